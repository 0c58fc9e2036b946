//! Persisted API credential, optionally encrypted at rest.

use secrecy::SecretString;
use tracing::debug;

use super::backend::KeyValueBackend;
use crate::error::StoreError;
use crate::secrets::CredentialEncryptor;

/// Key holding the user's stored API credential.
pub const CREDENTIAL_KEY: &str = "lookbook.api_credential";

/// Stores the generative-API credential in the same key-value host as the
/// projects. Plaintext by default (matching the original application); pass
/// an encryptor to keep it AES-256-GCM encrypted at rest instead.
pub struct CredentialStore<B: KeyValueBackend> {
    backend: B,
    encryptor: Option<CredentialEncryptor>,
}

impl<B: KeyValueBackend> CredentialStore<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            encryptor: None,
        }
    }

    pub fn with_encryptor(backend: B, encryptor: CredentialEncryptor) -> Self {
        Self {
            backend,
            encryptor: Some(encryptor),
        }
    }

    /// The stored credential, or `None` if none has been saved.
    pub fn get(&self) -> Result<Option<SecretString>, StoreError> {
        let Some(raw) = self.backend.get(CREDENTIAL_KEY)? else {
            return Ok(None);
        };
        let plaintext = match &self.encryptor {
            Some(encryptor) => encryptor.decrypt(&raw)?,
            None => raw,
        };
        Ok(Some(SecretString::from(plaintext)))
    }

    pub fn save(&mut self, credential: &str) -> Result<(), StoreError> {
        let stored = match &self.encryptor {
            Some(encryptor) => encryptor.encrypt(credential)?,
            None => credential.to_string(),
        };
        self.backend.set(CREDENTIAL_KEY, &stored)?;
        debug!("API credential saved");
        Ok(())
    }

    pub fn remove(&mut self) -> Result<(), StoreError> {
        self.backend.remove(CREDENTIAL_KEY)?;
        Ok(())
    }

    pub fn has_credential(&self) -> Result<bool, StoreError> {
        Ok(self.backend.get(CREDENTIAL_KEY)?.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::backend::MemoryBackend;
    use secrecy::ExposeSecret;

    const TEST_KEY: &str = "0123456789abcdef0123456789abcdef0123456789abcdef0123456789abcdef";

    #[test]
    fn plaintext_roundtrip() {
        let mut store = CredentialStore::new(MemoryBackend::new());
        assert!(!store.has_credential().unwrap());
        assert!(store.get().unwrap().is_none());

        store.save("AIzaSy-example").unwrap();
        assert!(store.has_credential().unwrap());
        assert_eq!(
            store.get().unwrap().unwrap().expose_secret(),
            "AIzaSy-example"
        );

        store.remove().unwrap();
        assert!(!store.has_credential().unwrap());
    }

    #[test]
    fn encrypted_credential_is_not_stored_in_the_clear() {
        let encryptor = CredentialEncryptor::from_hex_key(TEST_KEY).unwrap();
        let mut store = CredentialStore::with_encryptor(MemoryBackend::new(), encryptor);
        store.save("AIzaSy-example").unwrap();

        // Raw backend value is ciphertext.
        let backend = store.backend;
        let raw = backend.get(CREDENTIAL_KEY).unwrap().unwrap();
        assert!(!raw.contains("AIzaSy-example"));

        let encryptor = CredentialEncryptor::from_hex_key(TEST_KEY).unwrap();
        let store = CredentialStore::with_encryptor(backend, encryptor);
        assert_eq!(
            store.get().unwrap().unwrap().expose_secret(),
            "AIzaSy-example"
        );
    }

    #[test]
    fn wrong_key_fails_decryption() {
        let encryptor = CredentialEncryptor::from_hex_key(TEST_KEY).unwrap();
        let mut store = CredentialStore::with_encryptor(MemoryBackend::new(), encryptor);
        store.save("secret").unwrap();

        let other_key = "ffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff";
        let wrong = CredentialEncryptor::from_hex_key(other_key).unwrap();
        let store = CredentialStore::with_encryptor(store.backend, wrong);
        assert!(matches!(store.get(), Err(StoreError::Credential(_))));
    }
}
