//! API credential resolution and at-rest encryption.
//!
//! Credentials can come from three places, tried in priority order: a direct
//! value (quick local testing), a file (Docker secrets pattern), or an
//! environment variable. The resolved value is wrapped in `SecretString` so
//! it never shows up in debug output or logs.

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use secrecy::SecretString;
use std::fs;

/// Error type for credential resolution and encryption failures.
#[derive(Debug, thiserror::Error)]
pub enum SecretError {
    #[error("No secret source provided (need one of: direct value, file path, or env var name)")]
    NoSourceProvided,

    #[error("Failed to read secret from file '{path}': {source}")]
    FileReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Environment variable '{name}' not set")]
    EnvVarNotSet { name: String },

    #[error("Environment variable '{name}' contains invalid UTF-8")]
    EnvVarNotUnicode { name: String },

    #[error("Encryption error: {0}")]
    EncryptionError(String),

    #[error("Decryption error: {0}")]
    DecryptionError(String),

    #[error("Invalid encryption key: {0}")]
    InvalidKey(String),
}

pub type Result<T> = std::result::Result<T, SecretError>;

/// Resolves an API credential from multiple sources in priority order:
/// direct value, then file contents, then environment variable.
///
/// Empty strings are treated as "not provided" for every source. File and
/// env var contents are trimmed (both commonly carry trailing newlines).
pub fn resolve_secret(
    direct: Option<&str>,
    file_path: Option<&str>,
    env_var: Option<&str>,
) -> Result<SecretString> {
    if let Some(value) = direct.filter(|v| !v.is_empty()) {
        return Ok(SecretString::from(value.to_string()));
    }

    if let Some(path) = file_path.filter(|p| !p.is_empty()) {
        let expanded = expand_home(path);
        let content = fs::read_to_string(&expanded).map_err(|e| SecretError::FileReadError {
            path: expanded,
            source: e,
        })?;
        return Ok(SecretString::from(content.trim().to_string()));
    }

    if let Some(name) = env_var.filter(|n| !n.is_empty()) {
        return match std::env::var(name) {
            Ok(value) => Ok(SecretString::from(value.trim().to_string())),
            Err(std::env::VarError::NotPresent) => Err(SecretError::EnvVarNotSet {
                name: name.to_string(),
            }),
            Err(std::env::VarError::NotUnicode(_)) => Err(SecretError::EnvVarNotUnicode {
                name: name.to_string(),
            }),
        };
    }

    Err(SecretError::NoSourceProvided)
}

/// Like [`resolve_secret`], but a missing source is `Ok(None)` instead of an
/// error. Useful where an unset credential just disables a feature.
pub fn resolve_secret_optional(
    direct: Option<&str>,
    file_path: Option<&str>,
    env_var: Option<&str>,
) -> Result<Option<SecretString>> {
    match resolve_secret(direct, file_path, env_var) {
        Ok(secret) => Ok(Some(secret)),
        Err(SecretError::NoSourceProvided) => Ok(None),
        Err(e) => Err(e),
    }
}

/// Expands `~` or `~/path` to the current user's home directory.
/// `~user/path` syntax is not supported.
fn expand_home(path: &str) -> String {
    if path == "~" || path.starts_with("~/") {
        if let Some(home) = std::env::var_os("HOME").or_else(|| std::env::var_os("USERPROFILE")) {
            return path.replacen('~', &home.to_string_lossy(), 1);
        }
    }
    path.to_string()
}

/// Encryption key environment variable name.
pub const CREDENTIAL_KEY_ENV_VAR: &str = "LOOKBOOK_TOKEN_KEY";

/// Nonce size for AES-256-GCM (96 bits).
const NONCE_SIZE: usize = 12;

/// Encrypts stored API credentials at rest using AES-256-GCM.
///
/// The key is a 64-character hex string (32 bytes), normally supplied via the
/// `LOOKBOOK_TOKEN_KEY` environment variable. Ciphertext is base64 of the
/// random nonce followed by the AEAD output, so the same plaintext encrypts
/// differently every time.
pub struct CredentialEncryptor {
    cipher: Aes256Gcm,
}

impl CredentialEncryptor {
    /// Creates an encryptor from the `LOOKBOOK_TOKEN_KEY` environment variable.
    pub fn from_env() -> Result<Self> {
        let key_hex = std::env::var(CREDENTIAL_KEY_ENV_VAR).map_err(|_| {
            SecretError::InvalidKey(format!(
                "Environment variable {} not set",
                CREDENTIAL_KEY_ENV_VAR
            ))
        })?;
        Self::from_hex_key(&key_hex)
    }

    /// Creates an encryptor from a 64-character hex key.
    pub fn from_hex_key(key_hex: &str) -> Result<Self> {
        let key_bytes = decode_hex(key_hex)
            .map_err(|e| SecretError::InvalidKey(format!("Invalid hex key: {}", e)))?;

        if key_bytes.len() != 32 {
            return Err(SecretError::InvalidKey(format!(
                "Key must be 32 bytes (64 hex chars), got {} bytes",
                key_bytes.len()
            )));
        }

        let cipher = Aes256Gcm::new_from_slice(&key_bytes)
            .map_err(|e| SecretError::InvalidKey(format!("Failed to create cipher: {}", e)))?;

        Ok(Self { cipher })
    }

    /// Encrypts plaintext; returns base64 of `<nonce><ciphertext>`.
    pub fn encrypt(&self, plaintext: &str) -> Result<String> {
        let mut nonce_bytes = [0u8; NONCE_SIZE];
        getrandom::fill(&mut nonce_bytes).map_err(|e| {
            SecretError::EncryptionError(format!("Failed to generate nonce: {}", e))
        })?;
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = self
            .cipher
            .encrypt(nonce, plaintext.as_bytes())
            .map_err(|e| SecretError::EncryptionError(e.to_string()))?;

        let mut combined = nonce_bytes.to_vec();
        combined.extend(ciphertext);
        Ok(BASE64.encode(combined))
    }

    /// Decrypts base64 `<nonce><ciphertext>` back to plaintext.
    pub fn decrypt(&self, encoded: &str) -> Result<String> {
        let combined = BASE64
            .decode(encoded)
            .map_err(|e| SecretError::DecryptionError(format!("Invalid base64: {}", e)))?;

        if combined.len() < NONCE_SIZE {
            return Err(SecretError::DecryptionError(
                "Ciphertext too short".to_string(),
            ));
        }

        let (nonce_bytes, ciphertext) = combined.split_at(NONCE_SIZE);
        let plaintext_bytes = self
            .cipher
            .decrypt(Nonce::from_slice(nonce_bytes), ciphertext)
            .map_err(|e| SecretError::DecryptionError(e.to_string()))?;

        String::from_utf8(plaintext_bytes)
            .map_err(|e| SecretError::DecryptionError(format!("Invalid UTF-8: {}", e)))
    }
}

fn decode_hex(hex: &str) -> std::result::Result<Vec<u8>, String> {
    if hex.len() % 2 != 0 {
        return Err("Hex string must have even length".to_string());
    }
    (0..hex.len())
        .step_by(2)
        .map(|i| {
            u8::from_str_radix(&hex[i..i + 2], 16)
                .map_err(|e| format!("Invalid hex at position {}: {}", i, e))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use serial_test::serial;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    #[serial]
    fn direct_value_takes_priority() {
        std::env::set_var("LOOKBOOK_TEST_SECRET_1", "env_value");
        let result =
            resolve_secret(Some("direct_value"), None, Some("LOOKBOOK_TEST_SECRET_1")).unwrap();
        assert_eq!(result.expose_secret(), "direct_value");
        std::env::remove_var("LOOKBOOK_TEST_SECRET_1");
    }

    #[test]
    #[serial]
    fn file_takes_priority_over_env() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "file_value").unwrap();

        std::env::set_var("LOOKBOOK_TEST_SECRET_2", "env_value");
        let result = resolve_secret(
            None,
            Some(temp_file.path().to_str().unwrap()),
            Some("LOOKBOOK_TEST_SECRET_2"),
        )
        .unwrap();
        assert_eq!(result.expose_secret(), "file_value");
        std::env::remove_var("LOOKBOOK_TEST_SECRET_2");
    }

    #[test]
    #[serial]
    fn env_var_fallback_and_trimming() {
        std::env::set_var("LOOKBOOK_TEST_SECRET_3", " env_value \n");
        let result = resolve_secret(None, None, Some("LOOKBOOK_TEST_SECRET_3")).unwrap();
        assert_eq!(result.expose_secret(), "env_value");
        std::env::remove_var("LOOKBOOK_TEST_SECRET_3");
    }

    #[test]
    fn no_source_error() {
        assert!(matches!(
            resolve_secret(None, None, None),
            Err(SecretError::NoSourceProvided)
        ));
        assert!(resolve_secret_optional(None, None, None)
            .unwrap()
            .is_none());
    }

    #[test]
    #[serial]
    fn empty_strings_ignored() {
        std::env::set_var("LOOKBOOK_TEST_SECRET_4", "env_value");
        let result =
            resolve_secret(Some(""), Some(""), Some("LOOKBOOK_TEST_SECRET_4")).unwrap();
        assert_eq!(result.expose_secret(), "env_value");
        std::env::remove_var("LOOKBOOK_TEST_SECRET_4");
    }

    #[test]
    fn missing_file_is_an_error() {
        let result = resolve_secret(None, Some("/nonexistent/path/to/secret"), None);
        assert!(matches!(result, Err(SecretError::FileReadError { .. })));
    }

    const TEST_KEY: &str = "0123456789abcdef0123456789abcdef0123456789abcdef0123456789abcdef";

    #[test]
    fn encryptor_roundtrip() {
        let encryptor = CredentialEncryptor::from_hex_key(TEST_KEY).unwrap();
        let ciphertext = encryptor.encrypt("AIzaSy-example-key").unwrap();
        assert_eq!(encryptor.decrypt(&ciphertext).unwrap(), "AIzaSy-example-key");
    }

    #[test]
    fn encryptor_randomizes_nonce() {
        let encryptor = CredentialEncryptor::from_hex_key(TEST_KEY).unwrap();
        let c1 = encryptor.encrypt("same").unwrap();
        let c2 = encryptor.encrypt("same").unwrap();
        assert_ne!(c1, c2);
        assert_eq!(encryptor.decrypt(&c1).unwrap(), "same");
        assert_eq!(encryptor.decrypt(&c2).unwrap(), "same");
    }

    #[test]
    fn encryptor_rejects_bad_keys() {
        assert!(matches!(
            CredentialEncryptor::from_hex_key("0123"),
            Err(SecretError::InvalidKey(_))
        ));
        assert!(matches!(
            CredentialEncryptor::from_hex_key("not-hex-at-all!!"),
            Err(SecretError::InvalidKey(_))
        ));
    }

    #[test]
    fn encryptor_rejects_tampered_ciphertext() {
        let encryptor = CredentialEncryptor::from_hex_key(TEST_KEY).unwrap();
        let ciphertext = encryptor.encrypt("test").unwrap();

        let mut raw = BASE64.decode(&ciphertext).unwrap();
        if let Some(byte) = raw.last_mut() {
            *byte ^= 0xff;
        }
        let tampered = BASE64.encode(raw);
        assert!(matches!(
            encryptor.decrypt(&tampered),
            Err(SecretError::DecryptionError(_))
        ));

        assert!(matches!(
            encryptor.decrypt("@@@not-base64@@@"),
            Err(SecretError::DecryptionError(_))
        ));
        assert!(matches!(
            encryptor.decrypt("YWJjZA=="), // shorter than the nonce
            Err(SecretError::DecryptionError(_))
        ));
    }
}
