//! Key-value backends the project store persists into.
//!
//! The abstraction mirrors a browser localStorage host: string keys, string
//! values, synchronous access, and a hard byte quota that surfaces as a
//! distinct error so callers can react with eviction instead of failing.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("Storage quota exceeded: write needs {needed} bytes, capacity is {capacity}")]
    QuotaExceeded { needed: usize, capacity: usize },

    #[error("Failed to initialize storage root '{path}': {source}")]
    Init {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read key '{key}': {source}")]
    Read {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write key '{key}': {source}")]
    Write {
        key: String,
        #[source]
        source: std::io::Error,
    },
}

impl BackendError {
    /// True only for capacity errors, which trigger the eviction protocol.
    /// Everything else propagates untouched.
    pub fn is_quota_exceeded(&self) -> bool {
        matches!(self, BackendError::QuotaExceeded { .. })
    }
}

pub trait KeyValueBackend {
    fn get(&self, key: &str) -> Result<Option<String>, BackendError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), BackendError>;
    fn remove(&mut self, key: &str) -> Result<(), BackendError>;
}

/// In-memory backend with an optional byte quota over keys plus values.
///
/// The quota makes it double as the capacity-exhaustion simulator for tests.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    entries: HashMap<String, String>,
    quota_bytes: Option<usize>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quota(quota_bytes: usize) -> Self {
        Self {
            entries: HashMap::new(),
            quota_bytes: Some(quota_bytes),
        }
    }

    fn used_bytes_excluding(&self, key: &str) -> usize {
        self.entries
            .iter()
            .filter(|(k, _)| k.as_str() != key)
            .map(|(k, v)| k.len() + v.len())
            .sum()
    }
}

impl KeyValueBackend for MemoryBackend {
    fn get(&self, key: &str) -> Result<Option<String>, BackendError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), BackendError> {
        if let Some(capacity) = self.quota_bytes {
            let needed = self.used_bytes_excluding(key) + key.len() + value.len();
            if needed > capacity {
                return Err(BackendError::QuotaExceeded { needed, capacity });
            }
        }
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), BackendError> {
        self.entries.remove(key);
        Ok(())
    }
}

/// File-per-key backend under a root directory.
///
/// Writes go to a temp file first and are renamed into place, so a crashed
/// write never leaves a half-written value behind.
#[derive(Debug)]
pub struct FileBackend {
    root: PathBuf,
    quota_bytes: Option<usize>,
}

impl FileBackend {
    pub fn new<P: AsRef<Path>>(root: P) -> Result<Self, BackendError> {
        let root = root.as_ref().to_path_buf();
        std::fs::create_dir_all(&root).map_err(|e| BackendError::Init {
            path: root.clone(),
            source: e,
        })?;
        Ok(Self {
            root,
            quota_bytes: None,
        })
    }

    pub fn with_quota<P: AsRef<Path>>(root: P, quota_bytes: usize) -> Result<Self, BackendError> {
        let mut backend = Self::new(root)?;
        backend.quota_bytes = Some(quota_bytes);
        Ok(backend)
    }

    fn path_for(&self, key: &str) -> PathBuf {
        // Keys are dotted namespaces; keep them filesystem-safe.
        let name: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.root.join(name)
    }

    /// Sum of stored value sizes, excluding the key about to be replaced.
    fn used_bytes_excluding(&self, key: &str) -> Result<usize, BackendError> {
        let skip = self.path_for(key);
        let entries = std::fs::read_dir(&self.root).map_err(|e| BackendError::Read {
            key: key.to_string(),
            source: e,
        })?;

        let mut total = 0usize;
        for entry in entries {
            let entry = entry.map_err(|e| BackendError::Read {
                key: key.to_string(),
                source: e,
            })?;
            if entry.path() == skip {
                continue;
            }
            if let Ok(metadata) = entry.metadata() {
                if metadata.is_file() {
                    total += metadata.len() as usize;
                }
            }
        }
        Ok(total)
    }
}

impl KeyValueBackend for FileBackend {
    fn get(&self, key: &str) -> Result<Option<String>, BackendError> {
        match std::fs::read_to_string(self.path_for(key)) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(BackendError::Read {
                key: key.to_string(),
                source: e,
            }),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), BackendError> {
        if let Some(capacity) = self.quota_bytes {
            let needed = self.used_bytes_excluding(key)? + value.len();
            if needed > capacity {
                return Err(BackendError::QuotaExceeded { needed, capacity });
            }
        }

        let path = self.path_for(key);
        // Append rather than `with_extension`: sanitized names can start with
        // dots, which `with_extension` would collapse into `..`.
        let mut tmp = path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        let write_err = |e| BackendError::Write {
            key: key.to_string(),
            source: e,
        };

        std::fs::write(&tmp, value).map_err(write_err)?;
        std::fs::rename(&tmp, &path).map_err(write_err)?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), BackendError> {
        match std::fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(BackendError::Write {
                key: key.to_string(),
                source: e,
            }),
        }
    }
}
