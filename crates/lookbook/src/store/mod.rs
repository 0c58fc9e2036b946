//! Client-side project persistence over a quota-bounded key-value host.

pub mod backend;
pub mod credentials;
pub mod model;
pub mod projects;
pub mod time;

pub use backend::{BackendError, FileBackend, KeyValueBackend, MemoryBackend};
pub use credentials::{CredentialStore, CREDENTIAL_KEY};
pub use model::{
    is_truncated, Position, Project, ProjectMetadata, StoreConfig, TRUNCATION_MARKER,
};
pub use projects::{
    LoadOutcome, ProjectStats, ProjectStore, StorageEstimate, COUNTER_KEY, PROJECTS_KEY,
};
pub use time::format_relative_time;
