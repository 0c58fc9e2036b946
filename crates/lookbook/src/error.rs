use thiserror::Error;

use crate::client::ClientError;
use crate::secrets::SecretError;
use crate::store::backend::BackendError;

#[derive(Error, Debug)]
pub enum LookbookError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Analysis error: {0}")]
    Analysis(#[from] AnalysisError),

    #[error("Generation error: {0}")]
    Generation(#[from] GenerationError),

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("No API credential configured")]
    MissingCredential,

    #[error("API credential is empty")]
    EmptyCredential,

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(String),
}

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Vision analysis call failed: {0}")]
    Client(#[source] ClientError),

    #[error("No JSON object found in analysis response")]
    NoJson,

    #[error("Failed to parse analysis JSON: {0}")]
    ParseJson(#[from] serde_json::Error),

    #[error("Expected exactly 3 poses, got {0}")]
    PoseCount(usize),

    #[error("Analysis produced an empty model description")]
    EmptyModelDescription,

    #[error("Analysis produced an empty garment description")]
    EmptyGarmentDescription,
}

#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("Image generation call failed: {0}")]
    Client(#[from] ClientError),
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Failed to serialize project records: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("Storage backend failure: {0}")]
    Backend(#[from] BackendError),

    #[error("Storage quota exhausted even after evicting all other projects: {0}")]
    QuotaExhausted(#[source] BackendError),

    #[error("Credential handling failed: {0}")]
    Credential(#[from] SecretError),
}

pub type Result<T> = std::result::Result<T, LookbookError>;
