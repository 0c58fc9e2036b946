//! AI-assisted fashion lookbook generation and persistence.
//!
//! Two halves: the [`pipeline`] turns reference images into a themed set of
//! generated poses through a [`client::GenerativeClient`], and the [`store`]
//! persists the resulting projects into a quota-aware key-value backend with
//! automatic eviction.

pub mod client;
pub mod error;
pub mod pipeline;
pub mod secrets;
pub mod store;

pub use client::{
    AspectRatio, ClientError, GeminiClient, GenerativeClient, ImagePart, ImageSize, InlineImage,
};
pub use error::{
    AnalysisError, ConfigError, GenerationError, LookbookError, Result, StoreError,
};
pub use pipeline::{
    DetailedDescription, GeneratedImage, NoopProgress, Photoshoot, PhotoshootInputs,
    PhotoshootOptions, PhotoshootResult, PipelineError, Pose, PoseOutcome, ProgressEvent,
    ProgressReporter, TracingProgress,
};
pub use secrets::{resolve_secret, resolve_secret_optional, CredentialEncryptor, SecretError};
pub use store::{
    CredentialStore, FileBackend, KeyValueBackend, MemoryBackend, Project, ProjectStore,
    StoreConfig,
};
