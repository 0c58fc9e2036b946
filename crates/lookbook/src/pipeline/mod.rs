//! The photoshoot generation pipeline: analyze reference images, synthesize
//! a seed image, then consistency-preserving pose variations.

pub mod analysis;
pub mod config;
pub mod error;
pub mod progress;
pub mod prompt;
pub mod runner;

pub use analysis::{DetailedDescription, Pose, REQUIRED_POSE_COUNT};
pub use config::{PhotoshootOptions, PromptContext};
pub use error::PipelineError;
pub use progress::{NoopProgress, PipelinePhase, ProgressEvent, ProgressReporter, TracingProgress};
pub use runner::{
    GeneratedImage, Photoshoot, PhotoshootInputs, PhotoshootResult, PoseOutcome,
};
