use thiserror::Error;

use crate::error::{AnalysisError, ConfigError, GenerationError, LookbookError};

/// Fatal pipeline failures. Individual variation failures are not errors;
/// they are recorded as prompt-only pose entries in the result.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Image analysis failed: {0}")]
    Analysis(#[from] AnalysisError),

    #[error("Seed image generation failed: {0}")]
    SeedGeneration(#[from] GenerationError),
}

impl From<PipelineError> for LookbookError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::Config(e) => LookbookError::Config(e),
            PipelineError::Analysis(e) => LookbookError::Analysis(e),
            PipelineError::SeedGeneration(e) => LookbookError::Generation(e),
        }
    }
}
