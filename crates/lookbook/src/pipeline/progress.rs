//! Progress reporting for pipeline runs.
//!
//! The pipeline makes several long network calls in sequence, so callers
//! embedding it in a UI need phase-level updates. Reporters receive owned
//! events and must not block.

/// Which stage of the run is active.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelinePhase {
    Analyzing,
    SeedGenerating,
    VariationGenerating { pose_index: usize },
}

/// A single progress update emitted by the runner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    /// A new phase started.
    Phase {
        phase: PipelinePhase,
        message: String,
    },
    /// A pose variation failed; the run continues with the remaining poses.
    PoseFailed { pose_name: String, error: String },
    /// The run finished. `generated` counts poses with an image out of
    /// `attempted` total poses.
    Completed {
        theme: String,
        generated: usize,
        attempted: usize,
    },
    /// The run aborted with a fatal error.
    Failed { error: String },
}

/// Receives progress updates during a pipeline run.
pub trait ProgressReporter: Send + Sync {
    fn report(&self, event: ProgressEvent);
}

/// Discards all events.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopProgress;

impl ProgressReporter for NoopProgress {
    fn report(&self, _event: ProgressEvent) {}
}

/// Logs events through `tracing` at levels matching their severity.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingProgress;

impl ProgressReporter for TracingProgress {
    fn report(&self, event: ProgressEvent) {
        match event {
            ProgressEvent::Phase { phase, message } => {
                tracing::info!(?phase, "{message}");
            }
            ProgressEvent::PoseFailed { pose_name, error } => {
                tracing::warn!(pose = %pose_name, %error, "pose variation failed");
            }
            ProgressEvent::Completed {
                theme,
                generated,
                attempted,
            } => {
                tracing::info!(%theme, generated, attempted, "photoshoot completed");
            }
            ProgressEvent::Failed { error } => {
                tracing::error!(%error, "photoshoot failed");
            }
        }
    }
}
