//! Drives one photoshoot end to end: vision analysis, seed image, then
//! sequential pose variations.

use serde::{Deserialize, Serialize};

use crate::client::{GenerativeClient, ImagePart, InlineImage};
use crate::error::{AnalysisError, GenerationError};

use super::analysis::{DetailedDescription, Pose};
use super::config::PhotoshootOptions;
use super::error::PipelineError;
use super::progress::{PipelinePhase, ProgressEvent, ProgressReporter};
use super::prompt;

/// Reference images for one run. The scene image is optional; without it
/// the analysis invents a fitting background.
#[derive(Debug, Clone)]
pub struct PhotoshootInputs {
    pub model: ImagePart,
    pub garment: ImagePart,
    pub scene: Option<ImagePart>,
}

/// One generated image, base64-encoded with its mime type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedImage {
    pub mime_type: String,
    pub data: String,
}

impl GeneratedImage {
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data)
    }
}

impl From<InlineImage> for GeneratedImage {
    fn from(image: InlineImage) -> Self {
        Self {
            mime_type: image.mime_type,
            data: image.data,
        }
    }
}

/// The outcome for one pose. A pose whose generation failed keeps its
/// prompt so the caller can retry it later; `image` is `None` in that case.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoseOutcome {
    pub pose_name: String,
    pub prompt: String,
    pub image: Option<GeneratedImage>,
}

/// Everything one run produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoshootResult {
    pub theme: String,
    /// One-line summary of the analysis, for display alongside the images.
    pub description: String,
    pub poses: Vec<PoseOutcome>,
}

impl PhotoshootResult {
    /// Poses that actually produced an image.
    pub fn generated_count(&self) -> usize {
        self.poses.iter().filter(|p| p.image.is_some()).count()
    }
}

/// The photoshoot runner. Generic over the client so tests and alternative
/// backends can substitute their own implementation.
pub struct Photoshoot<C: GenerativeClient> {
    client: C,
    options: PhotoshootOptions,
}

impl<C: GenerativeClient> Photoshoot<C> {
    pub fn new(client: C) -> Self {
        Self {
            client,
            options: PhotoshootOptions::default(),
        }
    }

    pub fn with_options(mut self, options: PhotoshootOptions) -> Self {
        self.options = options;
        self
    }

    /// Runs the full pipeline. Analysis and seed-image failures abort the
    /// run; a failed pose variation is recorded prompt-only and the run
    /// continues with the remaining poses.
    pub async fn run(
        &self,
        inputs: &PhotoshootInputs,
        progress: &dyn ProgressReporter,
    ) -> Result<PhotoshootResult, PipelineError> {
        match self.run_inner(inputs, progress).await {
            Ok(result) => Ok(result),
            Err(err) => {
                progress.report(ProgressEvent::Failed {
                    error: err.to_string(),
                });
                Err(err)
            }
        }
    }

    async fn run_inner(
        &self,
        inputs: &PhotoshootInputs,
        progress: &dyn ProgressReporter,
    ) -> Result<PhotoshootResult, PipelineError> {
        progress.report(ProgressEvent::Phase {
            phase: PipelinePhase::Analyzing,
            message: "Analyzing reference images".to_string(),
        });
        let description = self.analyze(inputs).await?;
        tracing::info!(theme = %description.theme, "analysis complete");

        progress.report(ProgressEvent::Phase {
            phase: PipelinePhase::SeedGenerating,
            message: format!("Generating {}", description.poses[0].name),
        });
        let seed_pose = &description.poses[0];
        let seed_prompt = prompt::seed_prompt(&description, seed_pose);
        let seed = self
            .client
            .generate_image(&seed_prompt, self.options.aspect_ratio, self.options.image_size)
            .await
            .map_err(GenerationError::Client)?;
        tracing::debug!(pose = %seed_pose.name, "seed image generated");

        let mut poses = vec![PoseOutcome {
            pose_name: seed_pose.name.clone(),
            prompt: seed_prompt,
            image: Some(seed.into()),
        }];

        for (index, pose) in description.poses.iter().enumerate().skip(1) {
            progress.report(ProgressEvent::Phase {
                phase: PipelinePhase::VariationGenerating { pose_index: index },
                message: format!("Generating {}", pose.name),
            });
            let variation_prompt = prompt::variation_prompt(&description, pose);
            let image = match self
                .client
                .generate_image(
                    &variation_prompt,
                    self.options.aspect_ratio,
                    self.options.image_size,
                )
                .await
            {
                Ok(image) => Some(image.into()),
                Err(err) => {
                    tracing::warn!(pose = %pose.name, error = %err, "variation failed, continuing");
                    progress.report(ProgressEvent::PoseFailed {
                        pose_name: pose.name.clone(),
                        error: err.to_string(),
                    });
                    None
                }
            };
            poses.push(PoseOutcome {
                pose_name: pose.name.clone(),
                prompt: variation_prompt,
                image,
            });
        }

        let result = PhotoshootResult {
            theme: description.theme.clone(),
            description: description.summary(),
            poses,
        };
        progress.report(ProgressEvent::Completed {
            theme: result.theme.clone(),
            generated: result.generated_count(),
            attempted: result.poses.len(),
        });
        Ok(result)
    }

    async fn analyze(
        &self,
        inputs: &PhotoshootInputs,
    ) -> Result<DetailedDescription, AnalysisError> {
        let instruction =
            prompt::analysis_prompt(inputs.scene.is_some(), self.options.context.as_ref());

        // Image order matches the numbering in the instruction text.
        let mut images = Vec::with_capacity(3);
        if let Some(scene) = &inputs.scene {
            images.push(scene.clone());
        }
        images.push(inputs.model.clone());
        images.push(inputs.garment.clone());

        let response = self
            .client
            .describe_images(&instruction, &images)
            .await
            .map_err(AnalysisError::Client)?;
        DetailedDescription::parse(&response)
    }
}
