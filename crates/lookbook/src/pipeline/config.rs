use serde::{Deserialize, Serialize};

pub use crate::client::{AspectRatio, ImageSize};

/// Options for one pipeline run.
#[derive(Debug, Clone, Default)]
pub struct PhotoshootOptions {
    pub aspect_ratio: AspectRatio,
    pub image_size: ImageSize,
    /// Extra context folded into the analysis prompt when the user picked
    /// named presets instead of relying on the reference images alone.
    pub context: Option<PromptContext>,
}

/// User-supplied hints about the product and chosen presets.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_description: Option<String>,
    /// Description of the selected model preset (ethnicity, body type, style).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_category: Option<String>,
}

impl PromptContext {
    pub fn is_empty(&self) -> bool {
        self.product_name.is_none()
            && self.product_description.is_none()
            && self.model_description.is_none()
            && self.background_description.is_none()
            && self.background_category.is_none()
    }
}
