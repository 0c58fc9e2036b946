//! Access to the generative API.
//!
//! The pipeline talks to the backend exclusively through the
//! [`GenerativeClient`] trait, so tests can substitute a scripted client and
//! the HTTP layer stays in one place.

pub mod gemini;
pub mod image;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use gemini::GeminiClient;
pub use image::ImagePart;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API returned status {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Response contained no candidates")]
    EmptyResponse,

    #[error("Response contained no text payload")]
    NoTextPayload,

    #[error("Response contained no image payload")]
    NoImagePayload,
}

/// Aspect ratios accepted by the image-generation endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AspectRatio {
    #[serde(rename = "1:1")]
    Square,
    #[default]
    #[serde(rename = "2:3")]
    Portrait2x3,
    #[serde(rename = "3:2")]
    Landscape3x2,
    #[serde(rename = "3:4")]
    Portrait3x4,
    #[serde(rename = "4:3")]
    Landscape4x3,
    #[serde(rename = "4:5")]
    Portrait4x5,
    #[serde(rename = "5:4")]
    Landscape5x4,
    #[serde(rename = "9:16")]
    Portrait9x16,
    #[serde(rename = "16:9")]
    Landscape16x9,
    #[serde(rename = "21:9")]
    Ultrawide21x9,
}

impl AspectRatio {
    pub fn as_str(&self) -> &'static str {
        match self {
            AspectRatio::Square => "1:1",
            AspectRatio::Portrait2x3 => "2:3",
            AspectRatio::Landscape3x2 => "3:2",
            AspectRatio::Portrait3x4 => "3:4",
            AspectRatio::Landscape4x3 => "4:3",
            AspectRatio::Portrait4x5 => "4:5",
            AspectRatio::Landscape5x4 => "5:4",
            AspectRatio::Portrait9x16 => "9:16",
            AspectRatio::Landscape16x9 => "16:9",
            AspectRatio::Ultrawide21x9 => "21:9",
        }
    }
}

/// Resolution tier for generated images.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ImageSize {
    #[serde(rename = "1K")]
    OneK,
    #[default]
    #[serde(rename = "2K")]
    TwoK,
    #[serde(rename = "4K")]
    FourK,
}

impl ImageSize {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageSize::OneK => "1K",
            ImageSize::TwoK => "2K",
            ImageSize::FourK => "4K",
        }
    }
}

/// A generated image as returned by the API: base64 bytes plus MIME type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineImage {
    pub mime_type: String,
    /// Base64-encoded image bytes.
    pub data: String,
}

impl InlineImage {
    /// Wraps the payload into a directly displayable data URL.
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data)
    }
}

/// The two call shapes the pipeline needs from a generative backend.
#[async_trait]
pub trait GenerativeClient: Send + Sync {
    /// Sends a text prompt plus inline reference images to a vision-capable
    /// text model and returns the textual response.
    async fn describe_images(
        &self,
        prompt: &str,
        images: &[ImagePart],
    ) -> Result<String, ClientError>;

    /// Sends a text prompt to the text-to-image model and returns the single
    /// generated image payload.
    async fn generate_image(
        &self,
        prompt: &str,
        aspect_ratio: AspectRatio,
        image_size: ImageSize,
    ) -> Result<InlineImage, ClientError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aspect_ratio_serializes_as_wire_string() {
        assert_eq!(
            serde_json::to_string(&AspectRatio::Portrait2x3).unwrap(),
            "\"2:3\""
        );
        assert_eq!(
            serde_json::to_string(&AspectRatio::Ultrawide21x9).unwrap(),
            "\"21:9\""
        );
        assert_eq!(serde_json::to_string(&ImageSize::FourK).unwrap(), "\"4K\"");
    }

    #[test]
    fn aspect_ratio_defaults() {
        assert_eq!(AspectRatio::default(), AspectRatio::Portrait2x3);
        assert_eq!(ImageSize::default(), ImageSize::TwoK);
        assert_eq!(AspectRatio::default().as_str(), "2:3");
    }

    #[test]
    fn inline_image_data_url() {
        let image = InlineImage {
            mime_type: "image/png".to_string(),
            data: "aGVsbG8=".to_string(),
        };
        assert_eq!(image.to_data_url(), "data:image/png;base64,aGVsbG8=");
    }
}
