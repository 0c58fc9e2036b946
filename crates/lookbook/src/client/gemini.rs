//! Gemini `generateContent` client over HTTP.
//!
//! Both pipeline call shapes go through the same endpoint: the vision
//! analysis call sends text plus inline images to the text model, the image
//! call sends a prompt plus an `imageConfig` to the image-preview model and
//! expects a single inline image back.

use std::time::Duration;

use log::{debug, warn};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use super::{AspectRatio, ClientError, GenerativeClient, ImagePart, ImageSize, InlineImage};
use crate::error::ConfigError;
use async_trait::async_trait;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_VISION_MODEL: &str = "gemini-2.5-pro";
const DEFAULT_IMAGE_MODEL: &str = "gemini-3-pro-image-preview";

const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Image synthesis regularly takes tens of seconds at the 2K tier.
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(180);

/// Maximum length for error bodies echoed into error values.
const MAX_ERROR_BODY_LENGTH: usize = 200;

pub struct GeminiClient {
    http: Client,
    api_key: SecretString,
    base_url: String,
    vision_model: String,
    image_model: String,
}

impl GeminiClient {
    /// Creates a client for the given API credential.
    ///
    /// An empty credential is refused here, before any network call is made.
    pub fn new(api_key: SecretString) -> Result<Self, ConfigError> {
        if api_key.expose_secret().trim().is_empty() {
            return Err(ConfigError::EmptyCredential);
        }

        let http = Client::builder()
            .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
            .timeout(DEFAULT_REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ConfigError::HttpClient(e.to_string()))?;

        Ok(Self {
            http,
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            vision_model: DEFAULT_VISION_MODEL.to_string(),
            image_model: DEFAULT_IMAGE_MODEL.to_string(),
        })
    }

    /// Overrides the API base URL (test servers, proxies).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Overrides the model used for vision analysis.
    pub fn with_vision_model(mut self, model: impl Into<String>) -> Self {
        self.vision_model = model.into();
        self
    }

    /// Overrides the model used for image generation.
    pub fn with_image_model(mut self, model: impl Into<String>) -> Self {
        self.image_model = model.into();
        self
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/models/{}:generateContent", self.base_url, model)
    }

    async fn generate_content(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, ClientError> {
        debug!("POST generateContent model={}", model);
        let response = self
            .http
            .post(self.endpoint(model))
            .header("x-goog-api-key", self.api_key.expose_secret())
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = extract_api_error(&body);
            warn!("generateContent failed: {} {}", status, message);
            return Err(ClientError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl GenerativeClient for GeminiClient {
    async fn describe_images(
        &self,
        prompt: &str,
        images: &[ImagePart],
    ) -> Result<String, ClientError> {
        let mut parts = vec![Part::text(prompt)];
        parts.extend(images.iter().map(Part::inline_image));

        let request = GenerateContentRequest {
            contents: vec![Content { parts }],
            generation_config: None,
        };

        let response = self.generate_content(&self.vision_model, &request).await?;
        let text = response.concatenated_text()?;
        if text.trim().is_empty() {
            return Err(ClientError::NoTextPayload);
        }
        Ok(text)
    }

    async fn generate_image(
        &self,
        prompt: &str,
        aspect_ratio: AspectRatio,
        image_size: ImageSize,
    ) -> Result<InlineImage, ClientError> {
        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part::text(prompt)],
            }],
            generation_config: Some(GenerationConfig {
                image_config: ImageConfig {
                    aspect_ratio,
                    image_size,
                },
            }),
        };

        let response = self.generate_content(&self.image_model, &request).await?;
        response.first_inline_image()
    }
}

/// Pulls `error.message` out of an API error body, falling back to the
/// (truncated) raw body when it is not the usual envelope.
fn extract_api_error(body: &str) -> String {
    if let Ok(envelope) = serde_json::from_str::<ApiErrorEnvelope>(body) {
        if !envelope.error.message.is_empty() {
            return envelope.error.message;
        }
    }
    let mut message = body.trim().to_string();
    if message.len() > MAX_ERROR_BODY_LENGTH {
        let mut cut = MAX_ERROR_BODY_LENGTH;
        while !message.is_char_boundary(cut) {
            cut -= 1;
        }
        message.truncate(cut);
        message.push_str("... (truncated)");
    }
    message
}

// ============================================
// Wire types
// ============================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData>,
}

impl Part {
    fn text(text: &str) -> Self {
        Self {
            text: Some(text.to_string()),
            inline_data: None,
        }
    }

    fn inline_image(image: &ImagePart) -> Self {
        Self {
            text: None,
            inline_data: Some(InlineData {
                mime_type: image.mime_type.clone(),
                data: image.data.clone(),
            }),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    #[serde(default = "default_mime_type")]
    mime_type: String,
    data: String,
}

fn default_mime_type() -> String {
    "image/png".to_string()
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    image_config: ImageConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ImageConfig {
    aspect_ratio: AspectRatio,
    image_size: ImageSize,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
}

impl GenerateContentResponse {
    fn parts(&self) -> Result<&[Part], ClientError> {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|c| c.parts.as_slice())
            .ok_or(ClientError::EmptyResponse)
    }

    /// All text parts of the first candidate, concatenated.
    fn concatenated_text(&self) -> Result<String, ClientError> {
        let text: String = self
            .parts()?
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect();
        Ok(text)
    }

    /// The first inline image of the first candidate.
    fn first_inline_image(&self) -> Result<InlineImage, ClientError> {
        self.parts()?
            .iter()
            .find_map(|p| p.inline_data.as_ref())
            .map(|d| InlineImage {
                mime_type: d.mime_type.clone(),
                data: d.data.clone(),
            })
            .ok_or(ClientError::NoImagePayload)
    }
}

#[derive(Debug, Default, Deserialize)]
struct ApiErrorEnvelope {
    #[serde(default)]
    error: ApiError,
}

#[derive(Debug, Default, Deserialize)]
struct ApiError {
    #[serde(default)]
    message: String,
}
