//! The persisted project record and its size-optimization pass.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Marker appended to an over-length image reference to signal that lossy
/// truncation occurred. A truncated reference can no longer be rendered.
pub const TRUNCATION_MARKER: &str = "...";

/// One photoshoot session: inputs, selections, and generated outputs.
///
/// Field names serialize in camelCase to stay compatible with records
/// written by earlier versions of the application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    /// Opaque unique identifier, immutable for the record's lifetime.
    pub id: String,
    pub title: String,
    /// Creation timestamp; doubles as the sort and eviction key.
    pub date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    /// Source image references (URLs or data URLs).
    #[serde(default)]
    pub images: Vec<String>,
    /// Raw upload payloads. Never persisted; unconditionally dropped by the
    /// size-optimization pass.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub uploaded_files: Vec<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub selected_models: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub selected_backgrounds: Vec<String>,
    /// Pipeline outputs (usually data URLs).
    #[serde(default)]
    pub generated_images: Vec<String>,
    /// Opaque pipeline output retained for display; not interpreted here.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub scenarios: Vec<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ProjectMetadata>,
}

impl Project {
    /// Creates an otherwise empty project dated now.
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            date: Utc::now(),
            thumbnail: None,
            images: Vec::new(),
            uploaded_files: Vec::new(),
            selected_models: Vec::new(),
            selected_backgrounds: Vec::new(),
            generated_images: Vec::new(),
            scenarios: Vec::new(),
            metadata: None,
        }
    }
}

/// Free-form generation parameters kept with a project.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectMetadata {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub model_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zoom_level: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub products: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

/// Tunables for the project store.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Hard cap on the number of retained projects.
    pub max_projects: usize,
    /// Data-URL image references longer than this are truncated before
    /// persistence.
    pub image_truncate_threshold: usize,
    /// How much of a truncated reference survives, before the marker.
    pub truncated_prefix_len: usize,
    /// Thumbnails get a stricter bound than full images.
    pub thumbnail_truncate_threshold: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            max_projects: 50,
            image_truncate_threshold: 50_000,
            truncated_prefix_len: 1_000,
            thumbnail_truncate_threshold: 10_000,
        }
    }
}

/// True if a reference was cut down by the size-optimization pass.
pub fn is_truncated(reference: &str) -> bool {
    reference.starts_with("data:") && reference.ends_with(TRUNCATION_MARKER)
}

/// The size pass applied to every record before it is written: raw uploads
/// are dropped, over-threshold data-URLs are cut to a bounded prefix plus
/// the truncation marker. Lossy and one-way.
pub(crate) fn optimize_for_storage(mut project: Project, config: &StoreConfig) -> Project {
    project.uploaded_files.clear();

    for reference in project
        .images
        .iter_mut()
        .chain(project.generated_images.iter_mut())
    {
        truncate_data_url(
            reference,
            config.image_truncate_threshold,
            config.truncated_prefix_len,
        );
    }

    if let Some(thumbnail) = project.thumbnail.as_mut() {
        truncate_data_url(
            thumbnail,
            config.thumbnail_truncate_threshold,
            config.truncated_prefix_len,
        );
    }

    project
}

/// Short opaque URLs pass through; only embedded data URLs are bounded.
fn truncate_data_url(reference: &mut String, threshold: usize, keep: usize) {
    if !reference.starts_with("data:") || reference.len() <= threshold {
        return;
    }
    let mut cut = keep.min(reference.len());
    while !reference.is_char_boundary(cut) {
        cut -= 1;
    }
    reference.truncate(cut);
    reference.push_str(TRUNCATION_MARKER);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data_url(len: usize) -> String {
        let mut url = String::from("data:image/png;base64,");
        url.push_str(&"A".repeat(len - url.len()));
        url
    }

    #[test]
    fn long_data_urls_are_truncated_to_prefix_plus_marker() {
        let config = StoreConfig::default();
        let original = data_url(60_000);

        let mut project = Project::new("p1", "Test");
        project.generated_images = vec![original.clone()];
        let optimized = optimize_for_storage(project, &config);

        let stored = &optimized.generated_images[0];
        assert_eq!(
            stored.len(),
            config.truncated_prefix_len + TRUNCATION_MARKER.len()
        );
        assert!(original.starts_with(stored.trim_end_matches(TRUNCATION_MARKER)));
        assert!(is_truncated(stored));
    }

    #[test]
    fn short_references_pass_through_unchanged() {
        let config = StoreConfig::default();
        let mut project = Project::new("p1", "Test");
        project.images = vec!["https://cdn.example.com/a.png".to_string()];
        project.generated_images = vec![data_url(1_000)];

        let optimized = optimize_for_storage(project.clone(), &config);
        assert_eq!(optimized.images, project.images);
        assert_eq!(optimized.generated_images, project.generated_images);
    }

    #[test]
    fn plain_urls_are_never_truncated_even_when_long() {
        let config = StoreConfig::default();
        let long_url = format!("https://cdn.example.com/{}", "a".repeat(60_000));
        let mut project = Project::new("p1", "Test");
        project.images = vec![long_url.clone()];

        let optimized = optimize_for_storage(project, &config);
        assert_eq!(optimized.images[0], long_url);
    }

    #[test]
    fn uploaded_files_are_always_dropped() {
        let config = StoreConfig::default();
        let mut project = Project::new("p1", "Test");
        project.uploaded_files = vec![serde_json::json!({"name": "raw.jpg", "size": 123456})];

        let optimized = optimize_for_storage(project, &config);
        assert!(optimized.uploaded_files.is_empty());
    }

    #[test]
    fn thumbnail_uses_the_stricter_bound() {
        let config = StoreConfig::default();
        let mut project = Project::new("p1", "Test");
        // Over the thumbnail bound but under the image bound.
        project.thumbnail = Some(data_url(20_000));
        project.generated_images = vec![data_url(20_000)];

        let optimized = optimize_for_storage(project, &config);
        assert!(is_truncated(optimized.thumbnail.as_deref().unwrap()));
        assert!(!is_truncated(&optimized.generated_images[0]));
    }

    #[test]
    fn serializes_in_camel_case() {
        let mut project = Project::new("p1", "Test");
        project.selected_models = vec!["model-a".to_string()];
        project.generated_images = vec!["url".to_string()];

        let json = serde_json::to_value(&project).unwrap();
        assert!(json.get("selectedModels").is_some());
        assert!(json.get("generatedImages").is_some());
        assert!(json.get("uploadedFiles").is_none());
        // ISO-8601 date string.
        assert!(json["date"].as_str().unwrap().contains('T'));
    }
}
