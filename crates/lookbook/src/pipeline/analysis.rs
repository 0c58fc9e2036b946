//! Parsing and validation of the vision model's image analysis.

use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;

/// The pipeline requires exactly this many poses from the analysis.
pub const REQUIRED_POSE_COUNT: usize = 3;

/// A named body/camera configuration to render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pose {
    pub name: String,
    pub description: String,
}

/// Textual analysis of the reference images, detailed enough that a
/// vision-blind text-to-image model can reproduce the same person, garment,
/// and setting from text alone. Transient: produced and consumed within one
/// pipeline run, never persisted directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailedDescription {
    pub model_description: String,
    pub garment_description: String,
    #[serde(default)]
    pub background_description: String,
    pub theme: String,
    pub poses: Vec<Pose>,
}

impl DetailedDescription {
    /// Parses the raw text response from the vision model. The model is
    /// asked for bare JSON but routinely wraps it in prose or code fences,
    /// so the first balanced JSON object is extracted before parsing.
    pub fn parse(raw: &str) -> Result<Self, AnalysisError> {
        let json = extract_json(raw).ok_or(AnalysisError::NoJson)?;
        let description: DetailedDescription = serde_json::from_str(json)?;
        description.validate()?;
        Ok(description)
    }

    fn validate(&self) -> Result<(), AnalysisError> {
        if self.poses.len() != REQUIRED_POSE_COUNT {
            return Err(AnalysisError::PoseCount(self.poses.len()));
        }
        if self.model_description.trim().is_empty() {
            return Err(AnalysisError::EmptyModelDescription);
        }
        if self.garment_description.trim().is_empty() {
            return Err(AnalysisError::EmptyGarmentDescription);
        }
        Ok(())
    }

    /// Lossy one-line summary for display and persistence alongside the
    /// generated images.
    pub fn summary(&self) -> String {
        format!(
            "Model: {}... | Garment: {}...",
            char_prefix(&self.model_description, 100),
            char_prefix(&self.garment_description, 100)
        )
    }
}

fn char_prefix(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((index, _)) => &text[..index],
        None => text,
    }
}

/// Extracts the first balanced `{...}` object, tracking string boundaries
/// and escape sequences so braces inside string values don't end the scan.
fn extract_json(response: &str) -> Option<&str> {
    let start = response.find('{')?;

    let mut depth = 0usize;
    let mut in_string = false;
    let mut escape_next = false;

    for (i, c) in response[start..].char_indices() {
        if escape_next {
            escape_next = false;
            continue;
        }
        match c {
            '\\' if in_string => escape_next = true,
            '"' => in_string = !in_string,
            '{' if !in_string => depth += 1,
            '}' if !in_string => {
                depth -= 1;
                if depth == 0 {
                    return Some(&response[start..start + i + c.len_utf8()]);
                }
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_json() -> String {
        serde_json::json!({
            "modelDescription": "East Asian woman, mid twenties, oval face, dark brown eyes",
            "garmentDescription": "Coral pink linen shirt dress, relaxed fit, notched collar",
            "backgroundDescription": "Soft-lit studio with warm beige backdrop",
            "theme": "Editorial",
            "poses": [
                {"name": "Front View", "description": "Standing straight, facing camera"},
                {"name": "Three-Quarter View", "description": "Turned 45 degrees, hand on hip"},
                {"name": "Back View", "description": "Facing away, looking over shoulder"}
            ]
        })
        .to_string()
    }

    #[test]
    fn parses_bare_json() {
        let description = DetailedDescription::parse(&valid_json()).unwrap();
        assert_eq!(description.theme, "Editorial");
        assert_eq!(description.poses.len(), 3);
        assert_eq!(description.poses[0].name, "Front View");
    }

    #[test]
    fn parses_json_wrapped_in_prose() {
        let wrapped = format!(
            "Here is the requested analysis:\n```json\n{}\n```\nLet me know!",
            valid_json()
        );
        let description = DetailedDescription::parse(&wrapped).unwrap();
        assert_eq!(description.poses.len(), 3);
    }

    #[test]
    fn rejects_wrong_pose_count() {
        let mut value: serde_json::Value = serde_json::from_str(&valid_json()).unwrap();
        value["poses"].as_array_mut().unwrap().pop();
        let err = DetailedDescription::parse(&value.to_string()).unwrap_err();
        assert!(matches!(err, AnalysisError::PoseCount(2)));
    }

    #[test]
    fn rejects_empty_descriptions() {
        let mut value: serde_json::Value = serde_json::from_str(&valid_json()).unwrap();
        value["modelDescription"] = serde_json::json!("  ");
        assert!(matches!(
            DetailedDescription::parse(&value.to_string()),
            Err(AnalysisError::EmptyModelDescription)
        ));

        let mut value: serde_json::Value = serde_json::from_str(&valid_json()).unwrap();
        value["garmentDescription"] = serde_json::json!("");
        assert!(matches!(
            DetailedDescription::parse(&value.to_string()),
            Err(AnalysisError::EmptyGarmentDescription)
        ));
    }

    #[test]
    fn rejects_responses_without_json() {
        assert!(matches!(
            DetailedDescription::parse("I could not analyze these images."),
            Err(AnalysisError::NoJson)
        ));
    }

    #[test]
    fn extract_json_ignores_braces_inside_strings() {
        let tricky = r#"note {"a": "value with \" and { braces }", "b": 1} trailing"#;
        assert_eq!(
            extract_json(tricky),
            Some(r#"{"a": "value with \" and { braces }", "b": 1}"#)
        );
    }

    #[test]
    fn extract_json_returns_none_for_unbalanced_input() {
        assert_eq!(extract_json(r#"{"a": 1"#), None);
        assert_eq!(extract_json("no object here"), None);
    }

    #[test]
    fn summary_is_bounded() {
        let mut value: serde_json::Value = serde_json::from_str(&valid_json()).unwrap();
        value["modelDescription"] = serde_json::json!("x".repeat(500));
        let description = DetailedDescription::parse(&value.to_string()).unwrap();
        let summary = description.summary();
        assert!(summary.starts_with("Model: xxx"));
        assert!(summary.len() < 300);
    }
}
