//! Project persistence with capped capacity and quota-based eviction.
//!
//! All records live under a single key as one JSON array, read-modify-write
//! on every mutation. The store assumes a single active writer; concurrent
//! writers are not coordinated and the last write wins.

use std::collections::HashSet;

use serde::Serialize;
use tracing::{debug, warn};

use super::backend::{BackendError, KeyValueBackend};
use super::model::{optimize_for_storage, Project, StoreConfig};
use crate::error::StoreError;

/// Key holding the JSON-serialized array of all project records.
pub const PROJECTS_KEY: &str = "lookbook.projects";

/// Key holding the monotonic ID counter.
pub const COUNTER_KEY: &str = "lookbook.project_counter";

/// Result of reading the persisted collection. A corrupted store degrades to
/// an empty one at the public surface, but callers that want to log or alert
/// can inspect this directly.
#[derive(Debug)]
pub enum LoadOutcome {
    Intact(Vec<Project>),
    Corrupted,
}

impl LoadOutcome {
    pub fn into_projects(self) -> Vec<Project> {
        match self {
            LoadOutcome::Intact(projects) => projects,
            LoadOutcome::Corrupted => Vec::new(),
        }
    }
}

/// Aggregate counts over the stored collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectStats {
    pub total_photoshoots: usize,
    pub total_images: usize,
}

/// Serialized size of the stored collection. Diagnostics only, never used
/// for enforcement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageEstimate {
    pub bytes: usize,
    pub project_count: usize,
}

impl StorageEstimate {
    pub fn kilobytes(&self) -> f64 {
        self.bytes as f64 / 1024.0
    }

    pub fn megabytes(&self) -> f64 {
        self.kilobytes() / 1024.0
    }
}

pub struct ProjectStore<B: KeyValueBackend> {
    backend: B,
    config: StoreConfig,
}

impl<B: KeyValueBackend> ProjectStore<B> {
    pub fn new(backend: B) -> Self {
        Self::with_config(backend, StoreConfig::default())
    }

    pub fn with_config(backend: B, config: StoreConfig) -> Self {
        Self { backend, config }
    }

    /// Releases the backend, e.g. to hand it to a fresh store instance.
    pub fn into_backend(self) -> B {
        self.backend
    }

    /// Reads the raw collection without masking corruption.
    pub fn load(&self) -> LoadOutcome {
        let raw = match self.backend.get(PROJECTS_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return LoadOutcome::Intact(Vec::new()),
            Err(e) => {
                warn!("failed to read project store, treating as empty: {}", e);
                return LoadOutcome::Corrupted;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(projects) => LoadOutcome::Intact(projects),
            Err(e) => {
                warn!("project store is corrupted, treating as empty: {}", e);
                LoadOutcome::Corrupted
            }
        }
    }

    /// All projects in stored order (most recent first after any create).
    /// Never fails; a corrupted store reads as empty.
    pub fn list_all(&self) -> Vec<Project> {
        self.load().into_projects()
    }

    /// Linear scan; fine because the collection is capped at `max_projects`.
    pub fn get_by_id(&self, id: &str) -> Option<Project> {
        self.list_all().into_iter().find(|p| p.id == id)
    }

    /// Idempotent upsert keyed by `id`.
    ///
    /// The record passes through the size-optimization pass first. New
    /// records are prepended; if that pushes the collection over
    /// `max_projects` the oldest records (by `date`) are trimmed. A write
    /// that fails on capacity triggers the eviction protocol: drop the
    /// oldest 10% (at least one) and retry, then fall back to a singleton
    /// collection holding only this record. Non-capacity errors are not
    /// retried.
    ///
    /// Returns the record as stored (possibly truncated).
    pub fn save(&mut self, project: Project) -> Result<Project, StoreError> {
        let optimized = optimize_for_storage(project, &self.config);
        let mut projects = self.list_all();

        match projects.iter().position(|p| p.id == optimized.id) {
            Some(index) => projects[index] = optimized.clone(),
            None => {
                projects.insert(0, optimized.clone());
                if projects.len() > self.config.max_projects {
                    projects.sort_by(|a, b| b.date.cmp(&a.date));
                    projects.truncate(self.config.max_projects);
                }
            }
        }

        match self.persist(&projects) {
            Ok(()) => return Ok(optimized),
            Err(StoreError::Backend(e)) if e.is_quota_exceeded() => {
                warn!("storage quota exceeded, evicting oldest projects: {}", e);
            }
            Err(e) => return Err(e),
        }

        // Bulk remediation: drop the oldest 10% (at least one record), but
        // never the record being saved, and retry.
        let mut by_age = projects.clone();
        by_age.sort_by(|a, b| a.date.cmp(&b.date));
        let remove_count = (by_age.len() / 10).max(1);
        let doomed: HashSet<&str> = by_age
            .iter()
            .filter(|p| p.id != optimized.id)
            .take(remove_count)
            .map(|p| p.id.as_str())
            .collect();
        let remaining: Vec<Project> = projects
            .iter()
            .filter(|p| !doomed.contains(p.id.as_str()))
            .cloned()
            .collect();
        debug!(
            "evicted {} of {} projects to free storage",
            doomed.len(),
            projects.len()
        );

        match self.persist(&remaining) {
            Ok(()) => return Ok(optimized),
            Err(StoreError::Backend(e)) if e.is_quota_exceeded() => {
                warn!(
                    "still over quota after eviction, keeping only the current project: {}",
                    e
                );
            }
            Err(e) => return Err(e),
        }

        // Last resort: discard all history and keep only the current save.
        let singleton = vec![optimized.clone()];
        match self.persist(&singleton) {
            Ok(()) => Ok(optimized),
            Err(StoreError::Backend(e)) if e.is_quota_exceeded() => {
                Err(StoreError::QuotaExhausted(e))
            }
            Err(e) => Err(e),
        }
    }

    /// Removes the record with the given `id`. Returns whether one existed.
    pub fn delete_by_id(&mut self, id: &str) -> Result<bool, StoreError> {
        let projects = self.list_all();
        let filtered: Vec<Project> = projects.iter().filter(|p| p.id != id).cloned().collect();

        if filtered.len() == projects.len() {
            return Ok(false);
        }

        self.persist(&filtered)?;
        Ok(true)
    }

    /// Returns a fresh unique identifier from the persisted counter plus a
    /// wall-clock timestamp. Unique across reloads within the same backend.
    pub fn generate_id(&mut self) -> Result<String, StoreError> {
        let counter: u64 = self
            .backend
            .get(COUNTER_KEY)?
            .and_then(|raw| raw.parse().ok())
            .unwrap_or(0);
        let next = counter + 1;
        self.backend.set(COUNTER_KEY, &next.to_string())?;

        Ok(format!(
            "project-{}-{}",
            chrono::Utc::now().timestamp_millis(),
            next
        ))
    }

    pub fn stats(&self) -> ProjectStats {
        let projects = self.list_all();
        let total_images = projects.iter().map(|p| p.generated_images.len()).sum();
        ProjectStats {
            total_photoshoots: projects.len(),
            total_images,
        }
    }

    pub fn estimate_storage_usage(&self) -> StorageEstimate {
        let projects = self.list_all();
        let bytes = serde_json::to_string(&projects)
            .map(|json| json.len())
            .unwrap_or(0);
        StorageEstimate {
            bytes,
            project_count: projects.len(),
        }
    }

    /// Manual trim: keeps the `keep_count` most recent projects by `date`.
    /// Returns how many records were removed.
    pub fn clear_oldest(&mut self, keep_count: usize) -> Result<usize, StoreError> {
        let projects = self.list_all();
        if projects.len() <= keep_count {
            return Ok(0);
        }

        let mut sorted = projects;
        sorted.sort_by(|a, b| b.date.cmp(&a.date));
        let removed = sorted.len() - keep_count;
        sorted.truncate(keep_count);

        self.persist(&sorted)?;
        Ok(removed)
    }

    fn persist(&mut self, projects: &[Project]) -> Result<(), StoreError> {
        let json = serde_json::to_string(projects).map_err(StoreError::Serialize)?;
        self.backend.set(PROJECTS_KEY, &json)?;
        Ok(())
    }
}
