// WHY: Training never overwrites an earlier model. Every run is registered as a
// new version with its metrics, and the registry names the active version of each
// kind, so a poor retrain is rolled back by activating an older id.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::info;

use super::model::{LearnedModel, ModelKind, TrainingReport};
use crate::dictionary::persistence::write_json_atomic;
use crate::error::{AbbrevError, Result};

/// One registered model version
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelEntry {
    /// `<kind>_v<version>`
    pub id: String,
    pub kind: ModelKind,
    pub version: u32,
    pub path: PathBuf,
    /// Seconds since the Unix epoch
    pub registered_at: u64,
    #[serde(default)]
    pub metrics: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct RegistryFile {
    #[serde(default)]
    active_models: BTreeMap<ModelKind, String>,
    #[serde(default)]
    models: Vec<ModelEntry>,
    #[serde(default)]
    last_updated: u64,
}

/// JSON index of trained models
#[derive(Debug, Clone)]
pub struct ModelRegistry {
    path: PathBuf,
    file: RegistryFile,
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

impl ModelRegistry {
    /// Open the registry at `path`; a missing file is an empty registry
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let file = if path.exists() {
            let file: RegistryFile = serde_json::from_reader(BufReader::new(File::open(&path)?))?;
            info!(
                "Loaded model registry with {} models ({} active)",
                file.models.len(),
                file.active_models.len()
            );
            file
        } else {
            RegistryFile::default()
        };
        Ok(Self { path, file })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Trained model files live next to the registry
    fn models_dir(&self) -> &Path {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    }

    fn next_version(&self, kind: ModelKind) -> u32 {
        self.file
            .models
            .iter()
            .filter(|m| m.kind == kind)
            .map(|m| m.version)
            .max()
            .unwrap_or(0)
            + 1
    }

    pub fn get(&self, id: &str) -> Option<&ModelEntry> {
        self.file.models.iter().find(|m| m.id == id)
    }

    /// Active entry for `kind`, if one is set and still registered
    pub fn active(&self, kind: ModelKind) -> Option<&ModelEntry> {
        self.file.active_models.get(&kind).and_then(|id| self.get(id))
    }

    pub fn is_active(&self, entry: &ModelEntry) -> bool {
        self.file.active_models.get(&entry.kind) == Some(&entry.id)
    }

    /// Registered models in registration order, optionally of one kind
    pub fn list(&self, kind: Option<ModelKind>) -> Vec<&ModelEntry> {
        self.file
            .models
            .iter()
            .filter(|m| kind.map_or(true, |k| m.kind == k))
            .collect()
    }

    /// Register an existing model file as the next version of `kind`
    pub fn register(
        &mut self,
        kind: ModelKind,
        path: impl Into<PathBuf>,
        metrics: BTreeMap<String, f64>,
        make_active: bool,
    ) -> Result<ModelEntry> {
        let version = self.next_version(kind);
        let entry = ModelEntry {
            id: format!("{kind}_v{version}"),
            kind,
            version,
            path: path.into(),
            registered_at: now_secs(),
            metrics,
        };

        let mut next = self.file.clone();
        if make_active {
            next.active_models.insert(kind, entry.id.clone());
        }
        next.models.push(entry.clone());
        self.commit(next)?;

        info!("Registered model {} of type {}", entry.id, kind);
        Ok(entry)
    }

    /// Save a freshly trained model as a new version and make it active
    pub fn register_trained(&mut self, model: &LearnedModel, report: &TrainingReport) -> Result<ModelEntry> {
        let version = self.next_version(model.kind);
        let path = self.models_dir().join(format!("{}_v{}.json", model.kind, version));
        model.save(&path)?;
        self.register(model.kind, path, report.metrics(), true)
    }

    pub fn set_active(&mut self, id: &str) -> Result<()> {
        let kind = self
            .get(id)
            .map(|m| m.kind)
            .ok_or_else(|| AbbrevError::Validation(format!("unknown model id '{id}'")))?;

        let mut next = self.file.clone();
        next.active_models.insert(kind, id.to_string());
        self.commit(next)?;

        info!("Set {} as active model for type {}", id, kind);
        Ok(())
    }

    /// Merge `metrics` into a registered model's metrics
    pub fn update_metrics(&mut self, id: &str, metrics: BTreeMap<String, f64>) -> Result<()> {
        let mut next = self.file.clone();
        let entry = next
            .models
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or_else(|| AbbrevError::Validation(format!("unknown model id '{id}'")))?;
        entry.metrics.extend(metrics);
        self.commit(next)?;

        info!("Updated metrics for model {}", id);
        Ok(())
    }

    /// Persist first; memory only changes once the file is written
    fn commit(&mut self, mut next: RegistryFile) -> Result<()> {
        next.last_updated = now_secs();
        write_json_atomic(&next, &self.path)?;
        self.file = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn trained(kind: ModelKind) -> (LearnedModel, TrainingReport) {
        let pairs = vec![("Cover Plate".to_string(), "Cvr Plt".to_string())];
        LearnedModel::train(kind, &pairs).expect("train")
    }

    #[test]
    fn test_register_trained_versions_and_activates() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let mut registry = ModelRegistry::open(temp_dir.path().join("model_registry.json")).expect("open");
        assert!(registry.active(ModelKind::Hybrid).is_none());

        let (model, report) = trained(ModelKind::Hybrid);
        let first = registry.register_trained(&model, &report).expect("register v1");
        let second = registry.register_trained(&model, &report).expect("register v2");

        assert_eq!(first.id, "hybrid_v1");
        assert_eq!(second.id, "hybrid_v2");
        assert!(first.path.exists() && second.path.exists(), "earlier versions are kept");
        assert_eq!(registry.active(ModelKind::Hybrid).map(|m| m.id.as_str()), Some("hybrid_v2"));
        assert_eq!(second.metrics.get("examples"), Some(&1.0));
        assert!(registry.active(ModelKind::Basic).is_none());
    }

    #[test]
    fn test_activate_persists_across_reopen() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join("model_registry.json");
        let mut registry = ModelRegistry::open(&path).expect("open");
        let (model, report) = trained(ModelKind::Basic);
        registry.register_trained(&model, &report).expect("register v1");
        registry.register_trained(&model, &report).expect("register v2");

        registry.set_active("basic_v1").expect("activate");
        let reopened = ModelRegistry::open(&path).expect("reopen");
        assert_eq!(reopened.active(ModelKind::Basic).map(|m| m.version), Some(1));
        assert_eq!(reopened.list(Some(ModelKind::Basic)).len(), 2);
        assert!(reopened.list(Some(ModelKind::Hybrid)).is_empty());
    }

    #[test]
    fn test_unknown_id_is_validation_error() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let mut registry = ModelRegistry::open(temp_dir.path().join("model_registry.json")).expect("open");
        assert!(registry.set_active("hybrid_v9").expect_err("unknown id").is_validation());
        assert!(registry
            .update_metrics("hybrid_v9", BTreeMap::new())
            .expect_err("unknown id")
            .is_validation());
        assert!(!registry.path().exists(), "failed edits write nothing");
    }

    #[test]
    fn test_update_metrics_merges() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let mut registry = ModelRegistry::open(temp_dir.path().join("model_registry.json")).expect("open");
        let metrics = BTreeMap::from([("examples".to_string(), 10.0), ("accuracy".to_string(), 0.5)]);
        let entry = registry
            .register(ModelKind::Basic, temp_dir.path().join("external.json"), metrics, false)
            .expect("register");
        assert!(!registry.is_active(&entry));

        registry
            .update_metrics(&entry.id, BTreeMap::from([("accuracy".to_string(), 0.8)]))
            .expect("update");
        let updated = registry.get(&entry.id).expect("registered");
        assert_eq!(updated.metrics.get("accuracy"), Some(&0.8));
        assert_eq!(updated.metrics.get("examples"), Some(&10.0));
    }

    #[test]
    fn test_corrupt_registry_is_an_error() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join("model_registry.json");
        std::fs::write(&path, "{ not json").expect("write corrupt registry");
        assert!(matches!(ModelRegistry::open(&path), Err(AbbrevError::Json(_))));
    }
}
