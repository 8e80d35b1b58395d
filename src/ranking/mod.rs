// WHY: "Use ML if available" is decided once, at construction. The pipeline holds
// an Arc<dyn Ranker>; when no model loads it is the UnavailableRanker null object,
// whose rank() fails with ModelUnavailable and sends the scorer back to fixed rules.

use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::ModelsConfig;
use crate::error::{AbbrevError, Result};
use crate::patterns::Pattern;
use crate::pipeline::Method;

pub mod model;
pub mod registry;

pub use model::{BasicRanker, HybridRanker, LearnedModel, ModelKind, TrainingReport};
pub use registry::{ModelEntry, ModelRegistry};

/// One option the ranker may choose
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub text: String,
    /// Transformer that produced `text`
    pub pattern: Pattern,
}

impl Candidate {
    pub fn new(text: impl Into<String>, pattern: Pattern) -> Self {
        Self { text: text.into(), pattern }
    }
}

/// What the ranker knows about the word being shortened
#[derive(Debug, Clone, Copy)]
pub struct RankContext<'a> {
    pub word: &'a str,
    /// Per-word cap the candidates already satisfy
    pub budget: usize,
    /// Whole working text the word belongs to
    pub text: &'a str,
    pub target_length: usize,
}

/// The ranker's selection
#[derive(Debug, Clone, PartialEq)]
pub struct Ranked {
    pub chosen: String,
    pub confidence: f64,
}

/// Capability: select the best candidate abbreviation for a word.
///
/// Implementations must only return text taken from `candidates`.
pub trait Ranker: Send + Sync {
    /// Method reported when this ranker's choices are used
    fn method(&self) -> Method;

    fn rank(&self, candidates: &[Candidate], context: &RankContext<'_>) -> Result<Ranked>;

    fn is_available(&self) -> bool {
        true
    }
}

/// Null object used when no trained model is loaded
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableRanker;

impl Ranker for UnavailableRanker {
    fn method(&self) -> Method {
        Method::RuleBased
    }

    fn rank(&self, _candidates: &[Candidate], _context: &RankContext<'_>) -> Result<Ranked> {
        Err(AbbrevError::ModelUnavailable)
    }

    fn is_available(&self) -> bool {
        false
    }
}

/// Wrap a loaded model in the ranker matching its kind
pub fn ranker_for(model: LearnedModel) -> Arc<dyn Ranker> {
    match model.kind {
        ModelKind::Basic => Arc::new(BasicRanker::new(model)),
        ModelKind::Hybrid => Arc::new(HybridRanker::new(model)),
    }
}

/// Pick the ranker at startup.
///
/// For hybrid then basic: the registry's active entry, then the fixed path.
/// With nothing loadable the null object is returned.
pub fn load_ranker(models: &ModelsConfig) -> Arc<dyn Ranker> {
    let registry = match ModelRegistry::open(&models.registry_path) {
        Ok(registry) => Some(registry),
        Err(e) => {
            warn!("Error loading model registry {}: {}", models.registry_path.display(), e);
            None
        }
    };

    for (kind, fixed_path) in [(ModelKind::Hybrid, &models.hybrid_path), (ModelKind::Basic, &models.basic_path)] {
        if let Some(entry) = registry.as_ref().and_then(|r| r.active(kind)) {
            match try_load(&entry.path) {
                Some(model) => {
                    info!("Using {} ranking model {} from {}", kind, entry.id, entry.path.display());
                    return ranker_for(model);
                }
                None => warn!("Active {} model {} could not be loaded from {}", kind, entry.id, entry.path.display()),
            }
        }
        if let Some(model) = try_load(fixed_path) {
            info!("Using {} ranking model from {}", model.kind, fixed_path.display());
            return ranker_for(model);
        }
    }
    warn!("No ML models available. Using rule-based abbreviation only.");
    Arc::new(UnavailableRanker)
}

fn try_load(path: &Path) -> Option<LearnedModel> {
    if !path.exists() {
        return None;
    }
    match LearnedModel::load(path) {
        Ok(model) => Some(model),
        Err(e) => {
            warn!("Error loading model {}: {}", path.display(), e);
            None
        }
    }
}
