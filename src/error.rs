// WHY: One error taxonomy for the engine so callers can tell validation failures
// (caller's fault, never partially processed) from recovered or I/O conditions

use std::path::PathBuf;

/// Errors produced by the abbreviation engine and its collaborators
#[derive(Debug, thiserror::Error)]
pub enum AbbrevError {
    /// Request rejected before entering the pipeline
    #[error("validation error: {0}")]
    Validation(String),

    /// Dictionary entry rejected at insertion time
    #[error("invalid dictionary entry {original:?} -> {abbreviated:?}: {reason}")]
    InvalidTerm {
        original: String,
        abbreviated: String,
        reason: String,
    },

    /// No trained model is loaded; recovered by falling back to rules
    #[error("no trained ranking model is available")]
    ModelUnavailable,

    /// Ranker failed or returned a choice outside its candidate set
    #[error("ranking failed: {0}")]
    Ranking(String),

    /// Tabular input lacks a required column
    #[error("input is missing required column {0:?}")]
    MissingColumn(String),

    #[error("failed to persist {path}: {message}")]
    Persistence { path: PathBuf, message: String },

    #[error("{0} lock poisoned")]
    LockPoisoned(&'static str),

    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),
}

impl AbbrevError {
    /// Whether this error belongs to the caller-facing validation class
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            AbbrevError::Validation(_) | AbbrevError::InvalidTerm { .. } | AbbrevError::MissingColumn(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, AbbrevError>;
