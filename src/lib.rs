pub mod batch;
pub mod config;
pub mod dictionary;
pub mod error;
pub mod patterns;
pub mod pipeline;
pub mod quality;
pub mod ranking;
pub mod rules;
pub mod scorer;
pub mod stats;
pub mod text;

// Re-export main types for convenient access
pub use error::{AbbrevError, Result};
pub use pipeline::{AbbreviationPipeline, AbbreviationRequest, AbbreviationResult, Method};
pub use rules::{AppliedRule, RuleKind};

// Re-export dictionary management
pub use dictionary::{BulkReport, DictionaryStore, SharedDictionary, Term};

// Re-export ranking capability and models
pub use ranking::{load_ranker, LearnedModel, ModelKind, ModelRegistry, Ranker, UnavailableRanker};

// Re-export batch and statistics types for the CLI and benchmarks
pub use batch::{BatchOptions, BatchProcessor, BatchSummary, Table};
pub use stats::{RunStatistics, StatisticsAggregator};
