// WHY: Each request walks an explicit state machine so every exit is a named
// terminal state. Validation failures leave before any work is done; an unmet
// budget is a normal PartialFailure carrying the best text achieved.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::config::{AbbreviationConfig, DEFAULT_TARGET_LENGTH};
use crate::dictionary::{DictionaryPass, SharedDictionary};
use crate::error::{AbbrevError, Result};
use crate::patterns::PatternParams;
use crate::ranking::{Ranker, UnavailableRanker};
use crate::rules::{AppliedRule, RuleKind};
use crate::scorer::{RuleOutcome, Scorer};
use crate::stats::StatisticsAggregator;
use crate::text::{char_len, collapse_whitespace};

/// Which strategy produced the final text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Method {
    Dictionary,
    RuleBased,
    MlBasic,
    MlHybrid,
    NoChange,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Dictionary => "dictionary",
            Method::RuleBased => "rule_based",
            Method::MlBasic => "ml_basic",
            Method::MlHybrid => "ml_hybrid",
            Method::NoChange => "no_change",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One unit of work
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbbreviationRequest {
    pub text: String,
    #[serde(default = "default_target_length")]
    pub target_length: usize,
    #[serde(default = "default_use_ml")]
    pub use_ml: bool,
}

fn default_target_length() -> usize {
    DEFAULT_TARGET_LENGTH
}

fn default_use_ml() -> bool {
    true
}

impl AbbreviationRequest {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            target_length: DEFAULT_TARGET_LENGTH,
            use_ml: true,
        }
    }

    pub fn with_target_length(mut self, target_length: usize) -> Self {
        self.target_length = target_length;
        self
    }

    pub fn with_ml(mut self, use_ml: bool) -> Self {
        self.use_ml = use_ml;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.target_length < 1 {
            return Err(AbbrevError::Validation("target_length must be at least 1".into()));
        }
        if self.text.trim().is_empty() {
            return Err(AbbrevError::Validation("text is empty".into()));
        }
        Ok(())
    }
}

/// Outcome of one request; built once and never mutated
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AbbreviationResult {
    original: String,
    original_length: usize,
    abbreviated: String,
    abbreviated_length: usize,
    reduction_percentage: f64,
    method_used: Method,
    rules_applied: Vec<AppliedRule>,
    success: bool,
}

impl AbbreviationResult {
    fn new(original: &str, abbreviated: String, method_used: Method, rules_applied: Vec<AppliedRule>, target_length: usize) -> Self {
        let original_length = char_len(original);
        let abbreviated_length = char_len(&abbreviated);
        let reduction_percentage = if original_length == 0 {
            0.0
        } else {
            (1.0 - abbreviated_length as f64 / original_length as f64) * 100.0
        };
        Self {
            original: original.to_string(),
            original_length,
            abbreviated,
            abbreviated_length,
            reduction_percentage,
            method_used,
            rules_applied,
            success: abbreviated_length <= target_length,
        }
    }

    pub fn original(&self) -> &str {
        &self.original
    }

    pub fn original_length(&self) -> usize {
        self.original_length
    }

    pub fn abbreviated(&self) -> &str {
        &self.abbreviated
    }

    pub fn abbreviated_length(&self) -> usize {
        self.abbreviated_length
    }

    pub fn reduction_percentage(&self) -> f64 {
        self.reduction_percentage
    }

    pub fn method_used(&self) -> Method {
        self.method_used
    }

    pub fn rules_applied(&self) -> &[AppliedRule] {
        &self.rules_applied
    }

    pub fn success(&self) -> bool {
        self.success
    }
}

/// Per-request states
#[derive(Debug)]
enum State {
    Init,
    DictionaryPass { working: String, rules: Vec<AppliedRule> },
    RulePass { pass: DictionaryPass, rules: Vec<AppliedRule> },
    Done(Terminal),
}

/// Terminal states
#[derive(Debug)]
enum Terminal {
    NoChange,
    Success { text: String, method: Method, rules: Vec<AppliedRule> },
    PartialFailure { text: String, method: Method, rules: Vec<AppliedRule> },
}

/// Orchestrates dictionary, rule and ranking passes for each request
#[derive(Clone)]
pub struct AbbreviationPipeline {
    dictionary: SharedDictionary,
    ranker: Arc<dyn Ranker>,
    params: PatternParams,
    min_confidence: f64,
    stats: Option<Arc<StatisticsAggregator>>,
}

impl AbbreviationPipeline {
    pub fn new(dictionary: SharedDictionary, ranker: Arc<dyn Ranker>, config: &AbbreviationConfig) -> Self {
        Self {
            dictionary,
            ranker,
            params: config.pattern_params(),
            min_confidence: config.min_confidence,
            stats: None,
        }
    }

    /// Pipeline with default tunables and no learned model
    pub fn rule_based(dictionary: SharedDictionary) -> Self {
        Self::new(dictionary, Arc::new(UnavailableRanker), &AbbreviationConfig::default())
    }

    /// Record every completed request into `stats`
    pub fn with_statistics(mut self, stats: Arc<StatisticsAggregator>) -> Self {
        self.stats = Some(stats);
        self
    }

    pub fn dictionary(&self) -> &SharedDictionary {
        &self.dictionary
    }

    pub fn statistics(&self) -> Option<&Arc<StatisticsAggregator>> {
        self.stats.as_ref()
    }

    pub fn ml_available(&self) -> bool {
        self.ranker.is_available()
    }

    pub fn abbreviate(&self, request: &AbbreviationRequest) -> Result<AbbreviationResult> {
        let target = request.target_length;
        let mut state = State::Init;

        let terminal = loop {
            state = match state {
                State::Init => {
                    request.validate()?;
                    if char_len(&request.text) <= target {
                        State::Done(Terminal::NoChange)
                    } else {
                        let working = collapse_whitespace(&request.text);
                        let mut rules = Vec::new();
                        if working != request.text {
                            rules.push(AppliedRule::new(RuleKind::Whitespace, "collapsed whitespace"));
                        }
                        State::DictionaryPass { working, rules }
                    }
                }
                State::DictionaryPass { working, mut rules } => {
                    let snapshot = self.dictionary.snapshot()?;
                    let pass = snapshot.apply(&working);
                    rules.extend(pass.rules.iter().cloned());
                    if char_len(&pass.text) <= target {
                        let method = if pass.substitutions() > 0 {
                            Method::Dictionary
                        } else {
                            Method::RuleBased
                        };
                        State::Done(Terminal::Success { text: pass.text, method, rules })
                    } else {
                        State::RulePass { pass, rules }
                    }
                }
                State::RulePass { pass, mut rules } => {
                    let (outcome, method) = self.rule_pass(&pass, request)?;
                    rules.extend(outcome.rules);
                    let terminal = if outcome.fits {
                        Terminal::Success { text: outcome.text, method, rules }
                    } else {
                        Terminal::PartialFailure { text: outcome.text, method, rules }
                    };
                    State::Done(terminal)
                }
                State::Done(terminal) => break terminal,
            };
        };

        let result = match terminal {
            Terminal::NoChange => {
                AbbreviationResult::new(&request.text, request.text.clone(), Method::NoChange, Vec::new(), target)
            }
            Terminal::Success { text, method, rules } => {
                AbbreviationResult::new(&request.text, text, method, rules, target)
            }
            Terminal::PartialFailure { text, method, rules } => {
                debug!("Budget {} not met for '{}'", target, request.text);
                AbbreviationResult::new(&request.text, text, method, rules, target)
            }
        };

        if let Some(stats) = &self.stats {
            stats.record(&result);
        }
        Ok(result)
    }

    /// Convenience wrapper over `abbreviate`
    pub fn abbreviate_text(&self, text: &str, target_length: usize, use_ml: bool) -> Result<AbbreviationResult> {
        self.abbreviate(
            &AbbreviationRequest::new(text)
                .with_target_length(target_length)
                .with_ml(use_ml),
        )
    }

    /// Rule pass, deferring to the ranker when requested; any ranker failure reruns with fixed rules
    fn rule_pass(&self, pass: &DictionaryPass, request: &AbbreviationRequest) -> Result<(RuleOutcome, Method)> {
        let scorer = Scorer::new(self.params);

        if request.use_ml {
            let ranked = Scorer::new(self.params)
                .with_ranker(self.ranker.as_ref(), self.min_confidence)
                .run(pass, request.target_length);
            match ranked {
                Ok(outcome) => {
                    let method = if outcome.ranked_choices > 0 {
                        self.ranker.method()
                    } else {
                        Method::RuleBased
                    };
                    return Ok((outcome, method));
                }
                Err(AbbrevError::ModelUnavailable) => {
                    debug!("No ranking model loaded; using fixed escalation");
                }
                Err(e) => {
                    warn!("Ranker failed, falling back to fixed escalation: {}", e);
                }
            }
        }

        Ok((scorer.run(pass, request.target_length)?, Method::RuleBased))
    }
}
