// WHY: rules_applied entries are human-readable strings on the wire, but the
// statistics aggregator needs to know which pattern fired without parsing prose

use serde::{Serialize, Serializer};
use std::fmt;

use crate::patterns::Pattern;

/// Which transformation produced an entry in rules_applied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RuleKind {
    Whitespace,
    Dictionary,
    Pattern(Pattern),
}

impl RuleKind {
    /// Stable name used in rule text and usage histograms
    pub fn name(&self) -> &'static str {
        match self {
            RuleKind::Whitespace => "whitespace",
            RuleKind::Dictionary => "dictionary",
            RuleKind::Pattern(pattern) => pattern.name(),
        }
    }
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl From<Pattern> for RuleKind {
    fn from(pattern: Pattern) -> Self {
        RuleKind::Pattern(pattern)
    }
}

/// One step that changed the text
#[derive(Debug, Clone, PartialEq)]
pub struct AppliedRule {
    pub kind: RuleKind,
    pub detail: String,
}

impl AppliedRule {
    pub fn new(kind: impl Into<RuleKind>, detail: impl Into<String>) -> Self {
        Self { kind: kind.into(), detail: detail.into() }
    }

    /// Standard "<kind>: 'from' -> 'to'" entry
    pub fn replacement(kind: impl Into<RuleKind>, from: &str, to: &str) -> Self {
        Self::new(kind, format!("'{from}' -> '{to}'"))
    }
}

impl fmt::Display for AppliedRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.detail)
    }
}

impl Serialize for AppliedRule {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
