// WHY: Rule precedence is data. The rule pass iterates ESCALATION instead of
// hard-coding the Truncation -> Vowel Removal -> First+Last order in control flow

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::text::{char_len, char_prefix, is_vowel};

/// Hard floor for truncation: never cut a word below two characters
pub const MIN_TRUNCATION_FLOOR: usize = 2;

/// Single-token shortening strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pattern {
    Truncation,
    VowelRemoval,
    FirstLast,
}

/// Fixed escalation order, least to most aggressive
pub const ESCALATION: [Pattern; 3] = [Pattern::Truncation, Pattern::VowelRemoval, Pattern::FirstLast];

/// Tunables shared by all transformers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatternParams {
    /// Truncation keeps at least this many characters
    pub min_truncation_length: usize,
}

impl PatternParams {
    pub fn new(min_truncation_length: usize) -> Self {
        Self {
            min_truncation_length: min_truncation_length.max(MIN_TRUNCATION_FLOOR),
        }
    }
}

impl Default for PatternParams {
    fn default() -> Self {
        Self::new(4)
    }
}

impl Pattern {
    pub fn name(&self) -> &'static str {
        match self {
            Pattern::Truncation => "truncation",
            Pattern::VowelRemoval => "vowel_removal",
            Pattern::FirstLast => "first_last",
        }
    }

    /// Shrink `word` toward `budget` characters.
    ///
    /// Returns `None` when the transformer leaves the word unchanged. A returned
    /// word may still exceed the budget when the transformer's own floor is
    /// reached; callers decide whether that output fits.
    pub fn transform(&self, word: &str, budget: usize, params: &PatternParams) -> Option<String> {
        if char_len(word) <= budget {
            return None;
        }
        match self {
            Pattern::Truncation => truncate(word, budget, params),
            Pattern::VowelRemoval => remove_vowels(word, budget),
            Pattern::FirstLast => first_last(word),
        }
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn truncate(word: &str, budget: usize, params: &PatternParams) -> Option<String> {
    let keep = budget.max(params.min_truncation_length);
    if keep >= char_len(word) {
        return None;
    }
    Some(char_prefix(word, keep).to_string())
}

/// Drop internal vowels from the end toward the start until the budget is met
fn remove_vowels(word: &str, budget: usize) -> Option<String> {
    let mut chars: Vec<char> = word.chars().collect();
    let mut removed = false;

    let mut idx = chars.len();
    while idx > 1 && chars.len() > budget {
        idx -= 1;
        if is_vowel(chars[idx]) {
            chars.remove(idx);
            removed = true;
        }
    }

    removed.then(|| chars.into_iter().collect())
}

fn first_last(word: &str) -> Option<String> {
    let mut chars = word.chars();
    let first = chars.next()?;
    let last = chars.next_back()?;
    if char_len(word) <= 2 {
        return None;
    }
    Some([first, last].iter().collect())
}
