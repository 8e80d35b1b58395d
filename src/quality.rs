// WHY: Reviewers triage batch output by these scores; they are heuristics over the
// rules that fired, not a second opinion on the text itself.

use serde::Serialize;

use crate::patterns::Pattern;
use crate::pipeline::AbbreviationResult;
use crate::rules::RuleKind;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QualityReport {
    pub confidence: f64,
    pub readability: f64,
    pub meaning_preserved: bool,
    /// Only dictionary forms and vowel-stripped words, nothing cut off
    pub is_standard: bool,
    pub suggestions: Vec<String>,
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub fn verify(result: &AbbreviationResult, target_length: usize) -> QualityReport {
    let fired = |pattern: Pattern| {
        result
            .rules_applied()
            .iter()
            .any(|rule| rule.kind == RuleKind::Pattern(pattern))
    };
    let severe = fired(Pattern::FirstLast);
    let truncated = severe || fired(Pattern::Truncation);
    let over_budget = result.abbreviated_length() > target_length;
    let meaning_preserved = !severe;
    let is_standard = !truncated;

    let readability = if severe {
        0.3
    } else if truncated {
        0.6
    } else if over_budget {
        0.7
    } else {
        1.0
    };

    let base = if over_budget || severe { 0.4 } else { 0.7 };
    let meaning_factor = if meaning_preserved { 0.2 } else { 0.0 };
    let standard_factor = if is_standard { 0.1 } else { 0.0 };
    let confidence = round2(f64::min(base + meaning_factor + standard_factor, 1.0));

    let mut suggestions = Vec::new();
    if severe {
        suggestions.push("Words were compressed to first and last letters, meaning may be lost".to_string());
    }
    if truncated {
        suggestions.push("Contains non-standard abbreviations".to_string());
    }
    if readability < 0.7 {
        suggestions.push("Some abbreviations may not be easily recognized".to_string());
    }
    if over_budget {
        suggestions.push(format!("Still exceeds the {target_length} character limit; consider a dictionary entry"));
    }

    QualityReport {
        confidence,
        readability: round2(readability),
        meaning_preserved,
        is_standard,
        suggestions,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dictionary::{DictionaryStore, SharedDictionary};
    use crate::pipeline::AbbreviationPipeline;

    fn run(text: &str, target: usize) -> AbbreviationResult {
        let store = DictionaryStore::from_pairs([("Recirculation", "RECIRC"), ("Cover", "Cvr")]).expect("valid");
        AbbreviationPipeline::rule_based(SharedDictionary::new(store))
            .abbreviate_text(text, target, false)
            .expect("valid request")
    }

    #[test]
    fn test_dictionary_result_is_standard() {
        let report = verify(&run("Recirculation Pump Cover", 20), 20);
        assert!(report.is_standard);
        assert!(report.meaning_preserved);
        assert_eq!(report.readability, 1.0);
        assert_eq!(report.confidence, 1.0);
        assert!(report.suggestions.is_empty());
    }

    #[test]
    fn test_truncation_lowers_readability() {
        let report = verify(&run("Thermoregulatorization", 10), 10);
        assert!(!report.is_standard);
        assert_eq!(report.readability, 0.6);
        assert_eq!(report.confidence, 0.9);
        assert_eq!(report.suggestions.len(), 2);
    }

    #[test]
    fn test_severe_compression_over_budget() {
        let report = verify(&run("Thermostat Controller", 3), 3);
        assert!(!report.meaning_preserved);
        assert_eq!(report.readability, 0.3);
        assert_eq!(report.confidence, 0.4);
        assert_eq!(report.suggestions.len(), 4);
    }
}
