// WHY: The rule pass spreads reductions across words instead of crushing the
// first long one. It searches a per-word length cap from loose to tight and keeps
// the loosest cap whose result fits, so every word stays as readable as the
// budget allows.

use std::ops::Range;
use tracing::debug;

use crate::dictionary::DictionaryPass;
use crate::error::{AbbrevError, Result};
use crate::patterns::{Pattern, PatternParams, ESCALATION};
use crate::ranking::{Candidate, RankContext, Ranker};
use crate::rules::AppliedRule;
use crate::text::{alpha_spans, char_len, is_measurement, token_spans};

/// Slice of the working text; only eligible pieces are ever rewritten
#[derive(Debug, Clone)]
struct Piece {
    text: String,
    eligible: bool,
}

/// Result of one rule pass
#[derive(Debug, Clone, PartialEq)]
pub struct RuleOutcome {
    pub text: String,
    pub rules: Vec<AppliedRule>,
    pub fits: bool,
    /// Word choices accepted from the ranker
    pub ranked_choices: usize,
}

impl RuleOutcome {
    fn unchanged(text: &str, fits: bool) -> Self {
        Self {
            text: text.to_string(),
            rules: Vec::new(),
            fits,
            ranked_choices: 0,
        }
    }
}

#[derive(Debug)]
struct WordChoice {
    text: String,
    rules: Vec<AppliedRule>,
    ranked: bool,
}

/// Chooses per-word transformations for the rule pass
pub struct Scorer<'a> {
    params: PatternParams,
    ranker: Option<&'a dyn Ranker>,
    min_confidence: f64,
}

impl<'a> Scorer<'a> {
    /// Fixed-escalation scorer
    pub fn new(params: PatternParams) -> Self {
        Self {
            params,
            ranker: None,
            min_confidence: 0.0,
        }
    }

    /// Defer word choices to `ranker`; choices below `min_confidence` use the fixed rule
    pub fn with_ranker(mut self, ranker: &'a dyn Ranker, min_confidence: f64) -> Self {
        self.ranker = Some(ranker);
        self.min_confidence = min_confidence;
        self
    }

    /// Shorten the dictionary-pass output toward `target_length`.
    ///
    /// Fails only when the ranker fails; the caller then reruns without it.
    pub fn run(&self, pass: &DictionaryPass, target_length: usize) -> Result<RuleOutcome> {
        let pieces = segment(&pass.text, &pass.replaced);
        if char_len(&pass.text) <= target_length {
            return Ok(RuleOutcome::unchanged(&pass.text, true));
        }

        let longest = pieces
            .iter()
            .filter(|p| p.eligible)
            .map(|p| char_len(&p.text))
            .max()
            .unwrap_or(0);

        let mut tightest = None;
        for cap in (1..longest).rev() {
            let attempt = self.attempt(&pieces, cap, target_length, &pass.text)?;
            if attempt.fits {
                debug!("Rule pass fits at word cap {}", cap);
                return Ok(attempt);
            }
            tightest = Some(attempt);
        }

        debug!("Rule pass cannot reach {} characters", target_length);
        Ok(tightest.unwrap_or_else(|| RuleOutcome::unchanged(&pass.text, false)))
    }

    fn attempt(&self, pieces: &[Piece], cap: usize, target_length: usize, text: &str) -> Result<RuleOutcome> {
        let mut total: usize = pieces.iter().map(|p| char_len(&p.text)).sum();
        let mut output: Vec<String> = pieces.iter().map(|p| p.text.clone()).collect();
        let mut rules = Vec::new();
        let mut ranked_choices = 0;

        for (idx, piece) in pieces.iter().enumerate() {
            if total <= target_length {
                break;
            }
            let word_len = char_len(&piece.text);
            if !piece.eligible || word_len <= cap {
                continue;
            }

            let context = RankContext { word: &piece.text, budget: cap, text, target_length };
            let choice = self.choose(&context)?;
            total = total - word_len + char_len(&choice.text);
            if choice.ranked {
                ranked_choices += 1;
            }
            rules.extend(choice.rules);
            output[idx] = choice.text;
        }

        Ok(RuleOutcome {
            text: output.concat(),
            rules,
            fits: total <= target_length,
            ranked_choices,
        })
    }

    fn choose(&self, context: &RankContext<'_>) -> Result<WordChoice> {
        let standalone: Vec<(Pattern, String)> = ESCALATION
            .iter()
            .filter_map(|pattern| {
                pattern
                    .transform(context.word, context.budget, &self.params)
                    .filter(|out| char_len(out) <= context.budget)
                    .map(|out| (*pattern, out))
            })
            .collect();

        if let Some(ranker) = self.ranker {
            if let Some(choice) = self.ranked_choice(ranker, context, &standalone)? {
                return Ok(choice);
            }
        }
        Ok(self.fixed_choice(context, standalone))
    }

    /// Longest standalone output that fits, else the escalation chain
    fn fixed_choice(&self, context: &RankContext<'_>, standalone: Vec<(Pattern, String)>) -> WordChoice {
        let word = context.word;
        let mut best: Option<(Pattern, String)> = None;
        for (pattern, out) in standalone {
            if best.as_ref().map_or(true, |(_, b)| char_len(&out) > char_len(b)) {
                best = Some((pattern, out));
            }
        }
        if let Some((pattern, out)) = best {
            return WordChoice {
                rules: vec![AppliedRule::replacement(pattern, word, &out)],
                text: out,
                ranked: false,
            };
        }

        let mut current = word.to_string();
        let mut rules = Vec::new();
        for pattern in ESCALATION {
            if char_len(&current) <= context.budget {
                break;
            }
            if let Some(next) = pattern.transform(&current, context.budget, &self.params) {
                rules.push(AppliedRule::replacement(pattern, &current, &next));
                current = next;
            }
        }
        WordChoice { text: current, rules, ranked: false }
    }

    /// Ask the ranker; `None` means use the fixed choice for this word
    fn ranked_choice(
        &self,
        ranker: &dyn Ranker,
        context: &RankContext<'_>,
        standalone: &[(Pattern, String)],
    ) -> Result<Option<WordChoice>> {
        // dictionary hits were substituted before this pass, so candidates are transformer outputs
        let mut candidates: Vec<Candidate> = Vec::with_capacity(standalone.len());
        for (pattern, out) in standalone {
            if !candidates.iter().any(|c| &c.text == out) {
                candidates.push(Candidate::new(out.clone(), *pattern));
            }
        }
        if candidates.is_empty() {
            return Ok(None);
        }

        let ranked = ranker.rank(&candidates, context)?;
        let chosen = candidates
            .iter()
            .find(|c| c.text == ranked.chosen)
            .ok_or_else(|| {
                AbbrevError::Ranking(format!("ranker chose '{}' outside its candidate set", ranked.chosen))
            })?;

        if ranked.confidence < self.min_confidence {
            debug!(
                "Ranker confidence {:.2} below {:.2} for '{}'; using fixed rule",
                ranked.confidence, self.min_confidence, context.word
            );
            return Ok(None);
        }

        Ok(Some(WordChoice {
            rules: vec![AppliedRule::new(
                chosen.pattern,
                format!(
                    "'{}' -> '{}' (ranked by {}, confidence {:.2})",
                    context.word,
                    chosen.text,
                    ranker.method(),
                    ranked.confidence
                ),
            )],
            text: chosen.text.clone(),
            ranked: true,
        }))
    }
}

/// Split text into fixed and eligible pieces. Measurement tokens and
/// dictionary insertions are fixed; letter runs elsewhere are eligible.
fn segment(text: &str, protected: &[Range<usize>]) -> Vec<Piece> {
    let mut eligible: Vec<Range<usize>> = Vec::new();
    for token in token_spans(text) {
        let slice = &text[token.clone()];
        if is_measurement(slice) {
            continue;
        }
        for span in alpha_spans(slice) {
            let span = (token.start + span.start)..(token.start + span.end);
            let shielded = protected.iter().any(|p| span.start < p.end && p.start < span.end);
            if !shielded {
                eligible.push(span);
            }
        }
    }

    let mut pieces = Vec::with_capacity(eligible.len() * 2 + 1);
    let mut last = 0;
    for span in eligible {
        if span.start > last {
            pieces.push(Piece { text: text[last..span.start].to_string(), eligible: false });
        }
        pieces.push(Piece { text: text[span.clone()].to_string(), eligible: true });
        last = span.end;
    }
    if last < text.len() {
        pieces.push(Piece { text: text[last..].to_string(), eligible: false });
    }
    pieces
}
