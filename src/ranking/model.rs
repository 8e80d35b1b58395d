// WHY: Learned rankers are small statistical models fitted on historical
// (description, approved abbreviation) pairs. They only ever reorder candidates
// the rule engine produced, so a bad model degrades choice, never correctness.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::str::FromStr;
use tracing::info;

use super::{Candidate, RankContext, Ranked, Ranker};
use crate::dictionary::persistence::write_json_atomic;
use crate::error::{AbbrevError, Result};
use crate::patterns::Pattern;
use crate::pipeline::Method;
use crate::text::{char_len, collapse_whitespace, is_measurement, is_vowel};

/// Ratio assumed before any training data is seen
const DEFAULT_RATIO: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    Basic,
    Hybrid,
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelKind::Basic => f.write_str("basic"),
            ModelKind::Hybrid => f.write_str("hybrid"),
        }
    }
}

impl FromStr for ModelKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "basic" => Ok(ModelKind::Basic),
            "hybrid" => Ok(ModelKind::Hybrid),
            other => Err(format!("unknown model kind '{other}', expected basic or hybrid")),
        }
    }
}

/// How often each transformer explains an approved abbreviation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternCounts {
    pub truncation: usize,
    pub vowel_removal: usize,
    pub first_last: usize,
    /// Abbreviations no single transformer reproduces
    pub other: usize,
}

impl PatternCounts {
    fn record(&mut self, pattern: Option<Pattern>) {
        match pattern {
            Some(Pattern::Truncation) => self.truncation += 1,
            Some(Pattern::VowelRemoval) => self.vowel_removal += 1,
            Some(Pattern::FirstLast) => self.first_last += 1,
            None => self.other += 1,
        }
    }

    fn get(&self, pattern: Pattern) -> usize {
        match pattern {
            Pattern::Truncation => self.truncation,
            Pattern::VowelRemoval => self.vowel_removal,
            Pattern::FirstLast => self.first_last,
        }
    }
}

/// Summary printed after training
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrainingReport {
    pub kind: ModelKind,
    pub examples: usize,
    pub aligned_words: usize,
    pub learned_words: usize,
    /// Mean absolute error of the predicted length ratio on the training words
    pub mean_absolute_error: f64,
}

impl TrainingReport {
    /// Numeric fields as registry metrics
    pub fn metrics(&self) -> BTreeMap<String, f64> {
        BTreeMap::from([
            ("examples".to_string(), self.examples as f64),
            ("aligned_words".to_string(), self.aligned_words as f64),
            ("learned_words".to_string(), self.learned_words as f64),
            ("mean_absolute_error".to_string(), self.mean_absolute_error),
        ])
    }
}

/// Persisted ranking model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearnedModel {
    pub kind: ModelKind,
    /// Lowercase word -> most frequent approved abbreviation
    pub word_abbreviations: BTreeMap<String, String>,
    pub pattern_counts: PatternCounts,
    /// Mean abbreviated/original length over changed words
    pub mean_ratio: f64,
    /// Mean ratio per word-length bucket (1-4, 5-7, 8-10, 11+)
    pub bucket_ratios: [Option<f64>; 4],
    pub trained_examples: usize,
}

fn length_bucket(len: usize) -> usize {
    match len {
        0..=4 => 0,
        5..=7 => 1,
        8..=10 => 2,
        _ => 3,
    }
}

/// Which single transformer reproduces `abbreviated` from `original`, ignoring case
fn classify(original: &str, abbreviated: &str) -> Option<Pattern> {
    let o: Vec<char> = original.chars().flat_map(char::to_lowercase).collect();
    let a: Vec<char> = abbreviated.chars().flat_map(char::to_lowercase).collect();
    if a.is_empty() || a.len() >= o.len() {
        return None;
    }

    if o.len() > 2 && a.len() == 2 && a[0] == o[0] && a[1] == o[o.len() - 1] {
        Some(Pattern::FirstLast)
    } else if o.starts_with(&a) {
        Some(Pattern::Truncation)
    } else if is_vowel_stripped(&o, &a) {
        Some(Pattern::VowelRemoval)
    } else {
        None
    }
}

/// `a` is `o` minus some non-leading vowels
fn is_vowel_stripped(o: &[char], a: &[char]) -> bool {
    let mut j = 0;
    for (i, &ch) in o.iter().enumerate() {
        if j < a.len() && a[j] == ch {
            j += 1;
        } else if i == 0 || !is_vowel(ch) {
            return false;
        }
    }
    j == a.len()
}

/// Ordered share of the word's consonants the candidate keeps
fn consonant_retention(word: &str, candidate: &str) -> f64 {
    let consonants: Vec<char> = word
        .chars()
        .filter(|c| c.is_alphabetic() && !is_vowel(*c))
        .flat_map(char::to_lowercase)
        .collect();
    if consonants.is_empty() {
        return 1.0;
    }
    let mut remaining = candidate.chars().flat_map(char::to_lowercase);
    let kept = consonants.iter().filter(|&&c| remaining.any(|x| x == c)).count();
    kept as f64 / consonants.len() as f64
}

/// Pair description tokens with abbreviation tokens sharing a first letter, in order
fn align_words<'a>(original: &'a str, abbreviated: &'a str) -> Vec<(&'a str, &'a str)> {
    let abbr_tokens: Vec<&str> = abbreviated.split_whitespace().collect();
    let mut pairs = Vec::new();
    let mut j = 0;
    for token in original.split_whitespace() {
        let Some(candidate) = abbr_tokens.get(j) else { break };
        if is_measurement(token) || !token.chars().all(char::is_alphabetic) {
            if *candidate == token {
                j += 1;
            }
            continue;
        }
        let first = |s: &str| s.chars().next().map(|c| c.to_lowercase().collect::<String>());
        if first(token) == first(*candidate) {
            pairs.push((token, *candidate));
            j += 1;
        }
    }
    pairs
}

impl LearnedModel {
    /// Fit a model on (description, abbreviation) pairs
    pub fn train(kind: ModelKind, pairs: &[(String, String)]) -> Result<(Self, TrainingReport)> {
        let usable: Vec<(String, String)> = pairs
            .iter()
            .map(|(o, a)| (collapse_whitespace(o), collapse_whitespace(a)))
            .filter(|(o, a)| !o.is_empty() && !a.is_empty())
            .collect();
        if usable.is_empty() {
            return Err(AbbrevError::Validation("no usable training pairs".into()));
        }

        let mut word_counts: BTreeMap<String, BTreeMap<String, usize>> = BTreeMap::new();
        let mut pattern_counts = PatternCounts::default();
        let mut ratio_sum = 0.0;
        let mut bucket_sums = [(0.0_f64, 0_usize); 4];
        let mut observations: Vec<(usize, f64)> = Vec::new();
        let mut aligned_words = 0;

        for (original, abbreviated) in &usable {
            for (word, abbr) in align_words(original, abbreviated) {
                aligned_words += 1;
                if word.eq_ignore_ascii_case(abbr) {
                    continue;
                }
                let word_len = char_len(word);
                let ratio = char_len(abbr) as f64 / word_len as f64;
                if ratio >= 1.0 {
                    continue;
                }

                *word_counts
                    .entry(word.to_lowercase())
                    .or_default()
                    .entry(abbr.to_string())
                    .or_default() += 1;
                pattern_counts.record(classify(word, abbr));

                ratio_sum += ratio;
                let bucket = &mut bucket_sums[length_bucket(word_len)];
                bucket.0 += ratio;
                bucket.1 += 1;
                observations.push((word_len, ratio));
            }
        }

        let word_abbreviations: BTreeMap<String, String> = word_counts
            .into_iter()
            .filter_map(|(word, counts)| {
                // most frequent; ties go to the lexicographically smallest for stable output
                let mut best: Option<(&String, usize)> = None;
                for (abbr, count) in &counts {
                    if best.map_or(true, |(_, c)| *count > c) {
                        best = Some((abbr, *count));
                    }
                }
                best.map(|(abbr, _)| (word, abbr.clone()))
            })
            .collect();

        let mean_ratio = if observations.is_empty() {
            DEFAULT_RATIO
        } else {
            ratio_sum / observations.len() as f64
        };
        let bucket_ratios = bucket_sums.map(|(sum, count)| (count > 0).then(|| sum / count as f64));

        let model = Self {
            kind,
            word_abbreviations,
            pattern_counts,
            mean_ratio,
            bucket_ratios,
            trained_examples: usable.len(),
        };

        let mean_absolute_error = if observations.is_empty() {
            0.0
        } else {
            observations
                .iter()
                .map(|(len, ratio)| (model.predicted_ratio(*len) - ratio).abs())
                .sum::<f64>()
                / observations.len() as f64
        };

        let report = TrainingReport {
            kind,
            examples: usable.len(),
            aligned_words,
            learned_words: model.word_abbreviations.len(),
            mean_absolute_error,
        };
        info!(
            "Trained {} model on {} examples ({} learned words, MAE {:.3})",
            kind, report.examples, report.learned_words, report.mean_absolute_error
        );
        Ok((model, report))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let model: Self = serde_json::from_reader(BufReader::new(file))?;
        Ok(model)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        write_json_atomic(self, path)?;
        info!("Saved {} model to {}", self.kind, path.display());
        Ok(())
    }

    /// Expected abbreviated/original ratio for a word of `word_len` characters
    pub fn predicted_ratio(&self, word_len: usize) -> f64 {
        match self.kind {
            ModelKind::Basic => self.mean_ratio,
            ModelKind::Hybrid => self.bucket_ratios[length_bucket(word_len)].unwrap_or(self.mean_ratio),
        }
    }

    pub fn learned(&self, word: &str) -> Option<&str> {
        self.word_abbreviations.get(&word.to_lowercase()).map(String::as_str)
    }

    /// Prior for a transformer, normalized so the most common pattern scores 1
    fn prior(&self, pattern: Pattern) -> f64 {
        let smoothed = |p: Pattern| self.pattern_counts.get(p) as f64 + 1.0;
        let max = [Pattern::Truncation, Pattern::VowelRemoval, Pattern::FirstLast]
            .into_iter()
            .map(smoothed)
            .fold(1.0, f64::max);
        smoothed(pattern) / max
    }

    fn length_fit(&self, word: &str, candidate: &str) -> f64 {
        let word_len = char_len(word);
        if word_len == 0 {
            return 0.0;
        }
        let actual = char_len(candidate) as f64 / word_len as f64;
        (1.0 - (actual - self.predicted_ratio(word_len)).abs()).clamp(0.0, 1.0)
    }

    /// Score in [0, 1]
    pub fn score(&self, candidate: &Candidate, word: &str) -> f64 {
        if self
            .learned(word)
            .is_some_and(|learned| learned.eq_ignore_ascii_case(&candidate.text))
        {
            return 1.0;
        }

        let prior = self.prior(candidate.pattern);
        let length = self.length_fit(word, &candidate.text);
        match self.kind {
            ModelKind::Basic => 0.5 * prior + 0.5 * length,
            ModelKind::Hybrid => 0.4 * prior + 0.3 * length + 0.3 * consonant_retention(word, &candidate.text),
        }
    }

    /// Highest-scoring candidate; earlier candidates win ties
    fn select(&self, candidates: &[Candidate], word: &str) -> Result<Ranked> {
        let mut best: Option<(usize, f64)> = None;
        for (idx, candidate) in candidates.iter().enumerate() {
            let score = self.score(candidate, word);
            if best.map_or(true, |(_, s)| score > s) {
                best = Some((idx, score));
            }
        }
        let (idx, score) = best.ok_or_else(|| AbbrevError::Ranking("no candidates to rank".into()))?;
        Ok(Ranked {
            chosen: candidates[idx].text.clone(),
            confidence: (score * 100.0).round() / 100.0,
        })
    }
}

/// Frequency model: learned word forms and pattern priors
#[derive(Debug, Clone)]
pub struct BasicRanker {
    model: LearnedModel,
}

impl BasicRanker {
    pub fn new(model: LearnedModel) -> Self {
        Self { model }
    }

    pub fn model(&self) -> &LearnedModel {
        &self.model
    }
}

impl Ranker for BasicRanker {
    fn method(&self) -> Method {
        Method::MlBasic
    }

    fn rank(&self, candidates: &[Candidate], context: &RankContext<'_>) -> Result<Ranked> {
        self.model.select(candidates, context.word)
    }
}

/// Frequency model plus length-bucket and consonant-retention features
#[derive(Debug, Clone)]
pub struct HybridRanker {
    model: LearnedModel,
}

impl HybridRanker {
    pub fn new(model: LearnedModel) -> Self {
        Self { model }
    }

    pub fn model(&self) -> &LearnedModel {
        &self.model
    }
}

impl Ranker for HybridRanker {
    fn method(&self) -> Method {
        Method::MlHybrid
    }

    fn rank(&self, candidates: &[Candidate], context: &RankContext<'_>) -> Result<Ranked> {
        self.model.select(candidates, context.word)
    }
}
