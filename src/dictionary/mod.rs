// WHY: Dictionary substitution is the cheapest, highest-fidelity strategy and always
// runs first. The store is immutable during lookups; edits go through
// SharedDictionary, which swaps whole snapshots so readers never see a half-applied edit.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::ops::Range;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};
use tracing::{debug, info};

use crate::error::{AbbrevError, Result};
use crate::rules::{AppliedRule, RuleKind};
use crate::text::{char_len, collapse_whitespace, normalize_key, word_spans};

pub mod defaults;
pub mod persistence;

pub use defaults::DEFAULT_TERMS;

/// A canonical term and its preferred abbreviation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Term {
    pub original: String,
    pub abbreviated: String,
}

impl Term {
    /// Validate and build a term; both sides are trimmed
    pub fn new(original: &str, abbreviated: &str) -> Result<Self> {
        let original = original.trim();
        let abbreviated = abbreviated.trim();
        let reject = |reason: &str| AbbrevError::InvalidTerm {
            original: original.to_string(),
            abbreviated: abbreviated.to_string(),
            reason: reason.to_string(),
        };

        if original.is_empty() {
            return Err(reject("original is empty"));
        }
        if abbreviated.is_empty() {
            return Err(reject("abbreviation is empty"));
        }
        // matching spans run from the first word to the last, so edge punctuation could never match
        let words = word_spans(original);
        let bounded = matches!(
            (words.first(), words.last()),
            (Some(first), Some(last)) if first.start == 0 && last.end == original.len()
        );
        if !bounded {
            return Err(reject("original must start and end with a letter or digit"));
        }
        // input is whitespace-collapsed before lookup, so that is the length replaced
        if char_len(abbreviated) > char_len(&collapse_whitespace(original)) {
            return Err(reject("abbreviation is longer than the original"));
        }

        Ok(Self {
            original: original.to_string(),
            abbreviated: abbreviated.to_string(),
        })
    }

    /// Lookup key: lowercase, whitespace-collapsed original
    pub fn key(&self) -> String {
        normalize_key(&self.original)
    }
}

#[derive(Debug, Clone)]
struct Entry {
    term: Term,
    /// Insertion sequence; re-adding a key moves it to the most recent position
    seq: u64,
    word_count: usize,
}

/// A known term found in some input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DictionaryMatch {
    /// Byte range of the matched text in the input
    pub span: Range<usize>,
    pub term: Term,
}

/// Output of a dictionary pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DictionaryPass {
    pub text: String,
    pub rules: Vec<AppliedRule>,
    /// Byte ranges in `text` occupied by inserted abbreviations
    pub replaced: Vec<Range<usize>>,
}

impl DictionaryPass {
    pub fn substitutions(&self) -> usize {
        self.replaced.len()
    }
}

/// Counts reported by a bulk update
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BulkReport {
    pub added: usize,
    pub updated: usize,
    pub invalid: usize,
    pub total: usize,
}

/// Case-insensitive term store with longest-match lookup
#[derive(Debug, Clone, Default)]
pub struct DictionaryStore {
    entries: HashMap<String, Entry>,
    next_seq: u64,
    max_words: usize,
}

impl DictionaryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store seeded with the built-in HVAC table
    pub fn with_defaults() -> Self {
        let mut store = Self::new();
        for (original, abbreviated) in DEFAULT_TERMS {
            // built-in table satisfies the Term invariant; skip rather than panic if edited badly
            if let Ok(term) = Term::new(original, abbreviated) {
                store.insert(term);
            }
        }
        store
    }

    /// Build from raw pairs, rejecting the first malformed entry
    pub fn from_pairs<'a, I>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut store = Self::new();
        for (original, abbreviated) in pairs {
            store.insert(Term::new(original, abbreviated)?);
        }
        Ok(store)
    }

    /// Insert or replace; returns the replaced term
    pub fn insert(&mut self, term: Term) -> Option<Term> {
        let key = term.key();
        let word_count = word_spans(&key).len();
        let seq = self.next_seq;
        self.next_seq += 1;
        self.max_words = self.max_words.max(word_count);
        self.entries
            .insert(key, Entry { term, seq, word_count })
            .map(|previous| previous.term)
    }

    /// Validate then insert
    pub fn add(&mut self, original: &str, abbreviated: &str) -> Result<Option<Term>> {
        Ok(self.insert(Term::new(original, abbreviated)?))
    }

    pub fn remove(&mut self, original: &str) -> Option<Term> {
        let removed = self.entries.remove(&normalize_key(original))?;
        self.max_words = self.entries.values().map(|e| e.word_count).max().unwrap_or(0);
        Some(removed.term)
    }

    pub fn get(&self, original: &str) -> Option<&Term> {
        self.entries.get(&normalize_key(original)).map(|e| &e.term)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries ordered by specificity: more words first, then longer, then most recent
    pub fn list(&self) -> Vec<Term> {
        let mut entries: Vec<&Entry> = self.entries.values().collect();
        entries.sort_by(|a, b| {
            b.word_count
                .cmp(&a.word_count)
                .then_with(|| char_len(&b.term.original).cmp(&char_len(&a.term.original)))
                .then_with(|| b.seq.cmp(&a.seq))
        });
        entries.into_iter().map(|e| e.term.clone()).collect()
    }

    /// Entries in insertion order, the order persisted to disk
    pub fn terms_in_insertion_order(&self) -> Vec<Term> {
        let mut entries: Vec<&Entry> = self.entries.values().collect();
        entries.sort_by_key(|e| e.seq);
        entries.into_iter().map(|e| e.term.clone()).collect()
    }

    /// Find all non-overlapping matches, longest phrases first, earlier on ties.
    ///
    /// Candidate spans run from one letter/digit run to a later one, so keys with
    /// inner punctuation such as "Self-Contained" or "w/o" match verbatim.
    pub fn lookup(&self, text: &str) -> Vec<DictionaryMatch> {
        if self.entries.is_empty() {
            return Vec::new();
        }

        let words = word_spans(text);
        // (span, matched chars, entry)
        let mut candidates: Vec<(Range<usize>, usize, &Entry)> = Vec::new();

        for i in 0..words.len() {
            let last = (i + self.max_words).min(words.len());
            for j in i..last {
                let span = words[i].start..words[j].end;
                if let Some(entry) = self.entries.get(&normalize_key(&text[span.clone()])) {
                    let matched = char_len(&text[span.clone()]);
                    candidates.push((span, matched, entry));
                }
            }
        }

        candidates.sort_by(|a, b| {
            b.1.cmp(&a.1)
                .then_with(|| a.0.start.cmp(&b.0.start))
                .then_with(|| b.2.seq.cmp(&a.2.seq))
        });

        let mut accepted: Vec<DictionaryMatch> = Vec::new();
        for (span, _, entry) in candidates {
            let overlaps = accepted
                .iter()
                .any(|m| span.start < m.span.end && m.span.start < span.end);
            if !overlaps {
                accepted.push(DictionaryMatch { span, term: entry.term.clone() });
            }
        }

        accepted.sort_by_key(|m| m.span.start);
        accepted
    }

    /// Substitute every match and describe each substitution
    pub fn apply(&self, text: &str) -> DictionaryPass {
        let matches = self.lookup(text);
        let mut pass = DictionaryPass {
            text: String::with_capacity(text.len()),
            ..DictionaryPass::default()
        };

        let mut last_end = 0;
        for m in matches {
            pass.text.push_str(&text[last_end..m.span.start]);
            let start = pass.text.len();
            pass.text.push_str(&m.term.abbreviated);
            pass.replaced.push(start..pass.text.len());
            pass.rules.push(AppliedRule::replacement(
                RuleKind::Dictionary,
                &text[m.span.clone()],
                &m.term.abbreviated,
            ));
            last_end = m.span.end;
        }
        pass.text.push_str(&text[last_end..]);

        debug!("Dictionary pass applied {} substitutions", pass.substitutions());
        pass
    }
}

/// Shared handle: lock-free-looking reads of an immutable snapshot, exclusive edits
#[derive(Debug, Clone)]
pub struct SharedDictionary {
    current: Arc<RwLock<Arc<DictionaryStore>>>,
    path: Option<PathBuf>,
}

impl SharedDictionary {
    /// In-memory dictionary with no persistence hook
    pub fn new(store: DictionaryStore) -> Self {
        Self {
            current: Arc::new(RwLock::new(Arc::new(store))),
            path: None,
        }
    }

    /// Dictionary whose edits are saved to `path` before they become visible
    pub fn persistent(store: DictionaryStore, path: impl Into<PathBuf>) -> Self {
        Self {
            current: Arc::new(RwLock::new(Arc::new(store))),
            path: Some(path.into()),
        }
    }

    /// Open (or seed) the dictionary file and keep it as the persistence target
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let store = persistence::load_or_init(&path)?;
        Ok(Self::persistent(store, path))
    }

    /// Current immutable snapshot
    pub fn snapshot(&self) -> Result<Arc<DictionaryStore>> {
        let guard = self.current.read().map_err(|_| AbbrevError::LockPoisoned("dictionary"))?;
        Ok(Arc::clone(&*guard))
    }

    pub fn list(&self) -> Result<Vec<Term>> {
        Ok(self.snapshot()?.list())
    }

    pub fn add(&self, original: &str, abbreviated: &str) -> Result<Option<Term>> {
        let term = Term::new(original, abbreviated)?;
        self.update(|store| Ok(store.insert(term)))
    }

    pub fn remove(&self, original: &str) -> Result<Option<Term>> {
        self.update(|store| Ok(store.remove(original)))
    }

    /// Apply many entries at once; malformed entries are counted and skipped
    pub fn add_many<'a, I>(&self, entries: I) -> Result<BulkReport>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        self.update(|store| {
            let mut report = BulkReport::default();
            for (original, abbreviated) in entries {
                match Term::new(original, abbreviated) {
                    Ok(term) => match store.insert(term) {
                        Some(_) => report.updated += 1,
                        None => report.added += 1,
                    },
                    Err(e) => {
                        debug!("Skipping dictionary entry: {}", e);
                        report.invalid += 1;
                    }
                }
            }
            report.total = store.len();
            Ok(report)
        })
    }

    /// Replace the whole store, e.g. after an external reload
    pub fn replace(&self, store: DictionaryStore) -> Result<()> {
        self.update(|current| {
            *current = store;
            Ok(())
        })
    }

    /// Copy, edit, persist, then publish
    fn update<T>(&self, edit: impl FnOnce(&mut DictionaryStore) -> Result<T>) -> Result<T> {
        let mut guard = self.current.write().map_err(|_| AbbrevError::LockPoisoned("dictionary"))?;
        let mut next = (**guard).clone();
        let outcome = edit(&mut next)?;

        if let Some(path) = &self.path {
            persistence::save(&next, path)?;
        }

        info!("Dictionary updated: {} entries", next.len());
        *guard = Arc::new(next);
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_store() -> DictionaryStore {
        DictionaryStore::from_pairs([("Stainless Steel", "SS"), ("Recirculation", "RECIRC")])
            .expect("valid pairs")
    }

    #[test]
    fn test_term_validation() {
        assert!(Term::new("Valve", "Vlv").is_ok());
        assert!(matches!(Term::new("  ", "X"), Err(AbbrevError::InvalidTerm { .. })));
        assert!(matches!(Term::new("Valve", " "), Err(AbbrevError::InvalidTerm { .. })));
        assert!(matches!(Term::new("Ht", "Heat"), Err(AbbrevError::InvalidTerm { .. })));
        let term = Term::new("  Set   Point ", " SetPt ").expect("trimmed");
        assert_eq!(term.original, "Set   Point");
        assert_eq!(term.key(), "set point");
    }

    #[test]
    fn test_apply_worked_example() {
        let pass = sample_store().apply("Stainless Steel Recirculation Pump Assembly");
        assert_eq!(pass.text, "SS RECIRC Pump Assembly");
        assert_eq!(pass.substitutions(), 2);
        assert_eq!(
            pass.rules.iter().map(|r| r.to_string()).collect::<Vec<_>>(),
            vec![
                "dictionary: 'Stainless Steel' -> 'SS'",
                "dictionary: 'Recirculation' -> 'RECIRC'",
            ]
        );
        assert_eq!(&pass.text[pass.replaced[0].clone()], "SS");
        assert_eq!(&pass.text[pass.replaced[1].clone()], "RECIRC");
    }

    #[test]
    fn test_lookup_is_case_insensitive_and_word_bounded() {
        let store = DictionaryStore::from_pairs([("Valve", "Vlv"), ("Heat", "Ht")]).expect("valid");
        let pass = store.apply("VALVE, heater valves heat");
        // "heater" and "valves" are different words
        assert_eq!(pass.text, "Vlv, heater valves Ht");
    }

    #[test]
    fn test_longest_match_wins() {
        let store = DictionaryStore::from_pairs([
            ("Stainless", "STSTL"),
            ("Steel", "STL"),
            ("Stainless Steel", "SS"),
        ])
        .expect("valid");
        let matches = store.lookup("stainless  steel sink");
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].term.abbreviated, "SS");
        assert_eq!(matches[0].span, 0..16);
    }

    #[test]
    fn test_overlapping_equal_length_prefers_earlier() {
        let store = DictionaryStore::from_pairs([("Heat Pump", "HP"), ("Pump Tank", "PT")])
            .expect("valid");
        let pass = store.apply("Heat Pump Tank");
        assert_eq!(pass.text, "HP Tank");
    }

    #[test]
    fn test_phrase_does_not_match_across_punctuation() {
        let store = DictionaryStore::from_pairs([("Manual Reset", "MR")]).expect("valid");
        assert!(store.lookup("Manual-Reset switch").is_empty());
        assert_eq!(store.lookup("manual reset switch").len(), 1);
    }

    #[test]
    fn test_punctuated_keys_match() {
        let store = DictionaryStore::from_pairs([
            ("Self-Contained", "SC"),
            ("w/o", "wo"),
            ("3/4 Inch", "3/4in"),
        ])
        .expect("valid");

        let matches = store.lookup("Self-Contained Breathing Unit");
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].span, 0..14);

        let pass = store.apply("Valve W/O Handle, 3/4  inch");
        assert_eq!(pass.text, "Valve wo Handle, 3/4in");
        assert_eq!(pass.substitutions(), 2);
    }

    #[test]
    fn test_term_edges_must_be_words() {
        assert!(matches!(Term::new("w/", "w"), Err(AbbrevError::InvalidTerm { .. })));
        assert!(matches!(Term::new("(Valve)", "Vlv"), Err(AbbrevError::InvalidTerm { .. })));
        assert!(matches!(Term::new("--", "-"), Err(AbbrevError::InvalidTerm { .. })));
        assert!(Term::new("Self-Contained", "SC").is_ok());
    }

    #[test]
    fn test_length_checked_against_collapsed_original() {
        let err = Term::new("Set      Point", "SetPointXY").expect_err("longer than 'Set Point'");
        assert!(err.is_validation());
        assert!(Term::new("Set      Point", "SetPt").is_ok());
    }

    #[test]
    fn test_readding_key_replaces_with_most_recent() {
        let mut store = DictionaryStore::new();
        assert!(store.add("Assembly", "Assy").expect("valid").is_none());
        let replaced = store.add("ASSEMBLY", "ASSY").expect("valid");
        assert_eq!(replaced.map(|t| t.abbreviated), Some("Assy".to_string()));
        assert_eq!(store.len(), 1);
        assert_eq!(store.apply("Assembly").text, "ASSY");
    }

    #[test]
    fn test_remove_recomputes_phrase_width() {
        let mut store = sample_store();
        assert!(store.remove("stainless steel").is_some());
        assert!(store.remove("stainless steel").is_none());
        assert!(store.lookup("Stainless Steel").is_empty());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_list_orders_by_specificity() {
        let store = DictionaryStore::from_pairs([
            ("Valve", "Vlv"),
            ("Manual Reset", "MR"),
            ("Temperature", "Temp"),
        ])
        .expect("valid");
        let originals: Vec<String> = store.list().into_iter().map(|t| t.original).collect();
        assert_eq!(originals, vec!["Manual Reset", "Temperature", "Valve"]);
    }

    #[test]
    fn test_defaults_seeded() {
        let store = DictionaryStore::with_defaults();
        assert!(store.len() > 100);
        assert_eq!(store.get("assembly").map(|t| t.abbreviated.as_str()), Some("ASSY"));
        assert_eq!(store.get("Stainless Steel").map(|t| t.abbreviated.as_str()), Some("SS"));
    }

    #[test]
    fn test_shared_dictionary_snapshots_are_isolated() {
        let shared = SharedDictionary::new(sample_store());
        let before = shared.snapshot().expect("snapshot");
        shared.add("Pump", "Pmp").expect("add");
        let after = shared.snapshot().expect("snapshot");

        assert!(before.get("Pump").is_none(), "old snapshot must not observe the edit");
        assert_eq!(after.get("pump").map(|t| t.abbreviated.as_str()), Some("Pmp"));
    }

    #[test]
    fn test_shared_add_rejects_malformed_entry() {
        let shared = SharedDictionary::new(DictionaryStore::new());
        let err = shared.add("", "X").expect_err("empty original rejected");
        assert!(err.is_validation());
        assert!(shared.list().expect("list").is_empty());
    }

    #[test]
    fn test_add_many_reports_counts() {
        let shared = SharedDictionary::new(sample_store());
        let report = shared
            .add_many([("Pump", "Pmp"), ("Recirculation", "RECIRC2"), ("", "X"), ("Ht", "Heat")])
            .expect("bulk update");
        assert_eq!(report, BulkReport { added: 1, updated: 1, invalid: 2, total: 3 });
    }
}
