// WHY: Shared text primitives so dictionary matching, the rule pass and length
// accounting all agree on what a character, a word and a key are

use regex_automata::meta::Regex;
use std::ops::Range;
use std::sync::OnceLock;

/// Letters and digits form dictionary words; everything else is a boundary
const WORD_PATTERN: &str = r"[\p{L}\p{N}]+";

/// Letters only; the rule pass never shortens digits
const ALPHA_PATTERN: &str = r"\p{L}+";

static WORD_REGEX: OnceLock<Regex> = OnceLock::new();
static ALPHA_REGEX: OnceLock<Regex> = OnceLock::new();

fn word_regex() -> &'static Regex {
    WORD_REGEX.get_or_init(|| Regex::new(WORD_PATTERN).expect("word pattern compiles"))
}

fn alpha_regex() -> &'static Regex {
    ALPHA_REGEX.get_or_init(|| Regex::new(ALPHA_PATTERN).expect("alpha pattern compiles"))
}

/// Length in characters, the unit every budget is expressed in
pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// First `count` characters of `text`
pub fn char_prefix(text: &str, count: usize) -> &str {
    match text.char_indices().nth(count) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

/// Trim and collapse every whitespace run into a single space
pub fn collapse_whitespace(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    collapse_whitespace_into(text, &mut result);
    result
}

/// Collapse whitespace into supplied buffer
/// WHY: batch processing reuses one buffer per worker
pub fn collapse_whitespace_into(text: &str, buffer: &mut String) {
    buffer.clear();
    buffer.reserve(text.len());

    let mut pending_space = false;
    for ch in text.chars() {
        if ch.is_whitespace() {
            pending_space = !buffer.is_empty();
        } else {
            if pending_space {
                buffer.push(' ');
                pending_space = false;
            }
            buffer.push(ch);
        }
    }
}

/// Dictionary key form: lowercase with collapsed whitespace
pub fn normalize_key(text: &str) -> String {
    collapse_whitespace(text).to_lowercase()
}

/// Byte ranges of whitespace-separated tokens
pub fn token_spans(text: &str) -> Vec<Range<usize>> {
    let mut spans = Vec::new();
    let mut start = None;
    for (idx, ch) in text.char_indices() {
        if ch.is_whitespace() {
            if let Some(begin) = start.take() {
                spans.push(begin..idx);
            }
        } else if start.is_none() {
            start = Some(idx);
        }
    }
    if let Some(begin) = start {
        spans.push(begin..text.len());
    }
    spans
}

/// Byte ranges of maximal letter/digit runs
pub fn word_spans(text: &str) -> Vec<Range<usize>> {
    word_regex().find_iter(text).map(|m| m.range()).collect()
}

/// Byte ranges of maximal letter runs
pub fn alpha_spans(text: &str) -> Vec<Range<usize>> {
    alpha_regex().find_iter(text).map(|m| m.range()).collect()
}

/// Tokens carrying digits are measurements or part codes and stay verbatim
pub fn is_measurement(token: &str) -> bool {
    token.chars().any(|c| c.is_ascii_digit())
}

pub fn is_vowel(ch: char) -> bool {
    matches!(ch, 'a' | 'e' | 'i' | 'o' | 'u' | 'A' | 'E' | 'I' | 'O' | 'U')
}
