use bjorn_abbrev::dictionary::persistence;
use bjorn_abbrev::{AbbreviationPipeline, AbbreviationRequest, DictionaryStore, Method, SharedDictionary};

#[path = "integration/fixtures/mod.rs"]
mod fixtures;
use fixtures::*;

#[path = "integration/mod.rs"]
mod test_utils;
use test_utils::TestFixture;

#[test]
fn test_open_seeds_default_table() {
    let fixture = TestFixture::new();
    let path = fixture.dictionary_path();
    assert!(!path.exists());

    let dictionary = SharedDictionary::open(&path).expect("open seeds defaults");
    assert!(path.exists());
    assert_eq!(
        dictionary.list().expect("list").len(),
        DictionaryStore::with_defaults().len()
    );
}

#[test]
fn test_edits_survive_reopen() {
    let fixture = TestFixture::new();
    let path = fixture.create_file("data/abbreviations.json", SAMPLE_DICTIONARY_JSON);

    let dictionary = SharedDictionary::open(&path).expect("open sample dictionary");
    dictionary.add("Pump", "PMP").expect("add");
    dictionary.remove("recirculation").expect("remove");

    let reopened = SharedDictionary::open(&path).expect("reopen");
    let originals: Vec<String> = reopened.list().expect("list").into_iter().map(|t| t.original).collect();
    assert_eq!(originals, vec!["Stainless Steel", "Pump"]);
}

/// A rejected entry leaves both memory and disk untouched
#[test]
fn test_rejected_edit_is_not_persisted() {
    let fixture = TestFixture::new();
    let path = fixture.create_file("data/abbreviations.json", SAMPLE_DICTIONARY_JSON);
    let before = fixture.read_file("data/abbreviations.json");

    let dictionary = SharedDictionary::open(&path).expect("open");
    let err = dictionary.add("Valve", "Valve Body").expect_err("longer abbreviation rejected");
    assert!(err.is_validation());

    assert_eq!(dictionary.list().expect("list").len(), 2);
    assert_eq!(fixture.read_file("data/abbreviations.json"), before);
}

/// Edits become visible to the next request without rebuilding the pipeline
#[test]
fn test_pipeline_sees_dictionary_edits() {
    let fixture = TestFixture::new();
    let path = fixture.create_file("data/abbreviations.json", SAMPLE_DICTIONARY_JSON);
    let pipeline = AbbreviationPipeline::rule_based(SharedDictionary::open(&path).expect("open"));

    let request = AbbreviationRequest::new("Stainless Steel Recirculation Pump Assembly").with_target_length(20);
    let before = pipeline.abbreviate(&request).expect("valid request");
    assert_eq!(before.method_used(), Method::RuleBased);

    pipeline.dictionary().add("Assembly", "ASSY").expect("add");
    let after = pipeline.abbreviate(&request).expect("valid request");
    assert_eq!(after.abbreviated(), "SS RECIRC Pump ASSY");
    assert_eq!(after.method_used(), Method::Dictionary);
}

#[test]
fn test_legacy_map_file_is_rewritten_as_entries() {
    let fixture = TestFixture::new();
    let path = fixture.create_file("legacy.json", r#"{"Valve": "Vlv"}"#);

    let dictionary = SharedDictionary::open(&path).expect("legacy format loads");
    dictionary.add("Pump", "PMP").expect("add");

    let content = fixture.read_file("legacy.json");
    let entries: serde_json::Value = serde_json::from_str(&content).expect("valid json");
    assert!(entries.is_array(), "saved as the entry list format: {content}");
    assert_eq!(persistence::load(&path).expect("reload").len(), 2);
}
