// Integration test utilities and common code
// WHY: Centralized utilities avoid duplication across integration tests

#![allow(dead_code)]

use bjorn_abbrev::config::AppConfig;
use bjorn_abbrev::{AbbreviationPipeline, DictionaryStore, SharedDictionary};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Test fixture helper for temporary dictionaries, models and CSV files
pub struct TestFixture {
    pub temp_dir: TempDir,
    pub root_path: PathBuf,
}

impl TestFixture {
    /// Create a new test fixture with temporary directory
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let root_path = temp_dir.path().to_path_buf();

        Self { temp_dir, root_path }
    }

    /// Write a file relative to the fixture root
    pub fn create_file<P: AsRef<Path>>(&self, relative_path: P, content: &str) -> PathBuf {
        let file_path = self.root_path.join(relative_path);

        // Create parent directories if needed
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent directories");
        }

        fs::write(&file_path, content).expect("Failed to write test file");
        file_path
    }

    pub fn dictionary_path(&self) -> PathBuf {
        self.root_path.join("data").join("abbreviations.json")
    }

    /// Configuration whose dictionary and model paths live inside the fixture
    pub fn config(&self) -> AppConfig {
        let mut config = AppConfig::default();
        config.dictionary.path = self.dictionary_path();
        config.models.registry_path = self.root_path.join("models").join("model_registry.json");
        config.models.basic_path = self.root_path.join("models").join("basic.json");
        config.models.hybrid_path = self.root_path.join("models").join("hybrid.json");
        config
    }

    /// Write `config()` as TOML and return its path
    pub fn write_config(&self) -> PathBuf {
        let content = toml::to_string(&self.config()).expect("Failed to serialize config");
        self.create_file("bjorn.toml", &content)
    }

    pub fn read_file<P: AsRef<Path>>(&self, relative_path: P) -> String {
        fs::read_to_string(self.root_path.join(relative_path)).expect("Failed to read fixture file")
    }
}

/// Rule-based pipeline over an in-memory dictionary
pub fn pipeline_with(pairs: &[(&str, &str)]) -> AbbreviationPipeline {
    let store = DictionaryStore::from_pairs(pairs.iter().copied()).expect("valid dictionary pairs");
    AbbreviationPipeline::rule_based(SharedDictionary::new(store))
}

/// Rule-based pipeline over the built-in HVAC table
pub fn default_pipeline() -> AbbreviationPipeline {
    AbbreviationPipeline::rule_based(SharedDictionary::new(DictionaryStore::with_defaults()))
}

/// Compare two strings line by line, providing detailed diff on mismatch
pub fn assert_golden_file(actual: &str, expected: &str, context: &str) {
    let actual_lines: Vec<&str> = actual.lines().collect();
    let expected_lines: Vec<&str> = expected.lines().collect();

    if actual_lines.len() != expected_lines.len() {
        panic!(
            "{}: Line count mismatch. Expected {} lines, got {} lines",
            context,
            expected_lines.len(),
            actual_lines.len()
        );
    }

    for (i, (actual_line, expected_line)) in actual_lines.iter().zip(expected_lines.iter()).enumerate() {
        if actual_line != expected_line {
            panic!(
                "{}: Line {} mismatch\nExpected: {}\nActual:   {}",
                context,
                i + 1,
                expected_line,
                actual_line
            );
        }
    }
}
