//! Corpus and case-suite data model and loading.
//!
//! # Input Formats
//!
//! Corpus descriptor (as written by `trigger-eval index`):
//!
//! ```json
//! { "count": 2, "skills": [ { "name": "pdf-export", "description": "..." } ] }
//! ```
//!
//! Case suite:
//!
//! ```json
//! { "cases": [ { "id": "c1", "prompt": "make a pdf report", "expected": ["pdf-export"] } ] }
//! ```
//!
//! Both loaders are fatal on failure: a missing file, invalid JSON, or a missing
//! top-level array aborts the run before any case is evaluated.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, warn};

use crate::error::{EvalError, Result};

/// A named, described item of the corpus. Identified by `name`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Unique name within a run.
    pub name: String,
    /// Descriptive text used for ranking.
    pub description: String,
}

impl Document {
    /// Create a new document.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }
}

/// A labeled prompt.
///
/// `expected` is empty for a negative case (nothing should be retrieved).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Case {
    /// Case identifier.
    pub id: String,
    /// Natural-language prompt.
    pub prompt: String,
    /// Expected document names, deduplicated in first-seen order.
    pub expected: Vec<String>,
}

impl Case {
    /// Create a case; `expected` is trimmed and deduplicated.
    pub fn new<I, S>(id: impl Into<String>, prompt: impl Into<String>, expected: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut seen = HashSet::new();
        let expected = expected
            .into_iter()
            .map(|s| s.into().trim().to_string())
            .filter(|s| !s.is_empty())
            .filter(|s| seen.insert(s.clone()))
            .collect();

        Self {
            id: id.into(),
            prompt: prompt.into(),
            expected,
        }
    }

    /// Positive cases expect at least one document.
    pub fn is_positive(&self) -> bool {
        !self.expected.is_empty()
    }

    /// Expected names as a set.
    pub fn expected_set(&self) -> HashSet<&str> {
        self.expected.iter().map(String::as_str).collect()
    }
}

// ============================================================================
// Corpus descriptor
// ============================================================================

/// One record of a corpus descriptor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentRecord {
    /// Document name.
    #[serde(default)]
    pub name: String,
    /// Description used for ranking.
    #[serde(default)]
    pub description: String,
    /// Optional short description (from `metadata.short-description`).
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub short_description: String,
    /// `version` frontmatter field.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub version: String,
    /// `license` frontmatter field.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub license: String,
    /// `allowed-tools` frontmatter field, raw.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub allowed_tools: String,
    /// Directory the record was indexed from, if any.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub skill_dir: String,
    /// Path of the indexed `SKILL.md`.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub skill_md: String,
    /// `.system`, `.curated`, `.experimental` or `custom`.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub scope_hint: String,
    /// Whether the skill ships a `scripts/` directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_scripts: Option<bool>,
    /// Whether the skill ships a `references/` directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_references: Option<bool>,
    /// Whether the skill ships an `examples/` directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_examples: Option<bool>,
    /// Whether the skill ships an `assets/` directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_assets: Option<bool>,
}

/// Structured corpus input: a count and an ordered sequence of records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CorpusDescriptor {
    /// Root directory the corpus was indexed from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skills_dir: Option<String>,
    /// Declared record count.
    #[serde(default)]
    pub count: usize,
    /// Records in corpus order.
    #[serde(alias = "documents")]
    pub skills: Vec<DocumentRecord>,
}

impl CorpusDescriptor {
    /// Build a descriptor from records, filling in `count`.
    pub fn new(skills_dir: Option<String>, skills: Vec<DocumentRecord>) -> Self {
        Self {
            skills_dir,
            count: skills.len(),
            skills,
        }
    }

    /// Parse a descriptor from JSON text.
    pub fn from_json_str(json: &str) -> std::result::Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Write the descriptor as pretty JSON, creating parent directories.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| EvalError::io(parent, e))?;
        }
        let mut json = serde_json::to_string_pretty(self)?;
        json.push('\n');
        std::fs::write(path, json).map_err(|e| EvalError::io(path, e))
    }

    /// Convert records into documents, trimming whitespace.
    ///
    /// A record without a name is structurally invalid.
    pub fn into_documents(self) -> Result<Vec<Document>> {
        if self.count != 0 && self.count != self.skills.len() {
            warn!(
                declared = self.count,
                actual = self.skills.len(),
                "Corpus count does not match number of records"
            );
        }

        let mut seen = HashSet::new();
        let mut documents = Vec::with_capacity(self.skills.len());
        for (i, record) in self.skills.into_iter().enumerate() {
            let name = record.name.trim().to_string();
            if name.is_empty() {
                return Err(EvalError::InvalidInput(format!(
                    "corpus record {} has an empty name",
                    i
                )));
            }
            if !seen.insert(name.clone()) {
                warn!(name = %name, "Duplicate document name in corpus");
            }
            documents.push(Document::new(name, record.description.trim()));
        }
        Ok(documents)
    }
}

/// Load the corpus from a descriptor file.
pub fn load_corpus(path: impl AsRef<Path>) -> Result<Vec<Document>> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| EvalError::io(path, e))?;
    let descriptor =
        CorpusDescriptor::from_json_str(&content).map_err(|e| EvalError::parse(path, e))?;
    let documents = descriptor.into_documents()?;
    debug!(path = %path.display(), documents = documents.len(), "Loaded corpus");
    Ok(documents)
}

// ============================================================================
// Case suite
// ============================================================================

#[derive(Debug, Deserialize)]
struct CaseRecord {
    #[serde(default)]
    id: String,
    #[serde(default)]
    prompt: String,
    #[serde(default)]
    expected: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct CaseSuite {
    cases: Vec<CaseRecord>,
}

/// Parse a case suite from JSON text.
pub fn parse_cases(json: &str) -> std::result::Result<Vec<Case>, serde_json::Error> {
    let suite: CaseSuite = serde_json::from_str(json)?;
    Ok(suite
        .cases
        .into_iter()
        .map(|c| Case::new(c.id.trim(), c.prompt.trim(), c.expected))
        .collect())
}

/// Load the case suite from a file.
pub fn load_cases(path: impl AsRef<Path>) -> Result<Vec<Case>> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| EvalError::io(path, e))?;
    let cases = parse_cases(&content).map_err(|e| EvalError::parse(path, e))?;
    debug!(path = %path.display(), cases = cases.len(), "Loaded case suite");
    Ok(cases)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_case_expected_deduplicated() {
        let case = Case::new("c1", "p", vec!["a", " b ", "a", "", "b"]);
        assert_eq!(case.expected, vec!["a", "b"]);
        assert!(case.is_positive());
    }

    #[test]
    fn test_negative_case() {
        let case = Case::new("n1", "hello", Vec::<String>::new());
        assert!(!case.is_positive());
        assert!(case.expected_set().is_empty());
    }

    #[test]
    fn test_parse_corpus_descriptor() {
        let json = r#"{"count": 2, "skills": [
            {"name": " pdf-export ", "description": "Generate PDF reports", "version": "1"},
            {"name": "chart-gen", "description": "Create charts"}
        ]}"#;
        let docs = CorpusDescriptor::from_json_str(json)
            .unwrap()
            .into_documents()
            .unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0], Document::new("pdf-export", "Generate PDF reports"));
    }

    #[test]
    fn test_documents_alias() {
        let json = r#"{"documents": [{"name": "a", "description": "b"}]}"#;
        let descriptor = CorpusDescriptor::from_json_str(json).unwrap();
        assert_eq!(descriptor.skills.len(), 1);
    }

    #[test]
    fn test_missing_array_is_error() {
        assert!(CorpusDescriptor::from_json_str(r#"{"count": 0}"#).is_err());
        assert!(parse_cases(r#"{"items": []}"#).is_err());
    }

    #[test]
    fn test_empty_name_is_invalid() {
        let descriptor = CorpusDescriptor::new(None, vec![DocumentRecord::default()]);
        let err = descriptor.into_documents().unwrap_err();
        assert!(matches!(err, EvalError::InvalidInput(_)));
    }

    #[test]
    fn test_parse_cases() {
        let json = r#"{"cases": [
            {"id": "c1", "prompt": " make a pdf ", "expected": ["pdf-export", "pdf-export"]},
            {"id": "n1", "prompt": "tell me a joke"}
        ]}"#;
        let cases = parse_cases(json).unwrap();
        assert_eq!(cases.len(), 2);
        assert_eq!(cases[0].prompt, "make a pdf");
        assert_eq!(cases[0].expected, vec!["pdf-export"]);
        assert!(!cases[1].is_positive());
    }

    #[test]
    fn test_load_corpus_missing_file() {
        let err = load_corpus("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, EvalError::Io { .. }));
    }

    #[test]
    fn test_load_cases_invalid_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();
        let err = load_cases(file.path()).unwrap_err();
        assert!(matches!(err, EvalError::Parse { .. }));
    }

    #[test]
    fn test_descriptor_roundtrip_keeps_order() {
        let descriptor = CorpusDescriptor::new(
            Some("/skills".into()),
            vec![
                DocumentRecord {
                    name: "b".into(),
                    description: "second".into(),
                    ..Default::default()
                },
                DocumentRecord {
                    name: "a".into(),
                    description: "first".into(),
                    ..Default::default()
                },
            ],
        );
        let json = serde_json::to_string(&descriptor).unwrap();
        let parsed = CorpusDescriptor::from_json_str(&json).unwrap();
        assert_eq!(parsed, descriptor);
        assert_eq!(parsed.count, 2);
        assert!(!json.contains("has_scripts"));
    }

    #[test]
    fn test_index_fields_survive_roundtrip() {
        let json = r#"{"skills_dir": "/s", "count": 1, "skills": [{
            "name": "pdf-export", "description": "PDFs", "short_description": "",
            "version": "1.0", "license": "MIT", "allowed_tools": "Read",
            "skill_dir": "/s/pdf-export", "skill_md": "/s/pdf-export/SKILL.md",
            "scope_hint": "custom", "has_scripts": true, "has_references": false,
            "has_examples": false, "has_assets": false
        }]}"#;
        let descriptor = CorpusDescriptor::from_json_str(json).unwrap();
        let record = &descriptor.skills[0];
        assert_eq!(record.version, "1.0");
        assert_eq!(record.scope_hint, "custom");
        assert_eq!(record.has_scripts, Some(true));
        assert_eq!(record.has_assets, Some(false));

        let out: serde_json::Value =
            serde_json::from_str(&serde_json::to_string(&descriptor).unwrap()).unwrap();
        assert_eq!(out["skills"][0]["allowed_tools"], "Read");
        assert_eq!(out["skills"][0]["has_references"], false);
    }
}
