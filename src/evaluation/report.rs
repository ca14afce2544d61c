//! Per-case trace and run report.

use serde::{Deserialize, Serialize};
use std::path::Path;

use super::metrics::RunSummary;
use crate::corpus::Case;
use crate::error::{EvalError, Result};

/// Outcome of one case. Written once, never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseResult {
    /// Case identifier.
    pub id: String,
    /// Prompt evaluated.
    pub prompt: String,
    /// Expected names.
    pub expected: Vec<String>,
    /// BM25 top-K names, best first.
    pub bm25_top_k: Vec<String>,
    /// Scores aligned with `bm25_top_k`.
    pub bm25_scores: Vec<f64>,
    /// Candidate pool handed to the reranker.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reranker_top_n: Option<Vec<String>>,
    /// Reranker picks (empty when the call failed).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reranker_picks: Option<Vec<String>>,
    /// Failure of the reranker call, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reranker_error: Option<String>,
}

impl CaseResult {
    /// Start a result for `case` from its BM25 top-K.
    pub fn new(case: &Case, bm25_top_k: Vec<String>, bm25_scores: Vec<f64>) -> Self {
        Self {
            id: case.id.clone(),
            prompt: case.prompt.clone(),
            expected: case.expected.clone(),
            bm25_top_k,
            bm25_scores,
            reranker_top_n: None,
            reranker_picks: None,
            reranker_error: None,
        }
    }

    /// Positive cases expect at least one name.
    pub fn is_positive(&self) -> bool {
        !self.expected.is_empty()
    }

    /// True if the reranker call for this case failed.
    pub fn reranker_failed(&self) -> bool {
        self.reranker_error.is_some()
    }
}

/// Complete run report: summary plus per-case results in suite order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvalReport {
    /// Aggregates.
    pub summary: RunSummary,
    /// Case results, in case-suite order.
    pub results: Vec<CaseResult>,
}

impl EvalReport {
    /// Pretty JSON with a trailing newline.
    pub fn to_json_pretty(&self) -> Result<String> {
        let mut json = serde_json::to_string_pretty(self)?;
        json.push('\n');
        Ok(json)
    }

    /// Write the report, creating parent directories.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| EvalError::io(parent, e))?;
        }
        std::fs::write(path, self.to_json_pretty()?).map_err(|e| EvalError::io(path, e))
    }

    /// Load a previously written report.
    pub fn read_json(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| EvalError::io(path, e))?;
        serde_json::from_str(&content).map_err(|e| EvalError::parse(path, e))
    }
}
