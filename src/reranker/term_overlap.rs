//! Term overlap judge.
//!
//! A local stand-in for an external judge: picks candidates whose terms cover a
//! large enough share of the prompt's terms.
//!
//! # When to Use
//!
//! - Dry runs of the reranker stage without spawning processes
//! - Baselines to compare an external judge against
//!
//! # Limitations
//!
//! - No IDF weighting (rare terms not prioritized)
//! - No term frequency consideration
//!
//! ```ascii
//! Prompt terms:  {make, pdf, report}
//! Candidate:     "pdf-export: Generate PDF reports from data"
//!                 terms {pdf-export, generate, pdf, reports, from, data}
//! Overlap = |prompt ∩ candidate| / |prompt| = 1/3
//! ```

use async_trait::async_trait;
use std::collections::HashSet;
use std::time::Duration;

use super::traits::{RerankResult, Reranker};
use crate::corpus::Document;
use crate::tokenizer::tokenize;

/// Judge selecting candidates by prompt-term coverage.
#[derive(Debug, Clone)]
pub struct TermOverlapReranker {
    /// Minimum share of prompt terms a candidate must contain (0.0-1.0).
    pub min_overlap: f64,
    /// Maximum number of picks.
    pub max_picks: usize,
}

impl TermOverlapReranker {
    /// Create with defaults (`min_overlap = 0.5`, `max_picks = 3`).
    pub fn new() -> Self {
        Self {
            min_overlap: 0.5,
            max_picks: 3,
        }
    }

    /// Set the minimum overlap threshold.
    pub fn with_min_overlap(mut self, min_overlap: f64) -> Self {
        self.min_overlap = min_overlap.clamp(0.0, 1.0);
        self
    }

    /// Set the maximum number of picks.
    pub fn with_max_picks(mut self, max_picks: usize) -> Self {
        self.max_picks = max_picks;
        self
    }

    fn overlap(prompt_terms: &HashSet<String>, doc: &Document) -> f64 {
        let doc_terms: HashSet<String> =
            tokenize(&format!("{}\n{}", doc.name, doc.description))
                .into_iter()
                .collect();
        let shared = prompt_terms.intersection(&doc_terms).count();
        shared as f64 / prompt_terms.len().max(1) as f64
    }
}

impl Default for TermOverlapReranker {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Reranker for TermOverlapReranker {
    fn name(&self) -> &str {
        "term-overlap"
    }

    async fn select(
        &self,
        prompt: &str,
        candidates: &[Document],
        _timeout: Duration,
    ) -> RerankResult<Vec<String>> {
        let prompt_terms: HashSet<String> = tokenize(prompt).into_iter().collect();
        if prompt_terms.is_empty() {
            return Ok(Vec::new());
        }

        let mut scored: Vec<(&Document, f64)> = candidates
            .iter()
            .map(|doc| (doc, Self::overlap(&prompt_terms, doc)))
            .filter(|(_, score)| *score > 0.0 && *score >= self.min_overlap)
            .collect();

        scored.sort_by(|a, b| b.1.total_cmp(&a.1));

        let names = scored
            .into_iter()
            .take(self.max_picks)
            .map(|(doc, _)| doc.name.clone());
        Ok(super::result::dedup_names(names))
    }
}
