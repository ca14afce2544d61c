//! Trigger metrics: hit rate, recall, precision, false invokes, exact match.
//!
//! # Case Classes
//!
//! | Class | `expected` | Contributes to |
//! |-------|------------|----------------|
//! | Positive | non-empty | hit@k, recall@k, macro recall/precision |
//! | Negative | empty | false-invoke rates |
//! | Both | any | exact-match rate, error count |
//!
//! Every rate divides by the size of its case subset and is `0.0` when the
//! subset is empty, never NaN.
//!
//! # Reduction
//!
//! Per-case results are collected first and reduced once, single-threaded, by
//! [`MetricsAccumulator`]. [`RunSummary::from_results`] is therefore a pure
//! function of the case results and can be recomputed from a saved report.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::report::CaseResult;

// ============================================================================
// Per-case metrics
// ============================================================================

/// True if any expected name was retrieved.
pub fn hit(expected: &HashSet<&str>, retrieved: &HashSet<&str>) -> bool {
    !expected.is_disjoint(retrieved)
}

/// Share of expected names that were retrieved (`0.0` if nothing is expected).
pub fn recall(expected: &HashSet<&str>, retrieved: &HashSet<&str>) -> f64 {
    if expected.is_empty() {
        return 0.0;
    }
    expected.intersection(retrieved).count() as f64 / expected.len() as f64
}

/// Share of picks that were expected (`0.0` for no picks).
pub fn precision(expected: &HashSet<&str>, picks: &HashSet<&str>) -> f64 {
    if picks.is_empty() {
        return 0.0;
    }
    expected.intersection(picks).count() as f64 / picks.len() as f64
}

/// True if the picks are exactly the expected set.
///
/// For a negative case this means "picked nothing".
pub fn exact_match(expected: &HashSet<&str>, picks: &HashSet<&str>) -> bool {
    expected == picks
}

/// `numerator / denominator`, or `0.0` for an empty subset.
pub fn rate(numerator: f64, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator / denominator as f64
    }
}

// ============================================================================
// Run summary
// ============================================================================

/// Reranker-stage aggregates, present only when the reranker ran.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RerankerSummary {
    /// Positive cases judged.
    pub reranker_cases_positive: usize,
    /// Negative cases judged.
    pub reranker_cases_negative: usize,
    /// Positive cases where any pick was expected.
    pub hit_rate: f64,
    /// Mean recall of picks over positive cases.
    pub macro_recall: f64,
    /// Mean precision of picks over positive cases (no picks = 0).
    pub macro_precision: f64,
    /// Negative cases with any pick.
    pub false_invoke_rate: f64,
    /// All cases whose picks equal the expected set.
    pub exact_match_rate: f64,
    /// Cases whose judge call failed.
    pub error_count: usize,
}

/// Aggregate counts and rates for a run.
///
/// Reranker fields are flattened into the same JSON object when present.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Number of cases evaluated.
    pub cases_total: usize,
    /// Cases with at least one expected name.
    pub cases_positive: usize,
    /// Cases expecting nothing.
    pub cases_negative: usize,
    /// Mean BM25 hit over positive cases.
    pub bm25_hit_at_k: f64,
    /// Mean BM25 recall over positive cases.
    pub bm25_recall_at_k: f64,
    /// Negative cases whose BM25 top-K has any non-zero score.
    pub bm25_false_invoke_rate: f64,
    /// Cutoff used for BM25 metrics.
    pub top_k: usize,
    /// Reranker aggregates.
    #[serde(flatten)]
    pub reranker: Option<RerankerSummary>,
}

impl RunSummary {
    /// Compute the summary from case results alone.
    pub fn from_results(results: &[CaseResult], top_k: usize, reranker_enabled: bool) -> Self {
        let mut acc = MetricsAccumulator::new();
        for result in results {
            acc.add(result);
        }
        acc.finish(top_k, reranker_enabled)
    }
}

/// Running sums over case results.
#[derive(Debug, Clone, Default)]
pub struct MetricsAccumulator {
    total: usize,
    positive: usize,
    negative: usize,
    bm25_hits: usize,
    bm25_recall_sum: f64,
    bm25_false_invokes: usize,

    judged_positive: usize,
    judged_negative: usize,
    judge_hits: usize,
    judge_recall_sum: f64,
    judge_precision_sum: f64,
    judge_false_invokes: usize,
    judge_exact: usize,
    judge_errors: usize,
}

impl MetricsAccumulator {
    /// Create an empty accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one case result in.
    pub fn add(&mut self, result: &CaseResult) {
        let expected: HashSet<&str> = result.expected.iter().map(String::as_str).collect();
        let retrieved: HashSet<&str> = result.bm25_top_k.iter().map(String::as_str).collect();
        let positive = !expected.is_empty();

        self.total += 1;
        if positive {
            self.positive += 1;
            self.bm25_hits += hit(&expected, &retrieved) as usize;
            self.bm25_recall_sum += recall(&expected, &retrieved);
        } else {
            self.negative += 1;
            self.bm25_false_invokes += result.bm25_scores.iter().any(|s| *s > 0.0) as usize;
        }

        let Some(picks) = &result.reranker_picks else {
            return;
        };
        let picks: HashSet<&str> = picks.iter().map(String::as_str).collect();

        if result.reranker_error.is_some() {
            self.judge_errors += 1;
        }
        if positive {
            self.judged_positive += 1;
            self.judge_hits += hit(&expected, &picks) as usize;
            self.judge_recall_sum += recall(&expected, &picks);
            self.judge_precision_sum += precision(&expected, &picks);
        } else {
            self.judged_negative += 1;
            self.judge_false_invokes += !picks.is_empty() as usize;
        }
        self.judge_exact += exact_match(&expected, &picks) as usize;
    }

    /// Produce the summary.
    pub fn finish(self, top_k: usize, reranker_enabled: bool) -> RunSummary {
        let reranker = reranker_enabled.then(|| RerankerSummary {
            reranker_cases_positive: self.judged_positive,
            reranker_cases_negative: self.judged_negative,
            hit_rate: rate(self.judge_hits as f64, self.judged_positive),
            macro_recall: rate(self.judge_recall_sum, self.judged_positive),
            macro_precision: rate(self.judge_precision_sum, self.judged_positive),
            false_invoke_rate: rate(self.judge_false_invokes as f64, self.judged_negative),
            exact_match_rate: rate(self.judge_exact as f64, self.total),
            error_count: self.judge_errors,
        });

        RunSummary {
            cases_total: self.total,
            cases_positive: self.positive,
            cases_negative: self.negative,
            bm25_hit_at_k: rate(self.bm25_hits as f64, self.positive),
            bm25_recall_at_k: rate(self.bm25_recall_sum, self.positive),
            bm25_false_invoke_rate: rate(self.bm25_false_invokes as f64, self.negative),
            top_k,
            reranker,
        }
    }
}
