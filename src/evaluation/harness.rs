//! Evaluation harness: BM25 per case, optional reranking, aggregation.
//!
//! # Flow
//!
//! ```ascii
//! corpus ──► Bm25Index (built once, shared read-only)
//!                 │
//! cases ──► ┌─────┴──────────────────────────────────────────────┐
//!           │ per case (up to `concurrency` in flight)           │
//!           │  tokenize(prompt) ─► rank(depth = max(k, n))       │
//!           │      ├─ top-k  ─► bm25_top_k                       │
//!           │      └─ top-n  ─► Reranker::select ─► picks/error  │
//!           └─────┬──────────────────────────────────────────────┘
//!                 │ results in suite order (buffered stream)
//!                 ▼
//!           RunSummary::from_results (single-threaded reduction)
//! ```
//!
//! A reranker failure is data: it lands on that case's [`CaseResult`] as an
//! error with empty picks and never stops the run.

use futures::stream::{self, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, info_span, warn, Instrument};

use super::metrics::RunSummary;
use super::report::{CaseResult, EvalReport};
use crate::bm25::Bm25Index;
use crate::corpus::{Case, Document};
use crate::error::{EvalError, Result, RetryStrategy};
use crate::reranker::Reranker;
use crate::retry::select_with_retry;

/// Run-wide parameters, passed explicitly rather than read from the environment.
#[derive(Debug, Clone, PartialEq)]
pub struct HarnessConfig {
    /// Cutoff for BM25 hit/recall.
    pub top_k: usize,
    /// Candidate pool size handed to the reranker.
    pub candidate_n: usize,
    /// Run the reranker stage.
    pub use_reranker: bool,
    /// Wall-clock budget per reranker call.
    pub timeout: Duration,
    /// Maximum cases in flight.
    pub concurrency: usize,
    /// Additional attempts for a failed reranker call.
    pub max_retries: u32,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            top_k: 5,
            candidate_n: 20,
            use_reranker: false,
            timeout: Duration::from_secs(120),
            concurrency: 1,
            max_retries: 0,
        }
    }
}

impl HarnessConfig {
    /// Set the BM25 cutoff.
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// Set the reranker candidate pool size.
    pub fn with_candidate_n(mut self, candidate_n: usize) -> Self {
        self.candidate_n = candidate_n;
        self
    }

    /// Enable or disable the reranker stage.
    pub fn with_reranker_enabled(mut self, enabled: bool) -> Self {
        self.use_reranker = enabled;
        self
    }

    /// Set the per-call timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the number of cases evaluated concurrently.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    /// Set the number of retries for failed reranker calls.
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }
}

/// Orchestrates per-case ranking, reranking and aggregation.
///
/// # Example
///
/// ```
/// use edgequake_trigger_eval::{Case, Document, EvaluationHarness, HarnessConfig};
///
/// # tokio_test_block(async {
/// let corpus = vec![
///     Document::new("pdf-export", "Generate PDF reports from data"),
///     Document::new("chart-gen", "Create charts and graphs"),
/// ];
/// let cases = vec![Case::new("c1", "make a pdf report", vec!["pdf-export"])];
///
/// let harness = EvaluationHarness::new(HarnessConfig::default().with_top_k(1));
/// let report = harness.evaluate(&corpus, &cases).await.unwrap();
/// assert_eq!(report.results[0].bm25_top_k, vec!["pdf-export"]);
/// assert_eq!(report.summary.bm25_hit_at_k, 1.0);
/// # });
/// # fn tokio_test_block<F: std::future::Future>(f: F) -> F::Output {
/// #     tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap().block_on(f)
/// # }
/// ```
pub struct EvaluationHarness {
    config: HarnessConfig,
    reranker: Option<Arc<dyn Reranker>>,
}

impl EvaluationHarness {
    /// Create a harness without a reranker.
    pub fn new(config: HarnessConfig) -> Self {
        Self {
            config,
            reranker: None,
        }
    }

    /// Attach the reranker used when `use_reranker` is set.
    pub fn with_reranker(mut self, reranker: Arc<dyn Reranker>) -> Self {
        self.reranker = Some(reranker);
        self
    }

    /// Get the configuration.
    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    fn validate(&self, corpus: &[Document], cases: &[Case]) -> Result<()> {
        if corpus.is_empty() {
            return Err(EvalError::ConfigError("no documents loaded".to_string()));
        }
        if cases.is_empty() {
            return Err(EvalError::ConfigError("no cases loaded".to_string()));
        }
        if self.config.top_k == 0 {
            return Err(EvalError::ConfigError("top_k must be at least 1".to_string()));
        }
        if self.config.concurrency == 0 {
            return Err(EvalError::ConfigError(
                "concurrency must be at least 1".to_string(),
            ));
        }
        if self.config.use_reranker {
            if self.reranker.is_none() {
                return Err(EvalError::ConfigError(
                    "reranker stage requested but no reranker configured".to_string(),
                ));
            }
            if self.config.candidate_n == 0 {
                return Err(EvalError::ConfigError(
                    "candidate_n must be at least 1".to_string(),
                ));
            }
            if self.config.top_k > self.config.candidate_n {
                return Err(EvalError::ConfigError(format!(
                    "top_k ({}) must not exceed candidate_n ({}) when reranking",
                    self.config.top_k, self.config.candidate_n
                )));
            }
        }
        Ok(())
    }

    /// Evaluate every case against the corpus.
    ///
    /// Fails only on caller errors detected before any ranking work; per-case
    /// reranker failures are recorded in the report.
    pub async fn evaluate(&self, corpus: &[Document], cases: &[Case]) -> Result<EvalReport> {
        self.validate(corpus, cases)?;

        let index = Bm25Index::from_documents(corpus);
        let depth = self.config.top_k.max(self.config.candidate_n);
        let reranker = self.reranker.as_deref().filter(|_| self.config.use_reranker);

        info!(
            documents = index.len(),
            cases = cases.len(),
            top_k = self.config.top_k,
            candidate_n = self.config.candidate_n,
            reranker = reranker.map(|r| r.name()).unwrap_or("none"),
            concurrency = self.config.concurrency,
            "Starting evaluation"
        );

        // `buffered` yields in input order whatever the completion order
        let results: Vec<CaseResult> = stream::iter(cases)
            .map(|case| {
                self.evaluate_case(&index, corpus, case, depth, reranker)
                    .instrument(info_span!("case", case_id = %case.id))
            })
            .buffered(self.config.concurrency)
            .collect()
            .await;

        let summary =
            RunSummary::from_results(&results, self.config.top_k, self.config.use_reranker);

        info!(
            bm25_hit_at_k = summary.bm25_hit_at_k,
            bm25_recall_at_k = summary.bm25_recall_at_k,
            errors = summary.reranker.as_ref().map(|r| r.error_count).unwrap_or(0),
            "Evaluation finished"
        );

        Ok(EvalReport { summary, results })
    }

    async fn evaluate_case(
        &self,
        index: &Bm25Index,
        corpus: &[Document],
        case: &Case,
        depth: usize,
        reranker: Option<&dyn Reranker>,
    ) -> CaseResult {
        let query = crate::tokenizer::tokenize(&case.prompt);
        let ranked = index.rank(&query, depth);

        let top_k = &ranked[..self.config.top_k.min(ranked.len())];
        let mut result = CaseResult::new(
            case,
            top_k.iter().map(|c| c.name.clone()).collect(),
            top_k.iter().map(|c| c.score).collect(),
        );
        debug!(top_k = ?result.bm25_top_k, "Ranked");

        let Some(reranker) = reranker else {
            return result;
        };

        let pool: Vec<Document> = ranked
            .iter()
            .take(self.config.candidate_n)
            .map(|c| corpus[c.index].clone())
            .collect();
        let strategy = RetryStrategy::with_retries(self.config.max_retries);
        let outcome = select_with_retry(
            reranker,
            &case.prompt,
            &pool,
            self.config.timeout,
            &strategy,
        )
        .await;

        result.reranker_top_n = Some(pool.iter().map(|d| d.name.clone()).collect());
        match outcome {
            Ok(picks) => {
                debug!(picks = ?picks, "Reranked");
                result.reranker_picks = Some(picks);
            }
            Err(e) => {
                warn!(case_id = %case.id, error = %e, "Reranker failed; scoring case as no picks");
                result.reranker_picks = Some(Vec::new());
                result.reranker_error = Some(e.to_string());
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RerankerError;
    use crate::reranker::{ScriptedOutcome, ScriptedReranker};

    fn corpus() -> Vec<Document> {
        vec![
            Document::new("pdf-export", "Generate PDF reports from data"),
            Document::new("chart-gen", "Create charts and graphs"),
        ]
    }

    #[tokio::test]
    async fn test_end_to_end_bm25_only() {
        let cases = vec![Case::new("c1", "make a pdf report", vec!["pdf-export"])];
        let harness = EvaluationHarness::new(HarnessConfig::default().with_top_k(1));
        let report = harness.evaluate(&corpus(), &cases).await.unwrap();

        assert_eq!(report.results[0].bm25_top_k, vec!["pdf-export"]);
        assert_eq!(report.summary.bm25_hit_at_k, 1.0);
        assert_eq!(report.summary.bm25_recall_at_k, 1.0);
        assert!(report.summary.reranker.is_none());
        assert!(report.results[0].reranker_picks.is_none());
    }

    #[tokio::test]
    async fn test_top_k_larger_than_corpus() {
        let cases = vec![Case::new("c1", "charts", vec!["chart-gen"])];
        let harness = EvaluationHarness::new(HarnessConfig::default().with_top_k(10));
        let report = harness.evaluate(&corpus(), &cases).await.unwrap();
        assert_eq!(report.results[0].bm25_top_k, vec!["chart-gen", "pdf-export"]);
        assert_eq!(report.results[0].bm25_scores[1], 0.0);
    }

    #[tokio::test]
    async fn test_empty_inputs_rejected() {
        let harness = EvaluationHarness::new(HarnessConfig::default());
        let cases = vec![Case::new("c1", "x", vec!["a"])];
        assert!(matches!(
            harness.evaluate(&[], &cases).await,
            Err(EvalError::ConfigError(_))
        ));
        assert!(matches!(
            harness.evaluate(&corpus(), &[]).await,
            Err(EvalError::ConfigError(_))
        ));
    }

    #[tokio::test]
    async fn test_reranker_requested_without_reranker() {
        let harness = EvaluationHarness::new(HarnessConfig::default().with_reranker_enabled(true));
        let cases = vec![Case::new("c1", "x", vec!["a"])];
        let err = harness.evaluate(&corpus(), &cases).await.unwrap_err();
        assert!(err.to_string().contains("no reranker"));
    }

    #[tokio::test]
    async fn test_top_k_above_candidate_pool_rejected() {
        let judge = Arc::new(ScriptedReranker::new());
        let config = HarnessConfig::default()
            .with_top_k(5)
            .with_candidate_n(2)
            .with_reranker_enabled(true);
        let harness = EvaluationHarness::new(config).with_reranker(judge.clone());
        let cases = vec![Case::new("c1", "pdf", vec!["pdf-export"])];

        let err = harness.evaluate(&corpus(), &cases).await.unwrap_err();
        assert!(matches!(err, EvalError::ConfigError(_)));
        assert!(err.to_string().contains("candidate_n"));
        assert_eq!(judge.calls(), 0);
    }

    #[tokio::test]
    async fn test_top_k_above_candidate_n_fine_without_reranker() {
        let config = HarnessConfig::default().with_top_k(5).with_candidate_n(2);
        let cases = vec![Case::new("c1", "pdf", vec!["pdf-export"])];
        let report = EvaluationHarness::new(config)
            .evaluate(&corpus(), &cases)
            .await
            .unwrap();
        assert_eq!(report.results[0].bm25_top_k.len(), 2);
    }

    #[tokio::test]
    async fn test_reranker_disabled_is_not_called() {
        let judge = Arc::new(ScriptedReranker::new());
        let harness =
            EvaluationHarness::new(HarnessConfig::default()).with_reranker(judge.clone());
        let cases = vec![Case::new("c1", "pdf", vec!["pdf-export"])];
        harness.evaluate(&corpus(), &cases).await.unwrap();
        assert_eq!(judge.calls(), 0);
    }

    #[tokio::test]
    async fn test_candidate_pool_bounded() {
        let corpus: Vec<Document> = (0..30)
            .map(|i| Document::new(format!("doc-{}", i), format!("report number {}", i)))
            .collect();
        let judge = Arc::new(ScriptedReranker::new());
        let config = HarnessConfig::default()
            .with_top_k(3)
            .with_candidate_n(7)
            .with_reranker_enabled(true);
        let harness = EvaluationHarness::new(config).with_reranker(judge);
        let cases = vec![Case::new("c1", "report", vec!["doc-1"])];
        let report = harness.evaluate(&corpus, &cases).await.unwrap();

        assert_eq!(report.results[0].bm25_top_k.len(), 3);
        assert_eq!(report.results[0].reranker_top_n.as_ref().unwrap().len(), 7);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retries_flaky_judge() {
        let judge = Arc::new(ScriptedReranker::new().on(
            "make a pdf report",
            ScriptedOutcome::Flaky {
                failures: 1,
                error: RerankerError::MalformedOutput("half an answer".into()),
                picks: vec!["pdf-export".into()],
            },
        ));
        let config = HarnessConfig::default()
            .with_reranker_enabled(true)
            .with_max_retries(1);
        let harness = EvaluationHarness::new(config).with_reranker(judge.clone());
        let cases = vec![Case::new("c1", "make a pdf report", vec!["pdf-export"])];
        let report = harness.evaluate(&corpus(), &cases).await.unwrap();

        assert_eq!(judge.calls(), 2);
        assert_eq!(
            report.results[0].reranker_picks,
            Some(vec!["pdf-export".to_string()])
        );
        assert_eq!(report.summary.reranker.unwrap().error_count, 0);
    }

    #[tokio::test]
    async fn test_no_retry_by_default() {
        let judge = Arc::new(
            ScriptedReranker::new()
                .otherwise(ScriptedOutcome::Fail(RerankerError::Io("pipe".into()))),
        );
        let harness = EvaluationHarness::new(HarnessConfig::default().with_reranker_enabled(true))
            .with_reranker(judge.clone());
        let cases = vec![Case::new("c1", "pdf", vec!["pdf-export"])];
        let report = harness.evaluate(&corpus(), &cases).await.unwrap();

        assert_eq!(judge.calls(), 1);
        assert_eq!(
            report.results[0].reranker_error.as_deref(),
            Some("Reranker I/O error: pipe")
        );
    }
}
