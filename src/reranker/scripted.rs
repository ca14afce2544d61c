//! Scripted judge for deterministic testing.
//!
//! Maps prompts to canned outcomes so harness behavior (failure isolation,
//! retries, ordering under concurrency) can be exercised without a process.
//!
//! ```ascii
//! ┌──────────────────────────────────────────────┐
//! │ ScriptedReranker                             │
//! │  "make a pdf" ─► Picks(["pdf-export"])       │
//! │  "slow one"   ─► Timeout                     │
//! │  "flaky"      ─► Flaky { failures: 1, .. }   │
//! │  <default>    ─► Picks([])                   │
//! └──────────────────────────────────────────────┘
//! ```

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use super::traits::{RerankResult, Reranker};
use crate::corpus::Document;
use crate::error::RerankerError;

/// Canned outcome for a prompt.
#[derive(Debug, Clone)]
pub enum ScriptedOutcome {
    /// Return these names.
    Picks(Vec<String>),
    /// Return the names of the first `n` candidates.
    TopCandidates(usize),
    /// Sleep past the timeout, then fail with [`RerankerError::Timeout`].
    Timeout,
    /// Fail immediately with this error.
    Fail(RerankerError),
    /// Fail `failures` times with `error`, then return `picks`.
    Flaky {
        /// Number of failing calls before success.
        failures: usize,
        /// Error returned while failing.
        error: RerankerError,
        /// Names returned once recovered.
        picks: Vec<String>,
    },
}

/// Judge returning canned outcomes keyed by prompt.
#[derive(Debug)]
pub struct ScriptedReranker {
    outcomes: HashMap<String, ScriptedOutcome>,
    fallback: ScriptedOutcome,
    delay: Duration,
    calls: AtomicUsize,
    attempts: Mutex<HashMap<String, usize>>,
}

impl ScriptedReranker {
    /// Create a judge that picks nothing for unknown prompts.
    pub fn new() -> Self {
        Self {
            outcomes: HashMap::new(),
            fallback: ScriptedOutcome::Picks(Vec::new()),
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
            attempts: Mutex::new(HashMap::new()),
        }
    }

    /// Script the outcome for `prompt`.
    pub fn on(mut self, prompt: impl Into<String>, outcome: ScriptedOutcome) -> Self {
        self.outcomes.insert(prompt.into(), outcome);
        self
    }

    /// Outcome for prompts without a script.
    pub fn otherwise(mut self, outcome: ScriptedOutcome) -> Self {
        self.fallback = outcome;
        self
    }

    /// Delay every successful answer (to shuffle completion order).
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Number of `select` calls made so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn attempt(&self, prompt: &str) -> usize {
        let mut attempts = match self.attempts.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let entry = attempts.entry(prompt.to_string()).or_insert(0);
        *entry += 1;
        *entry
    }
}

impl Default for ScriptedReranker {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Reranker for ScriptedReranker {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn select(
        &self,
        prompt: &str,
        candidates: &[Document],
        timeout: Duration,
    ) -> RerankResult<Vec<String>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let attempt = self.attempt(prompt);
        let outcome = self.outcomes.get(prompt).unwrap_or(&self.fallback);

        let picks = match outcome {
            ScriptedOutcome::Timeout => {
                tokio::time::sleep(timeout).await;
                return Err(RerankerError::Timeout(timeout));
            }
            ScriptedOutcome::Fail(error) => return Err(error.clone()),
            ScriptedOutcome::Flaky { failures, error, .. } if attempt <= *failures => {
                return Err(error.clone());
            }
            ScriptedOutcome::Flaky { picks, .. } | ScriptedOutcome::Picks(picks) => picks.clone(),
            ScriptedOutcome::TopCandidates(n) => {
                candidates.iter().take(*n).map(|d| d.name.clone()).collect()
            }
        };

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        Ok(super::result::dedup_names(picks))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_scripted_outcomes() {
        let judge = ScriptedReranker::new()
            .on("a", ScriptedOutcome::Picks(vec!["x".into(), "x".into()]))
            .on("b", ScriptedOutcome::Fail(RerankerError::Io("pipe".into())));

        let t = Duration::from_millis(10);
        assert_eq!(judge.select("a", &[], t).await.unwrap(), vec!["x"]);
        assert!(judge.select("b", &[], t).await.is_err());
        assert!(judge.select("c", &[], t).await.unwrap().is_empty());
        assert_eq!(judge.calls(), 3);
    }

    #[tokio::test]
    async fn test_flaky_recovers() {
        let judge = ScriptedReranker::new().on(
            "p",
            ScriptedOutcome::Flaky {
                failures: 2,
                error: RerankerError::Timeout(Duration::from_millis(1)),
                picks: vec!["ok".into()],
            },
        );
        let t = Duration::from_millis(10);
        assert!(judge.select("p", &[], t).await.is_err());
        assert!(judge.select("p", &[], t).await.is_err());
        assert_eq!(judge.select("p", &[], t).await.unwrap(), vec!["ok"]);
    }

    #[tokio::test]
    async fn test_top_candidates() {
        let judge = ScriptedReranker::new().otherwise(ScriptedOutcome::TopCandidates(1));
        let docs = vec![Document::new("first", ""), Document::new("second", "")];
        let picks = judge.select("any", &docs, Duration::from_millis(10)).await.unwrap();
        assert_eq!(picks, vec!["first"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_outcome() {
        let judge = ScriptedReranker::new().otherwise(ScriptedOutcome::Timeout);
        let err = judge
            .select("slow", &[], Duration::from_secs(120))
            .await
            .unwrap_err();
        assert_eq!(err, RerankerError::Timeout(Duration::from_secs(120)));
    }
}
