//! Error types for trigger evaluation.
//!
//! # Error Taxonomy
//!
//! Two families of errors exist, and they travel very differently:
//!
//! | Family | Type | Scope | Effect |
//! |--------|------|-------|--------|
//! | Fatal / load-time | [`EvalError`] | Whole run | Abort before any case is processed |
//! | Per-case | [`RerankerError`] | One case | Recorded on the case, counted in `error_count` |
//!
//! A [`RerankerError`] never aborts a run. The harness turns it into data on the
//! [`CaseResult`](crate::evaluation::CaseResult) and moves on.
//!
//! # Retry Strategies
//!
//! Each reranker error maps to a [`RetryStrategy`]. The adapter itself never
//! retries; the harness consults the strategy when `max_retries > 0`.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Result type for evaluation operations.
pub type Result<T> = std::result::Result<T, EvalError>;

// ============================================================================
// Retry Strategy
// ============================================================================

/// Strategy for retrying a failed reranker call.
#[derive(Debug, Clone, PartialEq)]
pub enum RetryStrategy {
    /// Retry with exponential backoff (for transient failures).
    ExponentialBackoff {
        /// Initial delay before first retry.
        base_delay: Duration,
        /// Maximum delay between retries.
        max_delay: Duration,
        /// Maximum number of attempts, including the first one.
        max_attempts: u32,
    },

    /// Do not retry at all (permanent error).
    NoRetry,
}

impl RetryStrategy {
    /// Backoff used for transient judge failures (timeouts, crashes, bad output).
    pub fn judge_backoff() -> Self {
        Self::ExponentialBackoff {
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(10),
            max_attempts: 3,
        }
    }

    /// Backoff allowing exactly `retries` additional attempts.
    ///
    /// `retries == 0` yields [`RetryStrategy::NoRetry`].
    pub fn with_retries(retries: u32) -> Self {
        if retries == 0 {
            return Self::NoRetry;
        }
        Self::ExponentialBackoff {
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(10),
            max_attempts: retries.saturating_add(1),
        }
    }

    /// Check if this strategy allows retrying.
    pub fn should_retry(&self) -> bool {
        !matches!(self, Self::NoRetry)
    }
}

// ============================================================================
// Reranker Errors (per-case)
// ============================================================================

/// Failure of a single reranker call.
///
/// Carries the underlying cause so it can be rendered into the case report.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum RerankerError {
    /// The judge did not finish within the wall-clock budget.
    #[error("Reranker timed out after {}s", secs(.0))]
    Timeout(Duration),

    /// The judge process exited unsuccessfully.
    #[error("Reranker exited with status {}: {stderr}", exit_label(.code))]
    NonZeroExit {
        /// Exit code, `None` when terminated by a signal.
        code: Option<i32>,
        /// Captured standard error.
        stderr: String,
    },

    /// The judge process could not be started.
    #[error("Failed to spawn reranker: {0}")]
    Spawn(String),

    /// I/O failure while talking to the judge.
    #[error("Reranker I/O error: {0}")]
    Io(String),

    /// The judge answered, but no usable structured payload was found.
    #[error("Malformed reranker output: {0}")]
    MalformedOutput(String),
}

fn secs(d: &Duration) -> f64 {
    d.as_secs_f64()
}

fn exit_label(code: &Option<i32>) -> String {
    match code {
        Some(c) => c.to_string(),
        None => "signal".to_string(),
    }
}

impl RerankerError {
    /// Get the appropriate retry strategy for this error.
    ///
    /// # Example
    ///
    /// ```
    /// use edgequake_trigger_eval::RerankerError;
    /// use std::time::Duration;
    ///
    /// let error = RerankerError::Timeout(Duration::from_secs(5));
    /// assert!(error.retry_strategy().should_retry());
    /// ```
    pub fn retry_strategy(&self) -> RetryStrategy {
        match self {
            Self::Timeout(_) | Self::NonZeroExit { .. } | Self::Io(_) | Self::MalformedOutput(_) => {
                RetryStrategy::judge_backoff()
            }

            // A missing binary will not fix itself
            Self::Spawn(_) => RetryStrategy::NoRetry,
        }
    }

    /// Check if this error is recoverable (can be retried).
    pub fn is_recoverable(&self) -> bool {
        self.retry_strategy().should_retry()
    }
}

// ============================================================================
// Run-level Errors (fatal)
// ============================================================================

/// Errors that abort an evaluation run.
#[derive(Debug, Error)]
pub enum EvalError {
    /// Reading or writing a file failed.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        /// File being accessed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// An input file is not valid JSON.
    #[error("Failed to parse {}: {source}", path.display())]
    Parse {
        /// File being parsed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: serde_json::Error,
    },

    /// Serialization error.
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// Input is parseable but structurally invalid.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Caller or configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Configuration file is not valid TOML.
    #[error("Failed to parse config: {0}")]
    ConfigParse(String),
}

impl EvalError {
    /// Wrap an I/O error with the path it concerns.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Wrap a JSON error with the path it concerns.
    pub fn parse(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::Parse {
            path: path.into(),
            source,
        }
    }
}
