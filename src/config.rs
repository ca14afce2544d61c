//! Run configuration.
//!
//! TOML-based configuration for an evaluation run: BM25 cutoffs, the reranker
//! stage and the external judge command.
//!
//! # Configuration File Location
//!
//! The config file is loaded from (in order of priority):
//! 1. An explicit path (`--config`)
//! 2. `TRIGGER_EVAL_CONFIG` environment variable
//! 3. `./trigger-eval.toml` (current working directory)
//! 4. `~/.edgequake/trigger-eval.toml` (user config)
//! 5. Built-in defaults
//!
//! Command-line flags override whatever was loaded.
//!
//! # Example Configuration
//!
//! ```toml
//! top_k = 5
//! candidate_n = 20
//! use_reranker = true
//! timeout_secs = 60
//! concurrency = 4
//! max_retries = 1
//! output = "out/trigger_eval_results.json"
//!
//! [reranker]
//! program = "codex"
//! args = ["exec", "--skip-git-repo-check", "--sandbox", "read-only",
//!         "--output-last-message", "{output}", "-"]
//! max_picks = 3
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

use crate::error::{EvalError, Result};
use crate::evaluation::HarnessConfig;
use crate::reranker::RerankerConfig;

/// Environment variable naming a config file.
pub const CONFIG_ENV_VAR: &str = "TRIGGER_EVAL_CONFIG";

/// File name searched in the working directory and `~/.edgequake/`.
pub const CONFIG_FILE_NAME: &str = "trigger-eval.toml";

/// Default report path.
pub const DEFAULT_OUTPUT: &str = "trigger_eval_results.json";

/// Root configuration for an evaluation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvalConfig {
    /// BM25 hit/recall cutoff.
    pub top_k: usize,
    /// Reranker candidate pool size.
    pub candidate_n: usize,
    /// Run the reranker stage.
    pub use_reranker: bool,
    /// Per-call timeout in seconds.
    pub timeout_secs: u64,
    /// Maximum cases evaluated in flight.
    pub concurrency: usize,
    /// Harness-level retries of a failed reranker call.
    pub max_retries: u32,
    /// Report path.
    pub output: PathBuf,
    /// External judge command.
    pub reranker: RerankerConfig,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            top_k: 5,
            candidate_n: 20,
            use_reranker: false,
            timeout_secs: 120,
            concurrency: 1,
            max_retries: 0,
            output: PathBuf::from(DEFAULT_OUTPUT),
            reranker: RerankerConfig::codex(),
        }
    }
}

impl EvalConfig {
    /// Load configuration from the standard locations.
    ///
    /// An explicit path must exist. The environment variable is skipped when it
    /// names a missing file, like the working-directory and user-level files.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }

        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            if Path::new(&path).exists() {
                return Self::from_file(&path);
            }
            debug!(path = %path, "{} points to a missing file, ignoring", CONFIG_ENV_VAR);
        }

        let local_path = Path::new(CONFIG_FILE_NAME);
        if local_path.exists() {
            return Self::from_file(local_path);
        }

        if let Some(home) = dirs::home_dir() {
            let user_path = home.join(".edgequake").join(CONFIG_FILE_NAME);
            if user_path.exists() {
                return Self::from_file(&user_path);
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file path.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| EvalError::io(path, e))?;
        debug!(path = %path.display(), "Loaded config");
        Self::from_toml(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        toml::from_str(toml_str).map_err(|e| EvalError::ConfigParse(e.to_string()))
    }

    /// Serialize configuration to a TOML string.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| EvalError::ConfigParse(e.to_string()))
    }

    /// Per-call timeout, never shorter than one second.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.top_k == 0 {
            return Err(EvalError::ConfigError("top_k must be at least 1".to_string()));
        }
        if self.candidate_n == 0 {
            return Err(EvalError::ConfigError(
                "candidate_n must be at least 1".to_string(),
            ));
        }
        if self.concurrency == 0 {
            return Err(EvalError::ConfigError(
                "concurrency must be at least 1".to_string(),
            ));
        }
        if self.use_reranker && self.top_k > self.candidate_n {
            return Err(EvalError::ConfigError(format!(
                "top_k ({}) must not exceed candidate_n ({}) when reranking",
                self.top_k, self.candidate_n
            )));
        }
        if self.reranker.program.trim().is_empty() {
            return Err(EvalError::ConfigError(
                "reranker program must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Run parameters for [`crate::EvaluationHarness`].
    pub fn harness_config(&self) -> HarnessConfig {
        HarnessConfig {
            top_k: self.top_k,
            candidate_n: self.candidate_n,
            use_reranker: self.use_reranker,
            timeout: self.timeout(),
            concurrency: self.concurrency,
            max_retries: self.max_retries,
        }
    }
}
