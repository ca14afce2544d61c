//! External-process judge.
//!
//! # Exchange
//!
//! ```ascii
//! ┌─────────────────┐  stdin: routing prompt   ┌──────────────────┐
//! │ CommandReranker │ ───────────────────────► │  judge process   │
//! │                 │                          │  (codex exec …)  │
//! │                 │ ◄─────────────────────── │                  │
//! └─────────────────┘  result file ({output})  └──────────────────┘
//!                      or stdout as fallback
//! ```
//!
//! The whole exchange runs under `tokio::time::timeout`. The child is spawned
//! with `kill_on_drop`, so abandoning the exchange on timeout kills it.

use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

use super::config::{RerankerConfig, OUTPUT_PLACEHOLDER};
use super::prompt::render_router_prompt;
use super::result::parse_selection;
use super::traits::{RerankResult, Reranker};
use crate::corpus::Document;
use crate::error::RerankerError;

/// Reranker backed by an external judge process.
///
/// # Example
///
/// ```ignore
/// use edgequake_trigger_eval::reranker::{CommandReranker, Reranker};
///
/// let reranker = CommandReranker::codex();
/// let picks = reranker.select("make a pdf report", &candidates, timeout).await?;
/// ```
#[derive(Debug, Clone)]
pub struct CommandReranker {
    config: RerankerConfig,
}

impl CommandReranker {
    /// Create a reranker with the given config.
    pub fn new(config: RerankerConfig) -> Self {
        Self { config }
    }

    /// Create a `codex exec` reranker.
    pub fn codex() -> Self {
        Self::new(RerankerConfig::codex())
    }

    /// Get the configuration.
    pub fn config(&self) -> &RerankerConfig {
        &self.config
    }

    fn build_args(&self, output_path: &Path) -> Vec<String> {
        let output = output_path.to_string_lossy();
        self.config
            .args
            .iter()
            .map(|a| a.replace(OUTPUT_PLACEHOLDER, &output))
            .collect()
    }

    /// Run the judge once and return its raw answer text.
    async fn exchange(&self, router_prompt: String, output_path: &Path) -> RerankResult<String> {
        let mut child = Command::new(&self.config.program)
            .args(self.build_args(output_path))
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| RerankerError::Spawn(format!("{}: {}", self.config.program, e)))?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| RerankerError::Io("stdin unavailable".to_string()))?;

        // Feed stdin while draining stdout/stderr so neither side blocks on a full pipe.
        let feed = async move {
            if let Err(e) = stdin.write_all(router_prompt.as_bytes()).await {
                debug!(error = %e, "Judge closed stdin early");
            }
            drop(stdin);
        };
        let ((), output) = tokio::join!(feed, child.wait_with_output());
        let output = output.map_err(|e| RerankerError::Io(e.to_string()))?;

        if !output.status.success() {
            return Err(RerankerError::NonZeroExit {
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let from_file = match tokio::fs::read(output_path).await {
            Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
            Err(e) => return Err(RerankerError::Io(e.to_string())),
        };

        if from_file.trim().is_empty() {
            Ok(String::from_utf8_lossy(&output.stdout).into_owned())
        } else {
            Ok(from_file)
        }
    }
}

impl Default for CommandReranker {
    fn default() -> Self {
        Self::codex()
    }
}

#[async_trait]
impl Reranker for CommandReranker {
    fn name(&self) -> &str {
        &self.config.program
    }

    async fn select(
        &self,
        prompt: &str,
        candidates: &[Document],
        timeout: Duration,
    ) -> RerankResult<Vec<String>> {
        let router_prompt = render_router_prompt(prompt, candidates, self.config.max_picks);

        // Removed when dropped, on every exit path
        let output_file = tempfile::Builder::new()
            .prefix("trigger_eval_router_")
            .suffix(".json")
            .tempfile()
            .map_err(|e| RerankerError::Io(e.to_string()))?;

        debug!(
            program = %self.config.program,
            candidates = candidates.len(),
            timeout_secs = timeout.as_secs_f64(),
            "Invoking judge"
        );

        let raw = tokio::time::timeout(timeout, self.exchange(router_prompt, output_file.path()))
            .await
            .map_err(|_| RerankerError::Timeout(timeout))??;

        parse_selection(&raw)
    }
}
