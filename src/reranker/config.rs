//! Reranker configuration types.
//!
//! ```ascii
//! ┌─────────────────────────────────────────────────────────┐
//! │                    RerankerConfig                       │
//! ├─────────────────────────────────────────────────────────┤
//! │ program: String     ─────► Judge executable             │
//! │ args: Vec<String>   ─────► argv, `{output}` placeholder │
//! │ max_picks: usize    ─────► Bound stated to the judge    │
//! └─────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};

/// Placeholder in [`RerankerConfig::args`] replaced by the result file path.
pub const OUTPUT_PLACEHOLDER: &str = "{output}";

/// Configuration for the external judge process.
///
/// # Example
///
/// ```
/// use edgequake_trigger_eval::reranker::RerankerConfig;
///
/// let config = RerankerConfig::command("my-judge", ["--out", "{output}"]).with_max_picks(2);
/// assert_eq!(config.max_picks, 2);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RerankerConfig {
    /// Program to execute.
    pub program: String,
    /// Arguments; [`OUTPUT_PLACEHOLDER`] is substituted with a temp file path.
    pub args: Vec<String>,
    /// Maximum number of picks the judge is asked for.
    pub max_picks: usize,
}

impl Default for RerankerConfig {
    fn default() -> Self {
        Self::codex()
    }
}

impl RerankerConfig {
    /// `codex exec` in a read-only sandbox, reading the prompt from stdin.
    pub fn codex() -> Self {
        Self {
            program: "codex".to_string(),
            args: [
                "exec",
                "--skip-git-repo-check",
                "--sandbox",
                "read-only",
                "--output-last-message",
                OUTPUT_PLACEHOLDER,
                "-",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            max_picks: 3,
        }
    }

    /// Arbitrary judge command.
    pub fn command<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
            ..Self::codex()
        }
    }

    /// Set the maximum number of picks.
    pub fn with_max_picks(mut self, max_picks: usize) -> Self {
        self.max_picks = max_picks;
        self
    }

    /// Returns true if the judge writes its answer to a result file.
    pub fn uses_output_file(&self) -> bool {
        self.args.iter().any(|a| a.contains(OUTPUT_PLACEHOLDER))
    }
}
