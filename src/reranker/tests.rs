//! Reranker tests shared across implementations.

use super::*;
use crate::corpus::Document;
use crate::error::RerankerError;
use std::sync::Arc;
use std::time::Duration;

fn pool() -> Vec<Document> {
    vec![
        Document::new("pdf-export", "Generate PDF reports from data"),
        Document::new("chart-gen", "Create charts and graphs"),
        Document::new("csv-clean", "Clean CSV files"),
    ]
}

#[test]
fn test_reranker_config_defaults() {
    let config = RerankerConfig::default();
    assert_eq!(config.program, "codex");
    assert_eq!(config.max_picks, 3);
    assert!(config.uses_output_file());
}

#[test]
fn test_custom_command_config() {
    let config = RerankerConfig::command("judge", ["--json"]);
    assert_eq!(config.args, vec!["--json"]);
    assert!(!config.uses_output_file());
    assert_eq!(config.max_picks, 3);
}

#[test]
fn test_config_from_toml() {
    let config: RerankerConfig = toml::from_str(
        r#"
        program = "my-judge"
        args = ["--out", "{output}"]
        "#,
    )
    .unwrap();
    assert_eq!(config.program, "my-judge");
    assert_eq!(config.max_picks, 3);
    assert!(config.uses_output_file());
}

#[tokio::test]
async fn test_rerankers_as_trait_objects() {
    let rerankers: Vec<Arc<dyn Reranker>> = vec![
        Arc::new(TermOverlapReranker::new()),
        Arc::new(ScriptedReranker::new().otherwise(ScriptedOutcome::TopCandidates(1))),
    ];

    for reranker in rerankers {
        let picks = reranker
            .select("generate pdf reports", &pool(), Duration::from_secs(1))
            .await
            .unwrap();
        assert_eq!(picks, vec!["pdf-export"], "reranker {}", reranker.name());
    }
}

#[tokio::test]
async fn test_candidates_only_from_pool() {
    let reranker = TermOverlapReranker::new().with_min_overlap(0.0);
    let picks = reranker
        .select("clean csv charts", &pool()[1..], Duration::from_secs(1))
        .await
        .unwrap();
    assert!(!picks.contains(&"pdf-export".to_string()));
}

#[tokio::test]
async fn test_failure_carries_cause() {
    let reranker = ScriptedReranker::new().otherwise(ScriptedOutcome::Fail(
        RerankerError::NonZeroExit {
            code: Some(1),
            stderr: "rate limited".into(),
        },
    ));
    let err = reranker
        .select("x", &pool(), Duration::from_secs(1))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("rate limited"));
}
