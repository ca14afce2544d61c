//! Parsing of the judge's answer.
//!
//! The judge is asked for `{"skills": [...]}` but answers often arrive wrapped
//! in markdown fences or prose. [`extract_json_object`] returns the first
//! well-formed JSON object found anywhere in the text.

use serde_json::{Map, Value};
use std::collections::HashSet;

use super::traits::RerankResult;
use crate::error::RerankerError;

const SNIPPET_LEN: usize = 200;

/// Find the first well-formed JSON object in `text`.
///
/// # Example
///
/// ```
/// use edgequake_trigger_eval::reranker::extract_json_object;
///
/// let text = "Sure!\n```json\n{\"skills\": [\"pdf-export\"]}\n```";
/// let obj = extract_json_object(text).unwrap();
/// assert!(obj.contains_key("skills"));
/// ```
pub fn extract_json_object(text: &str) -> Option<Map<String, Value>> {
    let text = text.trim();
    if let Ok(Value::Object(obj)) = serde_json::from_str::<Value>(text) {
        return Some(obj);
    }

    // Try each opening brace; the stream deserializer stops after one value,
    // so trailing prose or fences are ignored.
    text.match_indices('{').find_map(|(pos, _)| {
        let mut stream = serde_json::Deserializer::from_str(&text[pos..]).into_iter::<Value>();
        match stream.next() {
            Some(Ok(Value::Object(obj))) => Some(obj),
            _ => None,
        }
    })
}

/// Deduplicate names, preserving first occurrence order.
pub fn dedup_names<I>(names: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut seen = HashSet::new();
    names
        .into_iter()
        .filter(|name| seen.insert(name.clone()))
        .collect()
}

/// Extract the selected names from a judge answer.
///
/// Reads the `skills` array (alias `picks`). A missing or non-array value means
/// zero picks. Names are trimmed, empties dropped, duplicates removed.
pub fn parse_selection(text: &str) -> RerankResult<Vec<String>> {
    let obj = extract_json_object(text).ok_or_else(|| {
        let snippet: String = text.trim().chars().take(SNIPPET_LEN).collect();
        RerankerError::MalformedOutput(format!("no JSON object in output: {:?}", snippet))
    })?;

    let Some(Value::Array(items)) = obj.get("skills").or_else(|| obj.get("picks")) else {
        return Ok(Vec::new());
    };

    let names = items
        .iter()
        .map(|item| match item {
            Value::String(s) => s.trim().to_string(),
            other => other.to_string().trim().to_string(),
        })
        .filter(|s| !s.is_empty());

    Ok(dedup_names(names))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_json() {
        let picks = parse_selection(r#"{"skills": ["a", "b"]}"#).unwrap();
        assert_eq!(picks, vec!["a", "b"]);
    }

    #[test]
    fn test_fenced_json() {
        let text = "```json\n{\"skills\": [\"pdf-export\"]}\n```";
        assert_eq!(parse_selection(text).unwrap(), vec!["pdf-export"]);
    }

    #[test]
    fn test_json_inside_prose() {
        let text = "I think {the best} answer is {\"skills\": [\"chart-gen\"]} and that's it.";
        assert_eq!(parse_selection(text).unwrap(), vec!["chart-gen"]);
    }

    #[test]
    fn test_first_object_wins() {
        let text = r#"{"skills": ["first"]} then {"skills": ["second"]}"#;
        assert_eq!(parse_selection(text).unwrap(), vec!["first"]);
    }

    #[test]
    fn test_nested_braces() {
        let text = r#"answer: {"skills": ["a"], "meta": {"why": "x"}} done"#;
        assert_eq!(parse_selection(text).unwrap(), vec!["a"]);
    }

    #[test]
    fn test_dedup_and_trim() {
        let text = r#"{"skills": [" a ", "b", "a", "", "b"]}"#;
        assert_eq!(parse_selection(text).unwrap(), vec!["a", "b"]);
    }

    #[test]
    fn test_empty_selection() {
        assert!(parse_selection(r#"{"skills": []}"#).unwrap().is_empty());
        assert!(parse_selection(r#"{}"#).unwrap().is_empty());
        assert!(parse_selection(r#"{"skills": "pdf"}"#).unwrap().is_empty());
    }

    #[test]
    fn test_picks_alias() {
        assert_eq!(parse_selection(r#"{"picks": ["x"]}"#).unwrap(), vec!["x"]);
    }

    #[test]
    fn test_malformed_output() {
        let err = parse_selection("no json here").unwrap_err();
        assert!(matches!(err, RerankerError::MalformedOutput(_)));

        let err = parse_selection("[\"a\"]").unwrap_err();
        assert!(matches!(err, RerankerError::MalformedOutput(_)));
    }

    #[test]
    fn test_dedup_names_order() {
        let names = vec!["b".to_string(), "a".to_string(), "b".to_string()];
        assert_eq!(dedup_names(names), vec!["b", "a"]);
    }
}
