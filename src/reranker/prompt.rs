//! Routing prompt sent to the external judge.

use crate::corpus::Document;

/// Render the routing prompt for `request` over `candidates`.
///
/// Each candidate is listed as `- name: description`, in BM25 order.
pub fn render_router_prompt(request: &str, candidates: &[Document], max_picks: usize) -> String {
    let listing = candidates
        .iter()
        .map(|d| format!("- {}: {}", d.name, d.description))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "You are a skill router.\n\
         Given a user request and a list of available skills (name + description), \
         choose which skill(s) should be invoked.\n\
         \n\
         Rules:\n\
         - Choose 0 to {max_picks} skills.\n\
         - Prefer fewer skills.\n\
         - If none match, return an empty list.\n\
         - Output MUST be valid JSON only (no markdown).\n\
         \n\
         Available skills:\n\
         {listing}\n\
         \n\
         User request:\n\
         {request}\n\
         \n\
         Return JSON:\n\
         {{\"skills\": [\"skill-name\", \"...\"]}}\n"
    )
}
