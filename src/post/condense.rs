// src/post/condense.rs
use anyhow::{Context, Result};
use metrics::counter;
use tracing::info;

use super::parse::parse_generation;
use crate::error::CurateError;
use crate::llm::{invoke_text, LlmProvider, ModelRole};
use crate::prompts::condense_post_prompt;

/// Posts longer than this (link excluded) get condensed.
pub const CONDENSE_THRESHOLD_CHARS: usize = 300;

/// Character length of `post` with every occurrence of `link` removed.
pub fn post_length_without_link(post: &str, link: &str) -> usize {
    if link.is_empty() {
        return post.chars().count();
    }
    post.replace(link, "").chars().count()
}

pub fn needs_condensing(post: &str, link: &str) -> bool {
    post_length_without_link(post, link) > CONDENSE_THRESHOLD_CHARS
}

/// Rewrites `post` toward ~280 characters, keeping its structure.
///
/// `post`, `report` and at least one relevant link are required; the first
/// link is the one the post must keep. Only the final `<post>` section of
/// the model output is returned.
pub async fn condense_post(
    llm: &dyn LlmProvider,
    role: &ModelRole,
    post: &str,
    report: &str,
    relevant_links: &[String],
) -> Result<String> {
    if post.trim().is_empty() {
        return Err(CurateError::MissingState("no post found").into());
    }
    if report.trim().is_empty() {
        return Err(CurateError::MissingState("no report found").into());
    }
    let link = relevant_links
        .first()
        .ok_or(CurateError::MissingState("no relevant links found"))?;

    let original_len = post.chars().count();
    let system = condense_post_prompt(report, link, original_len);
    let user = format!("Here is the original post:\n\n{post}");

    crate::metrics::ensure_metrics_described();
    counter!("condense_calls_total").increment(1);

    let raw = invoke_text(llm, role, &system, &user)
        .await
        .context("condense post generation")?;
    let condensed = parse_generation(&raw)?;

    info!(
        target: "post",
        original_len,
        condensed_len = condensed.chars().count(),
        "post condensed"
    );
    Ok(condensed)
}

/// Condenses only when [`needs_condensing`]; otherwise returns `post` as is.
pub async fn condense_if_needed(
    llm: &dyn LlmProvider,
    role: &ModelRole,
    post: &str,
    report: &str,
    relevant_links: &[String],
) -> Result<String> {
    let link = relevant_links.first().map(String::as_str).unwrap_or("");
    if !needs_condensing(post, link) {
        return Ok(post.to_string());
    }
    condense_post(llm, role, post, report, relevant_links).await
}
