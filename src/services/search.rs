//! Relevance ranking for prompts.
//!
//! Matching is a case-insensitive substring test against the query as typed,
//! surrounding whitespace included. Each field that matches adds a fixed
//! weight:
//!
//! | Match | Points |
//! |-------|--------|
//! | Title contains query | 100 |
//! | Title starts with query | +50 |
//! | Content contains query | 30 |
//! | Each tag containing query | 20 |
//! | Description contains query | 10 |
//!
//! Prompts scoring zero are dropped. Ties keep collection order.

use crate::models::Prompt;
use serde::Serialize;

/// Points for a title containing the query.
pub const TITLE_CONTAINS_SCORE: u32 = 100;
/// Extra points for a title starting with the query.
pub const TITLE_PREFIX_SCORE: u32 = 50;
/// Points for content containing the query.
pub const CONTENT_SCORE: u32 = 30;
/// Points per tag containing the query.
pub const TAG_SCORE: u32 = 20;
/// Points for a description containing the query.
pub const DESCRIPTION_SCORE: u32 = 10;

/// A prompt paired with its relevance score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankedPrompt {
    /// The matched prompt.
    pub prompt: Prompt,
    /// Relevance score. Ranked results are always positive; unranked
    /// listings carry zero.
    pub score: u32,
}

/// Lowercases a query; `None` when it is blank.
///
/// Trimming only decides blankness, the needle keeps its whitespace.
fn normalize(query: &str) -> Option<String> {
    (!query.trim().is_empty()).then(|| query.to_lowercase())
}

/// Scores a prompt against an already-lowercased query.
#[must_use]
pub fn score_prompt(prompt: &Prompt, needle: &str) -> u32 {
    let mut score = 0;

    let title = prompt.title.to_lowercase();
    if title.contains(needle) {
        score += TITLE_CONTAINS_SCORE;
        if title.starts_with(needle) {
            score += TITLE_PREFIX_SCORE;
        }
    }

    if prompt.content().to_lowercase().contains(needle) {
        score += CONTENT_SCORE;
    }

    let tag_hits = prompt
        .tags
        .iter()
        .filter(|tag| tag.to_lowercase().contains(needle))
        .count();
    score += TAG_SCORE * u32::try_from(tag_hits).unwrap_or(u32::MAX / TAG_SCORE);

    if prompt
        .description
        .as_deref()
        .is_some_and(|d| d.to_lowercase().contains(needle))
    {
        score += DESCRIPTION_SCORE;
    }

    score
}

/// Filters and ranks prompts by relevance to `query`.
///
/// Returns matches in descending score order; equal scores keep their
/// relative order from `prompts`. A blank query returns nothing, since "no
/// active search" is for the caller to interpret.
///
/// # Examples
///
/// ```
/// use promptdock::models::{NewPrompt, Prompt};
/// use promptdock::rank_prompts;
///
/// let now = chrono::Utc::now();
/// let prompts = vec![
///     Prompt::create(NewPrompt::new("Bar Foo", ""), now),
///     Prompt::create(NewPrompt::new("Foo Bar", ""), now),
/// ];
/// let ranked = rank_prompts(&prompts, "bar");
/// assert_eq!(ranked[0].prompt.title, "Bar Foo");
/// assert_eq!(ranked[0].score, 150);
/// ```
#[must_use]
pub fn rank_prompts(prompts: &[Prompt], query: &str) -> Vec<RankedPrompt> {
    let Some(needle) = normalize(query) else {
        return Vec::new();
    };

    let mut ranked: Vec<RankedPrompt> = prompts
        .iter()
        .filter_map(|prompt| {
            let score = score_prompt(prompt, &needle);
            (score > 0).then(|| RankedPrompt {
                prompt: prompt.clone(),
                score,
            })
        })
        .collect();

    // sort_by is stable
    ranked.sort_by(|a, b| b.score.cmp(&a.score));
    ranked
}

/// Returns up to `limit` prompts with the highest usage counts.
///
/// Prompts never copied are left out. Ties keep collection order.
#[must_use]
pub fn most_used(prompts: &[Prompt], limit: usize) -> Vec<Prompt> {
    let mut used: Vec<&Prompt> = prompts.iter().filter(|p| p.usage_count > 0).collect();
    used.sort_by(|a, b| b.usage_count.cmp(&a.usage_count));
    used.into_iter().take(limit).cloned().collect()
}

/// Returns true if `prompt` passes the listing filter.
///
/// An empty query matches everything; otherwise title, content, or
/// description must contain it, ignoring case. A whitespace-only query is a
/// real filter. A non-empty tag list requires
/// at least one shared tag.
#[must_use]
pub fn matches_filter(prompt: &Prompt, query: &str, tags: &[String]) -> bool {
    let needle = query.to_lowercase();
    let query_ok = query.is_empty() || {
        prompt.title.to_lowercase().contains(&needle)
            || prompt.content().to_lowercase().contains(&needle)
            || prompt
                .description
                .as_deref()
                .is_some_and(|d| d.to_lowercase().contains(&needle))
    };

    let tags_ok = tags.is_empty() || tags.iter().any(|tag| prompt.has_tag(tag));

    query_ok && tags_ok
}
