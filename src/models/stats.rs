//! Collection statistics.

use serde::Serialize;

/// Length of the trailing window used for "recent" counts, in days.
pub const RECENT_WINDOW_DAYS: i64 = 7;

/// Summary counts over the store's collections.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    /// Number of prompts.
    pub total_prompts: usize,
    /// Number of tag catalog entries.
    pub total_tags: usize,
    /// Number of folders.
    pub total_folders: usize,
    /// Sum of all prompts' usage counts.
    pub total_usage: u64,
    /// Prompts created within the trailing window.
    pub recently_created: usize,
    /// Prompts updated within the trailing window.
    pub recently_updated: usize,
}
