use serde::Serialize;

use crate::domain::entities::chapter::ChapterEntry;

/// The source chosen to represent a series, with its resolved landing link.
#[derive(Debug, Clone, Serialize)]
pub struct SelectedSource {
    pub site: String,
    pub host: String,
    pub link: Option<String>,
}

/// Per-series view composed for presentation. Recomputed in full from the
/// raw observations and the durable record on every refresh; holding on to
/// one across refreshes is always wrong.
#[derive(Debug, Clone, Serialize)]
pub struct MatchSummary {
    pub title: String,
    pub source: Option<SelectedSource>,
    /// Every site the series was observed on, the selected source first and
    /// the rest ranked by the same ordering that picked it.
    pub sources: Vec<SelectedSource>,
    /// Everything known about the series on the selected source, newest
    /// first.
    pub chapters: Vec<ChapterEntry>,
    pub unread_chapters: Vec<ChapterEntry>,
    /// May exceed `unread_chapters.len()` when the numeric gap reaches past
    /// the scraper's short recent-chapters window.
    pub unread_count: usize,
    pub is_unread: bool,
    pub display_label: String,
}
