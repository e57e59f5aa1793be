use chrono::{DateTime, Utc};
use kidoku_lib::models::Token;
use serde::Serialize;

/// A chapter as derived from one source observation. Ephemeral, never
/// persisted.
#[derive(Debug, Clone, Serialize)]
pub struct ChapterEntry {
    pub label: String,
    pub number: Option<f64>,
    pub link: Option<String>,
    pub token: Token,
    pub detected_at: Option<DateTime<Utc>>,
    /// False for gap-synthesized placeholders, true for scraped entries.
    pub confirmed: bool,
}
