use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One scraped recent-chapter item, as loose as the scraper found it.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawChapter {
    pub label: Option<String>,
    pub number: Option<f64>,
    pub link: Option<String>,
    pub detected_at: Option<DateTime<Utc>>,
}

/// A type represent one site's latest observation of a series, normalized
/// across scrapers. Sparse by design: some sites only expose a single
/// "latest chapter" banner, others a short newest-first list.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SourceObservation {
    pub site: String,
    pub host: String,
    pub link: Option<String>,
    pub latest_chapter: Option<String>,
    pub latest_chapter_number: Option<f64>,
    /// Newest first when present; empty when the site only reports a banner.
    #[serde(default)]
    pub recent_chapters: Vec<RawChapter>,
    pub series_url_template: Option<String>,
    pub chapter_url_template: Option<String>,
}

impl SourceObservation {
    pub fn new(site: impl Into<String>, host: impl Into<String>) -> Self {
        Self {
            site: site.into(),
            host: host.into(),
            link: None,
            latest_chapter: None,
            latest_chapter_number: None,
            recent_chapters: Vec::new(),
            series_url_template: None,
            chapter_url_template: None,
        }
    }
}
