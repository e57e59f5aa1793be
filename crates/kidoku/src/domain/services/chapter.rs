use fancy_regex::Regex;
use itertools::Itertools;
use kidoku_lib::models::{RawChapter, SeriesRecord, SourceObservation, Token};

use crate::domain::{entities::chapter::ChapterEntry, services::template};

/// Outcome of making sense of whatever the scraper handed us for one
/// chapter: a real number when one can be recovered, else the text kept as
/// an opaque label.
#[derive(Debug, Clone, PartialEq)]
pub enum ChapterIdent {
    Numeric(f64),
    Label(String),
}

impl ChapterIdent {
    /// A native number wins, then a number recovered from the label, else
    /// the trimmed label stays opaque. `None` means the item carries no
    /// identity at all and must be dropped.
    pub fn from_raw(label: Option<&str>, number: Option<f64>) -> Option<Self> {
        if let Some(number) = number.filter(|number| number.is_finite()) {
            return Some(Self::Numeric(number));
        }

        let label = label.map(str::trim).filter(|label| !label.is_empty())?;

        match parse_chapter_number(label) {
            Some(number) => Some(Self::Numeric(number)),
            None => Some(Self::Label(label.to_string())),
        }
    }

    pub fn number(&self) -> Option<f64> {
        match self {
            Self::Numeric(number) => Some(*number),
            Self::Label(_) => None,
        }
    }
}

/// Pull a chapter number out of a free-form label: a bare "12" or "12.5"
/// parses directly, otherwise the label is searched for a "chapter 12" /
/// "ch. 12" / "c12" style marker.
pub fn parse_chapter_number(label: &str) -> Option<f64> {
    let trimmed = label.trim();
    if let Ok(number) = trimmed.parse::<f64>() {
        return number.is_finite().then_some(number);
    }

    let Ok(number_re) = Regex::new(r"(?i)(?:chapter|ch\.?|c)\s*(\d+(?:\.\d+)?)") else {
        return None;
    };
    number_re
        .captures(trimmed)
        .ok()
        .flatten()
        .and_then(|captures| captures.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Convert one source's raw observations into a deduplicated, token-tagged
/// chapter list. Input order is preserved: the scraper reports newest first
/// and the first occurrence of a token wins. When the site only exposes a
/// "latest chapter" banner the list is a synthetic singleton built from it.
pub fn normalize_chapters(source: &SourceObservation, series: &SeriesRecord) -> Vec<ChapterEntry> {
    let raw = if source.recent_chapters.is_empty() {
        vec![RawChapter {
            label: source.latest_chapter.clone(),
            number: source.latest_chapter_number,
            link: source.link.clone(),
            detected_at: None,
        }]
    } else {
        source.recent_chapters.clone()
    };

    raw.into_iter()
        .filter_map(|item| map_raw_chapter(source, series, item))
        .unique_by(|entry| entry.token.clone())
        .collect()
}

fn map_raw_chapter(
    source: &SourceObservation,
    series: &SeriesRecord,
    item: RawChapter,
) -> Option<ChapterEntry> {
    let ident = ChapterIdent::from_raw(item.label.as_deref(), item.number)?;
    let number = ident.number();
    let label = item
        .label
        .as_deref()
        .map(str::trim)
        .filter(|label| !label.is_empty())
        .map(str::to_string)
        .or_else(|| number.map(|number| number.to_string()))?;
    let token = Token::derive(Some(&label), number)?;
    let link =
        template::resolve_chapter_link(source, series, &label, number, item.link.as_deref());

    Some(ChapterEntry {
        label,
        number,
        link,
        token,
        detected_at: item.detected_at,
        confirmed: true,
    })
}

#[cfg(test)]
mod test {
    use super::*;

    fn raw(label: Option<&str>, number: Option<f64>) -> RawChapter {
        RawChapter {
            label: label.map(str::to_string),
            number,
            ..RawChapter::default()
        }
    }

    #[test]
    fn test_parse_chapter_number() {
        assert_eq!(parse_chapter_number("12"), Some(12.0));
        assert_eq!(parse_chapter_number(" 12.5 "), Some(12.5));
        assert_eq!(parse_chapter_number("Chapter 102"), Some(102.0));
        assert_eq!(parse_chapter_number("Ch. 4"), Some(4.0));
        assert_eq!(parse_chapter_number("c89.5"), Some(89.5));
        assert_eq!(parse_chapter_number("Extra Oneshot"), None);
    }

    #[test]
    fn test_ident_prefers_native_number() {
        assert_eq!(
            ChapterIdent::from_raw(Some("something odd"), Some(7.0)),
            Some(ChapterIdent::Numeric(7.0)),
        );
        assert_eq!(
            ChapterIdent::from_raw(Some("Chapter 8"), None),
            Some(ChapterIdent::Numeric(8.0)),
        );
        assert_eq!(
            ChapterIdent::from_raw(Some("Omake"), None),
            Some(ChapterIdent::Label("Omake".to_string())),
        );
        assert_eq!(ChapterIdent::from_raw(None, None), None);
    }

    #[test]
    fn test_normalize_dedupes_by_token_first_wins() {
        let source = SourceObservation {
            recent_chapters: vec![
                raw(Some("Chapter 12"), None),
                raw(Some("Ch. 12"), Some(12.0)),
                raw(Some("Chapter 11"), None),
            ],
            ..SourceObservation::new("mangadex", "mangadex.org")
        };
        let series = SeriesRecord::new("Blue Period");

        let entries = normalize_chapters(&source, &series);

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].label, "Chapter 12");
        assert_eq!(entries[0].token.as_str(), "num:12");
        assert_eq!(entries[1].token.as_str(), "num:11");
    }

    #[test]
    fn test_normalize_drops_tokenless_items() {
        let source = SourceObservation {
            recent_chapters: vec![raw(None, None), raw(Some("  "), None), raw(None, Some(3.0))],
            ..SourceObservation::new("mangadex", "mangadex.org")
        };
        let series = SeriesRecord::new("Blue Period");

        let entries = normalize_chapters(&source, &series);

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].label, "3");
        assert!(entries[0].confirmed);
    }

    #[test]
    fn test_normalize_builds_singleton_from_banner() {
        let source = SourceObservation {
            link: Some("https://tcbscans.com/one-piece".to_string()),
            latest_chapter: Some("Chapter 1100".to_string()),
            latest_chapter_number: Some(1100.0),
            ..SourceObservation::new("tcbscans", "tcbscans.com")
        };
        let series = SeriesRecord::new("One Piece");

        let entries = normalize_chapters(&source, &series);

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].token.as_str(), "num:1100");
        // no chapter template configured: the banner link is the series page
        assert_eq!(entries[0].link.as_deref(), Some("https://tcbscans.com/one-piece"));
    }

    #[test]
    fn test_normalize_keeps_scraper_order() {
        let source = SourceObservation {
            recent_chapters: vec![
                raw(None, Some(3.0)),
                raw(None, Some(1.0)),
                raw(None, Some(2.0)),
            ],
            ..SourceObservation::new("mangadex", "mangadex.org")
        };
        let series = SeriesRecord::new("Blue Period");

        let numbers: Vec<f64> = normalize_chapters(&source, &series)
            .iter()
            .filter_map(|entry| entry.number)
            .collect();

        assert_eq!(numbers, vec![3.0, 1.0, 2.0]);
    }
}
