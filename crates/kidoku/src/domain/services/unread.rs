use std::cmp::Ordering;
use std::collections::HashSet;

use itertools::Itertools;
use kidoku_lib::models::{SeriesRecord, SourceObservation, Token};

use crate::domain::{entities::chapter::ChapterEntry, services::template};

/// Unread subset of a chapter list plus the count to surface. The count may
/// exceed the list length when the numeric gap reaches past the scraper's
/// recent-chapters window and synthesis could not cover it.
#[derive(Debug, Clone)]
pub struct UnreadView {
    pub chapters: Vec<ChapterEntry>,
    pub count: usize,
}

/// Diff a normalized chapter list against the series' last-read marker.
///
/// Scan invariant: entries before the first marker match are unread, the
/// match and everything after it are read. A marker that matches nothing has
/// rotated out of the known window, so the whole list counts as unread.
/// Integer holes between the last-read number and the latest known number
/// are filled with placeholder entries flagged `confirmed: false`.
pub fn derive_unread(
    entries: &[ChapterEntry],
    last_read: Option<&Token>,
    source: &SourceObservation,
    series: &SeriesRecord,
) -> UnreadView {
    let mut unread: Vec<ChapterEntry> = match last_read {
        None => entries.to_vec(),
        Some(marker) => match entries.iter().position(|entry| entry.token == *marker) {
            Some(read_from) => entries[..read_from].to_vec(),
            None => entries.to_vec(),
        },
    };

    sort_by_detection(&mut unread);

    let latest_number = entries
        .iter()
        .find_map(|entry| entry.number)
        .or(source.latest_chapter_number)
        .filter(|number| number.is_finite());
    let last_read_number = last_read.and_then(Token::number);

    let gap = match (latest_number, last_read_number) {
        (Some(latest), Some(read)) => {
            let gap = latest.floor() - read.floor();
            (gap > 0.0).then_some(gap as usize)
        }
        _ => None,
    };

    if let (Some(gap), Some(latest), Some(read)) = (gap, latest_number, last_read_number) {
        if gap > unread.len() {
            synthesize_gap(
                &mut unread,
                read.floor() as i64,
                latest.floor() as i64,
                source,
                series,
            );
        }
    }

    let count = gap.map_or(unread.len(), |gap| gap.max(unread.len()));

    UnreadView { chapters: unread, count }
}

/// Fill every integer strictly above `last_read` up to and including
/// `latest` that is not already represented by a token in the unread set.
/// Placeholders are an estimate, not an observation: no detection time, not
/// confirmed, and the whole list is re-sorted numerically afterwards since
/// estimated entries have no place in a detection-time ordering.
fn synthesize_gap(
    unread: &mut Vec<ChapterEntry>,
    last_read: i64,
    latest: i64,
    source: &SourceObservation,
    series: &SeriesRecord,
) {
    let known: HashSet<Token> = unread.iter().map(|entry| entry.token.clone()).collect();

    for n in (last_read + 1)..=latest {
        let number = n as f64;
        let Some(token) = Token::from_number(number) else {
            continue;
        };
        if known.contains(&token) {
            continue;
        }

        let label = format!("Chapter {n}");
        let link = template::resolve_chapter_link(source, series, &label, Some(number), None);
        unread.push(ChapterEntry {
            label,
            number: Some(number),
            link,
            token,
            detected_at: None,
            confirmed: false,
        });
    }

    *unread = unread
        .drain(..)
        .unique_by(|entry| entry.token.clone())
        .collect();
    unread.sort_by(|a, b| match (a.number, b.number) {
        (Some(x), Some(y)) => y.partial_cmp(&x).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
}

/// Newest detection first; entries without a timestamp keep their relative
/// order at the tail. The sort is stable so scraper order breaks ties.
fn sort_by_detection(entries: &mut [ChapterEntry]) {
    entries.sort_by(|a, b| match (a.detected_at, b.detected_at) {
        (Some(x), Some(y)) => y.cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
}

#[cfg(test)]
mod test {
    use std::str::FromStr;

    use chrono::{TimeZone, Utc};

    use super::*;

    fn entry(number: f64) -> ChapterEntry {
        ChapterEntry {
            label: format!("Chapter {number}"),
            number: Some(number),
            link: None,
            token: Token::from_number(number).unwrap(),
            detected_at: None,
            confirmed: true,
        }
    }

    fn source() -> SourceObservation {
        SourceObservation::new("mangadex", "mangadex.org")
    }

    fn series() -> SeriesRecord {
        SeriesRecord::new("Chainsaw Man")
    }

    #[test]
    fn test_no_marker_means_everything_unread() {
        let entries = vec![entry(3.0), entry(2.0), entry(1.0)];

        let view = derive_unread(&entries, None, &source(), &series());

        let numbers: Vec<f64> = view.chapters.iter().filter_map(|e| e.number).collect();
        assert_eq!(numbers, vec![3.0, 2.0, 1.0]);
        assert_eq!(view.count, 3);
    }

    #[test]
    fn test_scan_stops_at_exact_match() {
        let entries = vec![entry(15.0), entry(14.0), entry(13.0)];
        let marker = Token::from_str("num:14").unwrap();

        let view = derive_unread(&entries, Some(&marker), &source(), &series());

        assert_eq!(view.chapters.len(), 1);
        assert_eq!(view.chapters[0].token.as_str(), "num:15");
        assert_eq!(view.count, 1);
    }

    #[test]
    fn test_stale_marker_leaves_whole_list_unread() {
        let entries = vec![entry(5.0), entry(4.0)];
        let marker = Token::from_str("num:99").unwrap();

        let view = derive_unread(&entries, Some(&marker), &source(), &series());

        assert_eq!(view.chapters.len(), 2);
    }

    #[test]
    fn test_gap_synthesis_fills_missing_integers() {
        // only the banner is known: chapter 15 observed, reader is at 10
        let source = SourceObservation {
            latest_chapter: Some("Chapter 15".to_string()),
            latest_chapter_number: Some(15.0),
            ..source()
        };
        let entries = vec![entry(15.0)];
        let marker = Token::from_str("num:10").unwrap();

        let view = derive_unread(&entries, Some(&marker), &source, &series());

        assert_eq!(view.count, 5);
        let numbers: Vec<f64> = view.chapters.iter().filter_map(|e| e.number).collect();
        assert_eq!(numbers, vec![15.0, 14.0, 13.0, 12.0, 11.0]);
        assert!(view.chapters[0].confirmed);
        assert!(view.chapters[1..].iter().all(|e| !e.confirmed));
        assert!(view.chapters[1..].iter().all(|e| e.detected_at.is_none()));
    }

    #[test]
    fn test_synthesis_skips_scraped_tokens() {
        let entries = vec![entry(15.0), entry(13.0)];
        let marker = Token::from_str("num:11").unwrap();

        let view = derive_unread(&entries, Some(&marker), &source(), &series());

        assert_eq!(view.count, 4);
        let numbers: Vec<f64> = view.chapters.iter().filter_map(|e| e.number).collect();
        assert_eq!(numbers, vec![15.0, 14.0, 13.0, 12.0]);
        let confirmed: Vec<bool> = view.chapters.iter().map(|e| e.confirmed).collect();
        assert_eq!(confirmed, vec![true, false, true, false]);
    }

    #[test]
    fn test_no_duplicate_tokens_in_unread() {
        let entries = vec![entry(12.0), entry(11.0)];
        let marker = Token::from_str("num:9").unwrap();

        let view = derive_unread(&entries, Some(&marker), &source(), &series());

        let mut tokens: Vec<&str> =
            view.chapters.iter().map(|e| e.token.as_str()).collect();
        tokens.sort_unstable();
        tokens.dedup();
        assert_eq!(tokens.len(), view.chapters.len());
    }

    #[test]
    fn test_detection_time_orders_unread() {
        let older = Utc.with_ymd_and_hms(2026, 8, 1, 12, 0, 0).unwrap();
        let newer = Utc.with_ymd_and_hms(2026, 8, 20, 12, 0, 0).unwrap();

        let mut first = entry(7.0);
        first.detected_at = Some(older);
        let mut second = entry(8.0);
        second.detected_at = Some(newer);

        // scraper listed the older detection first
        let view = derive_unread(&[first, second], None, &source(), &series());

        let numbers: Vec<f64> = view.chapters.iter().filter_map(|e| e.number).collect();
        assert_eq!(numbers, vec![8.0, 7.0]);
    }

    #[test]
    fn test_fractional_marker_gaps_on_whole_chapters() {
        let entries = vec![entry(14.0)];
        let marker = Token::from_str("num:12.5").unwrap();

        let view = derive_unread(&entries, Some(&marker), &source(), &series());

        // floor(14) - floor(12.5) = 2: chapter 13 is synthesized, 14 is real
        assert_eq!(view.count, 2);
        let numbers: Vec<f64> = view.chapters.iter().filter_map(|e| e.number).collect();
        assert_eq!(numbers, vec![14.0, 13.0]);
    }
}
