use std::cmp::Ordering;

use kidoku_lib::models::SourceObservation;

/// Total order used to rank a series' sources: highest known latest chapter
/// number first, sources without a number conceptually at -1, ties broken by
/// site label ascending, case-insensitive. Repeated runs over unchanged
/// input produce the same ranking.
pub fn compare_sources(a: &SourceObservation, b: &SourceObservation) -> Ordering {
    fn latest(source: &SourceObservation) -> f64 {
        source
            .latest_chapter_number
            .filter(|number| number.is_finite())
            .unwrap_or(-1.0)
    }

    latest(b)
        .partial_cmp(&latest(a))
        .unwrap_or(Ordering::Equal)
        .then_with(|| a.site.to_lowercase().cmp(&b.site.to_lowercase()))
}

/// All of a series' sources in display order, best first.
pub fn order_sources(sources: &[SourceObservation]) -> Vec<&SourceObservation> {
    let mut ordered: Vec<&SourceObservation> = sources.iter().collect();
    ordered.sort_by(|a, b| compare_sources(a, b));
    ordered
}

/// The single source that represents the series. When no source carries a
/// numeric chapter, one with at least a chapter label beats one with
/// neither.
pub fn select_source(sources: &[SourceObservation]) -> Option<&SourceObservation> {
    let ordered = order_sources(sources);

    if ordered
        .iter()
        .any(|source| source.latest_chapter_number.is_some())
    {
        return ordered.first().copied();
    }

    ordered
        .iter()
        .find(|source| {
            source
                .latest_chapter
                .as_deref()
                .is_some_and(|label| !label.trim().is_empty())
        })
        .copied()
        .or_else(|| ordered.first().copied())
}

#[cfg(test)]
mod test {
    use super::*;

    fn observation(site: &str, number: Option<f64>, label: Option<&str>) -> SourceObservation {
        SourceObservation {
            latest_chapter: label.map(str::to_string),
            latest_chapter_number: number,
            ..SourceObservation::new(site, format!("{}.com", site.to_lowercase()))
        }
    }

    #[test]
    fn test_highest_chapter_number_wins() {
        let sources = vec![
            observation("manganato", Some(101.0), Some("101")),
            observation("mangadex", Some(103.0), Some("103")),
            observation("tcbscans", None, Some("99")),
        ];

        let selected = select_source(&sources).unwrap();
        assert_eq!(selected.site, "mangadex");
    }

    #[test]
    fn test_tie_breaks_on_site_label() {
        let sources = vec![
            observation("Manganato", Some(50.0), None),
            observation("comikey", Some(50.0), None),
        ];

        let selected = select_source(&sources).unwrap();
        assert_eq!(selected.site, "comikey");
    }

    #[test]
    fn test_labeled_source_beats_bare_one_when_no_numbers() {
        let sources = vec![
            observation("aaa", None, None),
            observation("zzz", None, Some("Chapter 12")),
        ];

        let selected = select_source(&sources).unwrap();
        assert_eq!(selected.site, "zzz");
    }

    #[test]
    fn test_empty_input_selects_nothing() {
        assert!(select_source(&[]).is_none());
    }

    #[test]
    fn test_ordering_is_stable_across_runs() {
        let sources = vec![
            observation("beta", None, None),
            observation("alpha", Some(1.0), None),
        ];

        let first: Vec<&str> = order_sources(&sources).iter().map(|s| s.site.as_str()).collect();
        let second: Vec<&str> = order_sources(&sources).iter().map(|s| s.site.as_str()).collect();

        assert_eq!(first, vec!["alpha", "beta"]);
        assert_eq!(first, second);
    }
}
