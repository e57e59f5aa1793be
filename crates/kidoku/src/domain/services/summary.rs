use std::collections::HashMap;

use kidoku_lib::models::{SeriesRecord, SourceObservation, Token};
use thiserror::Error;

use crate::domain::{
    entities::summary::{MatchSummary, SelectedSource},
    repositories::series::{SeriesRepository, SeriesRepositoryError},
    services::{chapter, source, template, unread},
};

#[derive(Debug, Error)]
pub enum SummaryError {
    #[error("repository error: {0}")]
    RepositoryError(#[from] SeriesRepositoryError),
}

/// Result of a mark-read commit. A token that does not advance progress is a
/// benign no-op, never an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkReadOutcome {
    Advanced,
    Ignored,
}

/// Compose the per-series view for one durable record and its raw
/// observations. Pure: identical inputs always produce an identical summary.
pub fn summarize(series: &SeriesRecord, sources: &[SourceObservation]) -> MatchSummary {
    let Some(selected) = source::select_source(sources) else {
        return MatchSummary {
            title: series.title.clone(),
            source: None,
            sources: Vec::new(),
            chapters: Vec::new(),
            unread_chapters: Vec::new(),
            unread_count: 0,
            is_unread: false,
            display_label: "Unknown".to_string(),
        };
    };

    // keep every observed site in the view, selected source first, the rest
    // in selection order
    let ranked = source::order_sources(sources)
        .into_iter()
        .filter(|candidate| !std::ptr::eq(*candidate, selected));
    let source_views: Vec<SelectedSource> = std::iter::once(selected)
        .chain(ranked)
        .map(|observation| SelectedSource {
            site: observation.site.clone(),
            host: observation.host.clone(),
            link: template::resolve_series_link(observation, series),
        })
        .collect();

    let chapters = chapter::normalize_chapters(selected, series);
    let view = unread::derive_unread(
        &chapters,
        series.last_read_token.as_ref(),
        selected,
        series,
    );

    let display_label = chapters
        .first()
        .map(|chapter| chapter.label.clone())
        .or_else(|| {
            selected
                .latest_chapter
                .clone()
                .filter(|label| !label.trim().is_empty())
        })
        .unwrap_or_else(|| "Unknown".to_string());

    MatchSummary {
        title: series.title.clone(),
        source: source_views.first().cloned(),
        sources: source_views,
        chapters,
        is_unread: view.count > 0,
        unread_count: view.count,
        unread_chapters: view.chapters,
        display_label,
    }
}

/// Whether `candidate` moves the marker forward. Numeric markers only move
/// to strictly larger numbers. A label marker yields to anything numeric; a
/// label candidate never replaces a numeric marker, since its position in
/// the series cannot be established.
fn advances_progress(current: Option<&Token>, candidate: &Token) -> bool {
    let Some(current) = current else {
        return true;
    };
    if current == candidate {
        return false;
    }

    match (current.number(), candidate.number()) {
        (Some(current), Some(candidate)) => candidate > current,
        (Some(_), None) => false,
        (None, Some(_)) => true,
        (None, None) => true,
    }
}

pub struct SummaryService<R>
where
    R: SeriesRepository,
{
    repo: R,
}

impl<R> SummaryService<R>
where
    R: SeriesRepository,
{
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Recompute the full aggregate from the current observations and the
    /// durable directory. Observation map keys are matched to series titles
    /// case-insensitively; tracked series with no observations still get an
    /// (empty) summary. Output is ordered by title so repeated runs are
    /// directly comparable.
    pub async fn compute_summaries(
        &self,
        observations: &HashMap<String, Vec<SourceObservation>>,
    ) -> Result<Vec<MatchSummary>, SummaryError> {
        let series = self.repo.get_all_series().await?;

        let by_title: HashMap<String, &[SourceObservation]> = observations
            .iter()
            .map(|(title, sources)| (title.trim().to_lowercase(), sources.as_slice()))
            .collect();

        let mut summaries: Vec<MatchSummary> = series
            .iter()
            .map(|record| {
                let sources = by_title
                    .get(&record.title.trim().to_lowercase())
                    .copied()
                    .unwrap_or(&[]);
                summarize(record, sources)
            })
            .collect();

        summaries.sort_by(|a, b| a.title.to_lowercase().cmp(&b.title.to_lowercase()));

        debug!(
            "computed {} summaries, {} with unread chapters",
            summaries.len(),
            summaries.iter().filter(|s| s.is_unread).count(),
        );

        Ok(summaries)
    }

    /// Commit a new last-read marker for a series. Read-modify-write against
    /// the durable store: the write only happens when the token advances the
    /// stored marker, and a concurrent write from another device restarts
    /// the evaluation instead of clobbering it. The loop terminates because
    /// every conflict means the stored marker moved, and it only ever moves
    /// forward: eventually the token either commits or stops advancing.
    pub async fn mark_read(
        &self,
        title: &str,
        token: &Token,
    ) -> Result<MarkReadOutcome, SummaryError> {
        loop {
            let record = self.repo.get_series_by_title(title).await?;
            let current = record.last_read_token.as_ref();

            if !advances_progress(current, token) {
                debug!("mark read ignored for {title}: {token} does not advance progress");
                return Ok(MarkReadOutcome::Ignored);
            }

            match self.repo.update_last_read_token(title, current, token).await {
                Ok(()) => {
                    info!("marked {title} read at {token}");
                    return Ok(MarkReadOutcome::Advanced);
                }
                Err(SeriesRepositoryError::Conflict) => continue,
                Err(e) => return Err(e.into()),
            }
        }
    }
}
