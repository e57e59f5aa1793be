use async_trait::async_trait;
use thiserror::Error;

use kidoku_lib::models::{SeriesRecord, Token};

#[derive(Debug, Error)]
pub enum SeriesRepositoryError {
    #[error("series not found")]
    NotFound,
    #[error("last read marker changed concurrently")]
    Conflict,
    #[error("store error: {0}")]
    StoreError(#[from] anyhow::Error),
}

/// Port to the durable series directory. The engine reads whole records and
/// writes back exactly one field, the last-read marker.
#[async_trait]
pub trait SeriesRepository {
    async fn get_all_series(&self) -> Result<Vec<SeriesRecord>, SeriesRepositoryError>;

    /// Titles are compared case-insensitively.
    async fn get_series_by_title(&self, title: &str)
    -> Result<SeriesRecord, SeriesRepositoryError>;

    /// Persist a new last-read marker. `expected` is the marker the caller
    /// observed before deciding to advance; the store must answer
    /// [`SeriesRepositoryError::Conflict`] when the stored marker no longer
    /// matches it, so out-of-order writes from other devices cannot regress
    /// progress.
    async fn update_last_read_token(
        &self,
        title: &str,
        expected: Option<&Token>,
        token: &Token,
    ) -> Result<(), SeriesRepositoryError>;
}
