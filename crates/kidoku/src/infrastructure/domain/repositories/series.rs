use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use kidoku_lib::models::{SeriesRecord, Token};

use crate::domain::repositories::series::{SeriesRepository, SeriesRepositoryError};

fn title_key(title: &str) -> String {
    title.trim().to_lowercase()
}

/// In-memory series directory, for embedders without a durable store of
/// their own and for tests. Cloning shares the underlying map, the same way
/// the usual database-backed implementations share a pool.
#[derive(Clone)]
pub struct InMemorySeriesRepository {
    records: Arc<RwLock<HashMap<String, SeriesRecord>>>,
}

impl InMemorySeriesRepository {
    pub fn new(records: impl IntoIterator<Item = SeriesRecord>) -> Self {
        let records = records
            .into_iter()
            .map(|record| (title_key(&record.title), record))
            .collect();

        Self {
            records: Arc::new(RwLock::new(records)),
        }
    }

    pub async fn insert(&self, record: SeriesRecord) {
        self.records
            .write()
            .await
            .insert(title_key(&record.title), record);
    }
}

#[async_trait]
impl SeriesRepository for InMemorySeriesRepository {
    async fn get_all_series(&self) -> Result<Vec<SeriesRecord>, SeriesRepositoryError> {
        Ok(self.records.read().await.values().cloned().collect())
    }

    async fn get_series_by_title(
        &self,
        title: &str,
    ) -> Result<SeriesRecord, SeriesRepositoryError> {
        self.records
            .read()
            .await
            .get(&title_key(title))
            .cloned()
            .ok_or(SeriesRepositoryError::NotFound)
    }

    async fn update_last_read_token(
        &self,
        title: &str,
        expected: Option<&Token>,
        token: &Token,
    ) -> Result<(), SeriesRepositoryError> {
        let mut records = self.records.write().await;
        let record = records
            .get_mut(&title_key(title))
            .ok_or(SeriesRepositoryError::NotFound)?;

        if record.last_read_token.as_ref() != expected {
            return Err(SeriesRepositoryError::Conflict);
        }

        record.last_read_token = Some(token.clone());

        Ok(())
    }
}
