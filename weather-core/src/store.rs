use async_trait::async_trait;
use std::fmt::Debug;

use crate::model::{StoredObservation, WeatherObservation};

pub mod sqlite;

pub use sqlite::SqliteStore;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("stored row {id} is corrupt: {detail}")]
    Corrupt { id: i64, detail: String },
}

/// Persistence for weather observations.
///
/// Rows are only ever inserted; concurrent inserts are serialized by the
/// underlying database.
#[async_trait]
pub trait RecordStore: Send + Sync + Debug {
    /// Persist a validated observation and return it with its assigned id.
    async fn insert(&self, observation: WeatherObservation) -> Result<StoredObservation, StoreError>;

    async fn get(&self, id: i64) -> Result<Option<StoredObservation>, StoreError>;

    async fn count(&self) -> Result<u64, StoreError>;
}
