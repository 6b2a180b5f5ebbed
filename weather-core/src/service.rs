//! Request orchestration: fetch current conditions, validate, persist.

use std::sync::Arc;

use anyhow::Context;
use tracing::{error, info, warn};

use crate::{
    Config,
    model::StoredObservation,
    provider::{ProviderError, WeatherProvider, provider_from_config},
    store::{RecordStore, SqliteStore, StoreError},
    validation::{self, ValidationErrors},
};

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("the `location` query parameter is required")]
    MissingLocation,

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("validation failed: {0}")]
    Invalid(#[from] ValidationErrors),

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone)]
pub struct WeatherService {
    provider: Arc<dyn WeatherProvider>,
    store: Arc<dyn RecordStore>,
}

impl WeatherService {
    pub fn new(provider: Arc<dyn WeatherProvider>, store: Arc<dyn RecordStore>) -> Self {
        Self { provider, store }
    }

    /// Wire the WeatherAPI provider and the SQLite store described by config.
    pub async fn from_config(config: &Config) -> anyhow::Result<Self> {
        let provider = provider_from_config(config)?;
        let store = SqliteStore::connect(&config.server.database_url)
            .await
            .with_context(|| {
                format!("Failed to open observation store at {}", config.server.database_url)
            })?;

        Ok(Self::new(provider, Arc::new(store)))
    }

    pub fn store(&self) -> &Arc<dyn RecordStore> {
        &self.store
    }

    /// Fetch current conditions for `location`, validate them and store a new
    /// observation. Nothing is stored unless validation succeeds.
    pub async fn record_current(
        &self,
        location: Option<&str>,
    ) -> Result<StoredObservation, ServiceError> {
        let location = location
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .ok_or(ServiceError::MissingLocation)?;

        let conditions = self.provider.current(location).await.inspect_err(|err| {
            warn!(location, error = %err, "weather provider request failed");
        })?;

        let observation = validation::validate(&conditions.to_fields()).inspect_err(|err| {
            warn!(location, errors = %err, "provider response failed validation");
        })?;

        let stored = self.store.insert(observation).await.inspect_err(|err| {
            error!(location, error = %err, "failed to store observation");
        })?;

        info!(id = stored.id, location = %stored.observation.location, "stored weather observation");
        Ok(stored)
    }
}
