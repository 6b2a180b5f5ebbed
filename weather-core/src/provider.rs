use crate::{Config, model::fields, provider::weatherapi::WeatherApiProvider};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::{fmt::Debug, sync::Arc, time::Duration};

pub mod weatherapi;

/// Current conditions as reported by a provider, before validation.
///
/// Values are kept as raw JSON so the validator sees exactly what the
/// provider sent.
#[derive(Debug, Clone, PartialEq)]
pub struct CurrentConditions {
    pub location_name: Value,
    pub country: Value,
    pub temp_c: Value,
    pub temp_f: Value,
    pub condition_text: Value,
    pub condition_icon: Value,
}

impl CurrentConditions {
    /// Flatten into the field map the validator expects.
    pub fn to_fields(&self) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert(fields::LOCATION.into(), self.location_name.clone());
        map.insert(fields::COUNTRY.into(), self.country.clone());
        map.insert(fields::TEMPERATURE_C.into(), self.temp_c.clone());
        map.insert(fields::TEMPERATURE_F.into(), self.temp_f.clone());
        map.insert(fields::DESCRIPTION.into(), self.condition_text.clone());
        map.insert(fields::ICON.into(), self.condition_icon.clone());
        map
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("weather provider did not respond within {0:?}")]
    Timeout(Duration),

    #[error("failed to reach weather provider: {0}")]
    Request(#[source] reqwest::Error),

    #[error("weather provider returned {status}: {message}")]
    Status {
        status: reqwest::StatusCode,
        message: String,
    },

    #[error("unexpected weather provider response: {0}")]
    Decode(#[from] serde_json::Error),
}

#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn current(&self, location: &str) -> Result<CurrentConditions, ProviderError>;
}

/// Construct the provider described by config.
pub fn provider_from_config(config: &Config) -> anyhow::Result<Arc<dyn WeatherProvider>> {
    let api_key = config.provider.api_key.as_deref().ok_or_else(|| {
        anyhow::anyhow!(
            "No API key configured for WeatherAPI.\n\
                 Hint: run `weather-server configure` or set WEATHERAPI_KEY."
        )
    })?;

    let provider = WeatherApiProvider::new(
        api_key.to_owned(),
        config.provider.base_url.clone(),
        config.provider.timeout(),
    )?;

    Ok(Arc::new(provider))
}
