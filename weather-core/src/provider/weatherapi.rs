use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use super::{CurrentConditions, ProviderError, WeatherProvider};

pub const DEFAULT_BASE_URL: &str = "http://api.weatherapi.com/v1";

/// Client for WeatherAPI.com's current conditions endpoint.
#[derive(Debug, Clone)]
pub struct WeatherApiProvider {
    api_key: String,
    base_url: String,
    timeout: Duration,
    http: Client,
}

impl WeatherApiProvider {
    pub fn new(api_key: String, base_url: String, timeout: Duration) -> Result<Self, ProviderError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ProviderError::Request)?;

        Ok(Self { api_key, base_url, timeout, http })
    }

    fn current_url(&self) -> String {
        format!("{}/current.json", self.base_url.trim_end_matches('/'))
    }

    /// The request URL carries the API key, so it never leaves this function.
    fn classify(&self, err: reqwest::Error) -> ProviderError {
        if err.is_timeout() {
            ProviderError::Timeout(self.timeout)
        } else {
            ProviderError::Request(err.without_url())
        }
    }
}

#[derive(Debug, Deserialize)]
struct WaLocation {
    name: Value,
    country: Value,
}

#[derive(Debug, Deserialize)]
struct WaCondition {
    text: Value,
    icon: Value,
}

#[derive(Debug, Deserialize)]
struct WaCurrent {
    temp_c: Value,
    temp_f: Value,
    condition: WaCondition,
}

#[derive(Debug, Deserialize)]
struct WaResponse {
    location: WaLocation,
    current: WaCurrent,
}

#[derive(Debug, Deserialize)]
struct WaErrorBody {
    error: WaErrorDetail,
}

#[derive(Debug, Deserialize)]
struct WaErrorDetail {
    message: String,
}

/// Extract current conditions from a `current.json` body.
///
/// Every nested key must be present; a missing one is a decode error rather
/// than a value the validator gets to see.
pub(crate) fn parse_current(body: &str) -> Result<CurrentConditions, ProviderError> {
    let parsed: WaResponse = serde_json::from_str(body)?;

    Ok(CurrentConditions {
        location_name: parsed.location.name,
        country: parsed.location.country,
        temp_c: parsed.current.temp_c,
        temp_f: parsed.current.temp_f,
        condition_text: parsed.current.condition.text,
        condition_icon: parsed.current.condition.icon,
    })
}

fn error_message(body: &str) -> String {
    serde_json::from_str::<WaErrorBody>(body)
        .map(|b| b.error.message)
        .unwrap_or_else(|_| truncate_body(body))
}

#[async_trait]
impl WeatherProvider for WeatherApiProvider {
    async fn current(&self, location: &str) -> Result<CurrentConditions, ProviderError> {
        debug!(location, "requesting current conditions from WeatherAPI");

        let res = self
            .http
            .get(self.current_url())
            .query(&[("key", self.api_key.as_str()), ("q", location)])
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = res.status();
        let body = res.text().await.map_err(|e| self.classify(e))?;

        if !status.is_success() {
            return Err(ProviderError::Status { status, message: error_message(&body) });
        }

        parse_current(&body)
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const PARIS: &str = r#"{
        "location": {"name": "Paris", "region": "Ile-de-France", "country": "France"},
        "current": {
            "temp_c": 18.5,
            "temp_f": 65.3,
            "is_day": 1,
            "condition": {"text": "Clear", "icon": "//icon.url/1.png", "code": 1000}
        }
    }"#;

    #[test]
    fn parse_current_extracts_the_six_fields() {
        let conditions = parse_current(PARIS).unwrap();

        assert_eq!(conditions.location_name, json!("Paris"));
        assert_eq!(conditions.country, json!("France"));
        assert_eq!(conditions.temp_c, json!(18.5));
        assert_eq!(conditions.temp_f, json!(65.3));
        assert_eq!(conditions.condition_text, json!("Clear"));
        assert_eq!(conditions.condition_icon, json!("//icon.url/1.png"));
    }

    #[test]
    fn parse_current_reports_missing_nested_key() {
        let body = r#"{
            "location": {"name": "Paris"},
            "current": {"temp_c": 18.5, "temp_f": 65.3, "condition": {"text": "Clear", "icon": "x"}}
        }"#;

        let err = parse_current(body).unwrap_err();
        assert!(matches!(err, ProviderError::Decode(_)));
        assert!(err.to_string().contains("country"));
    }

    #[test]
    fn parse_current_keeps_null_leaves_for_validation() {
        let body = r#"{
            "location": {"name": null, "country": "France"},
            "current": {"temp_c": 18.5, "temp_f": 65.3, "condition": {"text": "Clear", "icon": "x"}}
        }"#;

        let conditions = parse_current(body).unwrap();
        assert_eq!(conditions.location_name, Value::Null);
    }

    #[test]
    fn error_message_prefers_provider_message() {
        let body = r#"{"error":{"code":1006,"message":"No matching location found."}}"#;
        assert_eq!(error_message(body), "No matching location found.");
        assert_eq!(error_message("upstream down"), "upstream down");
    }

    #[test]
    fn truncate_body_limits_long_bodies() {
        let long = "a".repeat(300);
        let out = truncate_body(&long);
        assert_eq!(out.len(), 203);
        assert!(out.ends_with("..."));
    }

    #[tokio::test]
    async fn transport_error_does_not_expose_api_key() {
        let closed = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = closed.local_addr().unwrap();
        drop(closed);

        let provider = WeatherApiProvider::new(
            "SECRET_KEY".into(),
            format!("http://{addr}/v1"),
            Duration::from_secs(5),
        )
        .unwrap();

        let err = provider.current("Paris").await.unwrap_err();

        assert!(matches!(err, ProviderError::Request(_)));
        assert!(!err.to_string().contains("SECRET_KEY"));
        assert!(!format!("{err:?}").contains("SECRET_KEY"));
    }

    #[test]
    fn current_url_tolerates_trailing_slash() {
        let provider = WeatherApiProvider::new(
            "KEY".into(),
            "http://localhost:9/v1/".into(),
            Duration::from_secs(1),
        )
        .unwrap();

        assert_eq!(provider.current_url(), "http://localhost:9/v1/current.json");
    }
}
