use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Field names as they appear in the response payload and in validation errors.
pub mod fields {
    pub const LOCATION: &str = "location";
    pub const COUNTRY: &str = "Country";
    pub const TEMPERATURE_C: &str = "temperature_c";
    pub const TEMPERATURE_F: &str = "temperature_f";
    pub const DESCRIPTION: &str = "description";
    pub const ICON: &str = "icon";
}

/// A validated weather observation, ready to be stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeatherObservation {
    pub location: String,

    #[serde(rename = "Country")]
    pub country: String,

    #[serde(rename = "temperature_c", with = "rust_decimal::serde::float")]
    pub temperature_celsius: Decimal,

    #[serde(rename = "temperature_f", with = "rust_decimal::serde::float")]
    pub temperature_fahrenheit: Decimal,

    pub description: String,

    #[serde(rename = "icon")]
    pub icon_url: String,
}

/// An observation together with the identity the store assigned to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredObservation {
    pub id: i64,

    #[serde(flatten)]
    pub observation: WeatherObservation,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn stored_observation_serializes_flat_with_original_field_names() {
        let stored = StoredObservation {
            id: 7,
            observation: WeatherObservation {
                location: "Paris".into(),
                country: "France".into(),
                temperature_celsius: Decimal::from_str("18.50").unwrap(),
                temperature_fahrenheit: Decimal::from_str("65.30").unwrap(),
                description: "Clear".into(),
                icon_url: "//icon.url/1.png".into(),
            },
        };

        let json = serde_json::to_value(&stored).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "id": 7,
                "location": "Paris",
                "Country": "France",
                "temperature_c": 18.5,
                "temperature_f": 65.3,
                "description": "Clear",
                "icon": "//icon.url/1.png"
            })
        );
    }
}
