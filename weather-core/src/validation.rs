//! Maps a raw field map onto [`WeatherObservation`], enforcing the storage schema.
//!
//! Every field is checked, and all failures are reported together keyed by
//! field name, so a caller can show them next to the offending input.

use std::{collections::BTreeMap, fmt, str::FromStr};

use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::model::{WeatherObservation, fields};

pub const LOCATION_MAX_CHARS: usize = 100;
pub const COUNTRY_MAX_CHARS: usize = 100;
pub const DESCRIPTION_MAX_CHARS: usize = 200;
pub const ICON_MAX_CHARS: usize = 100;

pub const TEMPERATURE_MAX_DIGITS: u32 = 5;
pub const TEMPERATURE_DECIMAL_PLACES: u32 = 2;

/// Field-level validation failures, serialized as `{"field": ["message", ...]}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<String, Vec<String>>);

impl ValidationErrors {
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0.entry(field.to_string()).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn field(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, messages) in &self.0 {
            for message in messages {
                if !first {
                    f.write_str("; ")?;
                }
                write!(f, "{field}: {message}")?;
                first = false;
            }
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// Validate a raw field map and build the observation it describes.
pub fn validate(raw: &Map<String, Value>) -> Result<WeatherObservation, ValidationErrors> {
    let mut errors = ValidationErrors::default();

    let location = string_field(raw, fields::LOCATION, LOCATION_MAX_CHARS, &mut errors);
    let country = string_field(raw, fields::COUNTRY, COUNTRY_MAX_CHARS, &mut errors);
    let temperature_celsius = decimal_field(raw, fields::TEMPERATURE_C, &mut errors);
    let temperature_fahrenheit = decimal_field(raw, fields::TEMPERATURE_F, &mut errors);
    let description = string_field(raw, fields::DESCRIPTION, DESCRIPTION_MAX_CHARS, &mut errors);
    let icon_url = string_field(raw, fields::ICON, ICON_MAX_CHARS, &mut errors);

    match (
        location,
        country,
        temperature_celsius,
        temperature_fahrenheit,
        description,
        icon_url,
    ) {
        (
            Some(location),
            Some(country),
            Some(temperature_celsius),
            Some(temperature_fahrenheit),
            Some(description),
            Some(icon_url),
        ) if errors.is_empty() => Ok(WeatherObservation {
            location,
            country,
            temperature_celsius,
            temperature_fahrenheit,
            description,
            icon_url,
        }),
        _ => Err(errors),
    }
}

fn present<'a>(
    raw: &'a Map<String, Value>,
    field: &str,
    errors: &mut ValidationErrors,
) -> Option<&'a Value> {
    match raw.get(field) {
        None => {
            errors.add(field, "This field is required.");
            None
        }
        Some(Value::Null) => {
            errors.add(field, "This field may not be null.");
            None
        }
        Some(value) => Some(value),
    }
}

fn string_field(
    raw: &Map<String, Value>,
    field: &str,
    max_chars: usize,
    errors: &mut ValidationErrors,
) -> Option<String> {
    let value = match present(raw, field, errors)? {
        Value::String(value) => value.clone(),
        Value::Number(n) => n.to_string(),
        _ => {
            errors.add(field, "Not a valid string.");
            return None;
        }
    };

    if value.trim().is_empty() {
        errors.add(field, "This field may not be blank.");
        return None;
    }

    if value.chars().count() > max_chars {
        errors.add(field, format!("Ensure this field has no more than {max_chars} characters."));
        return None;
    }

    Some(value)
}

fn decimal_field(
    raw: &Map<String, Value>,
    field: &str,
    errors: &mut ValidationErrors,
) -> Option<Decimal> {
    let max_whole_digits = TEMPERATURE_MAX_DIGITS - TEMPERATURE_DECIMAL_PLACES;
    let too_many_digits =
        format!("Ensure that there are no more than {max_whole_digits} digits before the decimal point.");

    let parsed = match present(raw, field, errors)? {
        // Number's Display is the shortest round-tripping form, so 65.3 stays 65.3.
        Value::Number(n) => parse_decimal(&n.to_string()),
        Value::String(s) => parse_decimal(s),
        _ => ParsedDecimal::Invalid,
    };

    let value = match parsed {
        ParsedDecimal::Value(value) => value,
        ParsedDecimal::TooLarge => {
            errors.add(field, too_many_digits);
            return None;
        }
        ParsedDecimal::Invalid => {
            errors.add(field, "A valid number is required.");
            return None;
        }
    };

    let mut value = value.round_dp_with_strategy(
        TEMPERATURE_DECIMAL_PLACES,
        RoundingStrategy::MidpointAwayFromZero,
    );
    if value.is_zero() {
        value = Decimal::ZERO;
    }
    value.rescale(TEMPERATURE_DECIMAL_PLACES);

    if value.abs().trunc() >= Decimal::from(10_i64.pow(max_whole_digits)) {
        errors.add(field, too_many_digits);
        return None;
    }

    Some(value)
}

enum ParsedDecimal {
    Value(Decimal),
    TooLarge,
    Invalid,
}

/// Parse plain or scientific notation. Finite values outside `Decimal`'s range
/// are still numbers: tiny ones round to zero, huge ones overflow the precision.
fn parse_decimal(raw: &str) -> ParsedDecimal {
    let raw = raw.trim();
    if let Ok(value) = Decimal::from_str(raw).or_else(|_| Decimal::from_scientific(raw)) {
        return ParsedDecimal::Value(value);
    }

    match raw.parse::<f64>() {
        Ok(f) if f.is_finite() && f.abs() < 1.0 => ParsedDecimal::Value(Decimal::ZERO),
        Ok(f) if f.is_finite() => ParsedDecimal::TooLarge,
        _ => ParsedDecimal::Invalid,
    }
}
