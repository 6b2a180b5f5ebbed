//! Core library for the weather observation recorder.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The WeatherAPI provider client
//! - Validation of provider data against the storage schema
//! - The observation store
//! - Request orchestration tying them together
//!
//! It is used by `weather-server`, but can also be reused by other binaries or services.

pub mod config;
pub mod model;
pub mod provider;
pub mod service;
pub mod store;
pub mod validation;

pub use config::{Config, ProviderConfig, ServerConfig};
pub use model::{StoredObservation, WeatherObservation};
pub use provider::{CurrentConditions, ProviderError, WeatherProvider};
pub use service::{ServiceError, WeatherService};
pub use store::{RecordStore, SqliteStore, StoreError};
pub use validation::ValidationErrors;
