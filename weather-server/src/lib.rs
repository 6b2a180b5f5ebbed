//! HTTP surface for the weather observation recorder.
//!
//! The binary in `main.rs` adds the command-line entry point on top of this.

pub mod error;
pub mod serializers;
pub mod urls;
pub mod views;

use std::sync::Arc;

use weather_core::WeatherService;

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<WeatherService>,
}

impl AppState {
    pub fn new(service: WeatherService) -> Self {
        Self { service: Arc::new(service) }
    }
}
