use axum::{
    Json,
    extract::{Query, State},
};
use weather_core::StoredObservation;

use crate::{AppState, error::ApiError, serializers::weather::WeatherQuery};

/// `GET /?location=...`: fetch, validate and store current conditions, then
/// return the stored record.
pub async fn get_weather(
    State(state): State<AppState>,
    Query(query): Query<WeatherQuery>,
) -> Result<Json<StoredObservation>, ApiError> {
    let stored = state.service.record_current(query.location.as_deref()).await?;
    Ok(Json(stored))
}
