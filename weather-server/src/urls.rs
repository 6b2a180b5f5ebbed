use axum::{Router, routing::get};

use crate::{AppState, views::weather::get_weather};

pub fn router(state: AppState) -> Router {
    Router::new().route("/", get(get_weather)).with_state(state)
}
