use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct WeatherQuery {
    pub location: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiErrorBody {
    pub error: String,
}
