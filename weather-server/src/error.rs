use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::error;
use weather_core::{ProviderError, ServiceError};

use crate::serializers::weather::ApiErrorBody;

/// HTTP rendering of a failed weather request.
#[derive(Debug)]
pub struct ApiError(pub ServiceError);

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        Self(err)
    }
}

fn body(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(ApiErrorBody { error: message.into() })).into_response()
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self.0 {
            ServiceError::MissingLocation => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "location": ["This query parameter is required."] })),
            )
                .into_response(),
            ServiceError::Invalid(errors) => (StatusCode::BAD_REQUEST, Json(errors)).into_response(),
            ServiceError::Provider(err @ ProviderError::Timeout(_)) => {
                body(StatusCode::GATEWAY_TIMEOUT, err.to_string())
            }
            ServiceError::Provider(err) => body(StatusCode::BAD_GATEWAY, err.to_string()),
            ServiceError::Store(err) => {
                error!(error = %err, "request failed while storing observation");
                body(StatusCode::INTERNAL_SERVER_ERROR, "internal server error")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use weather_core::{StoreError, ValidationErrors};

    #[test]
    fn status_codes_follow_failure_kind() {
        let status = |err: ServiceError| ApiError(err).into_response().status();

        assert_eq!(status(ServiceError::MissingLocation), StatusCode::BAD_REQUEST);
        assert_eq!(status(ServiceError::Invalid(ValidationErrors::default())), StatusCode::BAD_REQUEST);
        assert_eq!(
            status(ServiceError::Provider(ProviderError::Timeout(Duration::from_secs(1)))),
            StatusCode::GATEWAY_TIMEOUT
        );
        assert_eq!(
            status(ServiceError::Provider(ProviderError::Status {
                status: StatusCode::BAD_REQUEST,
                message: "No matching location found.".into(),
            })),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            status(ServiceError::Store(StoreError::Corrupt { id: 1, detail: "x".into() })),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
