//! Error handling for the REST API server.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use std::fmt;

use practica_core::error::PracticaError;

/// API error type.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: String,
    pub message: String,
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    pub fn new(status: StatusCode, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status,
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "BAD_REQUEST", message)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.status, self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.code,
                message: self.message,
                details: self.details,
            },
        };

        (self.status, Json(body)).into_response()
    }
}

fn status_for(err: &PracticaError) -> StatusCode {
    match err {
        PracticaError::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        PracticaError::NotFound { .. } => StatusCode::NOT_FOUND,
        PracticaError::SessionState { .. } => StatusCode::CONFLICT,
        PracticaError::ItemBank { .. } | PracticaError::Network { .. } => StatusCode::BAD_GATEWAY,
        PracticaError::Authentication { .. } => StatusCode::UNAUTHORIZED,
        PracticaError::Configuration(_) | PracticaError::UnsupportedProvider { .. } => {
            StatusCode::BAD_REQUEST
        }
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

// Core errors keep their structured code in the response body
impl From<PracticaError> for ApiError {
    fn from(err: PracticaError) -> Self {
        let status = status_for(&err);
        let code = err.code().as_str();

        let mut details = serde_json::Map::new();
        if let Some(suggestion) = err.suggestion() {
            details.insert("suggestion".to_string(), json!(suggestion));
        }
        match &err {
            PracticaError::Validation { details: extra, .. } => {
                for (key, value) in extra {
                    details.insert(key.clone(), json!(value));
                }
            }
            PracticaError::NotFound {
                resource_id: Some(id),
                ..
            } => {
                details.insert("resource_id".to_string(), json!(id));
            }
            _ => {}
        }

        if status.is_server_error() {
            tracing::error!(code, error = %err, "Request failed");
        }

        let api = ApiError::new(status, code, err.to_string());
        if details.is_empty() {
            api
        } else {
            api.with_details(serde_json::Value::Object(details))
        }
    }
}

/// Result type alias for API handlers.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_maps_to_422_with_code() {
        let api: ApiError = PracticaError::invalid_item_count(15).into();
        assert_eq!(api.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(api.code, "VAL_004");
        let details = api.details.unwrap();
        assert_eq!(details["item_count"], "15");
        assert!(details["suggestion"].as_str().is_some());
    }

    #[test]
    fn test_status_mapping() {
        let api: ApiError = PracticaError::learner_not_found("u_x").into();
        assert_eq!(api.status, StatusCode::NOT_FOUND);
        assert_eq!(api.details.unwrap()["resource_id"], "u_x");

        let api: ApiError = PracticaError::session_disposed().into();
        assert_eq!(api.status, StatusCode::CONFLICT);
        assert_eq!(api.code, "SES_002");

        let api: ApiError = PracticaError::database("locked").into();
        assert_eq!(api.status, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
