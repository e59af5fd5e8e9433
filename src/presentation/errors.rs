//! Gate error to HTTP response mapping

use axum::Json;
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde_json::json;

use super::models::ErrorResponse;
use tollgate_core::application::errors::GateError;

/// Rejection produced by the gating middleware and handlers
#[derive(Debug)]
pub struct GateRejection(pub GateError);

impl From<GateError> for GateRejection {
    fn from(error: GateError) -> Self {
        Self(error)
    }
}

impl GateRejection {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            error if error.is_authentication_failure() => StatusCode::UNAUTHORIZED,
            GateError::RoleForbidden => StatusCode::FORBIDDEN,
            GateError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            GateError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for GateRejection {
    fn into_response(self) -> Response {
        let status = self.status();
        let error = self.0;

        if status.is_server_error() {
            tracing::warn!(
                error = %error,
                http_status = %status,
                error_code = error.code(),
                "Gate rejected request"
            );
        } else {
            tracing::debug!(
                http_status = %status,
                error_code = error.code(),
                "Gate rejected request"
            );
        }

        let mut body = ErrorResponse::new(error.code(), error.public_message());
        match &error {
            GateError::RateLimited { retry_after_secs } => {
                body = body.with_details(json!({ "retry_after_secs": retry_after_secs }));
            }
            GateError::WrongCredentialKind { expected, actual } => {
                body = body.with_details(json!({ "expected": expected, "actual": actual }));
            }
            _ => {}
        }

        let mut response = (status, Json(body)).into_response();
        let headers = response.headers_mut();
        if status == StatusCode::UNAUTHORIZED {
            headers.insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        if let GateError::RateLimited { retry_after_secs } = error {
            headers.insert(header::RETRY_AFTER, HeaderValue::from(retry_after_secs));
        }
        response
    }
}
