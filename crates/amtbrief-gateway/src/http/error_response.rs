//! Translates `ApiError` into the JSON error shape and HTTP status:
//! `{error_kind, message, retriable}`. One call site so every handler's
//! error path looks the same.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use amtbrief_core::ApiError;

#[derive(Serialize)]
struct ErrorBody {
    error_kind: &'static str,
    message: String,
    retriable: bool,
}

/// Wraps an `ApiError` so handlers can return it directly as an
/// `axum::response::IntoResponse`.
pub struct ApiErrorResponse(pub ApiError);

impl From<ApiError> for ApiErrorResponse {
    fn from(e: ApiError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        let err = self.0;
        let status = StatusCode::from_u16(err.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        // Sensitive details are never returned — the message is the
        // templated `Display` text for the variant, never an upstream body.
        let body = ErrorBody {
            error_kind: err.code(),
            message: err.to_string(),
            retriable: err.retriable(),
        };
        (status, Json(body)).into_response()
    }
}
