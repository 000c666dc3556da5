//! Helpers for building the JSON response envelopes used across the API.
//!
//! Successful responses wrap their payload in `{"data": ...}` with an
//! optional `"message"` field, errors are `{"error": "..."}`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::json;

/// A successful response body wrapping `data`.
#[derive(Debug, Serialize)]
pub(crate) struct DataBody<T: Serialize> {
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
}

/// Respond with `{"data": ...}` and the given status code.
pub(crate) fn data_response<T: Serialize>(status_code: StatusCode, data: T) -> Response {
    (
        status_code,
        Json(DataBody {
            data,
            message: None,
        }),
    )
        .into_response()
}

/// Respond with `{"data": ..., "message": ...}` and the given status code.
pub(crate) fn data_message_response<T: Serialize>(
    status_code: StatusCode,
    data: T,
    message: &'static str,
) -> Response {
    (
        status_code,
        Json(DataBody {
            data,
            message: Some(message),
        }),
    )
        .into_response()
}

/// Respond with `{"message": ...}` and the given status code.
pub(crate) fn message_response(status_code: StatusCode, message: &'static str) -> Response {
    (status_code, Json(json!({ "message": message }))).into_response()
}

/// Respond with `{"error": ...}` and the given status code.
pub(crate) fn error_body(status_code: StatusCode, error_message: &str) -> Response {
    (status_code, Json(json!({ "error": error_message }))).into_response()
}
