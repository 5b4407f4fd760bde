use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

/// Minimal JSON error envelope
///
/// Serializes as `{"error": "..."}`.
///
/// # Example
/// ```
/// use faultline::common::ErrorBody;
///
/// let body = ErrorBody::new("Unauthenticated.");
/// assert_eq!(serde_json::to_string(&body).unwrap(), r#"{"error":"Unauthenticated."}"#);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }

    /// Pair the body with an HTTP status
    pub fn with_status(self, status: StatusCode) -> Response {
        (status, Json(self)).into_response()
    }
}

/// HTML page with the given status
pub fn html(status: StatusCode, body: String) -> Response {
    (
        status,
        [(
            header::CONTENT_TYPE,
            HeaderValue::from_static("text/html; charset=utf-8"),
        )],
        body,
    )
        .into_response()
}
