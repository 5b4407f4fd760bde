use crate::exception::{DefaultRenderer, RequestContext};
use crate::fault::Fault;
use axum::{
    Json,
    response::{IntoResponse, Response},
};
use serde_json::json;

/// A default renderer that exposes full fault detail
///
/// Used outside production, where developers want to see what went wrong.
#[derive(Clone, Default)]
pub struct DebugRenderer;

impl DefaultRenderer for DebugRenderer {
    fn render(&self, request: &RequestContext, fault: &Fault) -> Response {
        let status = fault.status_code();

        tracing::debug!(
            kind = %fault.kind(),
            status = status.as_u16(),
            uri = %request.uri,
            "rendering fault with debug detail"
        );

        (
            status,
            Json(json!({
                "statusCode": status.as_u16(),
                "kind": fault.kind(),
                "message": fault.message(),
                "method": request.method.as_str(),
                "path": request.uri.path(),
                "timestamp": chrono::Utc::now().to_rfc3339(),
            })),
        )
            .into_response()
    }
}
