use crate::fault::Fault;
use async_trait::async_trait;
use axum::{
    http::{HeaderMap, Method, Request, Uri, header},
    response::Response,
};

pub mod http;
mod layer;
mod responder;

pub use http::DebugRenderer;
pub use layer::{FaultLayer, FaultMiddleware};
pub use responder::{FaultResponder, FaultResponderBuilder, Reported};

/// What the responder needs to know about the request that failed
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub method: Method,
    pub uri: Uri,
    pub expects_json: bool,
}

impl RequestContext {
    pub fn new(method: Method, uri: Uri, headers: &HeaderMap) -> Self {
        Self {
            method,
            uri,
            expects_json: expects_json(headers),
        }
    }

    pub fn from_request<B>(request: &Request<B>) -> Self {
        Self::new(
            request.method().clone(),
            request.uri().clone(),
            request.headers(),
        )
    }
}

/// Whether the client wants a JSON answer.
///
/// True for AJAX requests (not PJAX) that accept anything, or when the first
/// `Accept` entry names a JSON media type.
pub fn expects_json(headers: &HeaderMap) -> bool {
    let accept = first_accept(headers);

    let ajax = headers
        .get("x-requested-with")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.eq_ignore_ascii_case("XMLHttpRequest"));
    let pjax = headers.contains_key("x-pjax");
    let accepts_any = matches!(accept.as_deref(), None | Some("*/*") | Some("*"));

    let wants_json = accept
        .as_deref()
        .is_some_and(|media| media.contains("/json") || media.contains("+json"));

    (ajax && !pjax && accepts_any) || wants_json
}

fn first_accept(headers: &HeaderMap) -> Option<String> {
    let raw = headers.get(header::ACCEPT)?.to_str().ok()?;
    let first = raw.split(',').next()?;
    let media = first.split(';').next()?.trim().to_ascii_lowercase();
    (!media.is_empty()).then_some(media)
}

/// Framework rendering used outside production
pub trait DefaultRenderer: Send + Sync + 'static {
    fn render(&self, request: &RequestContext, fault: &Fault) -> Response;
}

/// The ExceptionFilter trait
///
/// Filters handle faults raised during request processing.
/// They must return a valid Response.
#[async_trait]
pub trait ExceptionFilter: Send + Sync + 'static {
    /// Catch a fault and return a response
    async fn catch(&self, request: &RequestContext, fault: Fault) -> Response;
}

/// Router fallback that turns unmatched routes into a route-miss fault
pub async fn route_not_found() -> Fault {
    Fault::route_not_found()
}
