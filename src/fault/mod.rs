//! Fault model
//!
//! A [`Fault`] is the value handlers raise when a request cannot be served.
//! It carries a closed [`FaultKind`] classification, a human-readable message
//! and an optional HTTP status. Faults are created at the point of failure,
//! handed to the [`FaultResponder`](crate::exception::FaultResponder) once and
//! then dropped.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use strum_macros::{AsRefStr, Display, EnumIter};

/// Classification of a fault
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, AsRefStr, EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum FaultKind {
    /// The caller is not authenticated
    Authentication,
    /// The caller is authenticated but not allowed to perform the action
    Authorization,
    /// Generic HTTP error carrying its own status
    Http,
    /// A model or record lookup returned nothing
    ModelNotFound,
    /// No route matched the request
    RouteNotFound,
    /// Session or CSRF token did not match
    TokenMismatch,
    /// Input failed validation
    Validation,
    /// Anything not classified above
    Generic,
}

impl FaultKind {
    /// Whether faults of this kind are operational incidents worth reporting.
    ///
    /// Everything user-facing (auth, HTTP errors, missing resources, token
    /// mismatches, validation) is expected traffic and stays quiet.
    pub fn should_report(self) -> bool {
        match self {
            FaultKind::Authentication
            | FaultKind::Authorization
            | FaultKind::Http
            | FaultKind::ModelNotFound
            | FaultKind::RouteNotFound
            | FaultKind::TokenMismatch
            | FaultKind::Validation => false,
            FaultKind::Generic => true,
        }
    }

    pub fn is_not_found(self) -> bool {
        matches!(self, FaultKind::ModelNotFound | FaultKind::RouteNotFound)
    }

    /// Status used when the fault does not carry one
    pub fn default_status(self) -> StatusCode {
        match self {
            FaultKind::Authentication => StatusCode::UNAUTHORIZED,
            FaultKind::Authorization => StatusCode::FORBIDDEN,
            FaultKind::Http | FaultKind::Generic => StatusCode::INTERNAL_SERVER_ERROR,
            FaultKind::ModelNotFound | FaultKind::RouteNotFound => StatusCode::NOT_FOUND,
            // 419 "Page Expired" has no named constant
            FaultKind::TokenMismatch => {
                StatusCode::from_u16(419).unwrap_or(StatusCode::BAD_REQUEST)
            }
            FaultKind::Validation => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }
}

/// An abnormal condition raised while handling a request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct Fault {
    kind: FaultKind,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<u16>,
}

impl Fault {
    pub fn new(kind: FaultKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            status: None,
        }
    }

    pub fn authentication() -> Self {
        Self::new(FaultKind::Authentication, "Unauthenticated.")
    }

    pub fn authorization(message: impl Into<String>) -> Self {
        Self::new(FaultKind::Authorization, message)
    }

    pub fn http(status: StatusCode, message: impl Into<String>) -> Self {
        Self::new(FaultKind::Http, message).with_status(status.as_u16())
    }

    pub fn model_not_found(message: impl Into<String>) -> Self {
        Self::new(FaultKind::ModelNotFound, message)
    }

    /// Route misses carry no message of their own
    pub fn route_not_found() -> Self {
        Self::new(FaultKind::RouteNotFound, "")
    }

    pub fn token_mismatch() -> Self {
        Self::new(FaultKind::TokenMismatch, "CSRF token mismatch.")
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(FaultKind::Validation, message)
    }

    pub fn generic(message: impl Into<String>) -> Self {
        Self::new(FaultKind::Generic, message)
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    pub fn kind(&self) -> FaultKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn status(&self) -> Option<u16> {
        self.status
    }

    /// Model and route misses, plus HTTP faults raised with a 404 status
    pub fn is_not_found(&self) -> bool {
        self.kind.is_not_found()
            || (self.kind == FaultKind::Http && self.status == Some(StatusCode::NOT_FOUND.as_u16()))
    }

    pub fn should_report(&self) -> bool {
        self.kind.should_report()
    }

    /// Explicit status if it is a valid HTTP code, otherwise the kind's default
    pub fn status_code(&self) -> StatusCode {
        self.status
            .and_then(|code| StatusCode::from_u16(code).ok())
            .unwrap_or_else(|| self.kind.default_status())
    }
}

impl From<anyhow::Error> for Fault {
    fn from(err: anyhow::Error) -> Self {
        Fault::generic(format!("{:#}", err))
    }
}

#[cfg(feature = "sea-orm-db")]
impl From<sea_orm::DbErr> for Fault {
    fn from(err: sea_orm::DbErr) -> Self {
        match err {
            sea_orm::DbErr::RecordNotFound(message) => Fault::model_not_found(message),
            other => Fault::generic(format!("Database error: {}", other)),
        }
    }
}

/// Plain response that carries the fault in its extensions.
///
/// Without a [`FaultLayer`](crate::exception::FaultLayer) this is what the
/// client sees; with one, the layer picks the fault up and renders it.
impl IntoResponse for Fault {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let mut response = (status, self.message.clone()).into_response();
        response.extensions_mut().insert(self);
        response
    }
}
