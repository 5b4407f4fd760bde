use crate::fault::Fault;
use async_trait::async_trait;
use axum::http::{header, request::Parts};

mod layer;

pub use layer::{GuardLayer, GuardMiddleware};

/// Standard Result type for Guard
/// Ok(()) means allowed
/// Err(GuardError) means denied
pub type GuardResult = Result<(), GuardError>;

#[derive(Debug, thiserror::Error)]
pub enum GuardError {
    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),
}

impl From<GuardError> for Fault {
    fn from(err: GuardError) -> Self {
        match err {
            GuardError::Unauthorized(_) => Fault::authentication(),
            GuardError::Forbidden(message) => Fault::authorization(message),
        }
    }
}

/// The Guard trait
/// Implement this to protect routes. Guards see the request head only.
#[async_trait]
pub trait Guard: Send + Sync + 'static {
    async fn can_activate(&self, request: &Parts) -> GuardResult;
}

/// Lets requests through when they carry `Authorization: Bearer <token>`
/// with the expected token
pub struct BearerGuard {
    token: String,
}

impl BearerGuard {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

#[async_trait]
impl Guard for BearerGuard {
    async fn can_activate(&self, request: &Parts) -> GuardResult {
        let presented = request
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or_else(|| GuardError::Unauthorized("missing bearer token".to_string()))?;

        if presented != self.token {
            return Err(GuardError::Unauthorized("invalid bearer token".to_string()));
        }
        Ok(())
    }
}
