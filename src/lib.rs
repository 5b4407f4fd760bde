//! # Faultline
//!
//! Production fault reporting and error rendering for axum applications.
//!
//! Handlers return `Result<T, Fault>`. A [`FaultLayer`] in front of the router
//! picks up every fault and hands it to the [`FaultResponder`], which
//!
//! - **reports** it: expected, user-facing faults (authentication,
//!   authorization, HTTP errors, missing resources, token mismatches,
//!   validation) stay quiet; everything else is logged and, in production,
//!   sent to Slack as an `ExceptionOccurred` notification,
//! - **renders** it: in production a translated error page (404 for missing
//!   resources, 400 otherwise); elsewhere the detailed default renderer;
//!   unauthenticated callers get a 401 JSON body or a redirect to login.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use faultline::prelude::*;
//! use axum::routing::get;
//!
//! async fn show_order(Path(id): Path<u64>) -> Result<String, Fault> {
//!     if id == 0 {
//!         return Err(Fault::model_not_found(""));
//!     }
//!     Ok(format!("order {}", id))
//! }
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ResponderConfig::from_config(&ConfigService::new())?;
//!     let responder = Arc::new(FaultResponder::builder(config).build()?);
//!
//!     let router = Router::new()
//!         .route("/orders/{id}", get(show_order))
//!         .fallback(route_not_found)
//!         .layer(FaultLayer::new(responder));
//!
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
//!     axum::serve(listener, router).await?;
//!     Ok(())
//! }
//! ```

pub mod common;
pub mod config;
pub mod error;
pub mod exception;
pub mod fault;
pub mod guard;
pub mod notification;
pub mod translation;
pub mod view;

// Re-export core types
pub use config::{ConfigService, Environment, ResponderConfig};
pub use error::{ResponderError, Result};
pub use exception::{
    DefaultRenderer, ExceptionFilter, FaultLayer, FaultResponder, Reported, RequestContext,
    route_not_found,
};
pub use fault::{Fault, FaultKind};
pub use notification::{ExceptionOccurred, NotificationSink};

// Re-export commonly used types from dependencies
pub use async_trait::async_trait;
pub use axum;

/// Prelude module for convenient imports
///
/// ```
/// use faultline::prelude::*;
/// ```
pub mod prelude {
    pub use crate::common::ErrorBody;
    pub use crate::config::{ConfigService, Environment, ResponderConfig};
    pub use crate::error::ResponderError;
    pub use crate::exception::{
        DebugRenderer, DefaultRenderer, ExceptionFilter, FaultLayer, FaultResponder, Reported,
        RequestContext, route_not_found,
    };
    pub use crate::fault::{Fault, FaultKind};
    pub use crate::guard::{BearerGuard, Guard, GuardError, GuardLayer, GuardResult};
    pub use crate::notification::{
        ExceptionOccurred, LogNotifier, NotificationSink, SlackNotifier,
    };
    pub use crate::translation::Translator;
    pub use crate::view::ViewRenderer;
    pub use async_trait::async_trait;
    pub use axum::{
        Json, Router,
        extract::{Path, Query, State},
        http::StatusCode,
        response::{IntoResponse, Response},
    };
    pub use std::sync::Arc;
}
