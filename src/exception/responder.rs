//! Fault reporting and rendering
//!
//! [`FaultResponder`] is the application's exception handler. For every fault
//! it decides whether operations should hear about it and what the client
//! gets back:
//!
//! ```text
//! report:  reportable kind? ── no ──> suppressed
//!              │ yes
//!              ├─ log at error level
//!              └─ production? ── yes ──> notify sink (ExceptionOccurred)
//!
//! render:  production? ── no ──> authentication? ── yes ──> 401 JSON or 302 to login
//!              │ yes                    └─ no ──> default renderer
//!          not found? ── yes ──> 404 notice (fault message or fallback)
//!              │ no
//!              └──> 400 notice (generic title and description)
//! ```

use crate::common::{ErrorBody, html};
use crate::config::ResponderConfig;
use crate::error::Result;
use crate::exception::{DebugRenderer, DefaultRenderer, ExceptionFilter, RequestContext};
use crate::fault::{Fault, FaultKind};
use crate::notification::{self, ExceptionOccurred, NotificationSink};
use crate::translation::{ERROR_DESCRIPTION, ERROR_NOT_FOUND, ERROR_TITLE};
use crate::view::{NOTICE_TEMPLATE, NoticeView, ViewRenderer};
use async_trait::async_trait;
use axum::{
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use uuid::Uuid;

/// Header carrying the URL a guest was trying to reach before the login redirect
pub const INTENDED_URL_HEADER: &str = "x-intended-url";

const UNAUTHENTICATED: &str = "Unauthenticated.";

/// Outcome of [`FaultResponder::report`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reported {
    /// Expected fault kind, nothing logged or sent
    Suppressed,
    /// Logged, no notification outside production
    Logged,
    /// Logged and sent to the notification sink
    Notified(Uuid),
}

/// Decides how faults are reported and rendered
pub struct FaultResponder {
    config: ResponderConfig,
    views: ViewRenderer,
    notifier: Arc<dyn NotificationSink>,
    fallback: Arc<dyn DefaultRenderer>,
}

impl FaultResponder {
    pub fn builder(config: ResponderConfig) -> FaultResponderBuilder {
        FaultResponderBuilder::new(config)
    }

    pub fn config(&self) -> &ResponderConfig {
        &self.config
    }

    /// Log a fault and, in production, notify operations about it.
    ///
    /// Fault kinds that represent expected user-facing conditions are
    /// suppressed entirely. A failed notification is returned to the caller.
    pub async fn report(&self, fault: &Fault) -> Result<Reported> {
        if !fault.should_report() {
            tracing::debug!(kind = %fault.kind(), "fault not reported");
            return Ok(Reported::Suppressed);
        }

        tracing::error!(
            kind = %fault.kind(),
            status = ?fault.status(),
            "{}",
            fault.message()
        );

        if !self.config.environment.is_production() {
            return Ok(Reported::Logged);
        }

        let notification =
            ExceptionOccurred::new(fault, self.config.environment, &self.config.app_name);
        self.notifier.notify(&notification).await?;
        tracing::info!(incident = %notification.id, "exception notification sent");

        Ok(Reported::Notified(notification.id))
    }

    /// Render a fault into an HTTP response. Never fails.
    pub fn render(&self, request: &RequestContext, fault: &Fault) -> Response {
        if !self.config.environment.is_production() {
            return self.render_default(request, fault);
        }

        let translator = &self.config.translator;
        let mut status = StatusCode::BAD_REQUEST;
        let title = translator.trans(ERROR_TITLE);
        let mut description = translator.trans(ERROR_DESCRIPTION);

        if fault.is_not_found() {
            status = StatusCode::NOT_FOUND;
            description = if fault.message().is_empty() {
                translator.trans(ERROR_NOT_FOUND)
            } else {
                fault.message().to_string()
            };
        }

        let view = NoticeView {
            title,
            description,
            app_name: self.config.app_name.clone(),
            status: status.as_u16(),
        };

        match self.views.render(NOTICE_TEMPLATE, &view) {
            Ok(body) => html(status, body),
            Err(e) => {
                tracing::error!(error = %e, "error view failed to render, using fallback page");
                html(status, view.fallback_html())
            }
        }
    }

    /// Framework path outside production: unauthenticated callers go through
    /// [`unauthenticated`](Self::unauthenticated), everything else to the
    /// default renderer.
    fn render_default(&self, request: &RequestContext, fault: &Fault) -> Response {
        match fault.kind() {
            FaultKind::Authentication => self.unauthenticated(request),
            _ => self.fallback.render(request, fault),
        }
    }

    /// Response for a caller that is not logged in.
    ///
    /// JSON clients get a 401 body; browsers are redirected to the login
    /// route with the URL they wanted kept in [`INTENDED_URL_HEADER`].
    pub fn unauthenticated(&self, request: &RequestContext) -> Response {
        if request.expects_json {
            return ErrorBody::new(UNAUTHENTICATED).with_status(StatusCode::UNAUTHORIZED);
        }

        let mut response = StatusCode::FOUND.into_response();
        let headers = response.headers_mut();
        match HeaderValue::from_str(&self.config.login_route) {
            Ok(location) => {
                headers.insert(header::LOCATION, location);
            }
            Err(e) => {
                tracing::error!(error = %e, route = %self.config.login_route, "invalid login route");
                headers.insert(header::LOCATION, HeaderValue::from_static("/"));
            }
        }
        if let Ok(intended) = HeaderValue::from_str(&request.uri.to_string()) {
            headers.insert(INTENDED_URL_HEADER, intended);
        }
        response
    }

    /// Report, then render. A reporting failure is logged and the client
    /// still gets its response.
    pub async fn handle(&self, request: &RequestContext, fault: &Fault) -> Response {
        if let Err(e) = self.report(fault).await {
            tracing::error!(error = %e, kind = %fault.kind(), "failed to report fault");
        }
        self.render(request, fault)
    }
}

#[async_trait]
impl ExceptionFilter for FaultResponder {
    async fn catch(&self, request: &RequestContext, fault: Fault) -> Response {
        self.handle(request, &fault).await
    }
}

/// Builder for [`FaultResponder`]
///
/// Unset collaborators default to the sink chosen by
/// [`notification::sink_for`] and the [`DebugRenderer`].
pub struct FaultResponderBuilder {
    config: ResponderConfig,
    views: Option<ViewRenderer>,
    notifier: Option<Arc<dyn NotificationSink>>,
    fallback: Option<Arc<dyn DefaultRenderer>>,
}

impl FaultResponderBuilder {
    pub fn new(config: ResponderConfig) -> Self {
        Self {
            config,
            views: None,
            notifier: None,
            fallback: None,
        }
    }

    pub fn views(mut self, views: ViewRenderer) -> Self {
        self.views = Some(views);
        self
    }

    pub fn notifier(mut self, notifier: Arc<dyn NotificationSink>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn default_renderer(mut self, renderer: Arc<dyn DefaultRenderer>) -> Self {
        self.fallback = Some(renderer);
        self
    }

    pub fn build(self) -> Result<FaultResponder> {
        let views = match self.views {
            Some(views) => views,
            None => ViewRenderer::new()?,
        };
        let notifier = match self.notifier {
            Some(notifier) => notifier,
            None => notification::sink_for(&self.config)?,
        };
        let fallback = self
            .fallback
            .unwrap_or_else(|| Arc::new(DebugRenderer) as Arc<dyn DefaultRenderer>);

        tracing::info!(
            environment = %self.config.environment,
            "fault responder ready"
        );

        Ok(FaultResponder {
            config: self.config,
            views,
            notifier,
            fallback,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Environment;
    use crate::error::ResponderError;
    use crate::translation::Translator;
    use axum::http::{HeaderMap, Method, Uri};
    use std::sync::Mutex;
    use strum::IntoEnumIterator;

    #[derive(Default)]
    struct RecordingSink {
        sent: Mutex<Vec<ExceptionOccurred>>,
    }

    impl RecordingSink {
        fn count(&self) -> usize {
            self.sent.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl NotificationSink for RecordingSink {
        async fn notify(&self, notification: &ExceptionOccurred) -> Result<()> {
            self.sent.lock().unwrap().push(notification.clone());
            Ok(())
        }
    }

    struct FailingSink;

    #[async_trait]
    impl NotificationSink for FailingSink {
        async fn notify(&self, _notification: &ExceptionOccurred) -> Result<()> {
            Err(ResponderError::NotificationRejected {
                status: 500,
                message: "webhook down".to_string(),
            })
        }
    }

    #[derive(Default)]
    struct RecordingRenderer {
        calls: Mutex<Vec<FaultKind>>,
    }

    impl DefaultRenderer for RecordingRenderer {
        fn render(&self, _request: &RequestContext, fault: &Fault) -> Response {
            self.calls.lock().unwrap().push(fault.kind());
            StatusCode::IM_A_TEAPOT.into_response()
        }
    }

    fn translator() -> Translator {
        let mut translator = Translator::empty();
        translator
            .insert(ERROR_TITLE, "Oops")
            .insert(ERROR_DESCRIPTION, "Generic description")
            .insert(ERROR_NOT_FOUND, "Nothing here");
        translator
    }

    fn responder(
        environment: Environment,
    ) -> (FaultResponder, Arc<RecordingSink>, Arc<RecordingRenderer>) {
        let sink = Arc::new(RecordingSink::default());
        let renderer = Arc::new(RecordingRenderer::default());
        let config = ResponderConfig::new(environment)
            .with_app_name("Shop")
            .with_translator(translator())
            .with_login_route("/sessions/create");
        let responder = FaultResponder::builder(config)
            .notifier(sink.clone())
            .default_renderer(renderer.clone())
            .build()
            .unwrap();
        (responder, sink, renderer)
    }

    fn browser() -> RequestContext {
        let mut headers = HeaderMap::new();
        headers.insert(header::ACCEPT, HeaderValue::from_static("text/html"));
        RequestContext::new(Method::GET, Uri::from_static("/account/orders"), &headers)
    }

    fn api_client() -> RequestContext {
        let mut headers = HeaderMap::new();
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
        RequestContext::new(Method::GET, Uri::from_static("/api/orders"), &headers)
    }

    async fn body_text(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn production_notifies_only_reportable_kinds() {
        let (responder, sink, _) = responder(Environment::Production);

        for kind in FaultKind::iter() {
            let before = sink.count();
            let outcome = responder.report(&Fault::new(kind, "boom")).await.unwrap();
            let sent = sink.count() - before;

            if kind.should_report() {
                assert_eq!(sent, 1, "{kind} should notify once");
                assert!(matches!(outcome, Reported::Notified(_)));
            } else {
                assert_eq!(sent, 0, "{kind} should not notify");
                assert_eq!(outcome, Reported::Suppressed);
            }
        }
    }

    #[tokio::test]
    async fn notification_carries_the_fault() {
        let (responder, sink, _) = responder(Environment::Production);
        let outcome = responder
            .report(&Fault::generic("queue stalled").with_status(503))
            .await
            .unwrap();

        let sent = sink.sent.lock().unwrap();
        let notification = &sent[0];
        assert_eq!(outcome, Reported::Notified(notification.id));
        assert_eq!(notification.message, "queue stalled");
        assert_eq!(notification.status, Some(503));
        assert_eq!(notification.app_name, "Shop");
        assert_eq!(notification.environment, Environment::Production);
    }

    #[tokio::test]
    async fn non_production_never_notifies() {
        let (responder, sink, _) = responder(Environment::Local);
        let outcome = responder.report(&Fault::generic("boom")).await.unwrap();
        assert_eq!(outcome, Reported::Logged);
        assert_eq!(sink.count(), 0);
    }

    #[tokio::test]
    async fn notification_failure_propagates_from_report() {
        let config = ResponderConfig::new(Environment::Production);
        let responder = FaultResponder::builder(config)
            .notifier(Arc::new(FailingSink))
            .build()
            .unwrap();

        let err = responder.report(&Fault::generic("boom")).await.unwrap_err();
        assert!(matches!(err, ResponderError::NotificationRejected { status: 500, .. }));

        // handle swallows it and still answers
        let response = responder.handle(&browser(), &Fault::generic("boom")).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn not_found_without_message_uses_fallback_text() {
        let (responder, _, _) = responder(Environment::Production);
        let response = responder.render(&browser(), &Fault::model_not_found(""));

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/html; charset=utf-8"
        );
        let body = body_text(response).await;
        assert!(body.contains("<h1>Oops</h1>"));
        assert!(body.contains("<p>Nothing here</p>"));
    }

    #[tokio::test]
    async fn not_found_surfaces_its_own_message() {
        let (responder, _, _) = responder(Environment::Production);
        for fault in [
            Fault::model_not_found("No query results for model [Order] 42"),
            Fault::new(FaultKind::RouteNotFound, "No query results for model [Order] 42"),
        ] {
            let response = responder.render(&browser(), &fault);
            assert_eq!(response.status(), StatusCode::NOT_FOUND);
            assert!(body_text(response).await.contains("No query results for model [Order] 42"));
        }
    }

    #[tokio::test]
    async fn http_404_renders_not_found_page() {
        let (responder, _, _) = responder(Environment::Production);

        let response = responder.render(&browser(), &Fault::http(StatusCode::NOT_FOUND, ""));
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(body_text(response).await.contains("<p>Nothing here</p>"));

        let response = responder.render(
            &browser(),
            &Fault::http(StatusCode::NOT_FOUND, "Invoice 17 was archived"),
        );
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(body_text(response).await.contains("<p>Invoice 17 was archived</p>"));

        let response = responder.render(&browser(), &Fault::http(StatusCode::GONE, "gone"));
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn other_faults_get_generic_400_page() {
        let (responder, _, renderer) = responder(Environment::Production);
        for request in [browser(), api_client()] {
            for kind in FaultKind::iter().filter(|k| !k.is_not_found()) {
                let response = responder.render(&request, &Fault::new(kind, "internal detail"));
                assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{kind}");
                let body = body_text(response).await;
                assert!(body.contains("Generic description"));
                assert!(!body.contains("internal detail"));
            }
        }
        assert!(renderer.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn authentication_fault_in_production_gets_generic_page() {
        let (responder, sink, _) = responder(Environment::Production);
        for request in [browser(), api_client()] {
            let response = responder.handle(&request, &Fault::authentication()).await;

            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
            assert!(response.headers().get(header::LOCATION).is_none());
            assert!(body_text(response).await.contains("Generic description"));
        }
        assert_eq!(sink.count(), 0);
    }

    #[tokio::test]
    async fn validation_fault_in_production() {
        let (responder, sink, _) = responder(Environment::Production);
        let fault = Fault::validation("email is invalid");

        let response = responder.handle(&browser(), &fault).await;

        assert_eq!(sink.count(), 0);
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(body_text(response).await.contains("Generic description"));
    }

    #[tokio::test]
    async fn outside_production_defers_to_default_renderer() {
        for environment in [Environment::Local, Environment::Staging, Environment::Testing] {
            let (responder, _, renderer) = responder(environment);
            for kind in FaultKind::iter().filter(|k| *k != FaultKind::Authentication) {
                let response = responder.render(&browser(), &Fault::new(kind, "detail"));
                assert_eq!(response.status(), StatusCode::IM_A_TEAPOT);
            }
            assert_eq!(renderer.calls.lock().unwrap().len(), FaultKind::iter().count() - 1);
        }
    }

    #[tokio::test]
    async fn unauthenticated_json_request_gets_401() {
        for environment in [Environment::Local, Environment::Staging] {
            let (responder, _, renderer) = responder(environment);
            let response = responder.render(&api_client(), &Fault::authentication());
            assert!(renderer.calls.lock().unwrap().is_empty());

            assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
            assert_eq!(body_text(response).await, r#"{"error":"Unauthenticated."}"#);
        }
    }

    #[tokio::test]
    async fn unauthenticated_browser_is_redirected_to_login() {
        let (responder, sink, _) = responder(Environment::Local);
        let response = responder.handle(&browser(), &Fault::authentication()).await;

        assert_eq!(sink.count(), 0);
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(response.headers()[header::LOCATION], "/sessions/create");
        assert_eq!(response.headers()[INTENDED_URL_HEADER], "/account/orders");
    }

    #[tokio::test]
    async fn broken_template_falls_back_to_plain_page() {
        let mut views = ViewRenderer::new().unwrap();
        views.register_template(NOTICE_TEMPLATE, "{{nope}}").unwrap();
        let responder = FaultResponder::builder(ResponderConfig::new(Environment::Production))
            .views(views)
            .notifier(Arc::new(RecordingSink::default()))
            .build()
            .unwrap();

        let response = responder.render(&browser(), &Fault::model_not_found("gone"));
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(body_text(response).await.contains("<p>gone</p>"));
    }

    #[tokio::test]
    async fn exception_filter_catch_handles_fault() {
        let (responder, sink, _) = responder(Environment::Production);
        let filter: &dyn ExceptionFilter = &responder;

        let response = filter.catch(&browser(), Fault::generic("db down")).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(sink.count(), 1);
    }
}
