use crate::fault::Fault;
use crate::guard::Guard;
use axum::{
    body::Body,
    http::Request,
    response::{IntoResponse, Response},
};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tower::{Layer, Service};

/// Tower Layer for Guards
///
/// A denied request never reaches the inner service; the guard's error is
/// turned into a [`Fault`] response for the fault layer to render.
#[derive(Clone)]
pub struct GuardLayer {
    guards: Arc<Vec<Box<dyn Guard>>>,
}

impl GuardLayer {
    pub fn new(guards: Vec<Box<dyn Guard>>) -> Self {
        Self {
            guards: Arc::new(guards),
        }
    }
}

impl<S> Layer<S> for GuardLayer {
    type Service = GuardMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        GuardMiddleware {
            inner,
            guards: self.guards.clone(),
        }
    }
}

#[derive(Clone)]
pub struct GuardMiddleware<S> {
    inner: S,
    guards: Arc<Vec<Box<dyn Guard>>>,
}

impl<S> Service<Request<Body>> for GuardMiddleware<S>
where
    S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    S::Future: Send + 'static,
    S::Error: Send + 'static,
{
    type Response = Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let guards = self.guards.clone();
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);

        Box::pin(async move {
            let (parts, body) = req.into_parts();
            for guard in guards.iter() {
                if let Err(e) = guard.can_activate(&parts).await {
                    tracing::debug!(uri = %parts.uri, reason = %e, "request denied by guard");
                    return Ok(Fault::from(e).into_response());
                }
            }
            inner.call(Request::from_parts(parts, body)).await
        })
    }
}
