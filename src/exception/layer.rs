use crate::exception::{FaultResponder, RequestContext};
use crate::fault::Fault;
use axum::{body::Body, http::Request, response::Response};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tower::{Layer, Service};

/// Tower Layer that hands faults raised by handlers to a [`FaultResponder`]
///
/// Handlers return `Result<T, Fault>`; the fault travels back in the
/// response extensions and is reported and rendered here.
#[derive(Clone)]
pub struct FaultLayer {
    responder: Arc<FaultResponder>,
}

impl FaultLayer {
    pub fn new(responder: Arc<FaultResponder>) -> Self {
        Self { responder }
    }
}

impl<S> Layer<S> for FaultLayer {
    type Service = FaultMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        FaultMiddleware {
            inner,
            responder: self.responder.clone(),
        }
    }
}

#[derive(Clone)]
pub struct FaultMiddleware<S> {
    inner: S,
    responder: Arc<FaultResponder>,
}

impl<S> Service<Request<Body>> for FaultMiddleware<S>
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

    fn call(&mut self, request: Request<Body>) -> Self::Future {
        // The request is consumed by the inner service, so capture what the
        // responder needs up front.
        let context = RequestContext::from_request(&request);
        let responder = self.responder.clone();

        // Keep the service that was driven to readiness, leave a fresh clone behind
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);

        Box::pin(async move {
            let mut response = inner.call(request).await?;
            match response.extensions_mut().remove::<Fault>() {
                Some(fault) => Ok(responder.handle(&context, &fault).await),
                None => Ok(response),
            }
        })
    }
}
