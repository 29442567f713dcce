//! Request logging middleware

use axum::{body::Body, extract::MatchedPath};
use http::{Request, Response};
use std::{
    fmt::Display,
    future::Future,
    pin::Pin,
    task::{Context, Poll},
    time::Instant,
};
use tower::Layer;

/// Layer that logs one line per completed request.
#[derive(Clone, Default)]
pub struct AccessLogLayer;

impl<Service> Layer<Service> for AccessLogLayer
where
    Service: Send + Clone,
{
    type Service = AccessLogService<Service>;

    fn layer(&self, next: Service) -> Self::Service {
        AccessLogService { next }
    }
}

#[derive(Clone)]
pub struct AccessLogService<Service> {
    next: Service,
}

impl<Service, ReqBody> tower::Service<Request<ReqBody>> for AccessLogService<Service>
where
    Service: tower::Service<Request<ReqBody>, Response = Response<Body>> + Send + Clone + 'static,
    Service::Future: Send,
    Service::Error: Display + 'static,
    ReqBody: http_body::Body + Send + 'static,
{
    type Response = Response<Body>;
    type Error = Service::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Response<Body>, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.next.poll_ready(cx)
    }

    fn call(&mut self, req: Request<ReqBody>) -> Self::Future {
        let path = req
            .extensions()
            .get::<MatchedPath>()
            .map(|matched_path| matched_path.as_str().to_owned())
            .unwrap_or_else(|| req.uri().path().to_owned());

        let method = req.method().clone();
        let started = Instant::now();

        let mut next = self.next.clone();

        Box::pin(async move {
            let result = next.call(req).await;
            let elapsed = started.elapsed();

            match &result {
                Ok(response) => {
                    let status = response.status();

                    if status.is_server_error() {
                        log::warn!("{method} {path} {} in {elapsed:.2?}", status.as_u16());
                    } else {
                        log::info!("{method} {path} {} in {elapsed:.2?}", status.as_u16());
                    }
                }
                Err(e) => log::error!("{method} {path} failed after {elapsed:.2?}: {e}"),
            }

            result
        })
    }
}
