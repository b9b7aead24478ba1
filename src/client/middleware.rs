//! Tower middleware stamping a fixed header onto every outgoing request.
use http::{HeaderName, HeaderValue, Request};
use std::task::{Context, Poll};
use tower_layer::Layer;
use tower_service::Service;

#[derive(Clone, Debug)]
pub struct SetHeaderLayer {
    name: HeaderName,
    value: HeaderValue,
}

impl SetHeaderLayer {
    pub fn new(name: HeaderName, value: HeaderValue) -> Self {
        Self { name, value }
    }

    /// `User-Agent: <agent>`. Falls back to the crate name if `agent` is not
    /// a valid header value.
    pub fn user_agent(agent: &str) -> Self {
        let value = HeaderValue::from_str(agent)
            .unwrap_or_else(|_| HeaderValue::from_static(env!("CARGO_PKG_NAME")));
        Self::new(http::header::USER_AGENT, value)
    }

    pub fn accept_json() -> Self {
        Self::new(
            http::header::ACCEPT,
            HeaderValue::from_static("application/json"),
        )
    }
}

impl<S> Layer<S> for SetHeaderLayer {
    type Service = SetHeaderService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        SetHeaderService {
            inner,
            name: self.name.clone(),
            value: self.value.clone(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct SetHeaderService<S> {
    inner: S,
    name: HeaderName,
    value: HeaderValue,
}

impl<S, ReqBody> Service<Request<ReqBody>> for SetHeaderService<S>
where
    S: Service<Request<ReqBody>>,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<ReqBody>) -> Self::Future {
        req.headers_mut().insert(self.name.clone(), self.value.clone());
        self.inner.call(req)
    }
}
