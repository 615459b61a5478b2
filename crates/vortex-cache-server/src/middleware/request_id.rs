//! Identificador de peticion.
//!
//! Cada peticion recibe un [`RequestId`]: el `X-Request-Id` entrante si es
//! texto visible, o un UUID v7 nuevo. Se guarda como extension de la peticion
//! (la leen el span de logging y los handlers de cache) y se devuelve en la
//! respuesta.

use std::fmt;
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::{
    body::Body,
    http::{HeaderName, HeaderValue, Request, Response},
};
use tower::{Layer, Service};
use uuid::Uuid;

pub static REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

/// Identificador de la peticion en curso.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestId(Arc<str>);

impl RequestId {
    /// Genera un identificador nuevo, ordenable por tiempo.
    pub fn generate() -> Self {
        Self(Uuid::now_v7().to_string().into())
    }

    /// Reutiliza el header entrante si es valido; si no, genera uno.
    fn from_request(request: &Request<Body>) -> (Self, HeaderValue) {
        let incoming = request
            .headers()
            .get(&REQUEST_ID_HEADER)
            .filter(|value| !value.is_empty())
            .and_then(|value| Some((value.to_str().ok()?, value)));

        match incoming {
            Some((text, value)) => (Self(text.into()), value.clone()),
            None => {
                let id = Self::generate();
                // un UUID siempre es un header valido
                let value = HeaderValue::from_str(id.as_str())
                    .unwrap_or_else(|_| HeaderValue::from_static("unknown"));
                (id, value)
            }
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Identificador de la peticion, o `"unknown"` si no paso por el layer.
    pub fn of<B>(request: &Request<B>) -> &str {
        request
            .extensions()
            .get::<RequestId>()
            .map_or("unknown", RequestId::as_str)
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Layer que asigna un [`RequestId`] a cada peticion.
#[derive(Clone, Default)]
pub struct RequestIdLayer;

impl<S> Layer<S> for RequestIdLayer {
    type Service = RequestIdMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RequestIdMiddleware { inner }
    }
}

#[derive(Clone)]
pub struct RequestIdMiddleware<S> {
    inner: S,
}

impl<S> Service<Request<Body>> for RequestIdMiddleware<S>
where
    S: Service<Request<Body>, Response = Response<Body>> + Clone + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut request: Request<Body>) -> Self::Future {
        let (request_id, header) = RequestId::from_request(&request);

        request
            .headers_mut()
            .insert(REQUEST_ID_HEADER.clone(), header.clone());
        request.extensions_mut().insert(request_id);

        let mut inner = self.inner.clone();

        Box::pin(async move {
            let mut response = inner.call(request).await?;
            response
                .headers_mut()
                .insert(REQUEST_ID_HEADER.clone(), header);
            Ok(response)
        })
    }
}
