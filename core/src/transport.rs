//! Executes `HttpRequest` values against the network.
//!
//! The session is generic over `Transport` so tests can script responses and
//! embedders can bring their own HTTP stack. `ReqwestTransport` is the stock
//! implementation. It returns every status as data, because interpreting
//! status codes is the parser's job.

use async_trait::async_trait;
use reqwest::Method;
use tracing::debug;
use url::Url;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError>;
}

/// `reqwest`-backed transport.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    http: reqwest::Client,
    origin: Option<Url>,
}

impl ReqwestTransport {
    /// `origin` is prepended to request paths that are not absolute URLs,
    /// such as the default `/api` base.
    pub fn new(origin: Option<Url>) -> Self {
        Self::with_client(reqwest::Client::new(), origin)
    }

    pub fn with_client(http: reqwest::Client, origin: Option<Url>) -> Self {
        Self { http, origin }
    }

    fn resolve(&self, path: &str) -> Result<Url, ApiError> {
        if let Ok(url) = Url::parse(path) {
            return Ok(url);
        }
        let origin = self
            .origin
            .as_ref()
            .ok_or_else(|| ApiError::Transport(format!("relative path {path} with no origin configured")))?;
        origin
            .join(path)
            .map_err(|e| ApiError::Transport(format!("invalid request path {path}: {e}")))
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        let url = self.resolve(&request.path)?;
        debug!(method = %request.method, %url, "sending request");

        let mut builder = self.http.request(method(request.method), url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(k, v)| v.to_str().ok().map(|v| (k.as_str().to_string(), v.to_string())))
            .collect();
        let body = response.text().await?;
        debug!(status, "received response");

        Ok(HttpResponse { status, headers, body })
    }
}

fn method(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
        HttpMethod::Put => Method::PUT,
        HttpMethod::Delete => Method::DELETE,
    }
}
