// One blocking HTTP round trip per call. `Transport` is the seam between the
// catalog clients and the network; `HttpTransport` is the reqwest-backed one.
//
// Requests carry raw path segments below the base URL. They are escaped
// by `Url::path_segments_mut` when the URL is resolved.

use crate::error::{CatalogError, Result};
use reqwest::blocking::Client;
use reqwest::header::HeaderMap;
use reqwest::{Method, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Parse a catalog base URL, rejecting values that cannot carry a path.
pub fn parse_base_url(base_url: &str) -> Result<Url> {
    let url = Url::parse(base_url)
        .map_err(|e| CatalogError::InvalidConfig(format!("invalid base URL {base_url:?}: {e}")))?;
    if url.cannot_be_a_base() {
        return Err(CatalogError::InvalidConfig(format!(
            "base URL {base_url:?} cannot carry a path"
        )));
    }
    Ok(url)
}

/// Append `segments` to the path of `base`, escaping each one.
pub fn join_segments(base: &Url, segments: &[String]) -> Result<Url> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| CatalogError::InvalidConfig(format!("base URL {base} cannot carry a path")))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// A request relative to the catalog base URL.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    /// Unescaped path segments below the base URL.
    pub segments: Vec<String>,
    pub headers: HeaderMap,
    pub body: Option<Value>,
}

impl ApiRequest {
    pub fn get(segments: &[&str]) -> Self {
        ApiRequest {
            method: Method::GET,
            segments: segments.iter().map(|s| s.to_string()).collect(),
            headers: HeaderMap::new(),
            body: None,
        }
    }

    pub fn post(segments: &[&str], body: Value) -> Self {
        ApiRequest {
            method: Method::POST,
            segments: segments.iter().map(|s| s.to_string()).collect(),
            headers: HeaderMap::new(),
            body: Some(body),
        }
    }

    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers.extend(headers);
        self
    }

    /// Escaped path relative to the base URL, e.g. `/proposals/a%2Fb`.
    pub fn path(&self) -> String {
        Url::parse("http://catalog.invalid/")
            .ok()
            .and_then(|base| join_segments(&base, &self.segments).ok())
            .map(|url| url.path().to_string())
            .unwrap_or_default()
    }
}

/// Status and raw body of a response.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub body: String,
}

impl ApiResponse {
    pub fn new(status: StatusCode, body: impl Into<String>) -> Self {
        ApiResponse {
            status,
            body: body.into(),
        }
    }

    pub fn json<T: DeserializeOwned>(&self) -> serde_json::Result<T> {
        serde_json::from_str(&self.body)
    }

    /// Body for error reports: compact JSON when it parses, raw text otherwise.
    pub fn message(&self) -> String {
        match serde_json::from_str::<Value>(&self.body) {
            Ok(v) => v.to_string(),
            Err(_) => self.body.trim().to_string(),
        }
    }
}

pub trait Transport {
    fn send(&self, request: ApiRequest) -> Result<ApiResponse>;

    /// Base URL the request paths are resolved against, for log lines.
    fn base_url(&self) -> &str;
}

/// Blocking reqwest client bound to one catalog base URL.
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
    base: Url,
    base_url: String,
}

impl HttpTransport {
    pub fn new(base_url: &str) -> Result<Self> {
        let base_url = base_url.trim_end_matches('/');
        let base = parse_base_url(base_url)?;
        let client = Client::builder().build()?;
        Ok(HttpTransport {
            client,
            base,
            base_url: base_url.to_string(),
        })
    }
}

impl Transport for HttpTransport {
    fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
        let url = join_segments(&self.base, &request.segments)?;
        tracing::debug!("{} {}", request.method, url);
        let mut req = self
            .client
            .request(request.method, url)
            .headers(request.headers);
        if let Some(body) = &request.body {
            req = req.json(body);
        }
        let res = req.send()?;
        let status = res.status();
        let body = res.text()?;
        Ok(ApiResponse { status, body })
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }
}
