//! HTTP probing.
//!
//! A [`ProbeRequest`] is the static description of what a check sends; the
//! [`ProbeClient`] turns it into exactly one HTTP exchange and hands back the
//! raw [`ProbeResponse`]. Interpretation happens elsewhere.

use crate::error::{ConformanceError, ConformanceResult, ProbeError};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Method, Url};
use serde_json::Value;
use std::time::{Duration, Instant};
use tracing::debug;

/// Timeout applied to most checks.
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP method of a probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeMethod {
    Get,
    Post,
    Options,
}

impl ProbeMethod {
    fn as_reqwest(self) -> Method {
        match self {
            Self::Get => Method::GET,
            Self::Post => Method::POST,
            Self::Options => Method::OPTIONS,
        }
    }
}

impl std::fmt::Display for ProbeMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProbeMethod::Get => write!(f, "GET"),
            ProbeMethod::Post => write!(f, "POST"),
            ProbeMethod::Options => write!(f, "OPTIONS"),
        }
    }
}

/// Body sent with a probe.
#[derive(Debug, Clone, PartialEq)]
pub enum ProbeBody {
    /// No body.
    Empty,
    /// JSON body with `Content-Type: application/json`.
    Json(Value),
    /// `application/x-www-form-urlencoded` body (possibly with no fields).
    Form(Vec<(String, String)>),
}

/// Static description of one HTTP request.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeRequest {
    pub method: ProbeMethod,
    /// Path relative to the base URL; empty means the base URL itself.
    pub path: String,
    pub body: ProbeBody,
    pub headers: Vec<(String, String)>,
    pub timeout: Duration,
}

impl ProbeRequest {
    pub fn new(method: ProbeMethod, path: &str) -> Self {
        Self {
            method,
            path: path.to_string(),
            body: ProbeBody::Empty,
            headers: Vec::new(),
            timeout: DEFAULT_PROBE_TIMEOUT,
        }
    }

    pub fn get(path: &str) -> Self {
        Self::new(ProbeMethod::Get, path)
    }

    pub fn post(path: &str) -> Self {
        Self::new(ProbeMethod::Post, path)
    }

    pub fn options(path: &str) -> Self {
        Self::new(ProbeMethod::Options, path)
    }

    pub fn json(mut self, body: Value) -> Self {
        self.body = ProbeBody::Json(body);
        self
    }

    pub fn form(mut self, fields: Vec<(String, String)>) -> Self {
        self.body = ProbeBody::Form(fields);
        self
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Raw response of a completed exchange.
#[derive(Debug, Clone)]
pub struct ProbeResponse {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: String,
}

impl ProbeResponse {
    /// Response with no headers.
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }

    /// Add a header. Invalid names or values are ignored.
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        if let (Ok(name), Ok(value)) = (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            self.headers.insert(name, value);
        }
        self
    }

    /// Parse the body as JSON.
    pub fn json(&self) -> Result<Value, ProbeError> {
        serde_json::from_str(&self.body).map_err(|e| ProbeError::MalformedBody {
            reason: e.to_string(),
            body: truncate(&self.body, 200),
        })
    }

    /// Header value as text, if present and valid UTF-8.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

/// HTTP client bound to one target base URL.
#[derive(Debug, Clone)]
pub struct ProbeClient {
    client: Client,
    base_url: String,
}

impl ProbeClient {
    /// Create a client for `base_url`. Only `http` and `https` are accepted.
    pub fn new(base_url: &str) -> ConformanceResult<Self> {
        let parsed = Url::parse(base_url).map_err(|e| ConformanceError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ConformanceError::InvalidBaseUrl {
                url: base_url.to_string(),
                reason: format!("unsupported scheme '{}'", parsed.scheme()),
            });
        }

        let client = Client::builder().build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Normalized base URL (no trailing slash).
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for a probe path.
    pub fn url_for(&self, path: &str) -> String {
        let path = path.trim_start_matches('/');
        if path.is_empty() {
            self.base_url.clone()
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    /// Perform exactly one exchange. The request's timeout bounds the whole
    /// exchange, body included.
    pub async fn send(&self, request: &ProbeRequest) -> Result<ProbeResponse, ProbeError> {
        let url = self.url_for(&request.path);
        let timeout_ms = u64::try_from(request.timeout.as_millis()).unwrap_or(u64::MAX);

        let mut builder = self
            .client
            .request(request.method.as_reqwest(), &url)
            .timeout(request.timeout);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        builder = match &request.body {
            ProbeBody::Empty => builder,
            ProbeBody::Json(value) => builder.json(value),
            ProbeBody::Form(fields) => builder.form(fields),
        };

        debug!(method = %request.method, url = %url, timeout_ms, "sending probe");
        let started = Instant::now();

        let response = builder
            .send()
            .await
            .map_err(|e| ProbeError::from_reqwest(&e, timeout_ms))?;
        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body = response
            .text()
            .await
            .map_err(|e| ProbeError::from_reqwest(&e, timeout_ms))?;

        debug!(
            url = %url,
            status,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "probe response received"
        );

        Ok(ProbeResponse {
            status,
            headers,
            body,
        })
    }
}

/// Shorten `text` to at most `max` characters for diagnostics.
pub(crate) fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max).collect();
    out.push_str("...");
    out
}
