//! Per-request options for the plain HTTP path

use reqwest::header::{HeaderMap, CONTENT_TYPE};
use reqwest::{RequestBuilder, StatusCode, Version};
use std::time::Duration;
use url::Url;

/// Options for a single `get` call
///
/// HTTP options only apply when `render` is false; a rendered fetch goes
/// through the browser and ignores them.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// Fetch through a headless browser instead of plain HTTP
    pub render: bool,
    /// Extra request headers
    pub headers: Vec<(String, String)>,
    /// Query string parameters
    pub query: Vec<(String, String)>,
    /// Per-request timeout
    pub timeout: Option<Duration>,
    /// HTTP basic auth credentials
    pub basic_auth: Option<(String, Option<String>)>,
    /// Bearer token
    pub bearer_token: Option<String>,
}

impl RequestOptions {
    /// Options for a plain HTTP fetch
    pub fn new() -> Self {
        Self::default()
    }

    /// Options for a rendered fetch
    pub fn rendered() -> Self {
        Self {
            render: true,
            ..Default::default()
        }
    }

    /// Enable/disable rendering
    pub fn render(mut self, render: bool) -> Self {
        self.render = render;
        self
    }

    /// Add a request header
    pub fn header<K: Into<String>, V: Into<String>>(mut self, name: K, value: V) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Add a query parameter
    pub fn query<K: Into<String>, V: Into<String>>(mut self, name: K, value: V) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }

    /// Set the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Use HTTP basic auth
    pub fn basic_auth<U: Into<String>>(mut self, username: U, password: Option<String>) -> Self {
        self.basic_auth = Some((username.into(), password));
        self
    }

    /// Use a bearer token
    pub fn bearer_token<T: Into<String>>(mut self, token: T) -> Self {
        self.bearer_token = Some(token.into());
        self
    }

    /// Whether any HTTP-only option is set
    pub fn has_http_options(&self) -> bool {
        !self.headers.is_empty()
            || !self.query.is_empty()
            || self.timeout.is_some()
            || self.basic_auth.is_some()
            || self.bearer_token.is_some()
    }

    pub(crate) fn apply(&self, mut request: RequestBuilder) -> RequestBuilder {
        for (name, value) in &self.headers {
            request = request.header(name.as_str(), value.as_str());
        }
        if !self.query.is_empty() {
            request = request.query(&self.query);
        }
        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }
        if let Some((ref user, ref password)) = self.basic_auth {
            request = request.basic_auth(user, password.as_ref());
        }
        if let Some(ref token) = self.bearer_token {
            request = request.bearer_auth(token);
        }
        request
    }
}

/// Snapshot of the HTTP response a body came from
#[derive(Debug, Clone)]
pub(crate) struct HttpMeta {
    pub(crate) status: StatusCode,
    pub(crate) headers: HeaderMap,
    pub(crate) url: Url,
    pub(crate) version: Version,
    /// `charset` parameter of the `Content-Type` header
    pub(crate) charset: Option<String>,
}

impl HttpMeta {
    pub(crate) fn from_response(response: &reqwest::Response) -> Self {
        let headers = response.headers().clone();
        Self {
            status: response.status(),
            charset: charset_from_headers(&headers),
            headers,
            url: response.url().clone(),
            version: response.version(),
        }
    }
}

/// Charset label declared in `Content-Type`, if any
pub(crate) fn charset_from_headers(headers: &HeaderMap) -> Option<String> {
    let content_type = headers.get(CONTENT_TYPE)?.to_str().ok()?;
    content_type.split(';').skip(1).find_map(|param| {
        let (name, value) = param.split_once('=')?;
        if name.trim().eq_ignore_ascii_case("charset") {
            Some(value.trim().trim_matches('"').to_string())
        } else {
            None
        }
    })
}
