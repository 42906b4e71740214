//! Queryable HTML response
//!
//! [`HtmlResponse`] holds the raw page body and answers CSS selector queries
//! against it. Responses from the plain HTTP path also keep the status,
//! headers, final URL and protocol version; rendered responses have none of
//! those and report [`Error::AttributeNotFound`] when asked.

use crate::error::{Error, ExtractionError, Result};
use crate::http::HttpMeta;
use bytes::Bytes;
use encoding_rs::{Encoding, UTF_8};
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{StatusCode, Version};
use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::BTreeMap;
use url::Url;

/// An element matched by [`HtmlResponse::find`]
///
/// Owned snapshot; it does not borrow the parsed document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Element {
    /// Tag name, lowercase
    pub name: String,
    /// Concatenated descendant text
    pub text: String,
    /// Inner HTML
    pub inner_html: String,
    /// Outer HTML
    pub html: String,
    /// Attributes by name
    pub attributes: BTreeMap<String, String>,
}

impl Element {
    fn from_ref(element: ElementRef<'_>) -> Self {
        Self {
            name: element.value().name().to_string(),
            text: element.text().collect(),
            inner_html: element.inner_html(),
            html: element.html(),
            attributes: element
                .value()
                .attrs()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    /// Attribute value by name
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }
}

#[derive(Debug, Clone)]
enum Origin {
    Http(HttpMeta),
    Rendered { url: Option<String> },
}

/// HTML body plus the CSS query surface
#[derive(Debug, Clone)]
pub struct HtmlResponse {
    body: Bytes,
    origin: Origin,
}

impl HtmlResponse {
    /// Response with no HTTP backing
    pub fn new<B: Into<Bytes>>(body: B) -> Self {
        Self {
            body: body.into(),
            origin: Origin::Rendered { url: None },
        }
    }

    pub(crate) fn rendered(url: &str, html: String) -> Self {
        Self {
            body: Bytes::from(html),
            origin: Origin::Rendered {
                url: Some(url.to_string()),
            },
        }
    }

    pub(crate) fn from_http(body: Bytes, meta: HttpMeta) -> Self {
        Self {
            body,
            origin: Origin::Http(meta),
        }
    }

    /// Raw body bytes, exactly as received
    pub fn content(&self) -> &[u8] {
        &self.body
    }

    /// Body decoded as text, with invalid sequences replaced
    ///
    /// HTTP bodies are decoded with the charset from `Content-Type` (a BOM
    /// takes precedence); everything else is read as UTF-8.
    pub fn text(&self) -> Cow<'_, str> {
        match &self.origin {
            Origin::Http(meta) => {
                let encoding = meta
                    .charset
                    .as_deref()
                    .and_then(|label| Encoding::for_label(label.as_bytes()))
                    .unwrap_or(UTF_8);
                let (text, _, _) = encoding.decode(&self.body);
                text
            }
            Origin::Rendered { .. } => String::from_utf8_lossy(&self.body),
        }
    }

    /// Consume the response, returning the body
    pub fn into_content(self) -> Bytes {
        self.body
    }

    /// Parse the body into a document
    ///
    /// The body is reparsed on every call.
    pub fn html(&self) -> Html {
        Html::parse_document(&self.text())
    }

    /// All elements matching a CSS selector, in document order
    pub fn find(&self, selector: &str) -> Result<Vec<Element>> {
        let selector = parse_selector(selector)?;
        let document = self.html();
        Ok(document.select(&selector).map(Element::from_ref).collect())
    }

    /// First element matching a CSS selector
    pub fn find_first(&self, selector: &str) -> Result<Option<Element>> {
        let selector = parse_selector(selector)?;
        let document = self.html();
        Ok(document.select(&selector).next().map(Element::from_ref))
    }

    /// Whether this response came from the browser
    pub fn is_rendered(&self) -> bool {
        matches!(self.origin, Origin::Rendered { .. })
    }

    /// URL the browser was pointed at, for rendered responses
    pub fn rendered_url(&self) -> Option<&str> {
        match &self.origin {
            Origin::Rendered { url } => url.as_deref(),
            Origin::Http(_) => None,
        }
    }

    fn http(&self, attribute: &'static str) -> Result<&HttpMeta> {
        match &self.origin {
            Origin::Http(meta) => Ok(meta),
            Origin::Rendered { .. } => Err(Error::AttributeNotFound(attribute)),
        }
    }

    /// HTTP status code
    pub fn status(&self) -> Result<StatusCode> {
        Ok(self.http("status_code")?.status)
    }

    /// HTTP response headers
    pub fn headers(&self) -> Result<&HeaderMap> {
        Ok(&self.http("headers")?.headers)
    }

    /// A single response header
    pub fn header(&self, name: &str) -> Result<Option<&HeaderValue>> {
        Ok(self.headers()?.get(name))
    }

    /// Final URL after redirects
    pub fn url(&self) -> Result<&Url> {
        Ok(&self.http("url")?.url)
    }

    /// HTTP protocol version
    pub fn version(&self) -> Result<Version> {
        Ok(self.http("version")?.version)
    }
}

fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector)
        .map_err(|e| ExtractionError::InvalidSelector(format!("{}: {}", selector, e)).into())
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<html><body>
        <ul id="items">
            <li class="item" data-id="1">One</li>
            <li class="item" data-id="2">Two <b>bold</b></li>
        </ul>
        <span id="x">42</span>
    </body></html>"#;

    #[test]
    fn test_content_is_exact() {
        let body = vec![0xffu8, b'<', b'p', b'>'];
        let response = HtmlResponse::new(body.clone());
        assert_eq!(response.content(), body.as_slice());
        assert_eq!(response.text(), "\u{fffd}<p>");
    }

    #[test]
    fn test_find_by_id() {
        let response = HtmlResponse::new(PAGE);
        let found = response.find("#x").unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].text, "42");
        assert_eq!(found[0].name, "span");
        assert_eq!(found[0].attr("id"), Some("x"));
    }

    #[test]
    fn test_find_preserves_order() {
        let response = HtmlResponse::new(PAGE);
        let items = response.find("li.item").unwrap();
        let ids: Vec<_> = items.iter().filter_map(|e| e.attr("data-id")).collect();
        assert_eq!(ids, vec!["1", "2"]);
        assert_eq!(items[1].text, "Two bold");
        assert_eq!(items[1].inner_html, "Two <b>bold</b>");
    }

    #[test]
    fn test_find_no_match_is_empty() {
        let response = HtmlResponse::new(PAGE);
        assert!(response.find("table > tr").unwrap().is_empty());
        assert!(response.find_first("table").unwrap().is_none());
    }

    #[test]
    fn test_find_invalid_selector() {
        let response = HtmlResponse::new(PAGE);
        let err = response.find("li[").unwrap_err();
        assert!(matches!(
            err,
            Error::Extraction(ExtractionError::InvalidSelector(_))
        ));
    }

    #[test]
    fn test_http_body_decoded_with_declared_charset() {
        let meta = HttpMeta {
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            url: Url::parse("http://example.com/").unwrap(),
            version: Version::HTTP_11,
            charset: Some("windows-1252".to_string()),
        };
        let body = Bytes::from_static(b"<p id=\"x\">caf\xe9 \x80</p>");
        let response = HtmlResponse::from_http(body.clone(), meta);

        assert_eq!(response.content(), &body[..]);
        assert_eq!(response.find("#x").unwrap()[0].text, "caf\u{e9} \u{20ac}");
    }

    #[test]
    fn test_unknown_charset_falls_back_to_utf8() {
        let meta = HttpMeta {
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            url: Url::parse("http://example.com/").unwrap(),
            version: Version::HTTP_11,
            charset: Some("x-made-up".to_string()),
        };
        let body = Bytes::from_static("<p>caf\u{e9}</p>".as_bytes());
        let response = HtmlResponse::from_http(body, meta);
        assert_eq!(response.text(), "<p>caf\u{e9}</p>");
    }

    #[test]
    fn test_rendered_has_no_http_attributes() {
        let response = HtmlResponse::rendered("http://example.com/", PAGE.to_string());
        assert!(response.is_rendered());
        assert_eq!(response.rendered_url(), Some("http://example.com/"));
        assert!(matches!(
            response.status(),
            Err(Error::AttributeNotFound("status_code"))
        ));
        assert!(matches!(
            response.headers(),
            Err(Error::AttributeNotFound("headers"))
        ));
        assert!(matches!(response.url(), Err(Error::AttributeNotFound("url"))));
        assert!(matches!(
            response.version(),
            Err(Error::AttributeNotFound("version"))
        ));
    }

    #[test]
    fn test_http_attributes_forwarded() {
        let mut headers = HeaderMap::new();
        headers.insert("content-type", HeaderValue::from_static("text/html"));
        let meta = HttpMeta {
            status: StatusCode::OK,
            headers,
            url: Url::parse("http://example.com/page").unwrap(),
            version: Version::HTTP_11,
            charset: None,
        };
        let response = HtmlResponse::from_http(Bytes::from_static(PAGE.as_bytes()), meta);

        assert!(!response.is_rendered());
        assert_eq!(response.rendered_url(), None);
        assert_eq!(response.status().unwrap(), StatusCode::OK);
        assert_eq!(
            response.header("content-type").unwrap().unwrap(),
            "text/html"
        );
        assert_eq!(response.url().unwrap().path(), "/page");
        assert_eq!(response.version().unwrap(), Version::HTTP_11);
    }
}
