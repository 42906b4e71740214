//! Error types for Selestium
//!
//! This module provides the error hierarchy used across the crate, built with
//! `thiserror`. Every failure propagates to the immediate caller; nothing is
//! retried internally.

use thiserror::Error;

/// The main error type for Selestium operations
#[derive(Error, Debug)]
pub enum Error {
    /// Browser selector outside the supported set
    #[error("Unsupported browser type '{0}'. Supported types are 'firefox' and 'chrome'")]
    UnsupportedBrowser(String),

    /// Browser provisioning and control errors
    #[error("Browser error: {0}")]
    Browser(#[from] BrowserError),

    /// Navigation errors
    #[error("Navigation error: {0}")]
    Navigation(#[from] NavigationError),

    /// Plain HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] HttpError),

    /// HTML query errors
    #[error("Extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// Accessed an HTTP attribute on a response with no HTTP backing
    #[error("Response has no attribute '{0}'")]
    AttributeNotFound(&'static str),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// ChromiumOxide errors
    #[error("CDP error: {0}")]
    Cdp(String),

    /// thirtyfour/geckodriver errors
    #[error("WebDriver error: {0}")]
    WebDriver(String),
}

/// Browser lifecycle and control errors
#[derive(Error, Debug)]
pub enum BrowserError {
    /// Failed to launch browser or driver process
    #[error("Failed to launch browser: {0}")]
    LaunchFailed(String),

    /// Browser configuration error
    #[error("Invalid browser configuration: {0}")]
    ConfigError(String),

    /// The host OS could not be identified
    #[error("Unable to detect host OS: {0}")]
    HostDetection(String),

    /// No driver executable could be located
    #[error("Driver executable '{0}' not found on PATH")]
    DriverNotFound(String),

    /// Failed to read the page source back from the browser
    #[error("Failed to read page source: {0}")]
    PageSourceFailed(String),

    /// Timeout waiting for the browser or its driver
    #[error("Browser operation timed out after {0}ms")]
    Timeout(u64),
}

/// Navigation errors
#[derive(Error, Debug)]
pub enum NavigationError {
    /// Invalid URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Navigation timeout
    #[error("Navigation timed out after {0}ms")]
    Timeout(u64),

    /// Page load failed
    #[error("Page load failed: {0}")]
    LoadFailed(String),
}

/// Errors raised on the non-rendered HTTP path
#[derive(Error, Debug)]
pub enum HttpError {
    /// Server answered with a non-success status
    #[error("HTTP {status} for url {url}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Final URL of the request
        url: String,
    },

    /// Failed to build the HTTP client
    #[error("Failed to create HTTP client")]
    ClientBuild(#[source] reqwest::Error),

    /// Request timed out
    #[error("Request timed out")]
    Timeout(#[source] reqwest::Error),

    /// Failed to connect to server
    #[error("Failed to connect to server")]
    Connect(#[source] reqwest::Error),

    /// Other request error
    #[error("Request failed: {0}")]
    Request(#[source] reqwest::Error),
}

/// HTML query errors
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// Invalid selector
    #[error("Invalid selector: {0}")]
    InvalidSelector(String),
}

/// Result type alias for Selestium operations
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a CDP error from a string
    pub fn cdp<S: Into<String>>(msg: S) -> Self {
        Error::Cdp(msg.into())
    }

    /// HTTP status carried by the error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Http(HttpError::Status { status, .. }) => Some(*status),
            Error::Http(
                HttpError::Timeout(e) | HttpError::Connect(e) | HttpError::Request(e),
            ) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

impl HttpError {
    /// Classify a reqwest error
    pub fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            HttpError::Timeout(err)
        } else if err.is_connect() {
            HttpError::Connect(err)
        } else {
            HttpError::Request(err)
        }
    }
}

/// Convert chromiumoxide errors
impl From<chromiumoxide::error::CdpError> for Error {
    fn from(err: chromiumoxide::error::CdpError) -> Self {
        Error::Cdp(err.to_string())
    }
}

/// Convert thirtyfour errors
impl From<thirtyfour::error::WebDriverError> for Error {
    fn from(err: thirtyfour::error::WebDriverError) -> Self {
        Error::WebDriver(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::Browser(BrowserError::LaunchFailed("no chrome".to_string()));
        assert!(err.to_string().contains("Failed to launch browser"));
        assert!(err.to_string().contains("no chrome"));
    }

    #[test]
    fn test_unsupported_browser() {
        let err = Error::UnsupportedBrowser("safari".to_string());
        assert_eq!(
            err.to_string(),
            "Unsupported browser type 'safari'. Supported types are 'firefox' and 'chrome'"
        );
    }

    #[test]
    fn test_http_status_error() {
        let err: Error = HttpError::Status {
            status: 404,
            url: "http://example.com/missing".to_string(),
        }
        .into();
        assert!(err.to_string().contains("404"));
        assert!(err.to_string().contains("/missing"));
        assert_eq!(err.status(), Some(404));
    }

    #[test]
    fn test_attribute_not_found() {
        let err = Error::AttributeNotFound("status_code");
        assert_eq!(err.to_string(), "Response has no attribute 'status_code'");
        assert_eq!(err.status(), None);
    }

    #[test]
    fn test_driver_not_found() {
        let err = BrowserError::DriverNotFound("geckodriver".to_string());
        assert_eq!(
            err.to_string(),
            "Driver executable 'geckodriver' not found on PATH"
        );
    }

    #[test]
    fn test_extraction_error() {
        let err = ExtractionError::InvalidSelector("##".to_string());
        assert!(err.to_string().contains("Invalid selector"));
    }
}
