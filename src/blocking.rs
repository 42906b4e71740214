//! Blocking facade over [`crate::Session`]
//!
//! Every call blocks the current thread until the underlying HTTP request or
//! browser command completes. Do not use from inside an async runtime.
//! Dropping the session shuts down a running driver.

use crate::browser::{BrowserDriver, BrowserKind};
use crate::error::Result;
use crate::http::RequestOptions;
use crate::response::HtmlResponse;
use tokio::runtime::{Builder, Runtime};
use tracing::warn;

/// Blocking HTTP + browser fetch session
#[derive(Debug)]
pub struct Session {
    inner: crate::Session,
    runtime: Runtime,
}

impl Session {
    /// Create a session for a browser selector (`"firefox"` or `"chrome"`, any case)
    pub fn new(browser: &str) -> Result<Self> {
        Self::from_session(crate::Session::new(browser)?)
    }

    /// Create a session for a browser family
    pub fn with_kind(browser: BrowserKind) -> Result<Self> {
        Self::from_session(crate::Session::with_kind(browser)?)
    }

    /// Wrap a configured async session
    pub fn from_session(inner: crate::Session) -> Result<Self> {
        // One worker keeps the CDP handler task running between calls
        let runtime = Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()?;
        Ok(Self { inner, runtime })
    }

    /// Browser family used for rendering
    pub fn browser(&self) -> BrowserKind {
        self.inner.browser()
    }

    /// Whether a browser driver is currently running
    pub fn is_driver_active(&self) -> bool {
        self.inner.is_driver_active()
    }

    /// Plain HTTP GET
    pub fn get(&mut self, url: &str) -> Result<HtmlResponse> {
        self.runtime.block_on(self.inner.get(url))
    }

    /// Rendered GET through the browser
    pub fn render(&mut self, url: &str) -> Result<HtmlResponse> {
        self.runtime.block_on(self.inner.render(url))
    }

    /// GET with options; `options.render` selects the browser path
    pub fn get_with(&mut self, url: &str, options: RequestOptions) -> Result<HtmlResponse> {
        self.runtime.block_on(self.inner.get_with(url, options))
    }

    /// The live browser driver, starting one if none is running
    #[doc(alias = "browser_controller")]
    pub fn controller(&mut self) -> Result<BlockingController<'_>> {
        let driver = self.runtime.block_on(self.inner.controller())?;
        Ok(BlockingController {
            runtime: &self.runtime,
            driver,
        })
    }

    /// Shut down the browser driver, if one is running
    pub fn close(&mut self) -> Result<()> {
        self.runtime.block_on(self.inner.close())
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if self.inner.is_driver_active() {
            if let Err(e) = self.runtime.block_on(self.inner.close()) {
                warn!("Failed to shut down browser driver: {}", e);
            }
        }
    }
}

/// Blocking access to a session's live driver
pub struct BlockingController<'a> {
    runtime: &'a Runtime,
    driver: &'a mut dyn BrowserDriver,
}

impl BlockingController<'_> {
    /// Browser family behind this driver
    pub fn kind(&self) -> BrowserKind {
        self.driver.kind()
    }

    /// Navigate and wait for the page to load
    pub fn navigate(&mut self, url: &str) -> Result<()> {
        self.runtime.block_on(self.driver.navigate(url))
    }

    /// Serialized DOM of the current page
    pub fn page_source(&mut self) -> Result<String> {
        self.runtime.block_on(self.driver.page_source())
    }

    /// URL of the current page
    pub fn current_url(&mut self) -> Result<String> {
        self.runtime.block_on(self.driver.current_url())
    }

    /// The async driver, for operations not wrapped here
    pub fn driver(&mut self) -> &mut dyn BrowserDriver {
        &mut *self.driver
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_blocking_session_new() {
        let session = Session::new("Chrome").unwrap();
        assert_eq!(session.browser(), BrowserKind::Chrome);
        assert!(!session.is_driver_active());
    }

    #[test]
    fn test_blocking_session_unsupported() {
        assert!(matches!(
            Session::new("opera"),
            Err(Error::UnsupportedBrowser(_))
        ));
    }

    #[test]
    fn test_blocking_invalid_url() {
        let mut session = Session::new("firefox").unwrap();
        assert!(matches!(
            session.get("not a url"),
            Err(Error::Navigation(_))
        ));
        session.close().unwrap();
    }
}
