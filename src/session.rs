//! Unified fetch session
//!
//! A [`Session`] fetches pages either over plain HTTP or through a headless
//! browser, and returns both as an [`HtmlResponse`].
//!
//! The session owns at most one browser driver at a time. A rendered fetch
//! takes the driver (provisioning one if needed), reads the page, and always
//! shuts the driver down before returning, so every render starts a fresh
//! browser. [`Session::controller`] hands out the driver for direct use and
//! keeps it alive until the next render or [`Session::close`].

use crate::browser::{
    provisioner_for, BrowserDriver, BrowserKind, DriverConfig, DriverProvisioner, UrlValidator,
};
use crate::error::{BrowserError, HttpError, Result};
use crate::http::{HttpMeta, RequestOptions};
use crate::response::HtmlResponse;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// HTTP + browser fetch session
pub struct Session {
    browser: BrowserKind,
    provisioner: Box<dyn DriverProvisioner>,
    driver: Option<Box<dyn BrowserDriver>>,
    client: reqwest::Client,
}

impl Session {
    /// Create a session for a browser selector (`"firefox"` or `"chrome"`, any case)
    pub fn new(browser: &str) -> Result<Self> {
        Self::builder().browser(browser.parse()?).build()
    }

    /// Create a session for a browser family
    pub fn with_kind(browser: BrowserKind) -> Result<Self> {
        Self::builder().browser(browser).build()
    }

    /// Create a session builder
    pub fn builder() -> SessionBuilder {
        SessionBuilder::default()
    }

    /// Browser family used for rendering
    pub fn browser(&self) -> BrowserKind {
        self.browser
    }

    /// Shared HTTP client
    pub fn http_client(&self) -> &reqwest::Client {
        &self.client
    }

    /// Whether a browser driver is currently running
    pub fn is_driver_active(&self) -> bool {
        self.driver.is_some()
    }

    /// Plain HTTP GET
    pub async fn get(&mut self, url: &str) -> Result<HtmlResponse> {
        self.get_with(url, RequestOptions::default()).await
    }

    /// Rendered GET through the browser
    pub async fn render(&mut self, url: &str) -> Result<HtmlResponse> {
        self.get_with(url, RequestOptions::rendered()).await
    }

    /// GET with options; `options.render` selects the browser path
    #[instrument(skip(self, options), fields(render = options.render))]
    pub async fn get_with(&mut self, url: &str, options: RequestOptions) -> Result<HtmlResponse> {
        if options.render {
            if options.has_http_options() {
                debug!("Ignoring HTTP options for rendered fetch");
            }
            self.render_page(url).await
        } else {
            fetch_http(&self.client, url, &options).await
        }
    }

    /// The live browser driver, starting one if none is running
    ///
    /// The driver stays alive until the next rendered fetch or [`Session::close`].
    #[doc(alias = "browser_controller")]
    pub async fn controller(&mut self) -> Result<&mut dyn BrowserDriver> {
        let driver = match self.driver.take() {
            Some(driver) => driver,
            None => self.provisioner.initialize().await?,
        };
        Ok(self.driver.insert(driver).as_mut())
    }

    /// Shut down the browser driver, if one is running
    #[instrument(skip(self))]
    pub async fn close(&mut self) -> Result<()> {
        match self.driver.take() {
            Some(driver) => driver.shut_down().await,
            None => Ok(()),
        }
    }

    async fn render_page(&mut self, url: &str) -> Result<HtmlResponse> {
        let target = UrlValidator::for_render(url)?;

        let mut driver = match self.driver.take() {
            Some(driver) => driver,
            None => self.provisioner.initialize().await?,
        };

        let outcome = read_rendered(driver.as_mut(), target.as_str()).await;
        let shutdown = driver.shut_down().await;

        let html = outcome?;
        shutdown?;

        debug!("Rendered {} bytes from {}", html.len(), target);
        Ok(HtmlResponse::rendered(target.as_str(), html))
    }
}

async fn fetch_http(
    client: &reqwest::Client,
    url: &str,
    options: &RequestOptions,
) -> Result<HtmlResponse> {
    let url = UrlValidator::for_http(url)?;
    info!("Fetching: {}", url);

    let response = options
        .apply(client.get(url))
        .send()
        .await
        .map_err(HttpError::from_reqwest)?;

    let status = response.status();
    if !status.is_success() {
        warn!("HTTP {} for {}", status.as_u16(), response.url());
        return Err(HttpError::Status {
            status: status.as_u16(),
            url: response.url().to_string(),
        }
        .into());
    }

    let meta = HttpMeta::from_response(&response);
    let body = response.bytes().await.map_err(HttpError::from_reqwest)?;
    debug!("Fetched {} bytes", body.len());

    Ok(HtmlResponse::from_http(body, meta))
}

async fn read_rendered(driver: &mut dyn BrowserDriver, url: &str) -> Result<String> {
    driver.navigate(url).await?;
    driver.page_source().await
}

impl Drop for Session {
    fn drop(&mut self) {
        if self.driver.is_some() {
            warn!("Session dropped with a running browser driver; killing it without a clean quit");
        }
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("browser", &self.browser)
            .field("driver_active", &self.driver.is_some())
            .finish()
    }
}

/// Builder for Session
#[derive(Default)]
pub struct SessionBuilder {
    browser: BrowserKind,
    driver_config: DriverConfig,
    provisioner: Option<Box<dyn DriverProvisioner>>,
    client: Option<reqwest::Client>,
    user_agent: Option<String>,
    timeout: Option<Duration>,
}

impl SessionBuilder {
    /// Set the browser family
    pub fn browser(mut self, browser: BrowserKind) -> Self {
        self.browser = browser;
        self
    }

    /// Set the driver launch config
    pub fn driver_config(mut self, config: DriverConfig) -> Self {
        self.driver_config = config;
        self
    }

    /// Use a custom provisioner instead of the built-in one for the browser family
    pub fn provisioner<P: DriverProvisioner + 'static>(mut self, provisioner: P) -> Self {
        self.provisioner = Some(Box::new(provisioner));
        self
    }

    /// Use a preconfigured HTTP client
    pub fn http_client(mut self, client: reqwest::Client) -> Self {
        self.client = Some(client);
        self
    }

    /// Set the User-Agent for plain HTTP requests
    pub fn user_agent<S: Into<String>>(mut self, ua: S) -> Self {
        self.user_agent = Some(ua.into());
        self
    }

    /// Set the default timeout for plain HTTP requests
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Build the session
    pub fn build(self) -> Result<Session> {
        let client = match self.client {
            Some(client) => client,
            None => {
                let mut builder = reqwest::Client::builder().cookie_store(true);
                if let Some(ua) = self.user_agent {
                    builder = builder.user_agent(ua);
                }
                if let Some(timeout) = self.timeout {
                    builder = builder.timeout(timeout);
                }
                builder.build().map_err(HttpError::ClientBuild)?
            }
        };

        let provisioner = match self.provisioner {
            Some(provisioner) => {
                if provisioner.kind() != self.browser {
                    return Err(BrowserError::ConfigError(format!(
                        "provisioner for {} does not match session browser {}",
                        provisioner.kind(),
                        self.browser
                    ))
                    .into());
                }
                provisioner
            }
            None => provisioner_for(self.browser, self.driver_config),
        };

        debug!("Session created for {}", self.browser);

        Ok(Session {
            browser: self.browser,
            provisioner,
            driver: None,
            client,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_new_normalizes_case() {
        let session = Session::new("FIREFOX").unwrap();
        assert_eq!(session.browser(), BrowserKind::Firefox);
        assert!(!session.is_driver_active());

        let session = Session::new("Chrome").unwrap();
        assert_eq!(session.browser(), BrowserKind::Chrome);
    }

    #[test]
    fn test_new_rejects_unknown_browser() {
        let err = Session::new("safari").unwrap_err();
        assert!(matches!(err, Error::UnsupportedBrowser(ref s) if s == "safari"));
    }

    #[test]
    fn test_builder_default_is_firefox() {
        let session = Session::builder().build().unwrap();
        assert_eq!(session.browser(), BrowserKind::Firefox);
    }

    #[tokio::test]
    async fn test_close_without_driver_is_noop() {
        let mut session = Session::with_kind(BrowserKind::Chrome).unwrap();
        session.close().await.unwrap();
        assert!(!session.is_driver_active());
    }

    #[tokio::test]
    async fn test_http_rejects_file_url() {
        let mut session = Session::new("firefox").unwrap();
        let err = session.get("file:///etc/hosts").await.unwrap_err();
        assert!(matches!(err, Error::Navigation(_)));
    }
}
