//! Chrome provisioning over the DevTools protocol

use super::controller::{BrowserDriver, DriverProvisioner};
use super::navigation::WAIT_FOR_LOAD_SCRIPT;
use super::{BrowserKind, DriverConfig};
use crate::error::{BrowserError, Error, NavigationError, Result};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig as CdpBrowserConfig};
use chromiumoxide::Page;
use futures::StreamExt;
use std::any::Any;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

/// Launches headless Chrome/Chromium
#[derive(Debug, Clone)]
pub struct ChromeProvisioner {
    config: DriverConfig,
}

impl ChromeProvisioner {
    /// Create a provisioner with the given config
    pub fn new(config: DriverConfig) -> Self {
        Self { config }
    }

    /// Translate our config into a chromiumoxide launch config
    fn cdp_config(&self) -> Result<CdpBrowserConfig> {
        let config = &self.config;
        let mut builder = CdpBrowserConfig::builder()
            .launch_timeout(config.startup_timeout())
            .request_timeout(config.page_load_timeout());

        // chromiumoxide launches headless unless asked otherwise
        if !config.headless {
            builder = builder.with_head();
        }

        if config.disable_gpu {
            builder = builder.arg("--disable-gpu");
        }

        if !config.sandbox {
            builder = builder.no_sandbox();
        }

        if let Some(ref ua) = config.user_agent {
            builder = builder.arg(format!("--user-agent={}", ua));
        }

        if let Some(ref path) = config.chrome_path {
            builder = builder.chrome_executable(path);
        }

        for arg in &config.extra_args {
            builder = builder.arg(arg);
        }

        builder
            .build()
            .map_err(|e| BrowserError::ConfigError(e).into())
    }
}

#[async_trait]
impl DriverProvisioner for ChromeProvisioner {
    fn kind(&self) -> BrowserKind {
        BrowserKind::Chrome
    }

    #[instrument(skip(self))]
    async fn initialize(&self) -> Result<Box<dyn BrowserDriver>> {
        info!(
            "Launching Chrome with config: headless={}",
            self.config.headless
        );

        let (browser, mut handler) = Browser::launch(self.cdp_config()?)
            .await
            .map_err(|e| BrowserError::LaunchFailed(e.to_string()))?;

        // The handler must be polled for the browser connection to make progress
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    warn!("Browser handler event error");
                    break;
                }
            }
            debug!("Browser handler finished");
        });

        let page = match browser.new_page("about:blank").await {
            Ok(page) => page,
            Err(e) => {
                let mut browser = browser;
                let _ = browser.close().await;
                handler_task.abort();
                return Err(BrowserError::LaunchFailed(e.to_string()).into());
            }
        };

        info!("Chrome launched successfully");

        Ok(Box::new(ChromeDriver {
            browser,
            handler: handler_task,
            page,
            page_load_timeout_ms: self.config.page_load_timeout_ms,
        }))
    }
}

/// Running Chrome instance with a single page
pub struct ChromeDriver {
    browser: Browser,
    handler: JoinHandle<()>,
    page: Page,
    page_load_timeout_ms: u64,
}

impl ChromeDriver {
    /// The underlying chromiumoxide page
    pub fn page(&self) -> &Page {
        &self.page
    }

    /// The underlying chromiumoxide browser
    pub fn browser(&self) -> &Browser {
        &self.browser
    }
}

#[async_trait]
impl BrowserDriver for ChromeDriver {
    fn kind(&self) -> BrowserKind {
        BrowserKind::Chrome
    }

    #[instrument(skip(self))]
    async fn navigate(&mut self, url: &str) -> Result<()> {
        info!("Navigating to: {}", url);
        let timeout = Duration::from_millis(self.page_load_timeout_ms);

        tokio::time::timeout(timeout, self.page.goto(url))
            .await
            .map_err(|_| NavigationError::Timeout(self.page_load_timeout_ms))?
            .map_err(|e| NavigationError::LoadFailed(e.to_string()))?;

        tokio::time::timeout(timeout, self.page.evaluate(WAIT_FOR_LOAD_SCRIPT))
            .await
            .map_err(|_| NavigationError::Timeout(self.page_load_timeout_ms))?
            .map_err(|e| Error::cdp(e.to_string()))?;

        debug!("Navigation complete: {}", url);
        Ok(())
    }

    async fn page_source(&mut self) -> Result<String> {
        self.page
            .content()
            .await
            .map_err(|e| BrowserError::PageSourceFailed(e.to_string()).into())
    }

    async fn current_url(&mut self) -> Result<String> {
        Ok(self.page.url().await?.unwrap_or_default())
    }

    #[instrument(skip(self))]
    async fn shut_down(self: Box<Self>) -> Result<()> {
        info!("Closing Chrome");
        let ChromeDriver {
            mut browser,
            handler,
            page,
            ..
        } = *self;
        drop(page);

        browser
            .close()
            .await
            .map_err(|e| Error::cdp(e.to_string()))?;
        let _ = browser.wait().await;

        // Wait for handler to finish
        let _ = tokio::time::timeout(Duration::from_secs(5), handler).await;

        info!("Chrome closed");
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
