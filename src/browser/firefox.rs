//! Firefox provisioning over WebDriver
//!
//! A private geckodriver process is started per driver and a thirtyfour
//! session is opened against it. On Android hosts geckodriver is located on
//! `PATH` up front and launched by absolute path; elsewhere the OS resolves it.

use super::controller::{BrowserDriver, DriverProvisioner};
use super::host::{find_executable, HostOs};
use super::{BrowserKind, DriverConfig};
use crate::error::{BrowserError, Error, NavigationError, Result};
use async_trait::async_trait;
use serde_json::{json, Map, Value};
use std::any::Any;
use std::io;
use std::net::{Ipv4Addr, TcpListener};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use thirtyfour::WebDriver;
use tokio::net::TcpStream;
use tokio::process::{Child, Command};
use tokio::time::Instant;
use tracing::{debug, info, instrument, warn};

/// geckodriver executable name
pub const GECKODRIVER: &str = "geckodriver";

const READY_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Launches headless Firefox through geckodriver
#[derive(Debug, Clone)]
pub struct FirefoxProvisioner {
    config: DriverConfig,
}

impl FirefoxProvisioner {
    /// Create a provisioner with the given config
    pub fn new(config: DriverConfig) -> Self {
        Self { config }
    }

    /// W3C capabilities for a new Firefox session
    pub fn capabilities(&self) -> Map<String, Value> {
        let mut caps = Map::new();
        caps.insert("browserName".to_string(), json!("firefox"));
        caps.insert(
            "moz:firefoxOptions".to_string(),
            json!({ "args": self.config.browser_args() }),
        );
        caps.insert(
            "timeouts".to_string(),
            json!({ "pageLoad": self.config.page_load_timeout_ms }),
        );
        caps
    }

    /// Start geckodriver and wait until it accepts connections
    async fn spawn_geckodriver(&self, path: &Path) -> Result<(Child, u16)> {
        let port = free_port()?;
        debug!("Starting {} on port {}", path.display(), port);

        let mut child = Command::new(path)
            .arg("--host")
            .arg(Ipv4Addr::LOCALHOST.to_string())
            .arg("--port")
            .arg(port.to_string())
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| match e.kind() {
                io::ErrorKind::NotFound => {
                    BrowserError::DriverNotFound(path.display().to_string())
                }
                _ => BrowserError::LaunchFailed(format!("{}: {}", path.display(), e)),
            })?;

        let deadline = Instant::now() + self.config.startup_timeout();
        loop {
            if let Some(status) = child.try_wait()? {
                return Err(BrowserError::LaunchFailed(format!(
                    "geckodriver exited during startup with {}",
                    status
                ))
                .into());
            }
            if TcpStream::connect((Ipv4Addr::LOCALHOST, port)).await.is_ok() {
                return Ok((child, port));
            }
            if Instant::now() >= deadline {
                let _ = child.kill().await;
                return Err(BrowserError::Timeout(self.config.startup_timeout_ms).into());
            }
            tokio::time::sleep(READY_POLL_INTERVAL).await;
        }
    }
}

/// Pick the geckodriver executable to launch
pub(crate) fn resolve_geckodriver<F>(
    config: &DriverConfig,
    host: &HostOs,
    lookup: F,
) -> Result<PathBuf>
where
    F: FnOnce(&str) -> Option<PathBuf>,
{
    if let Some(ref path) = config.geckodriver_path {
        return Ok(PathBuf::from(path));
    }

    if host.is_android() {
        return lookup(GECKODRIVER)
            .ok_or_else(|| BrowserError::DriverNotFound(GECKODRIVER.to_string()).into());
    }

    Ok(PathBuf::from(GECKODRIVER))
}

fn free_port() -> Result<u16> {
    let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0))?;
    Ok(listener.local_addr()?.port())
}

#[async_trait]
impl DriverProvisioner for FirefoxProvisioner {
    fn kind(&self) -> BrowserKind {
        BrowserKind::Firefox
    }

    #[instrument(skip(self))]
    async fn initialize(&self) -> Result<Box<dyn BrowserDriver>> {
        info!(
            "Launching Firefox with config: headless={}",
            self.config.headless
        );

        let host = HostOs::detect().await?;
        let geckodriver = resolve_geckodriver(&self.config, &host, find_executable)?;
        let (mut service, port) = self.spawn_geckodriver(&geckodriver).await?;

        let server_url = format!("http://{}:{}", Ipv4Addr::LOCALHOST, port);
        let driver = match WebDriver::new(server_url, self.capabilities()).await {
            Ok(driver) => driver,
            Err(e) => {
                let _ = service.kill().await;
                return Err(BrowserError::LaunchFailed(e.to_string()).into());
            }
        };

        info!("Firefox launched successfully");

        Ok(Box::new(FirefoxDriver {
            driver,
            service,
            page_load_timeout_ms: self.config.page_load_timeout_ms,
        }))
    }
}

/// Running Firefox session backed by its own geckodriver
pub struct FirefoxDriver {
    driver: WebDriver,
    service: Child,
    page_load_timeout_ms: u64,
}

impl FirefoxDriver {
    /// The underlying thirtyfour session
    pub fn webdriver(&self) -> &WebDriver {
        &self.driver
    }
}

#[async_trait]
impl BrowserDriver for FirefoxDriver {
    fn kind(&self) -> BrowserKind {
        BrowserKind::Firefox
    }

    #[instrument(skip(self))]
    async fn navigate(&mut self, url: &str) -> Result<()> {
        info!("Navigating to: {}", url);
        // geckodriver blocks until the load event under the default page load strategy
        tokio::time::timeout(
            Duration::from_millis(self.page_load_timeout_ms),
            self.driver.goto(url),
        )
        .await
        .map_err(|_| NavigationError::Timeout(self.page_load_timeout_ms))?
        .map_err(|e| NavigationError::LoadFailed(e.to_string()))?;

        debug!("Navigation complete: {}", url);
        Ok(())
    }

    async fn page_source(&mut self) -> Result<String> {
        self.driver
            .source()
            .await
            .map_err(|e| BrowserError::PageSourceFailed(e.to_string()).into())
    }

    async fn current_url(&mut self) -> Result<String> {
        Ok(self.driver.current_url().await?.to_string())
    }

    #[instrument(skip(self))]
    async fn shut_down(self: Box<Self>) -> Result<()> {
        info!("Closing Firefox");
        let FirefoxDriver {
            driver,
            mut service,
            ..
        } = *self;

        let quit = driver.quit().await.map_err(Error::from);
        if let Err(e) = service.kill().await {
            warn!("Failed to stop geckodriver: {}", e);
        }

        quit?;
        info!("Firefox closed");
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
