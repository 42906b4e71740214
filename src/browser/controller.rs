//! Driver provisioning seam
//!
//! A [`DriverProvisioner`] starts a browser and hands back an owned
//! [`BrowserDriver`]. The driver owns the browser process; whoever holds the
//! box is responsible for calling [`BrowserDriver::shut_down`].

use super::{BrowserKind, ChromeProvisioner, DriverConfig, FirefoxProvisioner};
use crate::error::Result;
use async_trait::async_trait;
use std::any::Any;

/// A running, controllable browser instance
#[async_trait]
pub trait BrowserDriver: Send {
    /// Browser family behind this driver
    fn kind(&self) -> BrowserKind;

    /// Navigate to `url` and wait until the page has finished loading
    async fn navigate(&mut self, url: &str) -> Result<()>;

    /// Serialized DOM of the current page, including script-made changes
    async fn page_source(&mut self) -> Result<String>;

    /// URL of the current page after redirects
    async fn current_url(&mut self) -> Result<String>;

    /// Quit the browser and release its process
    async fn shut_down(self: Box<Self>) -> Result<()>;

    /// Downcast access to the concrete driver
    fn as_any(&self) -> &dyn Any;

    /// Mutable downcast access to the concrete driver
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Starts browsers of one family
#[async_trait]
pub trait DriverProvisioner: Send + Sync {
    /// Browser family this provisioner starts
    fn kind(&self) -> BrowserKind;

    /// Launch a browser and return its driver
    async fn initialize(&self) -> Result<Box<dyn BrowserDriver>>;
}

/// Provisioner for the given browser family
pub fn provisioner_for(kind: BrowserKind, config: DriverConfig) -> Box<dyn DriverProvisioner> {
    match kind {
        BrowserKind::Firefox => Box::new(FirefoxProvisioner::new(config)),
        BrowserKind::Chrome => Box::new(ChromeProvisioner::new(config)),
    }
}
