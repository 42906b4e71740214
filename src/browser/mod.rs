//! Browser automation module
//!
//! This module provisions headless browsers for the render path: Chrome
//! through ChromiumOxide (CDP) and Firefox through geckodriver (WebDriver).
//! Both are exposed behind the same [`BrowserDriver`] capability set.

pub mod chrome;
pub mod config;
pub mod controller;
pub mod firefox;
pub mod host;
pub mod navigation;

pub use chrome::{ChromeDriver, ChromeProvisioner};
pub use config::{DriverConfig, DriverConfigBuilder};
pub use controller::{provisioner_for, BrowserDriver, DriverProvisioner};
pub use firefox::{FirefoxDriver, FirefoxProvisioner};
pub use host::HostOs;
pub use navigation::UrlValidator;

use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Supported browser families
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrowserKind {
    /// Firefox, driven through geckodriver
    #[default]
    Firefox,
    /// Chrome/Chromium, driven through the DevTools protocol
    Chrome,
}

impl BrowserKind {
    /// Lowercase selector key
    pub fn as_str(&self) -> &'static str {
        match self {
            BrowserKind::Firefox => "firefox",
            BrowserKind::Chrome => "chrome",
        }
    }
}

impl fmt::Display for BrowserKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BrowserKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "firefox" => Ok(BrowserKind::Firefox),
            "chrome" => Ok(BrowserKind::Chrome),
            _ => Err(Error::UnsupportedBrowser(s.to_string())),
        }
    }
}
