//! Driver launch configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration shared by both driver provisioners
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriverConfig {
    /// Run in headless mode (default: true)
    pub headless: bool,
    /// Pass `--disable-gpu` to the browser (default: true)
    pub disable_gpu: bool,
    /// Enable sandbox (default: true). Chrome only.
    pub sandbox: bool,
    /// User agent string (None = browser default). Chrome only.
    pub user_agent: Option<String>,
    /// Bound on navigation plus ready wait, in milliseconds (default: 30000)
    pub page_load_timeout_ms: u64,
    /// Bound on driver process startup, in milliseconds (default: 20000)
    pub startup_timeout_ms: u64,
    /// Path to Chrome/Chromium executable (None = auto-detect)
    pub chrome_path: Option<String>,
    /// Path to geckodriver executable (None = discover)
    pub geckodriver_path: Option<String>,
    /// Additional browser arguments
    pub extra_args: Vec<String>,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            headless: true,
            disable_gpu: true,
            sandbox: true,
            user_agent: None,
            page_load_timeout_ms: 30000,
            startup_timeout_ms: 20000,
            chrome_path: None,
            geckodriver_path: None,
            extra_args: Vec::new(),
        }
    }
}

impl DriverConfig {
    /// Create a new config builder
    pub fn builder() -> DriverConfigBuilder {
        DriverConfigBuilder::default()
    }

    /// Arguments common to both browser families
    pub fn browser_args(&self) -> Vec<String> {
        let mut args = Vec::with_capacity(self.extra_args.len() + 2);
        if self.headless {
            args.push("--headless".to_string());
        }
        if self.disable_gpu {
            args.push("--disable-gpu".to_string());
        }
        args.extend(self.extra_args.iter().cloned());
        args
    }

    pub(crate) fn page_load_timeout(&self) -> Duration {
        Duration::from_millis(self.page_load_timeout_ms)
    }

    pub(crate) fn startup_timeout(&self) -> Duration {
        Duration::from_millis(self.startup_timeout_ms)
    }
}

/// Builder for DriverConfig
#[derive(Default)]
pub struct DriverConfigBuilder {
    config: DriverConfig,
}

impl DriverConfigBuilder {
    /// Set headless mode
    pub fn headless(mut self, headless: bool) -> Self {
        self.config.headless = headless;
        self
    }

    /// Enable/disable the `--disable-gpu` flag
    pub fn disable_gpu(mut self, disable_gpu: bool) -> Self {
        self.config.disable_gpu = disable_gpu;
        self
    }

    /// Enable/disable sandbox
    pub fn sandbox(mut self, sandbox: bool) -> Self {
        self.config.sandbox = sandbox;
        self
    }

    /// Set user agent
    pub fn user_agent<S: Into<String>>(mut self, ua: S) -> Self {
        self.config.user_agent = Some(ua.into());
        self
    }

    /// Set page load timeout
    pub fn page_load_timeout_ms(mut self, ms: u64) -> Self {
        self.config.page_load_timeout_ms = ms;
        self
    }

    /// Set driver startup timeout
    pub fn startup_timeout_ms(mut self, ms: u64) -> Self {
        self.config.startup_timeout_ms = ms;
        self
    }

    /// Set Chrome path
    pub fn chrome_path<S: Into<String>>(mut self, path: S) -> Self {
        self.config.chrome_path = Some(path.into());
        self
    }

    /// Set geckodriver path
    pub fn geckodriver_path<S: Into<String>>(mut self, path: S) -> Self {
        self.config.geckodriver_path = Some(path.into());
        self
    }

    /// Add extra browser argument
    pub fn arg<S: Into<String>>(mut self, arg: S) -> Self {
        self.config.extra_args.push(arg.into());
        self
    }

    /// Build the config
    pub fn build(self) -> DriverConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_driver_config_default() {
        let config = DriverConfig::default();
        assert!(config.headless);
        assert!(config.disable_gpu);
        assert!(config.sandbox);
        assert_eq!(config.page_load_timeout_ms, 30000);
        assert_eq!(config.startup_timeout_ms, 20000);
        assert!(config.geckodriver_path.is_none());
    }

    #[test]
    fn test_driver_config_builder() {
        let config = DriverConfig::builder()
            .headless(false)
            .disable_gpu(false)
            .sandbox(false)
            .user_agent("TestBot/1.0")
            .page_load_timeout_ms(60000)
            .geckodriver_path("/opt/bin/geckodriver")
            .arg("--no-first-run")
            .build();

        assert!(!config.headless);
        assert!(!config.disable_gpu);
        assert!(!config.sandbox);
        assert_eq!(config.user_agent, Some("TestBot/1.0".to_string()));
        assert_eq!(config.page_load_timeout_ms, 60000);
        assert_eq!(
            config.geckodriver_path.as_deref(),
            Some("/opt/bin/geckodriver")
        );
        assert_eq!(config.extra_args, vec!["--no-first-run"]);
    }

    #[test]
    fn test_browser_args() {
        assert_eq!(
            DriverConfig::default().browser_args(),
            vec!["--headless", "--disable-gpu"]
        );

        let headed = DriverConfig::builder().headless(false).arg("--mute-audio").build();
        assert_eq!(headed.browser_args(), vec!["--disable-gpu", "--mute-audio"]);
    }
}
