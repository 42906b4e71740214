//! Selestium - HTTP Requests with Optional Browser Rendering
//!
//! This crate puts a plain HTTP GET and a headless-browser page render behind
//! one request interface, and wraps either result in an HTML response that can
//! be queried with CSS selectors.
//!
//! # Features
//!
//! - **Plain fetch**: HTTP GET through a shared `reqwest` client with cookies
//! - **Rendered fetch**: Firefox (geckodriver/WebDriver) or Chrome (CDP) loads the
//!   page and returns the DOM after scripts have run
//! - **Queryable response**: CSS selector queries via `scraper`
//! - **Driver access**: direct control of the running browser when needed
//!
//! # Architecture
//!
//! ```text
//! Caller ──▶ Session::get_with ──┬─ render=false ─▶ reqwest ──────────┐
//!                                │                                     ▼
//!                                └─ render=true ──▶ DriverProvisioner  HtmlResponse
//!                                                   │ (Firefox|Chrome)    │
//!                                                   ▼                     ▼
//!                                              BrowserDriver ──▶ page source ─▶ find(css)
//! ```
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use selestium::Session;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut session = Session::new("firefox")?;
//!
//!     // Plain HTTP
//!     let response = session.get("https://example.com").await?;
//!     println!("status: {}", response.status()?);
//!
//!     // Rendered through a headless browser
//!     let rendered = session.render("https://example.com").await?;
//!     for heading in rendered.find("h1")? {
//!         println!("{}", heading.text);
//!     }
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod blocking;
pub mod browser;
pub mod error;
pub mod http;
pub mod response;
pub mod session;

// Re-exports for convenience
pub use browser::{BrowserDriver, BrowserKind, DriverConfig, DriverProvisioner};
pub use error::{Error, Result};
pub use http::RequestOptions;
pub use response::{Element, HtmlResponse};
pub use session::{Session, SessionBuilder};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
