//! Selestium CLI
//!
//! Fetch a page, optionally through a headless browser, and print the
//! elements matching a CSS selector.

use anyhow::Context;
use clap::Parser;
use selestium::{BrowserKind, DriverConfig, RequestOptions, Session};

/// Fetch a page and query it with CSS selectors
#[derive(Parser, Debug)]
#[command(name = "selestium")]
#[command(version)]
#[command(about = "HTTP GET with optional headless-browser rendering")]
struct Args {
    /// URL to fetch
    url: String,

    /// Render the page in a headless browser
    #[arg(short, long)]
    render: bool,

    /// Browser used for rendering
    #[arg(short, long, default_value = "firefox")]
    browser: BrowserKind,

    /// CSS selector to query; prints the whole body when omitted
    #[arg(short, long)]
    select: Option<String>,

    /// Extra request header as NAME:VALUE (plain fetch only)
    #[arg(short = 'H', long = "header")]
    headers: Vec<String>,

    /// Print matched elements as JSON
    #[arg(long)]
    json: bool,

    /// Show the browser window
    #[arg(long)]
    headed: bool,

    /// Path to Chrome/Chromium executable
    #[arg(long)]
    chrome_path: Option<String>,

    /// Path to geckodriver executable
    #[arg(long)]
    geckodriver_path: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn parse_header(raw: &str) -> anyhow::Result<(String, String)> {
    let (name, value) = raw
        .split_once(':')
        .with_context(|| format!("header must be NAME:VALUE, got '{}'", raw))?;
    Ok((name.trim().to_string(), value.trim().to_string()))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize tracing
    let filter = if args.verbose { "debug" } else { "info" };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let mut driver_config = DriverConfig::builder().headless(!args.headed);
    if let Some(path) = args.chrome_path {
        driver_config = driver_config.chrome_path(path);
    }
    if let Some(path) = args.geckodriver_path {
        driver_config = driver_config.geckodriver_path(path);
    }

    let mut session = Session::builder()
        .browser(args.browser)
        .driver_config(driver_config.build())
        .build()?;

    let mut options = RequestOptions::new().render(args.render);
    for raw in &args.headers {
        let (name, value) = parse_header(raw)?;
        options = options.header(name, value);
    }

    let response = session
        .get_with(&args.url, options)
        .await
        .with_context(|| format!("failed to fetch {}", args.url))?;

    match args.select {
        Some(selector) => {
            let elements = response.find(&selector)?;
            tracing::debug!("{} elements matched {}", elements.len(), selector);
            if args.json {
                println!("{}", serde_json::to_string_pretty(&elements)?);
            } else {
                for element in elements {
                    println!("{}", element.text.trim());
                }
            }
        }
        None => println!("{}", response.text()),
    }

    session.close().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_header() {
        assert_eq!(
            parse_header("Accept: text/html").unwrap(),
            ("Accept".to_string(), "text/html".to_string())
        );
        assert!(parse_header("no-colon").is_err());
    }

    #[test]
    fn test_args_parse() {
        let args = Args::parse_from([
            "selestium",
            "https://example.com",
            "--render",
            "--browser",
            "CHROME",
            "--select",
            "#x",
        ]);
        assert!(args.render);
        assert_eq!(args.browser, BrowserKind::Chrome);
        assert_eq!(args.select.as_deref(), Some("#x"));
    }

    #[test]
    fn test_args_reject_unknown_browser() {
        assert!(Args::try_parse_from(["selestium", "https://example.com", "-b", "safari"]).is_err());
    }
}
