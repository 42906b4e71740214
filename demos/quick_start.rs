//! # Selestium - Quick Start Example
//!
//! Fetches a page over plain HTTP, then renders it in headless Firefox, and
//! queries both results with the same CSS selector.
//!
//! Run with: `cargo run --example quick-start`
//! Rendering requires Firefox and geckodriver on PATH.

use selestium::Session;

const URL: &str = "https://www.whatismybrowser.com/detect/is-javascript-enabled";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let mut session = Session::new("firefox")?;

    // Without rendering the page's scripts never run
    let plain = session.get(URL).await?;
    println!("HTTP status: {}", plain.status()?);
    if let Some(detected) = plain.find_first("#detected_value")? {
        println!("Plain fetch:    {}", detected.text.trim());
    }

    let rendered = session.render(URL).await?;
    if let Some(detected) = rendered.find_first("#detected_value")? {
        println!("Rendered fetch: {}", detected.text.trim());
    }

    // Direct driver access; the browser stays up until close()
    let driver = session.controller().await?;
    driver.navigate("https://example.com").await?;
    println!("Controller at:  {}", driver.current_url().await?);
    session.close().await?;

    Ok(())
}
