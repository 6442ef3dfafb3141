//! Network-facing collectors: feeds and linked pages.
//!
//! # Submodules
//!
//! | Module | Fetches | Failure mode |
//! |--------|---------|--------------|
//! | [`feed`] | RSS/Atom documents | feed skipped, logged |
//! | [`og_image`] | article pages, for `og:image` | no image, logged at debug |
//!
//! Both share one [`reqwest::Client`] built by [`build_client`], so the
//! User-Agent and timeout are set in one place. Feeds are fetched one at a
//! time, in configuration order.

pub mod feed;
pub mod og_image;

use reqwest::Client;
use std::error::Error;
use std::time::Duration;

/// Build the HTTP client used for every request of the run.
pub fn build_client(user_agent: &str, timeout: Duration) -> Result<Client, Box<dyn Error>> {
    let client = Client::builder()
        .user_agent(user_agent)
        .timeout(timeout)
        .build()?;
    Ok(client)
}
