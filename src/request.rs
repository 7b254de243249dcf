//! Outbound request identity and the shared HTTP client.
//!
//! Listing and article pages are fetched as a search-engine crawler: the
//! site serves crawlers full server-rendered markup. Images are fetched
//! with an ordinary browser identity.

use crate::error::{CollectError, Result};
use rand::seq::IndexedRandom;
use rand::{rng, Rng};
use reqwest::header::{HeaderMap, HeaderValue, LOCATION, USER_AGENT};
use reqwest::redirect::Policy;
use reqwest::{Client, RequestBuilder, Response};
use std::time::Duration;
use tracing::{debug, instrument};

pub const USER_AGENT_CHROME: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/100.0.4896.75 Safari/537.36";
pub const USER_AGENT_BAIDU_SPIDER: &str =
    "Mozilla/5.0 (compatible; Baiduspider-render/2.0; +http://www.baidu.com/search/spider.html)";

pub const X_FORWARDED_FOR: &str = "x-forwarded-for";

/// Address prefixes published for the crawler's fetch hosts.
const SPIDER_PREFIXES: [&str; 5] = [
    "116.179.37.",
    "124.166.232.",
    "116.179.32.",
    "180.76.15.",
    "180.76.5.",
];

/// Which client a request claims to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Identity {
    Browser,
    Crawler,
}

impl Identity {
    /// Headers for one request. Crawler headers carry a fresh random
    /// forwarded address on every call.
    pub fn headers(self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        match self {
            Identity::Browser => {
                headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_CHROME));
            }
            Identity::Crawler => {
                headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_BAIDU_SPIDER));
                if let Ok(addr) = HeaderValue::from_str(&spider_address()) {
                    headers.insert(X_FORWARDED_FOR, addr);
                }
            }
        }
        headers
    }

    pub fn apply(self, req: RequestBuilder) -> RequestBuilder {
        req.headers(self.headers())
    }
}

/// A random address inside the crawler's published ranges.
pub fn spider_address() -> String {
    let mut rng = rng();
    let prefix = SPIDER_PREFIXES.choose(&mut rng).copied().unwrap_or(SPIDER_PREFIXES[0]);
    let octet: u8 = rng.random_range(1..=254);
    format!("{prefix}{octet}")
}

/// Build the client every collector request goes through.
///
/// Redirects are never followed so a moved or removed page reaches the
/// caller as its 3xx response.
pub fn build_client(timeout: Duration) -> reqwest::Result<Client> {
    Client::builder()
        .timeout(timeout)
        .redirect(Policy::none())
        .build()
}

/// Issue a GET and reject anything but a 2xx.
///
/// A 3xx comes back as [`CollectError::Redirected`] carrying the
/// `Location` header, any other status as [`CollectError::Status`].
#[instrument(level = "debug", skip(client))]
pub async fn get(client: &Client, url: &str, identity: Identity) -> Result<Response> {
    let resp = identity.apply(client.get(url)).send().await?;
    let status = resp.status();
    debug!(%status, "Fetched");

    if status.is_redirection() {
        let location = resp
            .headers()
            .get(LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        return Err(CollectError::Redirected { status, location });
    }
    if !status.is_success() {
        return Err(CollectError::Status(status));
    }
    Ok(resp)
}
