pub mod http_fetcher;
pub mod parallel;
pub mod proxy;

use async_trait::async_trait;

use crate::app::Result;

pub use http_fetcher::HttpFetcher;
pub use parallel::fetch_all;
pub use proxy::Proxy;

/// Reads the raw text of a feed document.
///
/// Implementations report every transport-level failure (unreachable host,
/// timeout, non-2xx status, malformed relay response) as a network error and
/// never retry.
#[async_trait]
pub trait Fetcher {
    async fn fetch(&self, url: &str) -> Result<String>;
}
