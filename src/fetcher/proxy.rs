use url::Url;

use crate::app::{Result, TributaryError};

pub const DEFAULT_PROXY_URL: &str = "https://allorigins.hexlet.app/get";

/// Builds relay URLs of the form `<base>?url=<encoded feed url>&disableCache=true`.
#[derive(Debug, Clone)]
pub struct Proxy {
    base: Url,
}

impl Proxy {
    pub fn new(base: &str) -> Result<Self> {
        let base = Url::parse(base)
            .map_err(|e| TributaryError::Config(format!("Invalid proxy URL {}: {}", base, e)))?;
        Ok(Self { base })
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    pub fn proxied_url(&self, feed_url: &str) -> Url {
        let mut url = self.base.clone();
        url.query_pairs_mut()
            .append_pair("url", feed_url)
            .append_pair("disableCache", "true");
        url
    }
}

impl Default for Proxy {
    fn default() -> Self {
        Self {
            base: Url::parse(DEFAULT_PROXY_URL).expect("default proxy URL is valid"),
        }
    }
}
