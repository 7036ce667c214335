#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Notify;

use tributary::app::{AppContext, Result, TributaryError};
use tributary::fetcher::Fetcher;
use tributary::i18n::{Catalog, Locale};
use tributary::poller::PollerConfig;

/// Serves canned bodies per url. Urls without a body fail with a network
/// error. A held url blocks until its gate is notified.
#[derive(Default)]
pub struct ScriptedFetcher {
    bodies: Mutex<HashMap<String, String>>,
    gates: Mutex<HashMap<String, Arc<Notify>>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedFetcher {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn serve(&self, url: &str, body: impl Into<String>) {
        self.bodies.lock().unwrap().insert(url.to_string(), body.into());
    }

    pub fn fail(&self, url: &str) {
        self.bodies.lock().unwrap().remove(url);
    }

    pub fn hold(&self, url: &str) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.gates.lock().unwrap().insert(url.to_string(), gate.clone());
        gate
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Fetcher for ScriptedFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        self.calls.lock().unwrap().push(url.to_string());

        let gate = self.gates.lock().unwrap().get(url).cloned();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        self.bodies
            .lock()
            .unwrap()
            .get(url)
            .cloned()
            .ok_or_else(|| TributaryError::Network(format!("{} unreachable", url)))
    }
}

pub fn context(fetcher: Arc<ScriptedFetcher>) -> Arc<AppContext> {
    context_with(fetcher, Locale::En, Duration::from_secs(5))
}

pub fn context_with(
    fetcher: Arc<ScriptedFetcher>,
    locale: Locale,
    interval: Duration,
) -> Arc<AppContext> {
    Arc::new(AppContext::with_fetcher(
        fetcher,
        Catalog::new(locale),
        PollerConfig { interval },
    ))
}

/// An RSS 2.0 document with one item per `(title, link)`.
pub fn rss(title: &str, items: &[(&str, &str)]) -> String {
    let items: String = items
        .iter()
        .map(|(item_title, link)| {
            format!(
                "<item><title>{}</title><link>{}</link><description>About {}</description></item>",
                item_title, link, item_title
            )
        })
        .collect();

    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>{}</title>
    <description>{} updates</description>
    <link>https://example.com</link>
    {}
  </channel>
</rss>"#,
        title, title, items
    )
}
