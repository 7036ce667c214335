use std::sync::{Arc, Mutex, PoisonError};

use crate::app::error::Result;
use crate::config::Config;
use crate::fetcher::http_fetcher::HttpFetcher;
use crate::fetcher::Fetcher;
use crate::i18n::{Catalog, Translator};
use crate::parser::FeedParser;
use crate::poller::{Poller, PollerConfig, PollerHandle};
use crate::store::StateStore;

pub struct AppContext {
    pub store: Arc<StateStore>,
    pub fetcher: Arc<dyn Fetcher + Send + Sync>,
    pub parser: FeedParser,
    pub translator: Arc<dyn Translator + Send + Sync>,
    pub poller_config: PollerConfig,
    poller: Mutex<Option<PollerHandle>>,
}

impl AppContext {
    pub fn new(config: &Config) -> Result<Self> {
        let proxy = config.proxy.build()?;
        let fetcher: Arc<dyn Fetcher + Send + Sync> =
            Arc::new(HttpFetcher::new(&config.http, proxy)?);

        Ok(Self::with_fetcher(
            fetcher,
            Catalog::new(config.locale),
            config.poller.into(),
        ))
    }

    pub fn with_fetcher(
        fetcher: Arc<dyn Fetcher + Send + Sync>,
        translator: impl Translator + Send + Sync + 'static,
        poller_config: PollerConfig,
    ) -> Self {
        Self {
            store: Arc::new(StateStore::new()),
            fetcher,
            parser: FeedParser::new(),
            translator: Arc::new(translator),
            poller_config,
            poller: Mutex::new(None),
        }
    }

    /// Start the background poller if the store has feeds and no poller has
    /// been started yet. Must be called from within a tokio runtime.
    pub fn ensure_poller(&self) -> bool {
        if !self.store.try_start_polling() {
            return false;
        }

        let handle = Poller::new(
            self.store.clone(),
            self.fetcher.clone(),
            self.parser.clone(),
            self.poller_config,
        )
        .spawn();

        *self.poller.lock().unwrap_or_else(PoisonError::into_inner) = Some(handle);
        true
    }

    pub fn poller_running(&self) -> bool {
        self.poller
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|handle| !handle.is_stopped() && !handle.is_finished())
    }

    /// Stop the poller, if one was started, and wait for it to exit.
    pub async fn shutdown(&self) {
        let handle = self
            .poller
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        if let Some(handle) = handle {
            handle.stop();
            handle.join().await;
        }
    }
}
