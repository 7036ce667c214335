//! Background refresh of every stored feed.
//!
//! One loop per session: sleep for the configured interval, fetch all feeds
//! at once, parse and merge each response, then schedule the next cycle.
//! A failing feed is logged and skipped; nothing stops the loop except
//! [`PollerHandle::stop`].

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::fetcher::{fetch_all, Fetcher};
use crate::parser::FeedParser;
use crate::store::StateStore;

pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(5000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollerConfig {
    /// Delay before each cycle, measured from the end of the previous one.
    pub interval: Duration,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_INTERVAL,
        }
    }
}

/// Parse an interval such as "500ms", "5s", "2m", "1h", "1d" or raw seconds.
pub fn parse_interval(s: &str) -> Result<Duration, String> {
    let s = s.trim().to_lowercase();

    let parse = |digits: &str, unit: &str| {
        digits
            .trim()
            .parse::<u64>()
            .map_err(|_| format!("Invalid {}: {}", unit, digits))
    };

    let scaled = |value: u64, factor: u64| {
        value
            .checked_mul(factor)
            .map(Duration::from_secs)
            .ok_or_else(|| format!("Interval too large: {}", s))
    };

    let duration = if let Some(ms) = s.strip_suffix("ms") {
        Duration::from_millis(parse(ms, "milliseconds")?)
    } else if let Some(secs) = s.strip_suffix('s') {
        Duration::from_secs(parse(secs, "seconds")?)
    } else if let Some(minutes) = s.strip_suffix('m') {
        scaled(parse(minutes, "minutes")?, 60)?
    } else if let Some(hours) = s.strip_suffix('h') {
        scaled(parse(hours, "hours")?, 3600)?
    } else if let Some(days) = s.strip_suffix('d') {
        scaled(parse(days, "days")?, 86_400)?
    } else {
        s.parse::<u64>().map(Duration::from_secs).map_err(|_| {
            format!("Invalid interval: {}. Use a format like '500ms', '5s', '30m'", s)
        })?
    };

    if duration.is_zero() {
        return Err("Interval must be greater than zero".to_string());
    }
    Ok(duration)
}

pub fn format_interval(interval: Duration) -> String {
    let millis = interval.as_millis();
    if millis % 1000 != 0 {
        return format!("{}ms", millis);
    }

    let secs = interval.as_secs();
    if secs >= 86400 && secs % 86400 == 0 {
        format!("{}d", secs / 86400)
    } else if secs >= 3600 && secs % 3600 == 0 {
        format!("{}h", secs / 3600)
    } else if secs >= 60 && secs % 60 == 0 {
        format!("{}m", secs / 60)
    } else {
        format!("{}s", secs)
    }
}

/// Totals for one poll cycle.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CycleReport {
    pub feeds: usize,
    pub new_feeds: usize,
    pub updated_feeds: usize,
    pub new_posts: usize,
    pub errors: usize,
}

pub struct Poller {
    store: Arc<StateStore>,
    fetcher: Arc<dyn Fetcher + Send + Sync>,
    parser: FeedParser,
    config: PollerConfig,
}

impl Poller {
    pub fn new(
        store: Arc<StateStore>,
        fetcher: Arc<dyn Fetcher + Send + Sync>,
        parser: FeedParser,
        config: PollerConfig,
    ) -> Self {
        Self {
            store,
            fetcher,
            parser,
            config,
        }
    }

    /// Start the loop on the current runtime.
    ///
    /// Dropping the returned handle detaches the loop; it keeps running until
    /// the runtime shuts down.
    pub fn spawn(self) -> PollerHandle {
        let (stop_tx, stop_rx) = watch::channel(false);
        let task = tokio::spawn(self.run(stop_rx));
        PollerHandle {
            stop: stop_tx,
            task,
        }
    }

    async fn run(self, mut stop: watch::Receiver<bool>) {
        info!(
            "Poller started (interval: {})",
            format_interval(self.config.interval)
        );

        loop {
            tokio::select! {
                _ = tokio::time::sleep(self.config.interval) => {}
                _ = stopped(&mut stop) => break,
            }

            tokio::select! {
                report = self.run_cycle() => {
                    debug!(
                        "Poll cycle done: {} feeds, {} new posts, {} errors",
                        report.feeds, report.new_posts, report.errors
                    );
                }
                _ = stopped(&mut stop) => break,
            }
        }

        info!("Poller stopped");
    }

    /// Fetch every stored feed concurrently and merge what is new.
    ///
    /// Each response is reconciled against the store as it is at merge time,
    /// so posts merged meanwhile by a submission are never duplicated or lost.
    pub async fn run_cycle(&self) -> CycleReport {
        let urls: Vec<String> = self
            .store
            .read(|state| state.feed.feeds.iter().map(|f| f.url.clone()).collect());

        let mut report = CycleReport {
            feeds: urls.len(),
            ..CycleReport::default()
        };

        for (url, result) in fetch_all(self.fetcher.clone(), urls).await {
            let merged = result
                .and_then(|body| self.parser.parse(&url, &body))
                .map(|parsed| self.store.merge(parsed));

            match merged {
                Ok(outcome) => {
                    report.new_feeds += outcome.new_feeds;
                    report.updated_feeds += outcome.updated_feeds;
                    report.new_posts += outcome.new_posts;
                    if outcome.new_posts > 0 {
                        info!("{} new posts from {}", outcome.new_posts, url);
                    }
                }
                Err(e) => {
                    report.errors += 1;
                    warn!("Failed to update {}: {}", url, e);
                }
            }
        }

        self.store.record_poll_cycle();
        report
    }
}

/// Resolves once a stop is requested. A dropped handle never resolves it.
async fn stopped(stop: &mut watch::Receiver<bool>) {
    if stop.wait_for(|stopped| *stopped).await.is_err() {
        std::future::pending::<()>().await;
    }
}

pub struct PollerHandle {
    stop: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl PollerHandle {
    pub fn stop(&self) {
        self.stop.send_replace(true);
    }

    pub fn is_stopped(&self) -> bool {
        *self.stop.borrow()
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait for the loop to exit. Call [`stop`](Self::stop) first.
    pub async fn join(self) {
        if let Err(e) = self.task.await {
            error!("Poller task failed: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_interval() {
        assert_eq!(parse_interval("500ms").unwrap(), Duration::from_millis(500));
        assert_eq!(parse_interval("5s").unwrap(), Duration::from_secs(5));
        assert_eq!(parse_interval("30m").unwrap(), Duration::from_secs(1800));
        assert_eq!(parse_interval("1h").unwrap(), Duration::from_secs(3600));
        assert_eq!(parse_interval("1d").unwrap(), Duration::from_secs(86400));
        assert_eq!(parse_interval(" 60 ").unwrap(), Duration::from_secs(60));
        assert!(parse_interval("invalid").is_err());
        assert!(parse_interval("0s").is_err());
        assert!(parse_interval("").is_err());
    }

    #[test]
    fn test_parse_interval_rejects_overflow() {
        assert!(parse_interval("999999999999999999m").is_err());
        assert!(parse_interval("999999999999999999h").is_err());
        assert!(parse_interval("999999999999999999d").is_err());
        assert_eq!(
            parse_interval("18446744073709551615s").unwrap(),
            Duration::from_secs(u64::MAX)
        );
    }

    #[test]
    fn test_format_interval() {
        assert_eq!(format_interval(Duration::from_millis(5000)), "5s");
        assert_eq!(format_interval(Duration::from_millis(1500)), "1500ms");
        assert_eq!(format_interval(Duration::from_secs(1800)), "30m");
        assert_eq!(format_interval(Duration::from_secs(7200)), "2h");
        assert_eq!(format_interval(Duration::from_secs(86400)), "1d");
        assert_eq!(format_interval(Duration::from_secs(90)), "90s");
    }

    #[test]
    fn test_default_interval_is_five_seconds() {
        assert_eq!(PollerConfig::default().interval, Duration::from_secs(5));
    }
}
