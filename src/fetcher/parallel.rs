use std::sync::Arc;

use crate::app::{Result, TributaryError};
use crate::fetcher::Fetcher;

/// Fetch every url at once and wait for all of them.
///
/// Each request runs in its own task, so no request waits on another.
/// Results come back in input order, one per url.
pub async fn fetch_all(
    fetcher: Arc<dyn Fetcher + Send + Sync>,
    urls: Vec<String>,
) -> Vec<(String, Result<String>)> {
    let mut handles = Vec::with_capacity(urls.len());

    for url in urls {
        let fetcher = fetcher.clone();
        let target = url.clone();
        let handle = tokio::spawn(async move { fetcher.fetch(&target).await });
        handles.push((url, handle));
    }

    let mut results = Vec::with_capacity(handles.len());
    for (url, handle) in handles {
        let result = match handle.await {
            Ok(result) => result,
            Err(e) => {
                tracing::error!("Fetch task join error for {}: {}", url, e);
                Err(TributaryError::Network(format!("fetch task failed: {}", e)))
            }
        };
        results.push((url, result));
    }

    results
}
