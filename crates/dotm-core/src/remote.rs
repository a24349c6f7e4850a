//! Remote items: fetching their content and deciding when to refresh.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Url;
use tokio::task::JoinHandle;

use crate::manager::DotfileManager;
use crate::notify::Event;
use crate::tree::{ConfigItem, ItemKind, flatten};
use crate::{Error, Result};

/// Format of `last_refresh`.
pub const LAST_REFRESH_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Retrieves remote content.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String>;
}

/// Reads `file://` URLs from disk and `http(s)://` URLs over the network.
#[derive(Clone, Default)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        let parsed = Url::parse(url).map_err(|e| fetch_error(url, e))?;

        match parsed.scheme() {
            "file" => {
                let path = parsed
                    .to_file_path()
                    .map_err(|_| fetch_error(url, "not a local file path"))?;
                tokio::fs::read_to_string(&path)
                    .await
                    .map_err(|e| fetch_error(url, e))
            }
            "http" | "https" => {
                let resp = self
                    .client
                    .get(parsed)
                    .send()
                    .await
                    .map_err(|e| fetch_error(url, e))?;
                if !resp.status().is_success() {
                    return Err(fetch_error(url, format!("HTTP {}", resp.status())));
                }
                resp.text().await.map_err(|e| fetch_error(url, e))
            }
            other => Err(fetch_error(url, format!("unsupported scheme '{other}'"))),
        }
    }
}

fn fetch_error(url: &str, e: impl ToString) -> Error {
    Error::Fetch {
        url: url.to_string(),
        message: e.to_string(),
    }
}

fn is_http_url(url: &str) -> bool {
    let lower = url.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Whether a scheduled tick should refresh `item` at `now_ms`.
///
/// Only items with a positive interval and an `http(s)` URL take part;
/// `file://` items refresh on demand only.
pub fn needs_refresh(item: &ConfigItem, now_ms: i64) -> bool {
    let Some(interval) = item.refresh_interval.filter(|i| *i > 0) else {
        return false;
    };
    if !item.url.as_deref().is_some_and(is_http_url) {
        return false;
    }
    match item.last_refresh_ms {
        None | Some(0) => true,
        Some(last) => (now_ms - last) / 1000 >= interval as i64,
    }
}

/// Remote items due for a refresh at `now_ms`.
pub fn due_items(tree: &[ConfigItem], now_ms: i64) -> Vec<String> {
    flatten(tree)
        .into_iter()
        .filter(|i| i.kind == ItemKind::Remote && needs_refresh(i, now_ms))
        .map(|i| i.id.clone())
        .collect()
}

/// Runs scheduled refreshes on a fixed interval.
pub struct RefreshScheduler;

impl RefreshScheduler {
    /// Spawn the refresh loop on the current tokio runtime.
    ///
    /// Each tick makes one attempt per due remote item, then announces a
    /// list reload. Failures are logged and retried on a later tick.
    pub fn spawn(manager: Arc<DotfileManager>, period: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            // The first tick completes immediately
            ticker.tick().await;
            loop {
                ticker.tick().await;
                Self::tick(&manager).await;
            }
        })
    }

    /// One scheduled pass. Returns how many items were refreshed.
    pub async fn tick(manager: &DotfileManager) -> usize {
        let now = chrono::Utc::now().timestamp_millis();
        let due = match manager.list() {
            Ok(doc) => due_items(&doc.list, now),
            Err(e) => {
                tracing::warn!(error = %e, "Cannot load tree for scheduled refresh");
                return 0;
            }
        };

        let mut refreshed = 0;
        for id in due {
            match manager.refresh_remote(&id).await {
                Ok(_) => refreshed += 1,
                Err(e) => tracing::warn!(id = %id, code = e.code(), error = %e, "Scheduled refresh failed"),
            }
        }

        manager.notifier().notify(Event::ListReloaded);
        refreshed
    }
}
