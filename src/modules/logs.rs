//! Contract log watcher

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use alloy::primitives::Address;

use crate::infrastructure::ethereum::{EthereumProvider, LogEntry};

use super::watch::{Scope, WatchHandle};

pub const DEFAULT_LOG_LIMIT: usize = 100;

/// Most recent logs, oldest first, never more than `limit`
#[derive(Debug, Clone)]
pub struct LogBuffer {
    entries: VecDeque<LogEntry>,
    limit: usize,
}

impl LogBuffer {
    pub fn new(limit: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            limit,
        }
    }

    pub fn extend(&mut self, logs: impl IntoIterator<Item = LogEntry>) {
        for log in logs {
            self.entries.push_back(log);
            if self.entries.len() > self.limit {
                self.entries.pop_front();
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn to_vec(&self) -> Vec<LogEntry> {
        self.entries.iter().cloned().collect()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct WatchConfig {
    pub limit: usize,
    pub poll_interval: Duration,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LOG_LIMIT,
            poll_interval: Duration::from_secs(1),
        }
    }
}

/// Watch logs emitted by `address`.
///
/// Fetches everything up to the current head first, then on every new block
/// fetches `(previous, latest]`. `on_update` receives the retained logs after
/// each change and never runs once the returned handle is dropped.
pub fn watch_logs(
    provider: Arc<dyn EthereumProvider>,
    address: Address,
    config: WatchConfig,
    on_update: impl FnMut(Vec<LogEntry>) + Send + 'static,
) -> WatchHandle {
    WatchHandle::spawn(move |scope| run_watch(provider, address, config, scope, on_update))
}

async fn run_watch(
    provider: Arc<dyn EthereumProvider>,
    address: Address,
    config: WatchConfig,
    scope: Scope,
    mut on_update: impl FnMut(Vec<LogEntry>) + Send + 'static,
) {
    tracing::info!(%address, limit = config.limit, "log watch started");
    let mut buffer = LogBuffer::new(config.limit);
    let mut fetched_to: Option<u64> = None;

    while scope.is_live() {
        match provider.block_number().await {
            Ok(latest) if fetched_to.map_or(true, |prev| latest > prev) => {
                let from = fetched_to.map_or(0, |prev| prev + 1);
                if !scope.is_live() {
                    break;
                }
                match provider.get_logs(address, from, latest).await {
                    Ok(logs) => {
                        let changed = !logs.is_empty() || fetched_to.is_none();
                        buffer.extend(logs);
                        fetched_to = Some(latest);
                        if changed {
                            let snapshot = buffer.to_vec();
                            scope.emit(|| on_update(snapshot));
                        }
                    }
                    Err(err) => {
                        tracing::warn!(%address, from, to = latest, "log fetch failed: {err:#}");
                    }
                }
            }
            Ok(_) => {}
            Err(err) => tracing::warn!(%address, "block number failed: {err:#}"),
        }
        tokio::time::sleep(config.poll_interval).await;
    }
    tracing::info!(%address, "log watch stopped");
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use super::*;
    use crate::infrastructure::ethereum::mock::{log_at, MockProvider};

    fn config() -> WatchConfig {
        WatchConfig {
            limit: DEFAULT_LOG_LIMIT,
            poll_interval: Duration::from_millis(5),
        }
    }

    #[test]
    fn test_buffer_keeps_most_recent() {
        let address = Address::with_last_byte(1);
        let mut buffer = LogBuffer::new(3);
        buffer.extend((0..5).map(|i| log_at(address, i, 0)));
        let blocks: Vec<_> = buffer.to_vec().iter().map(|l| l.block_number).collect();
        assert_eq!(blocks, vec![Some(2), Some(3), Some(4)]);
    }

    #[tokio::test]
    async fn test_watch_never_retains_more_than_limit() {
        let address = Address::with_last_byte(1);
        let provider = Arc::new(MockProvider::new(31337));
        provider.with(|s| {
            s.block_number = 10;
            s.logs = (0..=10)
                .flat_map(|block| (0..30).map(move |i| log_at(address, block, i)))
                .collect();
        });

        let sizes = Arc::new(Mutex::new(Vec::new()));
        let seen = sizes.clone();
        let handle = watch_logs(provider.clone(), address, config(), move |logs| {
            seen.lock().unwrap().push(logs.len());
        });

        tokio::time::sleep(Duration::from_millis(30)).await;
        // a burst of 500 logs in one new block
        provider.with(|s| {
            s.block_number = 11;
            s.logs.extend((0..500).map(|i| log_at(address, 11, i)));
        });
        tokio::time::sleep(Duration::from_millis(30)).await;
        drop(handle);

        let sizes = sizes.lock().unwrap();
        assert!(sizes.len() >= 2);
        assert!(sizes.iter().all(|n| *n <= DEFAULT_LOG_LIMIT));
    }

    #[tokio::test]
    async fn test_incremental_ranges() {
        let address = Address::with_last_byte(1);
        let other = Address::with_last_byte(2);
        let provider = Arc::new(MockProvider::new(31337));
        provider.with(|s| {
            s.block_number = 2;
            s.logs = vec![log_at(address, 1, 0), log_at(other, 2, 0)];
        });

        let latest = Arc::new(Mutex::new(Vec::new()));
        let seen = latest.clone();
        let _handle = watch_logs(provider.clone(), address, config(), move |logs| {
            *seen.lock().unwrap() = logs;
        });
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(latest.lock().unwrap().len(), 1);

        provider.with(|s| {
            s.logs.push(log_at(address, 3, 0));
            s.block_number = 3;
        });
        tokio::time::sleep(Duration::from_millis(20)).await;
        let blocks: Vec<_> = latest.lock().unwrap().iter().map(|l| l.block_number).collect();
        assert_eq!(blocks, vec![Some(1), Some(3)]);
    }

    #[tokio::test]
    async fn test_no_fetch_or_callback_after_drop() {
        let address = Address::with_last_byte(1);
        let provider = Arc::new(MockProvider::new(31337));
        provider.with(|s| s.block_number = 1);

        let callbacks = Arc::new(AtomicUsize::new(0));
        let seen = callbacks.clone();
        let handle = watch_logs(provider.clone(), address, config(), move |_| {
            seen.fetch_add(1, Ordering::SeqCst);
        });
        tokio::time::sleep(Duration::from_millis(20)).await;
        drop(handle);

        let fetches = provider.log_fetches();
        let fired = callbacks.load(Ordering::SeqCst);
        provider.with(|s| {
            s.block_number = 5;
            s.logs.push(log_at(address, 5, 0));
        });
        tokio::time::sleep(Duration::from_millis(30)).await;

        assert_eq!(provider.log_fetches(), fetches);
        assert_eq!(callbacks.load(Ordering::SeqCst), fired);
    }
}
