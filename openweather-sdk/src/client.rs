use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;

use chrono::Utc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::cache::{CacheEntry, DEFAULT_CAPACITY, WeatherCache};
use crate::error::WeatherError;
use crate::fetch::WeatherFetcher;
use crate::model::{WeatherReport, normalize};
use crate::registry::SdkRegistry;

/// Maximum age in seconds a cached entry may have before a lookup refetches.
pub const FRESHNESS_WINDOW_SECS: i64 = 600;

/// Lower bound in seconds applied to caller-supplied polling intervals.
pub const MIN_POLL_INTERVAL_SECS: u64 = 60;

/// Refresh strategy for a client's cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Entries are refetched only when a lookup finds them stale.
    OnDemand,
    /// A background task refetches every cached city on a fixed period.
    Polling,
}

/// Per-API-key weather client with a bounded, freshness-aware cache.
///
/// Obtained through [`SdkRegistry::create`], which guarantees at most one
/// live client per key. In [`Mode::Polling`] a background task started at
/// construction sweeps the cache on a fixed period; [`WeatherClient::delete`]
/// stops it and unregisters the client.
#[derive(Debug)]
pub struct WeatherClient {
    api_key: String,
    mode: Mode,
    poll_interval: Duration,
    cache: WeatherCache,
    fetcher: Arc<dyn WeatherFetcher>,
    registry: Weak<SdkRegistry>,
    poll_task: Mutex<Option<JoinHandle<()>>>,
}

impl WeatherClient {
    /// Construction goes through [`SdkRegistry::create`]. Intervals below
    /// [`MIN_POLL_INTERVAL_SECS`] are silently floored.
    pub(crate) fn new(
        api_key: String,
        mode: Mode,
        poll_interval_secs: u64,
        fetcher: Arc<dyn WeatherFetcher>,
        registry: Weak<SdkRegistry>,
    ) -> Arc<Self> {
        let client = Arc::new(Self {
            api_key,
            mode,
            poll_interval: Duration::from_secs(poll_interval_secs.max(MIN_POLL_INTERVAL_SECS)),
            cache: WeatherCache::new(DEFAULT_CAPACITY),
            fetcher,
            registry,
            poll_task: Mutex::new(None),
        });
        if client.mode == Mode::Polling {
            client.spawn_polling();
        }
        client
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    fn spawn_polling(self: &Arc<Self>) {
        let weak = Arc::downgrade(self);
        let period = self.poll_interval;
        let handle = tokio::spawn(async move {
            // First tick fires immediately, then once per period.
            let mut ticker = tokio::time::interval(period);
            loop {
                ticker.tick().await;
                // Only a weak handle is held here so a dropped client ends
                // the loop instead of being kept alive by its own task.
                let Some(client) = weak.upgrade() else { break };
                client.refresh_all().await;
            }
        });
        *self.poll_task.lock().expect("poll task lock poisoned") = Some(handle);
    }

    /// Current weather for `city`, served from the cache when the entry is
    /// younger than [`FRESHNESS_WINDOW_SECS`], otherwise refetched.
    ///
    /// The fetch runs outside the cache lock. Two callers racing on the
    /// same stale city may both fetch; entries are replaced wholesale, so
    /// the last write wins. That duplicate fetch is inherited behavior,
    /// kept as-is rather than adding single-flight de-duplication.
    pub async fn get_weather(&self, city: &str) -> Result<WeatherReport, WeatherError> {
        let city = city.trim();
        if city.is_empty() {
            return Err(WeatherError::InvalidArgument(
                "city must not be blank".to_string(),
            ));
        }

        if let Some(entry) = self.cache.get(city) {
            if Utc::now().timestamp() - entry.fetched_at < FRESHNESS_WINDOW_SECS {
                return Ok(entry.report);
            }
        }

        self.fetch_and_store(city).await
    }

    async fn fetch_and_store(&self, city: &str) -> Result<WeatherReport, WeatherError> {
        let raw = self.fetcher.fetch_raw(city, &self.api_key).await?;
        let report = normalize(raw, city);
        self.cache.put(
            city.to_owned(),
            CacheEntry {
                report: report.clone(),
                fetched_at: Utc::now().timestamp(),
            },
        );
        Ok(report)
    }

    /// One background sweep: refetch every city currently cached.
    ///
    /// A failure for one city is logged and skipped so the rest of the
    /// batch and the polling task itself survive.
    async fn refresh_all(&self) {
        for city in self.cache.keys() {
            if let Err(err) = self.fetch_and_store(&city).await {
                warn!(city = %city, error = %err, "background refresh failed");
            }
        }
    }

    /// Tear the client down: abort the polling task if one is running,
    /// drop all cached entries, and unregister from the owning registry.
    /// Idempotent; safe in either mode.
    pub fn delete(&self) {
        if let Some(task) = self.poll_task.lock().expect("poll task lock poisoned").take() {
            task.abort();
        }
        self.cache.clear();
        if let Some(registry) = self.registry.upgrade() {
            registry.remove(&self.api_key);
        }
        debug!("weather client deleted");
    }
}

impl Drop for WeatherClient {
    fn drop(&mut self) {
        // A client dropped without delete() must not leave its timer behind.
        if let Ok(mut slot) = self.poll_task.lock() {
            if let Some(task) = slot.take() {
                task.abort();
            }
        }
    }
}
