use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tracing::debug;

use crate::client::{Mode, WeatherClient};
use crate::error::WeatherError;
use crate::fetch::{OpenWeatherFetcher, WeatherFetcher};

/// Table of live clients, one per API key.
///
/// An explicit object rather than process-global state, so tests and
/// embedders can run independent registries side by side. Typical use is
/// one registry constructed at process start.
#[derive(Debug, Default)]
pub struct SdkRegistry {
    clients: Mutex<HashMap<String, Arc<WeatherClient>>>,
    /// Fetch capability handed to every client this registry constructs;
    /// `None` means each client gets its own production HTTP fetcher.
    fetcher: Option<Arc<dyn WeatherFetcher>>,
}

impl SdkRegistry {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Registry whose clients use `fetcher` instead of the production
    /// HTTP transport.
    pub fn with_fetcher(fetcher: Arc<dyn WeatherFetcher>) -> Arc<Self> {
        Arc::new(Self {
            clients: Mutex::new(HashMap::new()),
            fetcher: Some(fetcher),
        })
    }

    /// Return the client for `api_key`, constructing it at most once.
    ///
    /// The first successful call for a key fixes the client's mode and
    /// interval; later calls get the existing instance and their arguments
    /// are ignored. Construction runs under the table lock, so concurrent
    /// callers for an unseen key all observe the same instance, and a
    /// failed construction leaves no entry behind and can be retried.
    ///
    /// Must run inside a tokio runtime when `mode` is [`Mode::Polling`],
    /// since the polling task is spawned at construction.
    pub fn create(
        self: &Arc<Self>,
        api_key: &str,
        mode: Mode,
        poll_interval_secs: u64,
    ) -> Result<Arc<WeatherClient>, WeatherError> {
        let api_key = api_key.trim();
        if api_key.is_empty() {
            return Err(WeatherError::InvalidArgument(
                "API key must not be blank".to_string(),
            ));
        }

        let mut clients = self.clients.lock().expect("registry lock poisoned");
        if let Some(existing) = clients.get(api_key) {
            return Ok(Arc::clone(existing));
        }

        let fetcher: Arc<dyn WeatherFetcher> = match &self.fetcher {
            Some(fetcher) => Arc::clone(fetcher),
            None => Arc::new(OpenWeatherFetcher::new()?),
        };
        let client = WeatherClient::new(
            api_key.to_owned(),
            mode,
            poll_interval_secs,
            fetcher,
            Arc::downgrade(self),
        );
        clients.insert(api_key.to_owned(), Arc::clone(&client));
        debug!(mode = ?mode, "registered weather client");
        Ok(client)
    }

    /// Drop the entry for `api_key`; a no-op when absent. Stopping the
    /// client's background task is the client's own job, done in
    /// [`WeatherClient::delete`] before it requests removal.
    pub fn remove(&self, api_key: &str) {
        self.clients
            .lock()
            .expect("registry lock poisoned")
            .remove(api_key);
    }

    pub fn len(&self) -> usize {
        self.clients.lock().expect("registry lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
