use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::blocking::Client;

use super::loader::{self, LoadError, LoadState};
use super::model::Dataset;

// ---------------------------------------------------------------------------
// Fetcher – raw text over the network
// ---------------------------------------------------------------------------

/// Source of raw response bodies. Implemented over HTTP for the app and by
/// in-memory fakes in tests.
pub trait Fetcher: Send + Sync {
    fn fetch_text(&self, url: &str) -> Result<String, LoadError>;
}

/// Blocking reqwest client; only ever called from worker threads.
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .context("building HTTP client")?;
        Ok(Self { client })
    }
}

impl Fetcher for HttpFetcher {
    fn fetch_text(&self, url: &str) -> Result<String, LoadError> {
        let response = self.client.get(url).send().map_err(network_error)?;
        let status = response.status();
        if !status.is_success() {
            return Err(LoadError::Network(format!("HTTP error! status: {status}")));
        }
        response.text().map_err(network_error)
    }
}

fn network_error(e: reqwest::Error) -> LoadError {
    if e.is_timeout() {
        LoadError::Timeout
    } else {
        LoadError::Network(e.to_string())
    }
}

// ---------------------------------------------------------------------------
// DatasetLoader – background fetch with a stale-response guard
// ---------------------------------------------------------------------------

/// Called from a worker thread after it has posted its result.
pub type Notify = Arc<dyn Fn() + Send + Sync>;

/// A finished fetch, tagged with the generation it was started under.
#[derive(Debug)]
pub struct Completion {
    pub generation: u64,
    pub url: String,
    pub result: Result<Dataset, LoadError>,
}

/// Runs each timetable fetch on its own thread.
///
/// Every [`request`](Self::request) bumps a generation counter; a completion
/// is only applied when its tag equals the current generation. Superseded
/// fetches are not cancelled, their results are dropped on arrival.
pub struct DatasetLoader {
    fetcher: Arc<dyn Fetcher>,
    generation: u64,
    current_url: String,
    tx: Sender<Completion>,
    rx: Receiver<Completion>,
    notify: Option<Notify>,
}

impl DatasetLoader {
    pub fn new(fetcher: Arc<dyn Fetcher>) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            fetcher,
            generation: 0,
            current_url: String::new(),
            tx,
            rx,
            notify: None,
        }
    }

    /// Install a wake-up hook (the UI uses it to request a repaint).
    pub fn with_notify(mut self, notify: Notify) -> Self {
        self.notify = Some(notify);
        self
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// URL of the most recent request; empty when nothing is selected.
    pub fn current_url(&self) -> &str {
        &self.current_url
    }

    /// Start loading `url`, superseding anything in flight, and return the
    /// state to show until the result arrives.
    ///
    /// The empty URL means "no selection": nothing is fetched.
    pub fn request(&mut self, url: &str) -> LoadState {
        self.generation += 1;
        self.current_url = url.to_string();

        if url.is_empty() {
            return LoadState::NoSourceSelected;
        }

        log::info!("Loading timetable {url} (request #{})", self.generation);

        let generation = self.generation;
        let fetcher = Arc::clone(&self.fetcher);
        let tx = self.tx.clone();
        let notify = self.notify.clone();
        let target = url.to_string();

        let spawned = thread::Builder::new()
            .name(format!("fetch-{generation}"))
            .spawn(move || {
                let result = loader::load(fetcher.as_ref(), &target);
                // A closed channel means the view is gone; nothing to report to.
                let _ = tx.send(Completion {
                    generation,
                    url: target,
                    result,
                });
                if let Some(notify) = notify {
                    notify();
                }
            });

        match spawned {
            Ok(_) => LoadState::Loading {
                url: url.to_string(),
            },
            Err(e) => {
                log::error!("Failed to spawn fetch thread: {e}");
                LoadState::LoadFailed(LoadError::Network(format!("could not start request: {e}")))
            }
        }
    }

    /// Turn a completion into a state, or `None` if a newer request exists.
    pub fn accept(&self, completion: Completion) -> Option<LoadState> {
        if completion.generation != self.generation {
            log::debug!(
                "Discarding stale response for {} (request #{}, current #{})",
                completion.url,
                completion.generation,
                self.generation
            );
            return None;
        }

        match &completion.result {
            Ok(ds) => log::info!(
                "Loaded {} rows with columns {:?} from {}",
                ds.len(),
                ds.columns,
                completion.url
            ),
            Err(e) => log::warn!("Failed to load {}: {e}", completion.url),
        }

        Some(LoadState::from_result(completion.result))
    }

    /// Drain finished fetches without blocking. Returns the state for the
    /// current request once it has arrived.
    pub fn poll(&mut self) -> Option<LoadState> {
        let mut latest = None;
        while let Ok(completion) = self.rx.try_recv() {
            if let Some(state) = self.accept(completion) {
                latest = Some(state);
            }
        }
        latest
    }
}
