//! Three-state loading of a webhook-backed board.
//!
//! A [`Board`] owns one webhook URL and the normaliser for its payload. Its
//! state is `Loading` until the first fetch completes, then `Ready` or
//! `Failed`. A fetch is only started on explicit request (service start or a
//! reload) and never while another one is still running.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{error, info};

use crate::error::Result;
use crate::fetcher::fetch_json;

#[derive(Debug, Clone, PartialEq)]
pub enum LoadState<T> {
    Loading,
    Ready { data: T, fetched_at: DateTime<Utc> },
    Failed { message: String },
}

pub type Normalize<T> = fn(&Value) -> Result<T>;

#[derive(Clone)]
pub struct Board<T> {
    name: &'static str,
    url: String,
    normalize: Normalize<T>,
    failure_prefix: &'static str,
    state: Arc<RwLock<LoadState<T>>>,
    in_flight: Arc<AtomicBool>,
}

impl<T> Board<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// `failure_prefix` opens the user-visible message shown when a load fails.
    pub fn new(name: &'static str, url: impl Into<String>, normalize: Normalize<T>, failure_prefix: &'static str) -> Self {
        Self {
            name,
            url: url.into(),
            normalize,
            failure_prefix,
            state: Arc::new(RwLock::new(LoadState::Loading)),
            in_flight: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub async fn snapshot(&self) -> LoadState<T> {
        self.state.read().await.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Fetches and normalises the webhook, waiting for the result.
    /// Returns `false` without doing anything if a fetch is already running.
    pub async fn refresh(&self) -> bool {
        if !self.begin() {
            info!(board = self.name, "fetch already in flight, ignoring refresh");
            return false;
        }
        self.load().await;
        true
    }

    /// Same as [`Board::refresh`] but runs the fetch on a background task.
    pub fn spawn_refresh(&self) -> bool {
        if !self.begin() {
            info!(board = self.name, "fetch already in flight, ignoring refresh");
            return false;
        }
        let board = self.clone();
        tokio::spawn(async move { board.load().await });
        true
    }

    fn begin(&self) -> bool {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    async fn load(&self) {
        *self.state.write().await = LoadState::Loading;
        info!(board = self.name, url = %self.url, "fetching webhook");
        let start_time = std::time::Instant::now();

        let result = fetch_json(&self.url).await.and_then(|body| (self.normalize)(&body));

        let next = match result {
            Ok(data) => {
                info!(board = self.name, elapsed = ?start_time.elapsed(), "webhook loaded");
                LoadState::Ready { data, fetched_at: Utc::now() }
            }
            Err(err) => {
                error!(board = self.name, error = %err, "webhook load failed");
                LoadState::Failed {
                    message: format!("{} Détail: {}", self.failure_prefix, err),
                }
            }
        };

        *self.state.write().await = next;
        self.in_flight.store(false, Ordering::Release);
    }
}
