//! # Application State
//!
//! Shared state for the Axum application, passed to all route handlers
//! via the `State` extractor.
//!
//! Everything here is either read-only after construction (configuration,
//! the translator pipeline) or a collaborator that manages its own
//! synchronization (the product repository, the metrics handle).

use std::fmt;
use std::sync::Arc;

use catalog_core::StatusPhrases;
use metrics_exporter_prometheus::PrometheusHandle;
use parking_lot::RwLock;
use uuid::Uuid;

use crate::config::Config;
use crate::middleware::translate::Pipeline;
use crate::product::Product;
use crate::repository::ProductRepository;

// -- Generic In-Memory Store --------------------------------------------------

/// Thread-safe, cloneable, insertion-ordered in-memory store.
///
/// All operations are synchronous (the RwLock is `parking_lot`, not
/// `tokio::sync`) because the lock is never held across `.await` points.
/// Ids are not unique keys: inserting an existing id appends a second
/// record, which lookups then report.
#[derive(Debug)]
pub struct Store<T: Clone + Send + Sync> {
    data: Arc<RwLock<Vec<(Uuid, T)>>>,
}

impl<T: Clone + Send + Sync> Clone for Store<T> {
    fn clone(&self) -> Self {
        Self {
            data: Arc::clone(&self.data),
        }
    }
}

impl<T: Clone + Send + Sync> Store<T> {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            data: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Append a record.
    pub fn insert(&self, id: Uuid, value: T) {
        self.data.write().push((id, value));
    }

    /// Every record stored under `id`, in insertion order.
    pub fn find(&self, id: &Uuid) -> Vec<T> {
        self.data
            .read()
            .iter()
            .filter(|(key, _)| key == id)
            .map(|(_, value)| value.clone())
            .collect()
    }

    /// Up to `limit` records after skipping `offset`.
    pub fn slice(&self, offset: usize, limit: usize) -> Vec<T> {
        self.data
            .read()
            .iter()
            .skip(offset)
            .take(limit)
            .map(|(_, value)| value.clone())
            .collect()
    }

    /// Return the number of records.
    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.data.read().is_empty()
    }
}

impl<T: Clone + Send + Sync> Default for Store<T> {
    fn default() -> Self {
        Self::new()
    }
}

// -- Application State --------------------------------------------------------

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub products: Arc<dyn ProductRepository>,
    pub pipeline: Pipeline,
    pub config: Arc<Config>,
    /// Present when a Prometheus recorder is installed.
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    /// State with default configuration and an empty in-memory store.
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// State for `config` with an empty in-memory store.
    pub fn with_config(config: Config) -> Self {
        Self::with_repository(config, Arc::new(Store::<Product>::new()))
    }

    /// State for `config` backed by `products`.
    pub fn with_repository(config: Config, products: Arc<dyn ProductRepository>) -> Self {
        Self {
            products,
            pipeline: Pipeline::new(StatusPhrases::new(), config.response_meta),
            config: Arc::new(config),
            metrics: None,
        }
    }

    /// Replace the status phrase table used for private errors.
    pub fn with_phrases(mut self, phrases: StatusPhrases) -> Self {
        self.pipeline = Pipeline::new(phrases, self.config.response_meta);
        self
    }

    /// Serve `/metrics` from `handle`.
    pub fn with_metrics(mut self, handle: Option<PrometheusHandle>) -> Self {
        self.metrics = handle;
        self
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState")
            .field("products", &self.products)
            .field("pipeline", &self.pipeline)
            .field("config", &self.config)
            .field("metrics", &self.metrics.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_keeps_insertion_order() {
        let store = Store::new();
        let ids: Vec<Uuid> = (0..5).map(|_| Uuid::new_v4()).collect();
        for (i, id) in ids.iter().enumerate() {
            store.insert(*id, i);
        }
        assert_eq!(store.len(), 5);
        assert_eq!(store.slice(1, 2), vec![1, 2]);
        assert_eq!(store.slice(4, 10), vec![4]);
        assert!(store.slice(5, 10).is_empty());
    }

    #[test]
    fn store_reports_duplicate_ids() {
        let store = Store::new();
        let id = Uuid::new_v4();
        store.insert(id, "first");
        store.insert(id, "second");
        assert_eq!(store.find(&id), vec!["first", "second"]);
        assert!(store.find(&Uuid::new_v4()).is_empty());
    }

    #[test]
    fn clones_share_data() {
        let store = Store::new();
        let clone = store.clone();
        store.insert(Uuid::new_v4(), 1u8);
        assert_eq!(clone.len(), 1);
        assert!(!clone.is_empty());
    }

    #[test]
    fn state_follows_config() {
        let config = Config {
            response_meta: false,
            ..Config::default()
        };
        let state = AppState::with_config(config);
        assert!(!state.config.response_meta);
        assert!(state.metrics.is_none());
    }
}
