//! # Persistence adapter for Tessera Core
//!
//! One-way, fire-and-forget submission of committed layouts to the dashboard
//! backend. The gesture state machine never awaits a submission: position
//! batches are debounced (bursts of rapid changes collapse into one request
//! after a quiet interval) and size patches go out immediately on resize
//! end. Failures are logged and dropped; the in-memory grid is not rolled
//! back, and the client and backend may diverge until the next full rebuild,
//! which is the only reconciliation mechanism.

use crate::config::PersistenceConfig;
use crate::{Error, Result};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tessera_panel_api::{PanelDescriptor, PositionBatch};
use tokio::sync::Mutex;
use tracing::{debug, error};

/// Backend operations the engine needs from the panel API.
///
/// The engine only writes placements and reads the layout document; panel
/// CRUD, storage and tasks belong to other surfaces.
#[async_trait]
pub trait PanelStore: Send + Sync {
    /// Batch-commit panel positions after a drag, resize or compact-all.
    async fn submit_positions(&self, dashboard_id: &str, batch: &PositionBatch) -> Result<()>;

    /// Commit a single panel's new size as a `"WxH"` token.
    async fn submit_size(&self, panel_id: &str, size: &str) -> Result<()>;

    /// Fetch the layout document the grid is built from.
    async fn fetch_layout(&self, dashboard_id: &str) -> Result<Vec<PanelDescriptor>>;
}

/// [`PanelStore`] over the dashboard's REST API.
pub struct HttpPanelStore {
    client: reqwest::Client,
    base_url: String,
}

impl HttpPanelStore {
    /// Create a store for the given backend base URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new<S: Into<String>>(base_url: S, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self { client, base_url })
    }

    /// Create a store from the persistence configuration group.
    pub fn from_config(config: &PersistenceConfig) -> Result<Self> {
        Self::new(
            config.base_url.clone(),
            Duration::from_secs(config.request_timeout_secs),
        )
    }
}

#[async_trait]
impl PanelStore for HttpPanelStore {
    async fn submit_positions(&self, dashboard_id: &str, batch: &PositionBatch) -> Result<()> {
        let url = format!(
            "{}/api/panels/positions?dashboard_id={}",
            self.base_url, dashboard_id
        );
        let response = self.client.post(&url).json(batch).send().await?;

        if !response.status().is_success() {
            return Err(Error::persistence(format!(
                "position save rejected: HTTP {}",
                response.status()
            )));
        }
        Ok(())
    }

    async fn submit_size(&self, panel_id: &str, size: &str) -> Result<()> {
        let url = format!("{}/api/panels/{}", self.base_url, panel_id);
        let response = self
            .client
            .patch(&url)
            .json(&serde_json::json!({ "size": size }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Error::persistence(format!(
                "size save rejected: HTTP {}",
                response.status()
            )));
        }
        Ok(())
    }

    async fn fetch_layout(&self, dashboard_id: &str) -> Result<Vec<PanelDescriptor>> {
        let url = format!("{}/api/panels?dashboard_id={}", self.base_url, dashboard_id);
        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(Error::persistence(format!(
                "layout fetch rejected: HTTP {}",
                response.status()
            )));
        }
        Ok(response.json().await?)
    }
}

/// Debounced, fire-and-forget submission front for a [`PanelStore`].
///
/// Position batches queued in quick succession collapse to the latest one;
/// a single request goes out once the debounce interval passes quietly.
/// Submission requires a tokio runtime (tasks are spawned, never awaited by
/// the caller).
///
/// # Example
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use std::time::Duration;
/// use tessera_core::persistence::{HttpPanelStore, PersistenceAdapter};
///
/// let store = HttpPanelStore::new("http://localhost:8000", Duration::from_secs(30)).unwrap();
/// let adapter = PersistenceAdapter::new(Arc::new(store), "default");
/// ```
#[derive(Clone)]
pub struct PersistenceAdapter {
    store: Arc<dyn PanelStore>,
    dashboard_id: String,
    debounce: Duration,
    pending: Arc<Mutex<Option<PositionBatch>>>,
    flush_scheduled: Arc<AtomicBool>,
}

impl PersistenceAdapter {
    /// Create an adapter for one dashboard with the default 300 ms debounce.
    pub fn new<S: Into<String>>(store: Arc<dyn PanelStore>, dashboard_id: S) -> Self {
        Self {
            store,
            dashboard_id: dashboard_id.into(),
            debounce: Duration::from_millis(300),
            pending: Arc::new(Mutex::new(None)),
            flush_scheduled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Override the debounce interval.
    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    /// The dashboard this adapter writes to.
    pub fn dashboard_id(&self) -> &str {
        &self.dashboard_id
    }

    /// Queue a position batch for debounced submission.
    ///
    /// Replaces any batch still waiting; the latest snapshot wins. Returns
    /// immediately; the request happens on a spawned task after the quiet
    /// interval, and a failure is logged, not retried.
    pub fn queue_positions(&self, batch: PositionBatch) {
        let store = Arc::clone(&self.store);
        let pending = Arc::clone(&self.pending);
        let flush_scheduled = Arc::clone(&self.flush_scheduled);
        let dashboard_id = self.dashboard_id.clone();
        let debounce = self.debounce;

        tokio::spawn(async move {
            {
                let mut slot = pending.lock().await;
                *slot = Some(batch);
            }

            // A flush is already waiting; it will pick up the new batch.
            if flush_scheduled.swap(true, Ordering::SeqCst) {
                return;
            }

            tokio::time::sleep(debounce).await;
            flush_scheduled.store(false, Ordering::SeqCst);

            let batch = pending.lock().await.take();
            if let Some(batch) = batch {
                debug!("submitting positions for {} panels", batch.len());
                if let Err(e) = store.submit_positions(&dashboard_id, &batch).await {
                    error!("Failed to save panel positions: {}", e);
                }
            }
        });
    }

    /// Submit a panel's new size immediately on a spawned task.
    pub fn save_size<S: Into<String>>(&self, panel_id: S, size: S) {
        let store = Arc::clone(&self.store);
        let panel_id = panel_id.into();
        let size = size.into();

        tokio::spawn(async move {
            if let Err(e) = store.submit_size(&panel_id, &size).await {
                error!("Failed to save size for panel '{}': {}", panel_id, e);
            }
        });
    }

    /// Submit any pending position batch now, skipping the quiet interval.
    ///
    /// Failures are logged, matching the fire-and-forget contract.
    pub async fn flush(&self) {
        let batch = self.pending.lock().await.take();
        if let Some(batch) = batch {
            if let Err(e) = self.store.submit_positions(&self.dashboard_id, &batch).await {
                error!("Failed to save panel positions: {}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_panel_api::PositionUpdate;

    #[derive(Default)]
    struct RecordingStore {
        positions: std::sync::Mutex<Vec<(String, PositionBatch)>>,
        sizes: std::sync::Mutex<Vec<(String, String)>>,
        fail: bool,
    }

    impl RecordingStore {
        fn failing() -> Self {
            Self {
                fail: true,
                ..Default::default()
            }
        }
    }

    #[async_trait]
    impl PanelStore for RecordingStore {
        async fn submit_positions(
            &self,
            dashboard_id: &str,
            batch: &PositionBatch,
        ) -> Result<()> {
            self.positions
                .lock()
                .unwrap()
                .push((dashboard_id.to_string(), batch.clone()));
            if self.fail {
                return Err(Error::persistence("position save rejected: HTTP 500"));
            }
            Ok(())
        }

        async fn submit_size(&self, panel_id: &str, size: &str) -> Result<()> {
            self.sizes
                .lock()
                .unwrap()
                .push((panel_id.to_string(), size.to_string()));
            if self.fail {
                return Err(Error::persistence("size save rejected: HTTP 500"));
            }
            Ok(())
        }

        async fn fetch_layout(&self, _dashboard_id: &str) -> Result<Vec<PanelDescriptor>> {
            Ok(Vec::new())
        }
    }

    fn batch_of(id: &str, x: i32) -> PositionBatch {
        PositionBatch::new(vec![PositionUpdate {
            id: id.to_string(),
            x,
            y: 0,
            w: None,
            h: None,
        }])
    }

    #[tokio::test(start_paused = true)]
    async fn test_debounce_collapses_bursts_to_latest() {
        let store = Arc::new(RecordingStore::default());
        let adapter = PersistenceAdapter::new(store.clone() as Arc<dyn PanelStore>, "default")
            .with_debounce(Duration::from_millis(300));

        adapter.queue_positions(batch_of("a", 1));
        tokio::task::yield_now().await;
        adapter.queue_positions(batch_of("a", 2));
        tokio::task::yield_now().await;
        adapter.queue_positions(batch_of("a", 3));

        tokio::time::sleep(Duration::from_millis(600)).await;

        let recorded = store.positions.lock().unwrap();
        assert_eq!(recorded.len(), 1, "burst collapses to one request");
        assert_eq!(recorded[0].0, "default");
        assert_eq!(recorded[0].1.panels[0].x, 3, "latest batch wins");
    }

    #[tokio::test(start_paused = true)]
    async fn test_separate_quiet_periods_submit_separately() {
        let store = Arc::new(RecordingStore::default());
        let adapter = PersistenceAdapter::new(store.clone() as Arc<dyn PanelStore>, "default")
            .with_debounce(Duration::from_millis(100));

        adapter.queue_positions(batch_of("a", 1));
        tokio::time::sleep(Duration::from_millis(300)).await;
        adapter.queue_positions(batch_of("a", 2));
        tokio::time::sleep(Duration::from_millis(300)).await;

        assert_eq!(store.positions.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_flush_submits_pending_immediately() {
        let store = Arc::new(RecordingStore::default());
        let adapter = PersistenceAdapter::new(store.clone() as Arc<dyn PanelStore>, "main")
            .with_debounce(Duration::from_secs(60));

        adapter.queue_positions(batch_of("a", 4));
        tokio::task::yield_now().await;
        adapter.flush().await;

        let recorded = store.positions.lock().unwrap();
        assert_eq!(recorded.len(), 1);
        assert_eq!(recorded[0].0, "main");
        assert_eq!(recorded[0].1.panels[0].x, 4);
    }

    #[tokio::test]
    async fn test_save_size_is_immediate() {
        let store = Arc::new(RecordingStore::default());
        let adapter = PersistenceAdapter::new(store.clone() as Arc<dyn PanelStore>, "default");

        adapter.save_size("weather", "4x3");
        tokio::task::yield_now().await;

        let recorded = store.sizes.lock().unwrap();
        assert_eq!(recorded.as_slice(), &[("weather".into(), "4x3".into())]);
    }

    #[tokio::test]
    async fn test_failures_are_swallowed() {
        let store = Arc::new(RecordingStore::failing());
        let adapter = PersistenceAdapter::new(store.clone() as Arc<dyn PanelStore>, "default");

        adapter.queue_positions(batch_of("a", 1));
        tokio::task::yield_now().await;
        // Logged, not propagated, not retried.
        adapter.flush().await;
        adapter.save_size("a", "2x2");
        tokio::task::yield_now().await;

        assert_eq!(store.positions.lock().unwrap().len(), 1);
        assert_eq!(store.sizes.lock().unwrap().len(), 1);
    }
}
