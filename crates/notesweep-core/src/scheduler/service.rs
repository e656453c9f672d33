use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDateTime;
use tokio::sync::{mpsc, watch, Mutex};
use tracing::{debug, error, info, warn};

use crate::config::AppConfig;
use crate::store::DocumentStore;
use crate::vault::DefaultFolder;
use crate::{Error, Result};

use super::tasks::{clean_folder, CleanupReport};

/// Source of the current local time
pub type Clock = Arc<dyn Fn() -> NaiveDateTime + Send + Sync>;

/// Events emitted by the scheduler to notify the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchedulerEvent {
    /// Neither the config nor the vault names a folder
    FolderNotConfigured,
    /// The configured folder does not exist
    FolderNotFound { path: String },
    /// A cleanup run completed
    Finished { report: CleanupReport },
    /// A trigger arrived while a run was in progress and was dropped
    Skipped,
    /// An error occurred during a background task
    Error { task: String, message: String },
}

/// Runs cleanups on demand and on a fixed interval, never two at once
#[derive(Clone)]
pub struct SchedulerService {
    store: Arc<dyn DocumentStore>,
    config: Arc<AppConfig>,
    default_folder: Option<String>,
    clock: Clock,
    run_guard: Arc<Mutex<()>>,
    event_tx: Option<mpsc::UnboundedSender<SchedulerEvent>>,
}

impl SchedulerService {
    /// Create a new scheduler service.
    ///
    /// `default_folder` is asked once, here; its answer is used whenever the
    /// config does not name a folder.
    pub fn new(
        store: Arc<dyn DocumentStore>,
        config: Arc<AppConfig>,
        default_folder: DefaultFolder,
    ) -> Self {
        let default_folder = default_folder();
        if let Some(ref folder) = default_folder {
            debug!("Host default folder: {}", folder);
        }

        Self {
            store,
            config,
            default_folder,
            clock: Arc::new(|| chrono::Local::now().naive_local()),
            run_guard: Arc::new(Mutex::new(())),
            event_tx: None,
        }
    }

    /// Replace the clock (used by tests to pin "now")
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Set the event sender for user notifications
    pub fn with_event_sender(mut self, tx: mpsc::UnboundedSender<SchedulerEvent>) -> Self {
        self.event_tx = Some(tx);
        self
    }

    /// Send an event (if event channel is configured)
    fn send_event(&self, event: SchedulerEvent) {
        if let Some(ref tx) = self.event_tx {
            if tx.send(event).is_err() {
                warn!("Failed to send scheduler event: receiver dropped");
            }
        }
    }

    /// Run one cleanup now.
    ///
    /// Returns `None` without doing anything when another run is in progress.
    pub async fn clean_now(&self) -> Option<Result<CleanupReport>> {
        let Ok(_running) = self.run_guard.try_lock() else {
            warn!("Cleanup already in progress, dropping trigger");
            self.send_event(SchedulerEvent::Skipped);
            return None;
        };

        let now = (self.clock)();
        let result = clean_folder(
            self.store.as_ref(),
            &self.config.cleanup,
            self.default_folder.as_deref(),
            now,
        )
        .await;

        let event = match &result {
            Ok(report) => SchedulerEvent::Finished { report: *report },
            Err(Error::FolderNotConfigured) => SchedulerEvent::FolderNotConfigured,
            Err(Error::FolderNotFound(path)) => SchedulerEvent::FolderNotFound { path: path.clone() },
            Err(e) => SchedulerEvent::Error {
                task: "cleanup".to_string(),
                message: e.to_string(),
            },
        };
        self.send_event(event);

        Some(result)
    }

    /// Run cleanups on the configured interval until shutdown signal
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        let cleanup_secs = self.config.sync.cleanup_interval_secs;

        // Skip if scheduling is disabled (0)
        if cleanup_secs == 0 {
            info!("Background scheduler disabled (cleanup_interval_secs = 0)");
            // Still wait for shutdown
            let _ = shutdown.changed().await;
            return;
        }

        info!("Scheduler started: cleanup={}s", cleanup_secs);

        let mut cleanup_interval = tokio::time::interval(Duration::from_secs(cleanup_secs));

        // Skip the first tick (fires immediately)
        cleanup_interval.tick().await;

        loop {
            tokio::select! {
                result = shutdown.changed() => {
                    if result.is_err() || *shutdown.borrow() {
                        info!("Scheduler received shutdown signal");
                        break;
                    }
                }

                _ = cleanup_interval.tick() => {
                    debug!("Running scheduled cleanup");
                    match self.clean_now().await {
                        Some(Ok(report)) => {
                            if report.modified > 0 {
                                info!("Scheduled cleanup: {} notes cleaned", report.modified);
                            }
                        }
                        Some(Err(e)) => error!("Scheduled cleanup failed: {}", e),
                        None => {}
                    }
                }
            }
        }

        info!("Scheduler stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::tasks::tests::MemoryStore;
    use crate::store::{DocumentEntry, Folder};
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use tokio::sync::Notify;
    use tokio::time::timeout;

    const MESSY: &str = "# Empty\n\n\n# Filled\nHello\n";

    fn fixed_clock() -> Clock {
        Arc::new(|| {
            NaiveDate::from_ymd_opt(2023, 1, 10)
                .unwrap()
                .and_hms_opt(8, 0, 0)
                .unwrap()
        })
    }

    fn service(store: Arc<dyn DocumentStore>, config: AppConfig) -> (SchedulerService, mpsc::UnboundedReceiver<SchedulerEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let svc = SchedulerService::new(store, Arc::new(config), Arc::new(|| Some("Daily".to_string())))
            .with_clock(fixed_clock())
            .with_event_sender(tx);
        (svc, rx)
    }

    /// Store whose reads wait until released
    struct GatedStore {
        inner: MemoryStore,
        entered: Notify,
        release: Notify,
    }

    #[async_trait]
    impl DocumentStore for GatedStore {
        async fn resolve_folder(&self, path: &str) -> Result<Option<Folder>> {
            self.inner.resolve_folder(path).await
        }

        async fn list_documents(&self, folder: &Folder) -> Result<Vec<DocumentEntry>> {
            self.inner.list_documents(folder).await
        }

        async fn read(&self, entry: &DocumentEntry) -> Result<String> {
            self.entered.notify_one();
            self.release.notified().await;
            self.inner.read(entry).await
        }

        async fn write(&self, entry: &DocumentEntry, content: &str) -> Result<()> {
            self.inner.write(entry, content).await
        }
    }

    #[tokio::test]
    async fn test_clean_now_reports_finished() {
        let store = Arc::new(MemoryStore::with_docs("Daily", &[("2023-01-01.md", MESSY)]));
        let (svc, mut rx) = service(store.clone(), AppConfig::default());

        let report = svc.clean_now().await.unwrap().unwrap();
        assert_eq!(report.modified, 1);
        assert_eq!(store.content("Daily/2023-01-01.md"), "# Filled\nHello\n");
        assert_eq!(rx.recv().await, Some(SchedulerEvent::Finished { report }));
    }

    #[tokio::test]
    async fn test_configured_folder_overrides_default() {
        let store = Arc::new(MemoryStore::with_docs("Daily", &[("2023-01-01.md", MESSY)]));
        let mut config = AppConfig::default();
        config.cleanup.folder = Some("Journal".to_string());
        let (svc, mut rx) = service(store.clone(), config);

        assert!(svc.clean_now().await.unwrap().is_err());
        assert_eq!(
            rx.recv().await,
            Some(SchedulerEvent::FolderNotFound { path: "Journal".to_string() })
        );
        assert_eq!(store.write_count(), 0);
    }

    #[tokio::test]
    async fn test_folder_not_configured_event() {
        let store = Arc::new(MemoryStore::with_docs("Daily", &[]));
        let (tx, mut rx) = mpsc::unbounded_channel();
        let svc = SchedulerService::new(store, Arc::new(AppConfig::default()), Arc::new(|| None))
            .with_event_sender(tx);

        assert!(matches!(svc.clean_now().await, Some(Err(Error::FolderNotConfigured))));
        assert_eq!(rx.recv().await, Some(SchedulerEvent::FolderNotConfigured));
    }

    #[tokio::test]
    async fn test_overlapping_trigger_is_dropped() {
        let store = Arc::new(GatedStore {
            inner: MemoryStore::with_docs("Daily", &[("2023-01-01.md", MESSY)]),
            entered: Notify::new(),
            release: Notify::new(),
        });
        let (svc, mut rx) = service(store.clone(), AppConfig::default());

        let first = tokio::spawn({
            let svc = svc.clone();
            async move { svc.clean_now().await }
        });
        store.entered.notified().await;

        assert!(svc.clean_now().await.is_none());
        assert_eq!(rx.recv().await, Some(SchedulerEvent::Skipped));

        store.release.notify_one();
        let report = first.await.unwrap().unwrap().unwrap();
        assert_eq!(report.modified, 1);
        assert_eq!(store.inner.write_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_interval_runs_cleanup() {
        let store = Arc::new(MemoryStore::with_docs("Daily", &[("2023-01-01.md", MESSY)]));
        let (svc, mut rx) = service(store.clone(), AppConfig::default());
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let handle = tokio::spawn({
            let svc = svc.clone();
            async move { svc.run(shutdown_rx).await }
        });

        // Paused time auto-advances to the next 24h tick
        let event = rx.recv().await.unwrap();
        assert!(matches!(event, SchedulerEvent::Finished { report } if report.modified == 1));

        shutdown_tx.send(true).unwrap();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_scheduler_shutdown_when_disabled() {
        let store = Arc::new(MemoryStore::with_docs("Daily", &[]));
        let mut config = AppConfig::default();
        config.sync.cleanup_interval_secs = 0;
        let (svc, _rx) = service(store, config);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        shutdown_tx.send(true).unwrap();

        let result = timeout(Duration::from_secs(1), svc.run(shutdown_rx)).await;
        assert!(result.is_ok());
    }
}
