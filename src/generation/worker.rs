// Background Generation Worker
//
// Owns an orchestrator and runs passes one at a time. Editors hold a cheap
// `GenerationHandle` and fire requests without waiting; requests that queue
// up while a pass is running are coalesced into the next pass.

use super::orchestrator::{GenerationError, GenerationOrchestrator, GenerationReport};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot, Mutex};
use tokio::task::JoinHandle;
use tokio::time::sleep;

/// Upper bound on back-to-back passes triggered by one request
const MAX_DRAIN_PASSES: usize = 16;

type Responder = oneshot::Sender<Option<GenerationReport>>;

#[derive(Debug)]
enum GenerationRequest {
    Run(Option<Responder>),
    Stop,
}

/// Sending side of a generation worker
#[derive(Debug, Clone)]
pub struct GenerationHandle {
    sender: mpsc::UnboundedSender<GenerationRequest>,
}

impl GenerationHandle {
    /// Ask for a pass without waiting for it
    ///
    /// Returns `false` if the worker has shut down.
    pub fn request(&self) -> bool {
        self.sender.send(GenerationRequest::Run(None)).is_ok()
    }

    /// Ask for a pass and wait for its report
    ///
    /// Returns `None` if the worker has shut down or the pass failed.
    pub async fn run_now(&self) -> Option<GenerationReport> {
        let (tx, rx) = oneshot::channel();
        self.sender.send(GenerationRequest::Run(Some(tx))).ok()?;
        rx.await.ok().flatten()
    }

    /// Stop the worker after any in-flight pass completes
    pub fn stop(&self) {
        let _ = self.sender.send(GenerationRequest::Stop);
    }

    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

/// Background worker
pub struct GenerationWorker {
    orchestrator: Arc<GenerationOrchestrator>,
    receiver: Mutex<mpsc::UnboundedReceiver<GenerationRequest>>,
    interval: Option<Duration>,
    running: AtomicBool,
}

impl GenerationWorker {
    /// Create a worker; the tick interval comes from the orchestrator's config
    pub fn new(orchestrator: Arc<GenerationOrchestrator>) -> (Self, GenerationHandle) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let interval = orchestrator.config().interval;
        let worker = Self {
            orchestrator,
            receiver: Mutex::new(receiver),
            interval,
            running: AtomicBool::new(false),
        };
        (worker, GenerationHandle { sender })
    }

    /// Create a worker and run it on the current tokio runtime
    pub fn spawn(orchestrator: Arc<GenerationOrchestrator>) -> (JoinHandle<()>, GenerationHandle) {
        let (worker, handle) = Self::new(orchestrator);
        let task = tokio::spawn(async move {
            if let Err(e) = worker.start().await {
                tracing::error!("Generation worker exited: {}", e);
            }
        });
        (task, handle)
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Serve requests until stopped or every handle is dropped
    pub async fn start(&self) -> Result<(), GenerationError> {
        if self.running.swap(true, Ordering::SeqCst) {
            return Err(GenerationError::AlreadyRunning);
        }

        let mut receiver = self.receiver.lock().await;
        tracing::info!("Starting generation worker (interval: {:?})", self.interval);

        loop {
            let request = match self.interval {
                Some(interval) => tokio::select! {
                    request = receiver.recv() => request,
                    _ = sleep(interval) => Some(GenerationRequest::Run(None)),
                },
                None => receiver.recv().await,
            };

            let mut responders = Vec::new();
            let mut stop = match request {
                None | Some(GenerationRequest::Stop) => true,
                Some(GenerationRequest::Run(responder)) => {
                    responders.extend(responder);
                    false
                }
            };

            if stop {
                break;
            }

            while let Ok(queued) = receiver.try_recv() {
                match queued {
                    GenerationRequest::Run(responder) => responders.extend(responder),
                    GenerationRequest::Stop => stop = true,
                }
            }

            let report = self.drain().await;
            for responder in responders {
                let _ = responder.send(report.clone());
            }

            if stop {
                break;
            }
        }

        self.running.store(false, Ordering::SeqCst);
        tracing::info!("Stopping generation worker");
        Ok(())
    }

    /// Run passes while full batches keep coming back
    async fn drain(&self) -> Option<GenerationReport> {
        let batch_size = self.orchestrator.config().batch_size;
        let mut total: Option<GenerationReport> = None;

        for _ in 0..MAX_DRAIN_PASSES {
            let report = match self.orchestrator.process_pending().await {
                Ok(report) => report,
                Err(e) => {
                    tracing::error!("Generation pass failed: {}", e);
                    break;
                }
            };

            let full = report.entries_processed >= batch_size;
            match total.as_mut() {
                Some(total) => total.merge(report),
                None => total = Some(report),
            }

            if !full {
                break;
            }
        }

        total
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GenerationConfig;
    use crate::storage::{AcronymStore, InMemoryStore};

    async fn seeded_store() -> Arc<InMemoryStore> {
        let store = Arc::new(InMemoryStore::new());
        store
            .create_entry("please run the integration test suite")
            .await
            .unwrap();
        store
            .create_entry("then run the integration test suite again")
            .await
            .unwrap();
        store
    }

    fn orchestrator(store: Arc<InMemoryStore>, config: GenerationConfig) -> Arc<GenerationOrchestrator> {
        Arc::new(GenerationOrchestrator::with_seed(store, config, 3))
    }

    #[tokio::test]
    async fn test_run_now_returns_report() {
        let store = seeded_store().await;
        let (task, handle) = GenerationWorker::spawn(orchestrator(store.clone(), GenerationConfig::default()));

        let report = handle.run_now().await.unwrap();
        assert_eq!(report.entries_processed, 2);
        assert!(!report.acronyms_created.is_empty());
        assert!(store.list_unprocessed(10).await.unwrap().is_empty());

        handle.stop();
        task.await.unwrap();
    }

    #[tokio::test]
    async fn test_drains_full_batches() {
        let store = Arc::new(InMemoryStore::new());
        for i in 0..7 {
            store.create_entry(&format!("entry {}", i)).await.unwrap();
        }

        let config = GenerationConfig {
            batch_size: 2,
            ..Default::default()
        };
        let (task, handle) = GenerationWorker::spawn(orchestrator(store.clone(), config));

        let report = handle.run_now().await.unwrap();
        assert_eq!(report.entries_processed, 7);
        assert!(store.list_unprocessed(10).await.unwrap().is_empty());

        handle.stop();
        task.await.unwrap();
    }

    #[tokio::test]
    async fn test_request_after_stop_is_rejected() {
        let store = seeded_store().await;
        let (task, handle) = GenerationWorker::spawn(orchestrator(store, GenerationConfig::default()));

        handle.stop();
        task.await.unwrap();

        assert!(!handle.request());
        assert!(handle.run_now().await.is_none());
    }

    #[tokio::test]
    async fn test_second_start_is_rejected() {
        let store = seeded_store().await;
        let (worker, handle) = GenerationWorker::new(orchestrator(store, GenerationConfig::default()));
        let worker = Arc::new(worker);

        let runner = worker.clone();
        let task = tokio::spawn(async move { runner.start().await });

        // Once a report comes back the first start owns the receiver
        assert!(handle.run_now().await.is_some());
        assert!(worker.is_running());
        assert!(matches!(worker.start().await, Err(GenerationError::AlreadyRunning)));

        handle.stop();
        assert!(task.await.unwrap().is_ok());
        assert!(!worker.is_running());
    }

    #[tokio::test]
    async fn test_periodic_tick() {
        let store = seeded_store().await;
        let config = GenerationConfig {
            interval: Some(Duration::from_millis(20)),
            ..Default::default()
        };
        let (task, handle) = GenerationWorker::spawn(orchestrator(store.clone(), config));

        sleep(Duration::from_millis(300)).await;
        assert!(store.list_unprocessed(10).await.unwrap().is_empty());

        handle.stop();
        task.await.unwrap();
    }

    #[tokio::test]
    async fn test_worker_exits_when_handles_dropped() {
        let store = seeded_store().await;
        let (task, handle) = GenerationWorker::spawn(orchestrator(store, GenerationConfig::default()));

        drop(handle);
        task.await.unwrap();
    }
}
