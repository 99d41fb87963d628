//! Long-lived enrichment workers.
//!
//! One pool serves every request: the service starts it once and hands
//! [`WorkerPool`] clones to its handlers. Workers drain a single bounded
//! queue, so a full queue makes submitters wait (the only backpressure).
//! [`PoolHandle::shutdown`] closes the queue; queued tasks still run, later
//! submissions fail with [`FetchError::PoolClosed`].
//!
//! ```text
//! Aggregator ──submit──▶ task queue (bounded) ──▶ N workers ──outcome──▶ per-request channel
//! ```

use std::sync::Arc;

use tokio::sync::{Mutex, mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, timeout_at};

use super::error::{EnrichError, EnrichStage, FetchError};
use super::filter::{self, DiscardReason};
use super::source::RepositorySource;
use super::types::{DEFAULT_QUEUE_CAPACITY, DEFAULT_WORKER_COUNT, Filters, RepositorySummary, Stats};
use crate::auth::Authorization;
use crate::github::GitHubRepository;

/// Pool sizing.
#[derive(Debug, Clone)]
pub struct PoolOptions {
    /// Number of workers spawned at start.
    pub workers: usize,
    /// Capacity of the shared task queue.
    pub queue_capacity: usize,
}

impl Default for PoolOptions {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKER_COUNT,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }
}

/// Work item for one repository of one request.
#[derive(Debug)]
pub struct EnrichmentTask {
    pub auth: Authorization,
    pub filters: Filters,
    /// Listing entry to enrich.
    pub repository: GitHubRepository,
    /// Both upstream calls must finish before this instant.
    pub deadline: Instant,
    /// Where the single outcome of this task goes.
    pub outcomes: mpsc::Sender<WorkerOutcome>,
}

/// Classified result of one enrichment task.
#[derive(Debug)]
pub enum WorkerOutcome {
    /// Enriched and accepted by the filters.
    Success(Stats),
    /// Enriched but excluded by a filter. Expected, not a failure.
    Discarded {
        repository: String,
        reason: DiscardReason,
    },
    /// An upstream call failed or the deadline passed.
    Failed {
        repository: String,
        error: EnrichError,
    },
}

/// Handle for submitting tasks to the shared workers.
///
/// Cheap to clone. The queue closes once every handle is dropped, after
/// which the workers drain what is left and exit.
#[derive(Clone)]
pub struct WorkerPool {
    tasks: mpsc::Sender<EnrichmentTask>,
}

/// Owner side of the spawned workers.
#[must_use = "call `shutdown` to stop the workers"]
pub struct PoolHandle {
    handles: Vec<JoinHandle<()>>,
    stop: watch::Sender<bool>,
}

impl WorkerPool {
    /// Spawn the workers on the current tokio runtime.
    pub fn start(source: Arc<dyn RepositorySource>, options: &PoolOptions) -> (Self, PoolHandle) {
        let workers = options.workers.max(1);
        let (tx, rx) = mpsc::channel(options.queue_capacity.max(1));
        let queue = Arc::new(Mutex::new(rx));
        let (stop, stop_rx) = watch::channel(false);

        let handles = (0..workers)
            .map(|id| {
                let source = Arc::clone(&source);
                let queue = Arc::clone(&queue);
                tokio::spawn(run_worker(id, source, queue, stop_rx.clone()))
            })
            .collect();

        tracing::info!(
            workers,
            queue_capacity = options.queue_capacity,
            "Started enrichment workers"
        );

        (Self { tasks: tx }, PoolHandle { handles, stop })
    }

    /// Enqueue a task, waiting while the queue is full.
    pub async fn submit(&self, task: EnrichmentTask) -> Result<(), FetchError> {
        self.tasks
            .send(task)
            .await
            .map_err(|_| FetchError::PoolClosed)
    }
}

impl PoolHandle {
    /// Close the queue, let the workers finish what is queued, and wait for them.
    pub async fn shutdown(self) {
        tracing::info!("Stopping enrichment workers");
        self.stop.send_replace(true);
        self.join().await;
    }

    /// Wait for every worker to exit.
    ///
    /// Without [`shutdown`](Self::shutdown) this returns once all
    /// [`WorkerPool`] handles are dropped and the queue is drained.
    pub async fn join(self) {
        for handle in self.handles {
            if let Err(e) = handle.await {
                tracing::error!(error = %e, "Enrichment worker panicked");
            }
        }
        tracing::info!("Enrichment workers stopped");
    }
}

async fn run_worker(
    id: usize,
    source: Arc<dyn RepositorySource>,
    queue: Arc<Mutex<mpsc::Receiver<EnrichmentTask>>>,
    mut stop: watch::Receiver<bool>,
) {
    tracing::debug!(worker = id, "Enrichment worker started");

    loop {
        // Hold the lock only while waiting for the next task.
        let task = {
            let mut rx = queue.lock().await;
            let stopping = *stop.borrow();
            if stopping {
                // Closed queues still hand out what is buffered.
                rx.close();
                rx.recv().await
            } else {
                tokio::select! {
                    biased;

                    Ok(()) = stop.changed() => {
                        rx.close();
                        rx.recv().await
                    }
                    task = rx.recv() => task,
                }
            }
        };
        let Some(task) = task else {
            break;
        };

        let outcome = enrich(source.as_ref(), &task).await;

        // The aggregator stops listening once its deadline fires.
        if task.outcomes.send(outcome).await.is_err() {
            tracing::debug!(
                worker = id,
                repo = %task.repository.full_name(),
                "Outcome dropped, request already finished"
            );
        }
    }

    tracing::debug!(worker = id, "Enrichment worker exited");
}

/// Fetch detail and languages for one repository, then apply the filters.
///
/// Always yields exactly one outcome. No retries.
pub async fn enrich(source: &dyn RepositorySource, task: &EnrichmentTask) -> WorkerOutcome {
    let repository = task.repository.full_name();
    let failed = |error| WorkerOutcome::Failed {
        repository: repository.clone(),
        error,
    };

    if Instant::now() >= task.deadline {
        return failed(EnrichError::DeadlineExceeded {
            stage: EnrichStage::Queued,
        });
    }

    let detail = match timeout_at(
        task.deadline,
        source.get_repository(&task.repository.url, &task.auth),
    )
    .await
    {
        Ok(Ok(detail)) => detail,
        Ok(Err(e)) => return failed(EnrichError::RepositoryDetail(e)),
        Err(_) => {
            return failed(EnrichError::DeadlineExceeded {
                stage: EnrichStage::RepositoryDetail,
            });
        }
    };

    let languages = match timeout_at(
        task.deadline,
        source.get_languages(&task.repository.languages_url, &task.auth),
    )
    .await
    {
        Ok(Ok(languages)) => languages,
        Ok(Err(e)) => return failed(EnrichError::Languages(e)),
        Err(_) => {
            return failed(EnrichError::DeadlineExceeded {
                stage: EnrichStage::Languages,
            });
        }
    };

    let stats = Stats {
        repository: RepositorySummary::merge(&task.repository, &detail),
        languages,
    };

    match filter::evaluate(&stats, &task.filters) {
        Ok(()) => WorkerOutcome::Success(stats),
        Err(reason) => WorkerOutcome::Discarded { repository, reason },
    }
}
