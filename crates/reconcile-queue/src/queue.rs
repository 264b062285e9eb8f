use std::hash::Hash;
use std::mem;
use std::sync::{Mutex, PoisonError};

use reconcile_diff::{SectionedConfig, SectionedDiff};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, trace};

use crate::config::QueueConfig;
use crate::error::{QueueError, QueueResult};

struct Job<S, SI, It, II> {
    old: Vec<S>,
    new: Vec<S>,
    reply: oneshot::Sender<QueueResult<SectionedDiff<S, SI, It, II>>>,
}

/// Compute one sectioned diff on tokio's blocking pool.
pub async fn calculate<S, SI, It, II>(
    old: Vec<S>,
    new: Vec<S>,
    config: SectionedConfig<S, SI, It, II>,
) -> QueueResult<SectionedDiff<S, SI, It, II>>
where
    S: Clone + Send + 'static,
    SI: Hash + Eq + Clone + Send + 'static,
    It: Clone + Send + 'static,
    II: Hash + Eq + Clone + Send + 'static,
{
    let diff = tokio::task::spawn_blocking(move || SectionedDiff::new(old, new, &config)).await?;
    Ok(diff)
}

/// Serialized diff computation for one logical stream of snapshots.
///
/// A single worker task takes requests in submission order and runs each
/// diff on the blocking pool, never starting one before the previous one
/// finished. The queue also tracks the stream's current snapshot, so
/// [`advance`](Self::advance) always diffs against the snapshot passed to
/// the previous advance.
pub struct DiffQueue<S, SI, It, II> {
    jobs: mpsc::Sender<Job<S, SI, It, II>>,
    current: Mutex<Vec<S>>,
    worker: JoinHandle<()>,
}

impl<S, SI, It, II> DiffQueue<S, SI, It, II>
where
    S: Clone + Send + 'static,
    SI: Hash + Eq + Clone + Send + 'static,
    It: Clone + Send + 'static,
    II: Hash + Eq + Clone + Send + 'static,
{
    /// Spawn the worker. The stream starts at an empty snapshot.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    pub fn new(diff_config: SectionedConfig<S, SI, It, II>, config: &QueueConfig) -> Self {
        let capacity = config.capacity.max(1);
        let (jobs, receiver) = mpsc::channel(capacity);
        let worker = tokio::spawn(run_worker(receiver, diff_config));

        debug!(capacity, "diff queue started");

        Self {
            jobs,
            current: Mutex::new(Vec::new()),
            worker,
        }
    }

    /// Diff two arbitrary snapshots, after every earlier request.
    ///
    /// Dropping the returned future before it resolves discards the result;
    /// once enqueued, the computation itself still runs.
    pub async fn submit(
        &self,
        old: Vec<S>,
        new: Vec<S>,
    ) -> QueueResult<SectionedDiff<S, SI, It, II>> {
        let (reply, result) = oneshot::channel();
        self.jobs
            .send(Job { old, new, reply })
            .await
            .map_err(|_| QueueError::Closed)?;
        result.await.map_err(|_| QueueError::Closed)?
    }

    /// Diff the stream's current snapshot against `new` and make `new` the
    /// current snapshot.
    ///
    /// The snapshot is replaced on the first poll, before waiting for room in
    /// the queue. From then on the stream has advanced even if the request is
    /// dropped or the diff fails.
    pub async fn advance(&self, new: Vec<S>) -> QueueResult<SectionedDiff<S, SI, It, II>> {
        let old = {
            let mut current = self.current.lock().unwrap_or_else(PoisonError::into_inner);
            mem::replace(&mut *current, new.clone())
        };
        self.submit(old, new).await
    }

    /// Stop accepting requests and wait for the pending ones to finish.
    pub async fn shutdown(self) -> QueueResult<()> {
        drop(self.jobs);
        self.worker.await?;
        Ok(())
    }
}

async fn run_worker<S, SI, It, II>(
    mut receiver: mpsc::Receiver<Job<S, SI, It, II>>,
    config: SectionedConfig<S, SI, It, II>,
) where
    S: Clone + Send + 'static,
    SI: Hash + Eq + Clone + Send + 'static,
    It: Clone + Send + 'static,
    II: Hash + Eq + Clone + Send + 'static,
{
    let mut processed = 0u64;

    while let Some(Job { old, new, reply }) = receiver.recv().await {
        let result = calculate(old, new, config.clone()).await;
        if let Err(error) = &result {
            debug!(%error, "diff failed");
        }
        if reply.send(result).is_err() {
            trace!("requester gone, diff result discarded");
        }
        processed += 1;
    }

    debug!(processed, "diff queue stopped");
}
