use std::num::NonZeroUsize;
use std::sync::Arc;

use ims_core::Error;
use rayon::prelude::*;

/// Hardware concurrency reported by the OS, at least 1.
pub fn available_concurrency() -> usize {
    std::thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1)
}

/// Join-style parallel execution primitive.
///
/// `run_parallel` calls `job(i, &mut states[i])` exactly once for every `i`
/// and returns only after every call has returned. Calls may run
/// concurrently and in any order.
pub trait Dispatcher {
    /// Upper bound on how many jobs can make progress at the same time.
    fn max_concurrency(&self) -> usize;

    fn run_parallel<S, F>(&self, states: &mut [S], job: F)
    where
        S: Send,
        F: Fn(usize, &mut S) + Sync;
}

/// Hands worker `w` the `w`-th contiguous chunk of `states`, if it exists.
///
/// Workers past the last chunk have nothing to do and return at once.
fn run_worker<S, F>(worker: usize, chunk: Option<(usize, &mut [S])>, job: &F)
where
    F: Fn(usize, &mut S),
{
    let Some((first, chunk)) = chunk else {
        log::trace!("worker {worker}: no work unit");
        return;
    };
    for (k, state) in chunk.iter_mut().enumerate() {
        job(first + k, state);
    }
}

fn chunk_len(states: usize, workers: usize) -> usize {
    states.div_ceil(workers.max(1)).max(1)
}

/// Runs every worker on the calling thread, one after another.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InlineDispatcher {
    workers: usize,
}

impl InlineDispatcher {
    pub fn new(workers: usize) -> Self {
        Self {
            workers: workers.max(1),
        }
    }
}

impl Default for InlineDispatcher {
    fn default() -> Self {
        Self::new(1)
    }
}

impl Dispatcher for InlineDispatcher {
    fn max_concurrency(&self) -> usize {
        self.workers
    }

    fn run_parallel<S, F>(&self, states: &mut [S], job: F)
    where
        S: Send,
        F: Fn(usize, &mut S) + Sync,
    {
        let len = chunk_len(states.len(), self.workers);
        let mut chunks = states.chunks_mut(len).enumerate();
        for worker in 0..self.workers {
            let chunk = chunks.next().map(|(c, chunk)| (c * len, chunk));
            run_worker(worker, chunk, &job);
        }
    }
}

/// Spawns a fixed number of scoped threads per call and joins them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScopedDispatcher {
    threads: usize,
}

impl ScopedDispatcher {
    pub fn new(threads: usize) -> Self {
        Self {
            threads: threads.max(1),
        }
    }

    pub fn threads(&self) -> usize {
        self.threads
    }
}

impl Default for ScopedDispatcher {
    fn default() -> Self {
        Self::new(available_concurrency())
    }
}

impl Dispatcher for ScopedDispatcher {
    fn max_concurrency(&self) -> usize {
        self.threads
    }

    fn run_parallel<S, F>(&self, states: &mut [S], job: F)
    where
        S: Send,
        F: Fn(usize, &mut S) + Sync,
    {
        let len = chunk_len(states.len(), self.threads);
        let mut chunks = states.chunks_mut(len).enumerate();
        let job = &job;

        std::thread::scope(|s| {
            for worker in 0..self.threads {
                let chunk = chunks.next().map(|(c, chunk)| (c * len, chunk));
                s.spawn(move || run_worker(worker, chunk, job));
            }
        });
    }
}

/// Runs jobs on a reusable `rayon` pool.
///
/// The pool is owned by the dispatcher (or shared through `Arc`), never the
/// global one, so callers decide its size.
#[derive(Debug, Clone)]
pub struct RayonDispatcher {
    pool: Arc<rayon::ThreadPool>,
}

impl RayonDispatcher {
    pub fn new(threads: usize) -> Result<Self, Error> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads.max(1))
            .thread_name(|i| format!("ims-worker-{i}"))
            .build()
            .map_err(|e| Error::Dispatch(e.to_string()))?;
        Ok(Self {
            pool: Arc::new(pool),
        })
    }

    pub fn from_pool(pool: Arc<rayon::ThreadPool>) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &Arc<rayon::ThreadPool> {
        &self.pool
    }
}

impl Dispatcher for RayonDispatcher {
    fn max_concurrency(&self) -> usize {
        self.pool.current_num_threads()
    }

    fn run_parallel<S, F>(&self, states: &mut [S], job: F)
    where
        S: Send,
        F: Fn(usize, &mut S) + Sync,
    {
        self.pool.install(|| {
            states
                .par_iter_mut()
                .enumerate()
                .for_each(|(i, state)| job(i, state));
        });
    }
}
