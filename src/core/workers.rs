//! Worker pools for background fetches and media opens.
//!
//! [`Workers`] uses work-stealing deques:
//! - External jobs go to a global injector that every worker polls first
//! - Idle workers steal from each other
//!
//! [`InlinePool`] runs jobs on the calling thread. Results still travel
//! through the component inboxes, so callers observe the same ordering.

use crossbeam::deque::{Injector, Stealer, Worker};
use log::trace;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use crate::entities::WorkerPool;

type Job = Box<dyn FnOnce() + Send + 'static>;

/// Thread pool with work-stealing for background jobs.
///
/// Recommended size: `num_cpus::get() * 3 / 4` (leave room for the UI thread).
pub struct Workers {
    injector: Arc<Injector<Job>>,
    handles: Vec<thread::JoinHandle<()>>,
    shutdown: Arc<AtomicBool>,
}

impl Workers {
    /// Spawn `num_threads` workers (at least one).
    pub fn new(num_threads: usize) -> std::io::Result<Self> {
        let num_threads = num_threads.max(1);
        let injector: Arc<Injector<Job>> = Arc::new(Injector::new());
        let shutdown = Arc::new(AtomicBool::new(false));

        let locals: Vec<Worker<Job>> = (0..num_threads).map(|_| Worker::new_fifo()).collect();
        let stealers: Vec<Stealer<Job>> = locals.iter().map(|w| w.stealer()).collect();

        let mut handles = Vec::with_capacity(num_threads);
        for (worker_id, local) in locals.into_iter().enumerate() {
            let injector = Arc::clone(&injector);
            let shutdown = Arc::clone(&shutdown);
            let stealers = stealers.clone();

            let handle = thread::Builder::new()
                .name(format!("reelfeed-worker-{}", worker_id))
                .spawn(move || run_worker(worker_id, local, &injector, &stealers, &shutdown))?;
            handles.push(handle);
        }

        trace!("Workers initialized: {} threads (work-stealing)", num_threads);

        Ok(Self {
            injector,
            handles,
            shutdown,
        })
    }

    pub fn threads(&self) -> usize {
        self.handles.len()
    }
}

fn run_worker(
    worker_id: usize,
    local: Worker<Job>,
    injector: &Injector<Job>,
    stealers: &[Stealer<Job>],
    shutdown: &AtomicBool,
) {
    trace!("Worker {} started", worker_id);

    loop {
        let job = local
            .pop()
            .or_else(|| injector.steal_batch_and_pop(&local).success())
            .or_else(|| stealers.iter().find_map(|s| s.steal().success()));

        if let Some(job) = job {
            job();
            continue;
        }

        if shutdown.load(Ordering::Relaxed) {
            break;
        }

        // No work - short sleep to avoid CPU spin
        thread::sleep(Duration::from_millis(1));
    }

    trace!("Worker {} stopped", worker_id);
}

impl WorkerPool for Workers {
    fn execute(&self, job: Box<dyn FnOnce() + Send + 'static>) {
        self.injector.push(job);
    }
}

impl Drop for Workers {
    fn drop(&mut self) {
        let num_threads = self.handles.len();
        trace!("Workers shutting down ({} threads)...", num_threads);

        self.shutdown.store(true, Ordering::SeqCst);

        // Epoch guards skip stale jobs, so draining is quick; the deadline
        // only bounds a stuck fetch.
        let deadline = Instant::now() + Duration::from_millis(500);

        for handle in std::mem::take(&mut self.handles) {
            while !handle.is_finished() {
                if Instant::now() >= deadline {
                    trace!("Shutdown timeout reached, detaching remaining workers");
                    return;
                }
                thread::sleep(Duration::from_millis(1));
            }
            let _ = handle.join();
        }

        trace!("All {} workers stopped", num_threads);
    }
}

/// Runs every job immediately on the calling thread.
#[derive(Debug, Default, Clone, Copy)]
pub struct InlinePool;

impl WorkerPool for InlinePool {
    fn execute(&self, job: Box<dyn FnOnce() + Send + 'static>) {
        job();
    }
}
