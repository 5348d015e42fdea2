//! Rayon thread pool configuration for scoring and search workloads.
//!
//! Matrix rows and root search branches fan out over Rayon; [WorkerPool::run]
//! pins that fan-out to a fixed thread count when the caller asks for one,
//! and otherwise stays on the global pool.

use rayon::ThreadPoolBuilder;

/// Worker thread configuration for parallel sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkerPool {
    /// Number of worker threads. 0 means the global Rayon pool (all cores).
    pub threads: usize,
}

impl Default for WorkerPool {
    fn default() -> Self {
        Self { threads: 0 }
    }
}

impl WorkerPool {
    /// The global Rayon pool (all CPU cores).
    pub fn global() -> Self {
        Self::default()
    }

    /// Exactly `threads` workers in a dedicated pool.
    pub fn fixed(threads: usize) -> Self {
        Self { threads }
    }

    /// Run `work` under this configuration. With [threads](WorkerPool::threads)
    /// set to 0 the closure executes on the global pool; otherwise a dedicated
    /// pool with that many threads hosts it for the duration of the call.
    pub fn run<F, R>(&self, work: F) -> R
    where
        F: FnOnce() -> R + Send,
        R: Send,
    {
        if self.threads == 0 {
            work()
        } else {
            let pool = ThreadPoolBuilder::new()
                .num_threads(self.threads)
                .build()
                .expect("rayon thread pool");
            pool.install(work)
        }
    }
}
