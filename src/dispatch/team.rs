//! Fixed-size worker teams with barrier synchronization
//!
//! A [`WorkerTeam`] owns a dedicated rayon pool whose thread count equals
//! the team size, so a broadcast runs the kernel exactly once per worker.
//! Workers stride over the candidate range by team size, the same access
//! pattern a `local_size_x` sized workgroup uses on the GPU.

use std::sync::Barrier;

use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::error::{CullError, CullResult};

/// Upper bound on spawned worker threads. GPU-style team sizes (1024 wide)
/// are logical widths; on the host a team larger than this only adds
/// barrier overhead.
pub const MAX_TEAM_WORKERS: usize = 256;

/// A fixed pool of workers that execute culling kernels in lockstep phases
pub struct WorkerTeam {
    pool: ThreadPool,
    workers: usize,
}

impl WorkerTeam {
    /// Create a team with `workers` members. Requests above
    /// [`MAX_TEAM_WORKERS`] are clamped with a warning; zero is an error.
    pub fn new(name: &str, workers: usize) -> CullResult<Self> {
        if workers == 0 {
            return Err(CullError::InvalidConfig(format!(
                "worker team '{}' requires at least 1 worker",
                name
            )));
        }

        let clamped = workers.min(MAX_TEAM_WORKERS);
        if clamped != workers {
            log::warn!(
                "worker team '{}' clamped from {} to {} workers",
                name,
                workers,
                clamped
            );
        }

        let thread_name = name.to_string();
        let pool = ThreadPoolBuilder::new()
            .num_threads(clamped)
            .thread_name(move |idx| format!("{}-{}", thread_name, idx))
            .build()
            .map_err(|source| CullError::TeamSpawn {
                name: name.to_string(),
                source,
            })?;

        log::debug!("worker team '{}' spawned with {} workers", name, clamped);

        Ok(Self {
            pool,
            workers: clamped,
        })
    }

    /// Create a team sized to the host CPU count
    pub fn sized_for_host(name: &str) -> CullResult<Self> {
        Self::new(name, num_cpus::get().max(1))
    }

    /// Number of workers in the team
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Run `kernel` once on every worker and block until all return.
    ///
    /// Every worker receives a [`TeamContext`] carrying its index and the
    /// shared barrier. All workers participate in the broadcast, so a
    /// kernel may call [`TeamContext::barrier`] freely as long as every
    /// worker reaches the same barrier (uniform control flow, the same
    /// rule GPU workgroups live under).
    pub fn dispatch<K>(&self, kernel: K)
    where
        K: Fn(&TeamContext<'_>) + Sync,
    {
        let barrier = Barrier::new(self.workers);
        self.pool.broadcast(|ctx| {
            let team_ctx = TeamContext {
                local_index: ctx.index(),
                team_size: self.workers,
                barrier: &barrier,
            };
            kernel(&team_ctx);
        });
    }
}

/// Per-worker view of a running dispatch
pub struct TeamContext<'a> {
    local_index: usize,
    team_size: usize,
    barrier: &'a Barrier,
}

impl TeamContext<'_> {
    /// This worker's index within the team, `0..team_size`
    pub fn local_index(&self) -> usize {
        self.local_index
    }

    /// Total number of workers in the team
    pub fn team_size(&self) -> usize {
        self.team_size
    }

    /// True for the single designated worker (index 0)
    pub fn is_leader(&self) -> bool {
        self.local_index == 0
    }

    /// Wait until every worker in the team reaches this point.
    ///
    /// Doubles as the memory fence between kernel phases: relaxed atomic
    /// writes made before the barrier are visible to every worker after it.
    pub fn barrier(&self) {
        self.barrier.wait();
    }

    /// Indices this worker owns when the team strides over `len` elements
    pub fn strided(&self, len: usize) -> impl Iterator<Item = usize> {
        (self.local_index..len).step_by(self.team_size)
    }
}
