// Viscull Constants - SINGLE SOURCE OF TRUTH
//
// This file contains ALL frame constants used by the culling kernels.
// Keeping them in one place mirrors how the GPU side shares a single
// header between CPU and shader code.
//
// CRITICAL: Do NOT define these constants anywhere else in the codebase!

/// VPL visibility compaction constants
pub mod vpl {
    /// Capacity of the per-dispatch visibility flag scratch. Candidate sets
    /// larger than this are rejected at dispatch validation.
    pub const MAX_TOTAL_VPLS_BEFORE_CULLING: usize = 10_000;

    /// Hard cap on compacted visible lights per frame. Overflow truncates,
    /// it never faults.
    pub const MAX_TOTAL_VPLS_PER_FRAME: usize = 2048;

    /// Number of workers that participate in the compaction phase. Kept
    /// small so contention on the shared slot counter stays bounded.
    pub const COMPACTION_CREW_SIZE: usize = 8;

    /// Logical team width of the compaction dispatch (1024 x 1 x 1).
    pub const TEAM_SIZE: usize = 1024;

    /// Number of cascade split planes used to build blend weights for the
    /// shadow sampler.
    pub const NUM_CASCADE_PLANES: usize = 3;
}

/// VSM draw culling constants
pub mod vsm {
    /// Border, in pages, added around a draw's page-space AABB before the
    /// residency pyramid is sampled. Absorbs page-boundary sampling error
    /// at the coarser pyramid level.
    pub const PAGE_BORDER: f32 = 2.0;

    /// Logical team dimensions of the culling dispatch (32 x 32 x 1).
    pub const TEAM_DIM_X: usize = 32;
    pub const TEAM_DIM_Y: usize = 32;
    pub const TEAM_SIZE: usize = TEAM_DIM_X * TEAM_DIM_Y;

    /// Residency samples taken per draw call (the four corners of the
    /// expanded page-space AABB).
    pub const RESIDENCY_SAMPLES: usize = 4;
}
