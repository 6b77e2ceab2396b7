//! Four-phase parallel stream compaction of visible VPLs
//!
//! Phases, each separated by a full team barrier:
//!
//! 1. reset    - the whole team clears the visibility flag scratch
//! 2. classify - the whole team marks lit candidates (disjoint flag slots)
//! 3. compact  - a small fixed crew appends flagged records through one
//!               atomic counter
//! 4. finalize - the leader clamps the counter to the cap and publishes it
//!
//! Restricting phase 3 to a small crew bounds contention on the shared
//! counter; the full team would serialize on the fetch-and-increment and
//! throw the parallelism away. Because the crew members interleave
//! non-deterministically, set membership beyond the cap carries no
//! fairness guarantee: when more lights are visible than fit, *some* cap
//! worth of them survives and which ones is unspecified.

use std::sync::atomic::{AtomicU32, Ordering};

use glam::{Vec3, Vec4};

use crate::config::VplConfig;
use crate::dispatch::{SharedBuffer, SharedCounter, SharedFlags, TeamContext, WorkerTeam};
use crate::error::{CullError, CullResult};
use crate::layouts::VplData;

use super::ShadowSampler;

/// Per-frame inputs to the compaction dispatch
pub struct VplFrameInputs<'a, S: ShadowSampler> {
    /// Candidate light records (`unedited` buffer), read-only
    pub lights: &'a [VplData],

    /// Cascade split planes; blend weights are the signed distances of a
    /// light to each plane
    pub cascade_planes: [Vec4; 3],

    /// Infinite light direction, world space
    pub light_direction: Vec3,

    /// Shadow evaluator for the infinite light
    pub sampler: &'a S,
}

/// Owns the scratch and output buffers of the VPL compaction kernel.
///
/// Outputs are overwritten on every dispatch; entries at and beyond
/// [`visible_count`](Self::visible_count) are stale and must not be read.
pub struct VplCompactor {
    config: VplConfig,
    flags: SharedFlags,
    counter: SharedCounter,
    compacted: SharedBuffer<VplData>,
    handles: SharedBuffer<u32>,
    num_visible: AtomicU32,
}

impl VplCompactor {
    pub fn new(config: VplConfig) -> CullResult<Self> {
        if config.max_vpls_per_frame == 0 {
            return Err(CullError::InvalidConfig(
                "max_vpls_per_frame must be at least 1".into(),
            ));
        }
        if config.max_vpls_before_culling < config.max_vpls_per_frame {
            return Err(CullError::InvalidConfig(format!(
                "flag scratch ({}) smaller than output cap ({})",
                config.max_vpls_before_culling, config.max_vpls_per_frame
            )));
        }
        if config.compaction_crew_size == 0 {
            return Err(CullError::InvalidConfig(
                "compaction_crew_size must be at least 1".into(),
            ));
        }

        let cap = config.max_vpls_per_frame;
        Ok(Self {
            flags: SharedFlags::new(config.max_vpls_before_culling),
            counter: SharedCounter::new(),
            compacted: SharedBuffer::zeroed(cap),
            handles: SharedBuffer::zeroed(cap),
            num_visible: AtomicU32::new(0),
            config,
        })
    }

    /// Spawn a worker team sized per this compactor's configuration
    pub fn spawn_team(&self) -> CullResult<WorkerTeam> {
        WorkerTeam::new("vpl-cull", self.config.team_size)
    }

    /// Run the compaction kernel for one frame.
    ///
    /// Validates input sizes, then executes the four phases on `team`.
    /// The kernel itself cannot fail: cap overflow truncates silently.
    pub fn dispatch<S: ShadowSampler>(
        &self,
        team: &WorkerTeam,
        inputs: &VplFrameInputs<'_, S>,
    ) -> CullResult<()> {
        let total = inputs.lights.len();
        if total > self.flags.capacity() {
            return Err(CullError::CandidateOverflow {
                candidates: total,
                capacity: self.flags.capacity(),
            });
        }

        log::trace!(
            "vpl compaction dispatch: {} candidates, cap {}, crew {}",
            total,
            self.config.max_vpls_per_frame,
            self.config.compaction_crew_size
        );

        team.dispatch(|ctx| self.kernel(ctx, inputs));

        log::trace!("vpl compaction produced {} visible lights", self.visible_count());
        Ok(())
    }

    fn kernel<S: ShadowSampler>(&self, ctx: &TeamContext<'_>, inputs: &VplFrameInputs<'_, S>) {
        let total = inputs.lights.len();
        let cap = self.config.max_vpls_per_frame as u32;

        // Phase 1: clear all visibility flags. No worker may classify
        // until every stale flag is gone.
        for index in ctx.strided(total) {
            self.flags.clear(index);
        }
        ctx.barrier();

        // Phase 2: classify. Each worker owns disjoint flag slots, so the
        // only hazard is the barrier below.
        for index in ctx.strided(total) {
            let light_pos = inputs.lights[index].world_position();
            let point = light_pos.extend(1.0);
            let cascade_blends = Vec3::new(
                inputs.cascade_planes[0].dot(point),
                inputs.cascade_planes[1].dot(point),
                inputs.cascade_planes[2].dot(point),
            );
            let shadow_factor =
                inputs
                    .sampler
                    .shadow_factor(light_pos, cascade_blends, inputs.light_direction);
            if shadow_factor < 1.0 {
                self.flags.mark(index);
            }
        }
        ctx.barrier();

        // Phase 3 prologue: one worker resets the slot counter.
        if ctx.is_leader() {
            self.counter.reset();
        }
        ctx.barrier();

        // Phase 3: compaction crew only. Crew members stride the *entire*
        // candidate range by crew size, not team size.
        let crew = self.config.compaction_crew_size.min(ctx.team_size());
        if ctx.local_index() < crew {
            for index in (ctx.local_index()..total).step_by(crew) {
                if !self.flags.is_marked(index) {
                    continue;
                }
                let slot = self.counter.next();
                if slot >= cap {
                    // Cap reached: abandon this crew member's remaining
                    // range. Other members may still reserve slots past
                    // the cap; the finalize clamp discards them.
                    break;
                }
                let record = inputs.lights[index];
                // SAFETY: `slot` was reserved exclusively via the shared
                // counter and is below the buffer length; no other worker
                // writes it this phase and reads happen after dispatch.
                unsafe {
                    self.compacted.write(slot as usize, record);
                    self.handles.write(slot as usize, record.handle);
                }
            }
        }
        ctx.barrier();

        // Phase 4: leader clamps and publishes the count.
        if ctx.is_leader() {
            let raw = self.counter.load();
            self.num_visible.store(raw.min(cap), Ordering::Relaxed);
        }
    }

    /// Number of valid entries in the compacted buffers, `<= cap`
    pub fn visible_count(&self) -> u32 {
        self.num_visible.load(Ordering::Relaxed)
    }

    /// Handles of the visible lights, in no guaranteed order
    pub fn visible_handles(&self) -> Vec<u32> {
        let count = self.visible_count() as usize;
        (0..count).map(|slot| self.handles.read(slot)).collect()
    }

    /// Compacted records of the visible lights, in no guaranteed order
    pub fn visible_lights(&self) -> Vec<VplData> {
        let count = self.visible_count() as usize;
        (0..count).map(|slot| self.compacted.read(slot)).collect()
    }
}
