//! Per-cascade hierarchical draw culling
//!
//! Cascades are processed sequentially; each cascade's draw loop is fully
//! parallel across the team with a barrier before the next cascade so no
//! worker reads the next cascade's shared corners early. A cascade whose
//! active page rectangle is inverted performs no writes at all for the
//! frame, so its output region keeps the previous frame's commands;
//! callers that cannot tolerate stale commands must clear the region
//! themselves before dispatching the indirect draw.

use glam::{IVec2, Mat4, Vec2};

use crate::config::VsmConfig;
use crate::constants::vsm::RESIDENCY_SAMPLES;
use crate::dispatch::{SharedBuffer, TeamContext, WorkerTeam};
use crate::error::{CullError, CullResult};
use crate::layouts::{Aabb, ClipMapBoundingBox, DrawElementsIndirectCommand};

use super::page_space::{
    expand_and_normalize, level_resolution, ndc_to_page, page_to_texcoord, pyramid_level,
    rects_overlap, PageGridInfo,
};
use super::{CascadeProjector, ResidencyPyramid};

/// Per-frame inputs to the culling dispatch
pub struct VsmFrameInputs<'a, P: CascadeProjector, R: ResidencyPyramid> {
    /// Input indirect commands, one per draw call, read-only
    pub in_draws: &'a [DrawElementsIndirectCommand],

    /// Per-draw model transforms
    pub model_transforms: &'a [Mat4],

    /// Per-draw object-space bounding boxes
    pub aabbs: &'a [Aabb],

    /// Active page rectangle of each cascade
    pub clipmap_bounds: &'a [ClipMapBoundingBox],

    /// External AABB-to-cascade-NDC transform
    pub projector: &'a P,

    /// Page-residency pyramid, built elsewhere this frame
    pub pyramid: &'a R,

    /// Page grid dimensions
    pub page_grid: PageGridInfo,
}

/// Owns the persistent output command array of the VSM culling kernel.
///
/// Output layout: `cascade * max_draw_commands + draw_index`. The buffer
/// persists across dispatches precisely so skipped cascades keep stale
/// commands (see module docs).
pub struct VsmDrawCuller {
    config: VsmConfig,
    out_draws: SharedBuffer<DrawElementsIndirectCommand>,
    // Team-shared scratch: corners of the active page rectangle, published
    // by the leader each cascade.
    corner_pages: SharedBuffer<[i32; 2]>,
    corner_texcoords: SharedBuffer<[f32; 2]>,
}

impl VsmDrawCuller {
    pub fn new(config: VsmConfig) -> CullResult<Self> {
        if config.max_draw_commands == 0 {
            return Err(CullError::InvalidConfig(
                "max_draw_commands must be at least 1".into(),
            ));
        }
        if config.num_cascades == 0 {
            return Err(CullError::InvalidConfig(
                "num_cascades must be at least 1".into(),
            ));
        }

        let slots = config.max_draw_commands * config.num_cascades;
        Ok(Self {
            out_draws: SharedBuffer::zeroed(slots),
            corner_pages: SharedBuffer::zeroed(RESIDENCY_SAMPLES),
            corner_texcoords: SharedBuffer::zeroed(RESIDENCY_SAMPLES),
            config,
        })
    }

    /// Spawn a worker team sized per this culler's configuration
    pub fn spawn_team(&self) -> CullResult<WorkerTeam> {
        WorkerTeam::new("vsm-cull", self.config.team_size)
    }

    /// Run the culling kernel for one frame.
    ///
    /// Validates that all per-draw arrays agree and fit one cascade's
    /// output region, then executes the cascade loop on `team`.
    pub fn dispatch<P: CascadeProjector, R: ResidencyPyramid>(
        &self,
        team: &WorkerTeam,
        inputs: &VsmFrameInputs<'_, P, R>,
    ) -> CullResult<()> {
        let draws = inputs.in_draws.len();
        if draws > self.config.max_draw_commands {
            return Err(CullError::DrawOverflow {
                draws,
                capacity: self.config.max_draw_commands,
            });
        }
        if inputs.model_transforms.len() != draws {
            return Err(CullError::LengthMismatch {
                what: "model_transforms",
                expected: draws,
                actual: inputs.model_transforms.len(),
            });
        }
        if inputs.aabbs.len() != draws {
            return Err(CullError::LengthMismatch {
                what: "aabbs",
                expected: draws,
                actual: inputs.aabbs.len(),
            });
        }
        if inputs.clipmap_bounds.len() != self.config.num_cascades {
            return Err(CullError::LengthMismatch {
                what: "clipmap_bounds",
                expected: self.config.num_cascades,
                actual: inputs.clipmap_bounds.len(),
            });
        }

        log::trace!(
            "vsm cull dispatch: {} draws across {} cascades",
            draws,
            self.config.num_cascades
        );

        team.dispatch(|ctx| self.kernel(ctx, inputs));
        Ok(())
    }

    fn kernel<P: CascadeProjector, R: ResidencyPyramid>(
        &self,
        ctx: &TeamContext<'_>,
        inputs: &VsmFrameInputs<'_, P, R>,
    ) {
        let max_index = inputs.page_grid.max_page_index() as f32;

        for cascade in 0..self.config.num_cascades {
            let bounds = inputs.clipmap_bounds[cascade];
            // Uniform across the team: every worker takes the same branch,
            // so skipping the cascade's barrier is safe.
            if bounds.is_empty() {
                continue;
            }

            if ctx.is_leader() {
                let corners = [
                    IVec2::new(bounds.min_page_x, bounds.min_page_y),
                    IVec2::new(bounds.min_page_x, bounds.max_page_y),
                    IVec2::new(bounds.max_page_x, bounds.min_page_y),
                    IVec2::new(bounds.max_page_x, bounds.max_page_y),
                ];
                for (slot, corner) in corners.iter().enumerate() {
                    let texcoord = page_to_texcoord(*corner, max_index);
                    // SAFETY: only the leader writes the scratch this
                    // phase; everyone else reads after the barrier.
                    unsafe {
                        self.corner_pages.write(slot, corner.to_array());
                        self.corner_texcoords.write(slot, texcoord.to_array());
                    }
                }
            }
            ctx.barrier();

            let page_min = Vec2::from_array([
                self.corner_pages.read(0)[0] as f32,
                self.corner_pages.read(0)[1] as f32,
            ]);
            let page_max = Vec2::from_array([
                self.corner_pages.read(3)[0] as f32,
                self.corner_pages.read(3)[1] as f32,
            ]);

            for draw_index in ctx.strided(inputs.in_draws.len()) {
                let verdict = self.test_draw(
                    inputs, cascade, draw_index, page_min, page_max, max_index,
                );
                let command = inputs.in_draws[draw_index].with_instance_count(verdict);
                let slot = cascade * self.config.max_draw_commands + draw_index;
                // SAFETY: strided draw indices are disjoint per worker and
                // each cascade writes its own output region.
                unsafe { self.out_draws.write(slot, command) };
            }

            // No worker may read the next cascade's corners before the
            // whole team finishes this cascade's draw commands.
            ctx.barrier();
        }
    }

    /// Page-rectangle and residency test for one draw call in one cascade.
    /// Returns the instance count to record: 1 = draw, 0 = culled.
    fn test_draw<P: CascadeProjector, R: ResidencyPyramid>(
        &self,
        inputs: &VsmFrameInputs<'_, P, R>,
        cascade: usize,
        draw_index: usize,
        page_min: Vec2,
        page_max: Vec2,
        max_index: f32,
    ) -> u32 {
        let ndc = inputs.projector.project_to_cascade_ndc(
            &inputs.aabbs[draw_index],
            &inputs.model_transforms[draw_index],
            cascade,
        );

        let aabb_min = ndc_to_page(ndc.min().truncate(), max_index);
        let aabb_max = ndc_to_page(ndc.max().truncate(), max_index);

        // Even an inactive page group still gets a command recorded: the
        // CPU's conservative caching may clear parts of the region within
        // the same frame window, so the draw must exist with 0 instances.
        if !rects_overlap(page_min, page_max, aabb_min, aabb_max) {
            return 0;
        }

        let (norm_min, norm_max) = expand_and_normalize(aabb_min, aabb_max, max_index);
        let level = pyramid_level(norm_min, norm_max, max_index);
        let resolution = level_resolution(max_index, level);

        let sample_corners = [
            Vec2::new(norm_min.x, norm_min.y),
            Vec2::new(norm_min.x, norm_max.y),
            Vec2::new(norm_max.x, norm_min.y),
            Vec2::new(norm_max.x, norm_max.y),
        ];

        let mut merged: f32 = 0.0;
        for corner in sample_corners {
            let texel = (corner * resolution).as_ivec2();
            merged = merged.max(inputs.pyramid.sample(texel, level, cascade));
        }

        if merged > 0.0 {
            1
        } else {
            0
        }
    }

    /// Snapshot of the full output command array
    pub fn commands(&self) -> Vec<DrawElementsIndirectCommand> {
        self.out_draws.to_vec()
    }

    /// Snapshot of one cascade's output region
    pub fn cascade_commands(&self, cascade: usize) -> Vec<DrawElementsIndirectCommand> {
        let start = cascade * self.config.max_draw_commands;
        (start..start + self.config.max_draw_commands)
            .map(|slot| self.out_draws.read(slot))
            .collect()
    }

    /// Corner texture coordinates published for the most recent
    /// non-skipped cascade
    pub fn active_corner_texcoords(&self) -> [Vec2; RESIDENCY_SAMPLES] {
        let mut corners = [Vec2::ZERO; RESIDENCY_SAMPLES];
        for (slot, corner) in corners.iter_mut().enumerate() {
            *corner = Vec2::from_array(self.corner_texcoords.read(slot));
        }
        corners
    }
}
