//! VSM draw culling
//!
//! Per shadow cascade, tests every draw call's bounding box against the
//! cascade's active clipmap page rectangle and a hierarchical
//! page-residency pyramid, then writes the verdict into an indirect draw
//! command array consumed directly by the shadow render pass.

pub mod culler;
pub mod page_space;

pub use culler::{VsmDrawCuller, VsmFrameInputs};
pub use page_space::PageGridInfo;

use glam::{IVec2, Mat4};

use crate::layouts::Aabb;

/// External transform from object space into a cascade's normalized clip
/// space. How perspective or clipmap wrap is handled per corner is the
/// renderer's business; the culler only consumes the resulting box.
pub trait CascadeProjector: Sync {
    fn project_to_cascade_ndc(&self, aabb: &Aabb, model: &Mat4, cascade: usize) -> Aabb;
}

/// Read-only view of the page-residency pyramid.
///
/// A texel at level `L` covers a `2^L x 2^L` block of pages and reads
/// greater than zero when at least one page in the block is resident.
/// Built and updated elsewhere once per frame before the culler runs.
/// Implementations must clamp `level` to their valid range.
pub trait ResidencyPyramid: Sync {
    /// Number of levels in the pyramid
    fn level_count(&self) -> u32;

    /// Residency sample at `texel` for the given level and cascade
    fn sample(&self, texel: IVec2, level: u32, cascade: usize) -> f32;
}
