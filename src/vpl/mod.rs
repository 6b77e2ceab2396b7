//! VPL visibility compaction
//!
//! Marks every candidate virtual point light as lit or shadowed against
//! the infinite (sun) light's cascades, then stream-compacts the lit
//! subset into a bounded output buffer with a globally consistent count.
//! The compacted buffer feeds the indirect lighting passes directly; no
//! CPU readback happens between dispatches.

pub mod compactor;

pub use compactor::{VplCompactor, VplFrameInputs};

use glam::Vec3;

/// External evaluator for the infinite light's cascaded shadow maps.
///
/// Treated as a black box with no side effects. Implementations must be
/// `Sync`: every worker in the team queries it concurrently.
pub trait ShadowSampler: Sync {
    /// Shadow factor at a world-space point, in `[0, 1]`.
    ///
    /// `1.0` means fully shadowed. Anything below marks the point as
    /// receiving at least partial illumination.
    fn shadow_factor(&self, world_pos: Vec3, cascade_blends: Vec3, light_dir: Vec3) -> f32;
}

impl<F> ShadowSampler for F
where
    F: Fn(Vec3, Vec3, Vec3) -> f32 + Sync,
{
    fn shadow_factor(&self, world_pos: Vec3, cascade_blends: Vec3, light_dir: Vec3) -> f32 {
        self(world_pos, cascade_blends, light_dir)
    }
}
