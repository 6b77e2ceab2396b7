//! Virtual shadow map buffer layouts

use bytemuck::{Pod, Zeroable};
use glam::{IVec2, Vec3};

/// Axis-aligned bounding box in the std430 layout the renderer binds.
/// Total size: 32 bytes.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct Aabb {
    /// Minimum corner (xyz) + padding (w)
    pub vmin: [f32; 4],

    /// Maximum corner (xyz) + padding (w)
    pub vmax: [f32; 4],
}

impl Aabb {
    /// Create from min/max corners
    pub fn from_min_max(min: Vec3, max: Vec3) -> Self {
        Self {
            vmin: [min.x, min.y, min.z, 1.0],
            vmax: [max.x, max.y, max.z, 1.0],
        }
    }

    pub fn min(&self) -> Vec3 {
        Vec3::new(self.vmin[0], self.vmin[1], self.vmin[2])
    }

    pub fn max(&self) -> Vec3 {
        Vec3::new(self.vmax[0], self.vmax[1], self.vmax[2])
    }

    /// The eight corner points, needed when a clip-space transform has to
    /// handle perspective or clipmap wrap per corner
    pub fn corners(&self) -> [Vec3; 8] {
        let min = self.min();
        let max = self.max();
        [
            Vec3::new(min.x, min.y, min.z),
            Vec3::new(max.x, min.y, min.z),
            Vec3::new(min.x, max.y, min.z),
            Vec3::new(max.x, max.y, min.z),
            Vec3::new(min.x, min.y, max.z),
            Vec3::new(max.x, min.y, max.z),
            Vec3::new(min.x, max.y, max.z),
            Vec3::new(max.x, max.y, max.z),
        ]
    }
}

/// Active page rectangle of one clipmap cascade. Total size: 16 bytes.
///
/// An inverted rectangle (`min > max` on either axis) means the cascade
/// has no active region this frame and must be skipped entirely.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Pod, Zeroable)]
pub struct ClipMapBoundingBox {
    pub min_page_x: i32,
    pub min_page_y: i32,
    pub max_page_x: i32,
    pub max_page_y: i32,
}

impl ClipMapBoundingBox {
    pub fn new(min_page: IVec2, max_page: IVec2) -> Self {
        Self {
            min_page_x: min_page.x,
            min_page_y: min_page.y,
            max_page_x: max_page.x,
            max_page_y: max_page.y,
        }
    }

    /// Rectangle that marks the cascade inactive for the frame
    pub fn empty() -> Self {
        Self::new(IVec2::ZERO, IVec2::splat(-1))
    }

    /// True when the cascade has no active pages this frame
    pub fn is_empty(&self) -> bool {
        self.min_page_x > self.max_page_x || self.min_page_y > self.max_page_y
    }
}
