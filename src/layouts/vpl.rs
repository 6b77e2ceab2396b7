//! Virtual point light buffer layout

use bytemuck::{Pod, Zeroable};
use glam::{Vec3, Vec4};

/// One virtual point light record. Total size: 48 bytes.
///
/// Layout is byte-identical between the unedited candidate buffer and the
/// compacted output buffer so the compaction phase can copy records
/// wholesale.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct VplData {
    /// World-space position (xyz) + padding (w)
    pub position: [f32; 4],

    /// Color and intensity (rgb * intensity, a)
    pub color: [f32; 4],

    /// Stable identity handle assigned by the light registry
    pub handle: u32,

    pub _pad: [u32; 3],
}

impl VplData {
    /// Create a light record
    pub fn new(handle: u32, position: Vec3, color: Vec4) -> Self {
        Self {
            position: [position.x, position.y, position.z, 1.0],
            color: color.to_array(),
            handle,
            _pad: [0; 3],
        }
    }

    /// World-space position
    pub fn world_position(&self) -> Vec3 {
        Vec3::new(self.position[0], self.position[1], self.position[2])
    }
}
