//! Centralized GPU buffer layout definitions
//!
//! Single source of truth for the `#[repr(C)]` records the kernels read
//! and write. Layouts are byte-compatible with the std430 blocks the
//! renderer binds, so records can be copied wholesale between buffers.

pub mod commands;
pub mod vpl;
pub mod vsm;

pub use commands::DrawElementsIndirectCommand;
pub use vpl::VplData;
pub use vsm::{Aabb, ClipMapBoundingBox};
