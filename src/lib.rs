//! viscull - worker-team visibility culling kernels
//!
//! Two independent per-frame culling kernels sharing one execution model
//! (fixed worker teams, team barriers, team-shared scratch):
//!
//! - [`vpl::VplCompactor`] classifies candidate virtual point lights
//!   against the infinite light's shadow cascades and stream-compacts the
//!   lit subset into a bounded buffer with a consistent count.
//! - [`vsm::VsmDrawCuller`] tests each draw call's bounding box, per
//!   shadow cascade, against the clipmap's active page rectangle and a
//!   hierarchical page-residency pyramid, writing 0/1 instance counts
//!   into an indirect draw command array.
//!
//! Everything the renderer owns stays behind traits: shadow evaluation
//! ([`vpl::ShadowSampler`]), the AABB clip-space transform
//! ([`vsm::CascadeProjector`]) and the residency pyramid
//! ([`vsm::ResidencyPyramid`]). The kernels never fail at runtime;
//! overflow saturates and empty cascades are skipped.

pub mod config;
pub mod constants;
pub mod dispatch;
pub mod error;
pub mod layouts;
pub mod vpl;
pub mod vsm;

pub use config::{CullConfig, VplConfig, VsmConfig};
pub use dispatch::{TeamContext, WorkerTeam};
pub use error::{CullError, CullResult};
pub use layouts::{Aabb, ClipMapBoundingBox, DrawElementsIndirectCommand, VplData};
pub use vpl::{ShadowSampler, VplCompactor, VplFrameInputs};
pub use vsm::{CascadeProjector, PageGridInfo, ResidencyPyramid, VsmDrawCuller, VsmFrameInputs};
