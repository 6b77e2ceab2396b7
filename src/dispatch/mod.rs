//! Worker-team execution model
//!
//! Both culling kernels run on the same model a GPU compute dispatch uses:
//! a fixed-size team of workers executes one kernel invocation each, shares
//! a scratch region visible only for the duration of the dispatch, and
//! synchronizes through a team-wide barrier. The barrier is the only
//! synchronization primitive; there is no cross-team communication.

pub mod shared;
pub mod team;

pub use shared::{SharedBuffer, SharedCounter, SharedFlags};
pub use team::{TeamContext, WorkerTeam};
