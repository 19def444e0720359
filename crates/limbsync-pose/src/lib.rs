//! limbsync Pose - Body pose as state
//!
//! The bone set is a fixed, closed list of joints. Host skeletons are bound to
//! it once per actor through a [`BoneTable`]; every per-frame read or write
//! goes through that table instead of a string lookup.
//!
//! The local side reads upstream tracking through [`TrackingSource`] and turns
//! it into a [`PoseSnapshot`], the only input the sync layer encodes.

pub mod joint;
pub mod skeleton;
pub mod snapshot;
pub mod tracking;

pub use joint::*;
pub use skeleton::*;
pub use snapshot::*;
pub use tracking::*;
