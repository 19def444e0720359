//! limbsync Core - Fundamental types and primitives
//!
//! This crate defines the core types shared by every limbsync crate:
//! - Identifiers (PeerId)
//! - Rotation and vector math (Quat, Vec3)
//! - Delivery classes, hand sides and hook results
//! - Error types

pub mod class;
pub mod error;
pub mod id;
pub mod math;

pub use class::*;
pub use error::*;
pub use id::*;
pub use math::*;
