//! limbsync Wire Protocol - Quantized pose codec
//!
//! Every value that crosses the network is packed into a fixed-width integer:
//! - Rotations: 32-bit smallest-three
//! - Bounded positions: 32-bit (hand-local) or 64-bit (world)
//! - Colors: 32-bit RGBA
//! - Finger curls: 32 bits per hand
//!
//! Messages are positional arrays of those integers with no field tags, so
//! sender and receiver must agree on the exact layout.

pub mod color;
pub mod event;
pub mod fingers;
pub mod flags;
pub mod hand;
pub mod message;
pub mod rotation;
pub mod shared;
pub mod vector;

pub use color::*;
pub use event::*;
pub use fingers::*;
pub use flags::*;
pub use hand::*;
pub use message::*;
pub use rotation::*;
pub use shared::*;
pub use vector::*;
