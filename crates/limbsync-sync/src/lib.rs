//! limbsync Sync - Pose replication between peers
//!
//! [`BodySync`] is the per-session engine the host drives from its frame loop:
//!
//! - local side: apply the tracked pose to the local rig, then encode and
//!   send it to opted-in peers around the host's generic serialization
//! - remote side: decode inbound messages into per-actor target state and
//!   converge each remote skeleton toward it every frame
//!
//! Host callbacks that may replace default behavior return [`Handled`].
//!
//! [`Handled`]: limbsync_core::Handled

pub mod config;
pub mod engine;
pub mod gate;
pub mod local;
pub mod logging;
pub mod remote;
pub mod room;
pub mod transport;

pub use config::*;
pub use engine::*;
pub use gate::*;
pub use local::*;
pub use logging::*;
pub use remote::*;
pub use room::*;
pub use transport::*;
