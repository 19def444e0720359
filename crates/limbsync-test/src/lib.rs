//! limbsync Test Harness - Lossy network simulation and pose sync scenarios
//!
//! This crate provides:
//! - A seeded lossy link model (latency, jitter, loss bursts, reordering,
//!   duplication)
//! - A multi-peer simulator that carries engine events between peers
//! - A headless local rig and scripted tracking input
//! - End-to-end scenarios measuring how closely observers track a sender

pub mod chaos;
pub mod rig;
pub mod scenario;
pub mod script;
pub mod simulator;

pub use chaos::*;
pub use rig::*;
pub use scenario::*;
pub use script::*;
pub use simulator::*;
