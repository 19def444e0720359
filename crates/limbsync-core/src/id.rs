//! Identity types for limbsync
//!
//! Peers are identified by the room-assigned actor number. It is only unique
//! within a room, which is the only scope limbsync ever needs.

use std::fmt;

/// Peer identity - room-scoped actor number
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct PeerId(pub i32);

impl PeerId {
    #[inline]
    pub fn new(actor_number: i32) -> Self {
        PeerId(actor_number)
    }

    #[inline]
    pub fn actor_number(self) -> i32 {
        self.0
    }

    #[inline]
    pub fn to_bytes(self) -> [u8; 4] {
        self.0.to_le_bytes()
    }

    #[inline]
    pub fn from_bytes(bytes: [u8; 4]) -> Self {
        PeerId(i32::from_le_bytes(bytes))
    }
}

impl fmt::Debug for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Peer(#{})", self.0)
    }
}

impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
