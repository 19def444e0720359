//! Visibility/ownership gate
//!
//! Decides, from peer properties, who receives limbsync traffic and which
//! remote actors limbsync drives instead of the host's generic IK.

use limbsync_core::{Handled, PeerId};

use crate::{PropertyStore, Room};

/// Property-driven opt-in checks
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OwnershipGate {
    key: String,
}

impl OwnershipGate {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// The peer advertises the property, whatever its value.
    ///
    /// Decides recipient eligibility and generic frame takeover.
    #[inline]
    pub fn is_opted_in(&self, props: &PropertyStore) -> bool {
        props.contains_key(&self.key)
    }

    /// The property is present and truthy
    pub fn is_enabled(&self, props: &PropertyStore) -> bool {
        props.get(&self.key).is_some_and(|v| v.is_truthy())
    }

    /// Whether the host's generic IK must stay off for an actor.
    ///
    /// Local actors are never vetoed; remote ones only when their owner's
    /// property is truthy.
    pub fn defer_ik(&self, is_local: bool, owner_props: &PropertyStore) -> Handled {
        if is_local {
            return Handled::No;
        }
        Handled::from(self.is_enabled(owner_props))
    }

    /// Fill `out` with every opted-in remote peer. Leaves it empty when not
    /// in a room.
    pub fn collect_recipients<R>(&self, room: &R, out: &mut Vec<PeerId>)
    where
        R: Room + ?Sized,
    {
        out.clear();
        if !room.in_room() {
            return;
        }
        let local = room.local_peer();
        out.extend(
            room.peers()
                .iter()
                .filter(|p| p.id != local && self.is_opted_in(&p.properties))
                .map(|p| p.id),
        );
    }
}
