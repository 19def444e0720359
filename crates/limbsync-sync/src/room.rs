//! Room membership and per-peer properties
//!
//! The session layer belongs to the host. limbsync only needs to know who is
//! in the room and which peers advertise support through their properties.

use std::collections::HashMap;

use limbsync_core::PeerId;

/// Custom property value
#[derive(Clone, Debug, PartialEq)]
pub enum PropertyValue {
    Bool(bool),
    Int(i64),
    Text(String),
}

impl PropertyValue {
    /// Only `Bool(true)` is truthy
    #[inline]
    pub fn is_truthy(&self) -> bool {
        matches!(self, PropertyValue::Bool(true))
    }
}

impl From<bool> for PropertyValue {
    fn from(v: bool) -> Self {
        PropertyValue::Bool(v)
    }
}

impl From<i64> for PropertyValue {
    fn from(v: i64) -> Self {
        PropertyValue::Int(v)
    }
}

impl From<&str> for PropertyValue {
    fn from(v: &str) -> Self {
        PropertyValue::Text(v.to_string())
    }
}

/// Per-peer custom properties
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PropertyStore {
    values: HashMap<String, PropertyValue>,
}

impl PropertyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, value: impl Into<PropertyValue>) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&mut self, key: &str, value: impl Into<PropertyValue>) {
        self.values.insert(key.to_string(), value.into());
    }

    pub fn remove(&mut self, key: &str) -> Option<PropertyValue> {
        self.values.remove(key)
    }

    pub fn get(&self, key: &str) -> Option<&PropertyValue> {
        self.values.get(key)
    }

    #[inline]
    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// A room member
#[derive(Clone, Debug, PartialEq)]
pub struct Peer {
    pub id: PeerId,
    pub properties: PropertyStore,
}

impl Peer {
    pub fn new(id: PeerId) -> Self {
        Self {
            id,
            properties: PropertyStore::new(),
        }
    }

    pub fn with_properties(id: PeerId, properties: PropertyStore) -> Self {
        Self { id, properties }
    }
}

/// Room membership as seen by the local peer
pub trait Room {
    fn in_room(&self) -> bool;

    fn local_peer(&self) -> PeerId;

    /// Every member, including the local peer
    fn peers(&self) -> &[Peer];

    fn peer(&self, id: PeerId) -> Option<&Peer> {
        self.peers().iter().find(|p| p.id == id)
    }

    fn properties(&self, id: PeerId) -> Option<&PropertyStore> {
        self.peer(id).map(|p| &p.properties)
    }
}

/// In-memory room
#[derive(Clone, Debug)]
pub struct StaticRoom {
    local: PeerId,
    peers: Vec<Peer>,
    connected: bool,
}

impl StaticRoom {
    /// Connected room containing only the local peer
    pub fn new(local: PeerId) -> Self {
        Self::with_local_properties(local, PropertyStore::new())
    }

    pub fn with_local_properties(local: PeerId, properties: PropertyStore) -> Self {
        Self {
            local,
            peers: vec![Peer::with_properties(local, properties)],
            connected: true,
        }
    }

    /// Add a peer, replacing any existing entry with the same id
    pub fn join(&mut self, peer: Peer) {
        self.leave(peer.id);
        self.peers.push(peer);
    }

    pub fn leave(&mut self, id: PeerId) -> Option<Peer> {
        let idx = self.peers.iter().position(|p| p.id == id)?;
        Some(self.peers.remove(idx))
    }

    pub fn set_property(&mut self, id: PeerId, key: &str, value: impl Into<PropertyValue>) -> bool {
        match self.peers.iter_mut().find(|p| p.id == id) {
            Some(peer) => {
                peer.properties.set(key, value);
                true
            }
            None => false,
        }
    }

    pub fn set_connected(&mut self, connected: bool) {
        self.connected = connected;
    }
}

impl Room for StaticRoom {
    fn in_room(&self) -> bool {
        self.connected
    }

    fn local_peer(&self) -> PeerId {
        self.local
    }

    fn peers(&self) -> &[Peer] {
        &self.peers
    }
}
