//! Event transport
//!
//! Sends are fire-and-forget. A failed send is logged and counted by the
//! engine; it never interrupts a tick.

use bytes::Bytes;
use limbsync_core::{Delivery, PeerId, SyncError, SyncResult};
use limbsync_wire::EventCode;

/// Host send primitive
pub trait Transport {
    /// Raise `code` with `payload` to exactly `targets`
    fn raise_event(
        &mut self,
        code: EventCode,
        payload: Bytes,
        targets: &[PeerId],
        delivery: Delivery,
    ) -> SyncResult<()>;
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn raise_event(
        &mut self,
        code: EventCode,
        payload: Bytes,
        targets: &[PeerId],
        delivery: Delivery,
    ) -> SyncResult<()> {
        (**self).raise_event(code, payload, targets, delivery)
    }
}

/// One raised event
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutboundEvent {
    pub code: EventCode,
    pub payload: Bytes,
    pub targets: Vec<PeerId>,
    pub delivery: Delivery,
}

impl OutboundEvent {
    pub fn is_for(&self, peer: PeerId) -> bool {
        self.targets.contains(&peer)
    }
}

/// Transport that keeps every raised event in memory
#[derive(Debug, Default)]
pub struct RecordingTransport {
    sent: Vec<OutboundEvent>,
    offline: bool,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// While offline every send fails
    pub fn set_offline(&mut self, offline: bool) {
        self.offline = offline;
    }

    pub fn sent(&self) -> &[OutboundEvent] {
        &self.sent
    }

    pub fn sent_with(&self, code: EventCode) -> impl Iterator<Item = &OutboundEvent> {
        self.sent.iter().filter(move |e| e.code == code)
    }

    /// Take everything raised so far
    pub fn drain(&mut self) -> Vec<OutboundEvent> {
        std::mem::take(&mut self.sent)
    }

    pub fn clear(&mut self) {
        self.sent.clear();
    }
}

impl Transport for RecordingTransport {
    fn raise_event(
        &mut self,
        code: EventCode,
        payload: Bytes,
        targets: &[PeerId],
        delivery: Delivery,
    ) -> SyncResult<()> {
        if self.offline {
            return Err(SyncError::Transport("transport offline".to_string()));
        }
        self.sent.push(OutboundEvent {
            code,
            payload,
            targets: targets.to_vec(),
            delivery,
        });
        Ok(())
    }
}
