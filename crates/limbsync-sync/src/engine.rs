//! Sync engine
//!
//! [`BodySync`] owns everything limbsync keeps between frames: the local bone
//! table, one [`RemoteActor`] per remote player, the outbound scratch buffers
//! and counters. All hooks run on the host's frame thread.

use std::collections::HashMap;

use limbsync_core::{Delivery, Handled, PeerId, SyncError, SyncResult};
use limbsync_pose::{BoneTable, PoseSnapshot, Skeleton, TrackingSource};
use limbsync_wire::{
    DetailMessage, EventCode, Message, SharedFrame, SharedState, DETAIL_FIELD_COUNT,
};

use crate::{
    apply_local_pose, with_visible_root, LocalRig, OwnershipGate, RemoteActor, Room, SyncConfig,
    Transport,
};

/// Engine counters
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SyncStats {
    /// Local ticks that produced a snapshot
    pub ticks: u64,
    pub body_sent: u64,
    pub detail_sent: u64,
    pub events_received: u64,
    /// Inbound events that could not be parsed or had no actor
    pub events_dropped: u64,
    pub send_failures: u64,
    /// Remote ticks that moved a skeleton
    pub remote_ticks: u64,
}

/// Outcome of [`BodySync::on_serialize_inbound`]
#[derive(Clone, Debug, PartialEq)]
pub enum InboundFrame {
    /// Not an opted-in sender; the host reads the frame itself
    Default,
    /// limbsync decoded the frame; the root rotation is left out
    TakenOver(SharedState),
}

impl InboundFrame {
    #[inline]
    pub fn handled(&self) -> Handled {
        Handled::from(matches!(self, InboundFrame::TakenOver(_)))
    }
}

/// Per-session pose sync engine
pub struct BodySync<T, B> {
    config: SyncConfig,
    gate: OwnershipGate,
    transport: T,
    local_bones: Option<BoneTable<B>>,
    remotes: HashMap<PeerId, RemoteActor<B>>,
    recipients: Vec<PeerId>,
    detail: [u32; DETAIL_FIELD_COUNT],
    stats: SyncStats,
}

impl<T: Transport, B: Copy> BodySync<T, B> {
    pub fn new(transport: T) -> Self {
        Self::with_config(SyncConfig::default(), transport)
    }

    /// Build with `config` as given. An invalid config is logged, not
    /// rejected; use [`try_with_config`](Self::try_with_config) to fail instead.
    pub fn with_config(config: SyncConfig, transport: T) -> Self {
        if let Err(e) = config.validate() {
            tracing::warn!(error = %e, "building sync engine with invalid config");
        }
        Self::build(config, transport)
    }

    /// Validate `config` before building the engine
    pub fn try_with_config(config: SyncConfig, transport: T) -> SyncResult<Self> {
        config.validate()?;
        Ok(Self::build(config, transport))
    }

    fn build(config: SyncConfig, transport: T) -> Self {
        Self {
            gate: OwnershipGate::new(config.property_key.clone()),
            config,
            transport,
            local_bones: None,
            remotes: HashMap::new(),
            recipients: Vec::with_capacity(10),
            detail: [0; DETAIL_FIELD_COUNT],
            stats: SyncStats::default(),
        }
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    pub fn gate(&self) -> &OwnershipGate {
        &self.gate
    }

    pub fn stats(&self) -> &SyncStats {
        &self.stats
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Forget the local bone table, e.g. after the host rebuilt the rig
    pub fn rebind_local(&mut self) {
        self.local_bones = None;
    }

    // ------------------------------------------------------------------
    // Local side
    // ------------------------------------------------------------------

    /// Apply the current tracking pose to the local rig.
    ///
    /// Returns `false` (and touches nothing) when no snapshot is available.
    pub fn on_local_tick<L, S>(&mut self, rig: &mut L, source: &S) -> bool
    where
        L: LocalRig<Bone = B> + ?Sized,
        S: TrackingSource + ?Sized,
    {
        let Some(snapshot) = PoseSnapshot::capture(source) else {
            return false;
        };
        self.stats.ticks += 1;

        let bones = *self
            .local_bones
            .get_or_insert_with(|| BoneTable::resolve(&*rig));
        apply_local_pose(rig, &bones, &snapshot, &self.config);
        true
    }

    /// Wrap the host's generic serialization of the local rig, then send
    /// limbsync messages to opted-in peers.
    ///
    /// `serialize` always runs. In hidden mode it sees a yaw-only root.
    pub fn on_serialize_outbound<L, S, R, F, Out>(
        &mut self,
        rig: &mut L,
        source: &S,
        room: &R,
        serialize: F,
    ) -> Out
    where
        L: LocalRig<Bone = B> + ?Sized,
        S: TrackingSource + ?Sized,
        R: Room + ?Sized,
        F: FnOnce(&mut L) -> Out,
    {
        let snapshot = PoseSnapshot::capture(source);
        let mode = snapshot.map(|s| s.visibility).unwrap_or_default();
        let out = with_visible_root(rig, mode, serialize);

        if let Some(snapshot) = snapshot {
            self.send_snapshot(&snapshot, room);
        }
        out
    }

    /// Send one snapshot to every opted-in peer in `room`
    pub fn send_snapshot<R>(&mut self, snapshot: &PoseSnapshot, room: &R)
    where
        R: Room + ?Sized,
    {
        self.gate.collect_recipients(room, &mut self.recipients);
        if self.recipients.is_empty() {
            tracing::trace!("no opted-in recipients");
            return;
        }

        if !snapshot.visibility.is_hidden() {
            let payload = snapshot.body_message().to_bytes();
            if self.raise(EventCode::Body, payload) {
                self.stats.body_sent += 1;
            }
        }

        if snapshot.wants_detail() {
            snapshot.write_detail_fields(&mut self.detail);
            let payload = DetailMessage::new(self.detail).to_bytes();
            if self.raise(EventCode::Detail, payload) {
                self.stats.detail_sent += 1;
            }
        }
    }

    fn raise(&mut self, code: EventCode, payload: bytes::Bytes) -> bool {
        match self
            .transport
            .raise_event(code, payload, &self.recipients, Delivery::Unreliable)
        {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(?code, error = %e, "send failed");
                self.stats.send_failures += 1;
                false
            }
        }
    }

    // ------------------------------------------------------------------
    // Remote side
    // ------------------------------------------------------------------

    /// Bind a newly instantiated remote actor
    pub fn on_actor_created<S>(&mut self, peer: PeerId, skeleton: &S)
    where
        S: Skeleton<Bone = B> + ?Sized,
    {
        let actor = RemoteActor::bind(skeleton);
        tracing::debug!(%peer, bound = actor.bones().bound_count(), "remote actor bound");
        self.remotes.insert(peer, actor);
    }

    pub fn on_actor_removed(&mut self, peer: PeerId) {
        if self.remotes.remove(&peer).is_some() {
            tracing::debug!(%peer, "remote actor removed");
        }
    }

    pub fn remote(&self, peer: PeerId) -> Option<&RemoteActor<B>> {
        self.remotes.get(&peer)
    }

    pub fn remote_count(&self) -> usize {
        self.remotes.len()
    }

    /// Handle an inbound event. Malformed payloads and events for unknown
    /// actors are dropped and counted; the error is returned for callers
    /// that want it.
    pub fn on_event(&mut self, sender: PeerId, code: u8, payload: &[u8]) -> SyncResult<()> {
        self.stats.events_received += 1;

        let message = match Message::parse(code, payload) {
            Ok(message) => message,
            Err(e) => {
                tracing::debug!(%sender, error = %e, "dropping inbound event");
                self.stats.events_dropped += 1;
                return Err(e);
            }
        };

        match self.remotes.get_mut(&sender) {
            Some(actor) => {
                actor.receive(&message);
                Ok(())
            }
            None => {
                tracing::debug!(%sender, code = ?message.code(), "event for unknown actor");
                self.stats.events_dropped += 1;
                Err(SyncError::PeerNotInRoom(sender))
            }
        }
    }

    /// Converge a remote skeleton toward its targets
    pub fn on_remote_tick<S>(&mut self, peer: PeerId, skeleton: &mut S, dt: f32) -> bool
    where
        S: Skeleton<Bone = B> + ?Sized,
    {
        let Some(actor) = self.remotes.get_mut(&peer) else {
            return false;
        };
        let moved = actor.tick(skeleton, dt, &self.config);
        if moved {
            self.stats.remote_ticks += 1;
        }
        moved
    }

    /// Take over the generic frame of an opted-in sender
    pub fn on_serialize_inbound<R>(
        &self,
        sender: PeerId,
        room: &R,
        frame: &SharedFrame,
    ) -> InboundFrame
    where
        R: Room + ?Sized,
    {
        match room.properties(sender) {
            Some(props) if self.gate.is_opted_in(props) => {
                InboundFrame::TakenOver(frame.decode(false))
            }
            _ => InboundFrame::Default,
        }
    }

    /// Decide whether the host's generic IK may enable on an actor
    pub fn on_remote_actor_enabled<R>(&self, actor: PeerId, room: &R) -> Handled
    where
        R: Room + ?Sized,
    {
        let is_local = actor == room.local_peer();
        match room.properties(actor) {
            Some(props) => self.gate.defer_ik(is_local, props),
            None => Handled::No,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::local::tests::TestRig;
    use crate::{IkState, Peer, PropertyStore, RecordingTransport, StaticRoom};
    use limbsync_core::{Quat, Vec3};
    use limbsync_pose::{ElbowResult, Joint, MapSkeleton, SpineResult, TrackingFrame, VisibilityMode};
    use limbsync_wire::{
        angular_distance, encode_rotation, BodyMessage, ChannelFlags, DetailField, HandState,
        DETAIL_PAYLOAD_SIZE, ROTATION_ERROR_BOUND,
    };

    const LOCAL: PeerId = PeerId(1);
    const OPTED: PeerId = PeerId(2);
    const VANILLA: PeerId = PeerId(3);

    fn room() -> StaticRoom {
        let mut room =
            StaticRoom::with_local_properties(LOCAL, PropertyStore::new().with("limbsync", true));
        room.join(Peer::with_properties(
            OPTED,
            PropertyStore::new().with("limbsync", true),
        ));
        room.join(Peer::new(VANILLA));
        room
    }

    fn frame(channels: u8, visibility: VisibilityMode) -> TrackingFrame {
        TrackingFrame {
            chest_rotation: Some(Quat::from_euler(20.0, 10.0, 0.0)),
            channels: ChannelFlags::new(channels),
            visibility,
            spine: SpineResult {
                upper_spine: Quat::from_euler(0.0, 12.0, 0.0),
                lower_spine: Quat::from_euler(0.0, 6.0, 0.0),
                head_lean_angle: 0.2,
                head_lean_axis: Vec3::new(0.0, 0.0, 1.0),
            },
            right_elbow: ElbowResult {
                upper_arm: Quat::from_yaw(35.0),
                forearm: Quat::from_yaw(70.0),
            },
            ..TrackingFrame::default()
        }
    }

    fn engine() -> BodySync<RecordingTransport, usize> {
        BodySync::new(RecordingTransport::new())
    }

    #[test]
    fn test_normal_mode_sends_body_and_detail() {
        let mut sync = engine();
        let mut rig = TestRig::new(IkState::Absent);
        let f = frame(ChannelFlags::SPINE, VisibilityMode::Normal);

        assert!(sync.on_local_tick(&mut rig, &f));
        sync.on_serialize_outbound(&mut rig, &f, &room(), |_| ());

        let sent = sync.transport().sent();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].code, EventCode::Body);
        assert_eq!(sent[1].code, EventCode::Detail);
        assert_eq!(sent[1].payload.len(), DETAIL_PAYLOAD_SIZE);
        for event in sent {
            assert_eq!(event.targets, vec![OPTED]);
            assert_eq!(event.delivery, Delivery::Unreliable);
        }
        assert_eq!(sync.stats().body_sent, 1);
        assert_eq!(sync.stats().detail_sent, 1);
    }

    #[test]
    fn test_hidden_mode_withholds_body() {
        let mut sync = engine();
        let mut rig = TestRig::new(IkState::Absent);
        let f = frame(ChannelFlags::RIGHT_ELBOW, VisibilityMode::Hidden);

        sync.on_local_tick(&mut rig, &f);
        let true_root = rig.root_rotation();
        let seen = sync.on_serialize_outbound(&mut rig, &f, &room(), |r| r.root_rotation());

        assert_eq!(seen, Quat::from_yaw(rig.head_yaw));
        assert_eq!(rig.root_rotation(), true_root);

        let sent = sync.transport().sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].code, EventCode::Detail);
        assert_eq!(sync.stats().body_sent, 0);
    }

    #[test]
    fn test_rebind_after_rig_rebuild() {
        let mut sync = engine();
        let f = frame(ChannelFlags::SPINE, VisibilityMode::Normal);
        let mut rig = TestRig::new(IkState::Absent);
        assert!(sync.on_local_tick(&mut rig, &f));

        // Same rig, rebuilt with fewer bones and different indices
        rig.skeleton = MapSkeleton::with_joints(&[Joint::UpperSpine]);
        sync.on_local_tick(&mut rig, &f);
        assert_ne!(rig.skeleton.joint_rotation(Joint::UpperSpine), Some(f.spine.upper_spine));

        sync.rebind_local();
        sync.on_local_tick(&mut rig, &f);
        assert_eq!(rig.skeleton.joint_rotation(Joint::UpperSpine), Some(f.spine.upper_spine));
    }

    #[test]
    fn test_no_snapshot_no_traffic() {
        let mut sync = engine();
        let mut rig = TestRig::new(IkState::Disabled);
        let mut f = frame(ChannelFlags::ALL.0, VisibilityMode::Hidden);
        f.ready = false;
        let before = rig.root_rotation();

        assert!(!sync.on_local_tick(&mut rig, &f));
        let seen = sync.on_serialize_outbound(&mut rig, &f, &room(), |r| r.root_rotation());

        assert_eq!(seen, before);
        assert_eq!(rig.mapped, 0);
        assert!(sync.transport().sent().is_empty());
        assert_eq!(sync.stats().ticks, 0);
    }

    #[test]
    fn test_peers_without_property_receive_nothing() {
        let mut sync = engine();
        let mut rig = TestRig::new(IkState::Absent);
        let f = frame(ChannelFlags::ALL.0, VisibilityMode::Normal);

        let mut vanilla_only = StaticRoom::new(LOCAL);
        vanilla_only.join(Peer::new(VANILLA));
        sync.on_serialize_outbound(&mut rig, &f, &vanilla_only, |_| ());
        assert!(sync.transport().sent().is_empty());

        sync.on_serialize_outbound(&mut rig, &f, &room(), |_| ());
        assert!(sync.transport().sent().iter().all(|e| !e.is_for(VANILLA)));
    }

    #[test]
    fn test_small_head_lean_transmitted_not_applied() {
        let mut sync = engine();
        let mut rig = TestRig::new(IkState::Absent);
        let f = frame(ChannelFlags::SPINE | ChannelFlags::HEAD_LEAN, VisibilityMode::Normal);

        sync.on_local_tick(&mut rig, &f);
        assert_eq!(rig.skeleton.joint_rotation(Joint::Head), Some(Quat::IDENTITY));

        sync.on_serialize_outbound(&mut rig, &f, &room(), |_| ());
        let detail = sync
            .transport()
            .sent_with(EventCode::Detail)
            .next()
            .map(|e| DetailMessage::parse(&e.payload).unwrap())
            .unwrap();
        let lean = detail.rotation(DetailField::HeadLean).unwrap();
        assert!(angular_distance(lean, f.spine.head_lean()) <= ROTATION_ERROR_BOUND);
    }

    #[test]
    fn test_send_failure_counted() {
        let mut sync = engine();
        sync.transport_mut().set_offline(true);
        let mut rig = TestRig::new(IkState::Absent);
        let f = frame(ChannelFlags::SPINE, VisibilityMode::Normal);

        sync.on_serialize_outbound(&mut rig, &f, &room(), |_| ());
        assert_eq!(sync.stats().send_failures, 2);
        assert_eq!(sync.stats().body_sent, 0);
    }

    #[test]
    fn test_inbound_events() {
        let mut sync = engine();
        let mut skeleton = MapSkeleton::full();
        sync.on_actor_created(OPTED, &skeleton);

        let body = BodyMessage::new(encode_rotation(Quat::from_yaw(120.0)));
        sync.on_event(OPTED, EventCode::Body.to_byte(), &body.to_bytes())
            .unwrap();

        let mut fields = [0u32; DETAIL_FIELD_COUNT];
        fields[DetailField::LowerSpine.index()] = encode_rotation(Quat::from_euler(0.0, 30.0, 0.0));
        let detail = DetailMessage::new(fields);
        sync.on_event(OPTED, EventCode::Detail.to_byte(), &detail.to_bytes())
            .unwrap();

        assert!(sync.on_remote_tick(OPTED, &mut skeleton, 0.05));
        assert_eq!(skeleton.root_rotation(), body.decoded_rotation());

        assert!(sync.on_event(OPTED, 0x42, &[0u8; 36]).is_err());
        assert!(sync.on_event(OPTED, EventCode::Detail.to_byte(), &[0u8; 8]).is_err());
        assert!(matches!(
            sync.on_event(VANILLA, EventCode::Body.to_byte(), &body.to_bytes()),
            Err(SyncError::PeerNotInRoom(_))
        ));
        assert_eq!(sync.stats().events_received, 5);
        assert_eq!(sync.stats().events_dropped, 3);

        sync.on_actor_removed(OPTED);
        assert!(!sync.on_remote_tick(OPTED, &mut skeleton, 0.05));
        assert_eq!(sync.remote_count(), 0);
    }

    #[test]
    fn test_inbound_takeover_drops_root() {
        let sync = engine();
        let room = room();
        let state = SharedState {
            head_rotation: Quat::from_yaw(10.0),
            right_hand: HandState {
                position: Vec3::new(0.2, 0.0, 0.1),
                rotation: Quat::IDENTITY,
            },
            ..SharedState::default()
        };
        let frame = SharedFrame::encode(&state, Quat::from_yaw(80.0));

        let taken = sync.on_serialize_inbound(OPTED, &room, &frame);
        assert!(taken.handled().is_handled());
        match taken {
            InboundFrame::TakenOver(decoded) => assert_eq!(decoded.root_rotation, None),
            InboundFrame::Default => panic!("expected takeover"),
        }

        let vanilla = sync.on_serialize_inbound(VANILLA, &room, &frame);
        assert_eq!(vanilla, InboundFrame::Default);
        assert!(vanilla.handled().run_default());
    }

    #[test]
    fn test_ik_veto() {
        let sync = engine();
        let mut room = room();
        room.join(Peer::with_properties(
            PeerId(4),
            PropertyStore::new().with("limbsync", false),
        ));

        assert_eq!(sync.on_remote_actor_enabled(OPTED, &room), Handled::Yes);
        assert_eq!(sync.on_remote_actor_enabled(LOCAL, &room), Handled::No);
        assert_eq!(sync.on_remote_actor_enabled(VANILLA, &room), Handled::No);
        assert_eq!(sync.on_remote_actor_enabled(PeerId(4), &room), Handled::No);
        assert_eq!(sync.on_remote_actor_enabled(PeerId(9), &room), Handled::No);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = SyncConfig {
            convergence_rate: -1.0,
            ..SyncConfig::default()
        };
        assert!(BodySync::<_, usize>::try_with_config(config, RecordingTransport::new()).is_err());
    }
}
