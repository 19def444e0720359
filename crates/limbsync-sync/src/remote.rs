//! Remote actor reconstruction
//!
//! Inbound messages only update targets. The skeleton moves toward them once
//! per frame, so loss, jitter and reordering show up as slightly slower
//! convergence instead of pops.

use limbsync_core::{Quat, Side};
use limbsync_pose::{BoneTable, Joint, Skeleton, JOINT_COUNT};
use limbsync_wire::{BodyMessage, ChannelFlags, DetailField, DetailMessage, FingerCurls, Message};

use crate::SyncConfig;

/// Latest decoded targets for one remote actor
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteTargetState {
    /// Per-joint target, `None` when the last detail message had no data for it
    targets: [Option<Quat>; JOINT_COUNT],
    head_lean: Option<Quat>,
    presence: ChannelFlags,
    target_fingers: [FingerCurls; 2],
    fingers: [FingerCurls; 2],
    /// Body rotation waiting to be snapped on the next tick
    pending_body: Option<Quat>,
    last_body: Option<Quat>,
    detail_count: u64,
}

impl Default for RemoteTargetState {
    fn default() -> Self {
        Self {
            targets: [None; JOINT_COUNT],
            head_lean: None,
            presence: ChannelFlags::NONE,
            target_fingers: [FingerCurls::OPEN; 2],
            fingers: [FingerCurls::OPEN; 2],
            pending_body: None,
            last_body: None,
            detail_count: 0,
        }
    }
}

impl RemoteTargetState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply_body(&mut self, msg: &BodyMessage) {
        let rotation = msg.decoded_rotation();
        self.pending_body = Some(rotation);
        self.last_body = Some(rotation);
    }

    /// Replace every target with the contents of `msg`
    pub fn apply_detail(&mut self, msg: &DetailMessage) {
        for side in Side::BOTH {
            self.targets[Joint::upper_arm(side).index()] =
                msg.rotation(DetailField::upper_arm(side));
            self.targets[Joint::forearm(side).index()] = msg.rotation(DetailField::forearm(side));
            self.target_fingers[side_index(side)] = msg.fingers(side);
        }
        self.targets[Joint::UpperSpine.index()] = msg.rotation(DetailField::UpperSpine);
        self.targets[Joint::LowerSpine.index()] = msg.rotation(DetailField::LowerSpine);
        self.head_lean = msg.rotation(DetailField::HeadLean);
        self.presence = msg.presence();
        self.detail_count += 1;
    }

    pub fn apply(&mut self, msg: &Message) {
        match msg {
            Message::Body(body) => self.apply_body(body),
            Message::Detail(detail) => self.apply_detail(detail),
        }
    }

    /// Whether the last detail message carried anything to drive
    #[inline]
    pub fn has_data(&self) -> bool {
        self.detail_count > 0 && !self.presence.is_empty()
    }

    pub fn target(&self, joint: Joint) -> Option<Quat> {
        self.targets[joint.index()]
    }

    pub fn head_lean(&self) -> Option<Quat> {
        self.head_lean
    }

    pub fn presence(&self) -> ChannelFlags {
        self.presence
    }

    pub fn detail_count(&self) -> u64 {
        self.detail_count
    }

    /// Last body rotation received, snapped or not
    pub fn body_rotation(&self) -> Option<Quat> {
        self.last_body
    }

    /// Smoothed finger curls
    pub fn fingers(&self, side: Side) -> &FingerCurls {
        &self.fingers[side_index(side)]
    }

    pub fn target_fingers(&self, side: Side) -> &FingerCurls {
        &self.target_fingers[side_index(side)]
    }
}

#[inline]
fn side_index(side: Side) -> usize {
    match side {
        Side::Left => 0,
        Side::Right => 1,
    }
}

/// A remote actor: its resolved bones and target state
#[derive(Debug, Clone)]
pub struct RemoteActor<B> {
    bones: BoneTable<B>,
    state: RemoteTargetState,
}

impl<B: Copy> RemoteActor<B> {
    /// Bind a freshly instantiated actor
    pub fn bind<S>(skeleton: &S) -> Self
    where
        S: Skeleton<Bone = B> + ?Sized,
    {
        Self {
            bones: BoneTable::resolve(skeleton),
            state: RemoteTargetState::new(),
        }
    }

    pub fn bones(&self) -> &BoneTable<B> {
        &self.bones
    }

    pub fn state(&self) -> &RemoteTargetState {
        &self.state
    }

    pub fn receive(&mut self, msg: &Message) {
        self.state.apply(msg);
    }

    /// Move the skeleton one frame toward the targets.
    ///
    /// A pending body rotation is written directly. Everything else is
    /// slerped by `t = clamp(dt * rate, 0, 1)`. Returns `false` when there was
    /// no detail data to drive.
    pub fn tick<S>(&mut self, skeleton: &mut S, dt: f32, config: &SyncConfig) -> bool
    where
        S: Skeleton<Bone = B> + ?Sized,
    {
        if let Some(body) = self.state.pending_body.take() {
            skeleton.set_root_rotation(body);
        }

        if !self.state.has_data() {
            return false;
        }

        let t = config.blend_factor(dt);
        let align = config.arm_align_offset();

        for side in Side::BOTH {
            if self.bones.arm(side).is_none() {
                continue;
            }
            for joint in [Joint::upper_arm(side), Joint::forearm(side)] {
                if let Some(target) = self.state.target(joint) {
                    self.bones.slerp_toward(skeleton, joint, target * align, t);
                }
            }
        }

        for joint in [Joint::LowerSpine, Joint::UpperSpine] {
            if let Some(target) = self.state.target(joint) {
                self.bones.slerp_toward(skeleton, joint, target, t);
            }
        }

        if let Some(lean) = self.state.head_lean {
            if let Some(head) = self.bones.rotation(&*skeleton, Joint::Head) {
                self.bones.slerp_toward(skeleton, Joint::Head, lean * head, t);
            }
        }

        for i in 0..2 {
            self.state.fingers[i] = self.state.fingers[i].lerp(&self.state.target_fingers[i], t);
        }

        true
    }
}
