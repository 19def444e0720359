//! Local pose snapshot
//!
//! A [`PoseSnapshot`] is a pure read of the tracker pipeline for one tick. It
//! is the single source for both local bone writes and outgoing messages, so
//! what the local player sees and what peers receive never diverge.

use limbsync_core::{Quat, Side};
use limbsync_wire::{
    encode_rotation, pack_fingers, BodyMessage, ChannelFlags, DetailField, DetailMessage,
    FingerCurls, DETAIL_FIELD_COUNT,
};

use crate::{ElbowResult, SpineResult, TrackingSource, VisibilityMode};

/// Why a tick produced no snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    Disabled,
    NotReady,
    NoChestTarget,
}

/// One tick of local tracking state
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoseSnapshot {
    pub chest_rotation: Quat,
    pub channels: ChannelFlags,
    pub visibility: VisibilityMode,
    /// Present when the spine or head-lean channel is enabled
    pub spine: Option<SpineResult>,
    pub left_elbow: Option<ElbowResult>,
    pub right_elbow: Option<ElbowResult>,
    pub left_fingers: FingerCurls,
    pub right_fingers: FingerCurls,
}

impl PoseSnapshot {
    /// Read the tracker pipeline. `None` means the whole tick is skipped.
    pub fn capture<T>(source: &T) -> Option<Self>
    where
        T: TrackingSource + ?Sized,
    {
        match Self::try_capture(source) {
            Ok(snapshot) => Some(snapshot),
            Err(reason) => {
                tracing::trace!(?reason, "pose capture skipped");
                None
            }
        }
    }

    /// Like [`capture`](Self::capture) but reports why nothing was read
    pub fn try_capture<T>(source: &T) -> Result<Self, SkipReason>
    where
        T: TrackingSource + ?Sized,
    {
        if !source.is_enabled() {
            return Err(SkipReason::Disabled);
        }
        let chest_rotation = source.chest_rotation().ok_or(SkipReason::NoChestTarget)?;
        if !source.is_ready() {
            return Err(SkipReason::NotReady);
        }

        let channels = source.channels();
        let spine = (channels.has_spine() || channels.has_head_lean()).then(|| source.spine());

        Ok(PoseSnapshot {
            chest_rotation,
            channels,
            visibility: source.visibility(),
            spine,
            left_elbow: channels.has_left_elbow().then(|| source.elbow(Side::Left)),
            right_elbow: channels.has_right_elbow().then(|| source.elbow(Side::Right)),
            left_fingers: source.fingers(Side::Left),
            right_fingers: source.fingers(Side::Right),
        })
    }

    pub fn elbow(&self, side: Side) -> Option<&ElbowResult> {
        match side {
            Side::Left => self.left_elbow.as_ref(),
            Side::Right => self.right_elbow.as_ref(),
        }
    }

    pub fn fingers(&self, side: Side) -> &FingerCurls {
        match side {
            Side::Left => &self.left_fingers,
            Side::Right => &self.right_fingers,
        }
    }

    /// Spine rotations, only when the spine channel is enabled
    pub fn spine_rotations(&self) -> Option<(Quat, Quat)> {
        if !self.channels.has_spine() {
            return None;
        }
        self.spine.map(|s| (s.upper_spine, s.lower_spine))
    }

    /// Head lean, when the head-lean channel is enabled
    pub fn head_lean(&self) -> Option<Quat> {
        if !self.channels.has_head_lean() {
            return None;
        }
        self.spine.map(|s| s.head_lean())
    }

    /// Head lean to apply on the local rig. Leans smaller than
    /// `threshold_deg` are ignored locally but still transmitted.
    pub fn local_head_lean(&self, threshold_deg: f32) -> Option<Quat> {
        let spine = self.spine?;
        if !self.channels.has_head_lean() || spine.head_lean_angle.abs() < threshold_deg {
            return None;
        }
        Some(spine.head_lean())
    }

    #[inline]
    pub fn wants_detail(&self) -> bool {
        self.channels.wants_detail()
    }

    /// Packed chest-follow rotation
    #[inline]
    pub fn body_rotation(&self) -> u32 {
        encode_rotation(self.chest_rotation)
    }

    pub fn body_message(&self) -> BodyMessage {
        BodyMessage::new(self.body_rotation())
    }

    /// Fill the fixed detail layout. Disabled channels are `0`; fingers are
    /// always packed.
    pub fn write_detail_fields(&self, fields: &mut [u32; DETAIL_FIELD_COUNT]) {
        *fields = [0; DETAIL_FIELD_COUNT];

        for side in Side::BOTH {
            if let Some(elbow) = self.elbow(side) {
                fields[DetailField::upper_arm(side).index()] = encode_rotation(elbow.upper_arm);
                fields[DetailField::forearm(side).index()] = encode_rotation(elbow.forearm);
            }
            fields[DetailField::fingers(side).index()] = pack_fingers(self.fingers(side));
        }

        if let Some((upper, lower)) = self.spine_rotations() {
            fields[DetailField::UpperSpine.index()] = encode_rotation(upper);
            fields[DetailField::LowerSpine.index()] = encode_rotation(lower);
        }
        if let Some(lean) = self.head_lean() {
            fields[DetailField::HeadLean.index()] = encode_rotation(lean);
        }
    }

    pub fn detail_fields(&self) -> [u32; DETAIL_FIELD_COUNT] {
        let mut fields = [0; DETAIL_FIELD_COUNT];
        self.write_detail_fields(&mut fields);
        fields
    }

    pub fn detail_message(&self) -> DetailMessage {
        DetailMessage::new(self.detail_fields())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TrackingFrame;
    use limbsync_core::Vec3;
    use limbsync_wire::{angular_distance, decode_rotation, ROTATION_ERROR_BOUND};

    fn frame(channels: u8) -> TrackingFrame {
        TrackingFrame {
            chest_rotation: Some(Quat::from_yaw(30.0)),
            channels: ChannelFlags::new(channels),
            spine: SpineResult {
                upper_spine: Quat::from_euler(0.0, 10.0, 0.0),
                lower_spine: Quat::from_euler(0.0, 5.0, 0.0),
                head_lean_angle: 12.0,
                head_lean_axis: Vec3::new(0.0, 0.0, 1.0),
            },
            left_elbow: ElbowResult {
                upper_arm: Quat::from_yaw(-40.0),
                forearm: Quat::from_yaw(-20.0),
            },
            right_elbow: ElbowResult {
                upper_arm: Quat::from_yaw(40.0),
                forearm: Quat::from_yaw(20.0),
            },
            left_fingers: FingerCurls::FIST,
            ..TrackingFrame::default()
        }
    }

    #[test]
    fn test_capture_gates() {
        let mut f = frame(0);
        assert!(PoseSnapshot::capture(&f).is_some());

        f.enabled = false;
        assert_eq!(PoseSnapshot::try_capture(&f), Err(SkipReason::Disabled));

        f.enabled = true;
        f.chest_rotation = None;
        assert_eq!(PoseSnapshot::try_capture(&f), Err(SkipReason::NoChestTarget));

        f.chest_rotation = Some(Quat::IDENTITY);
        f.ready = false;
        assert_eq!(PoseSnapshot::try_capture(&f), Err(SkipReason::NotReady));
    }

    #[test]
    fn test_detail_field_order() {
        let f = frame(ChannelFlags::RIGHT_ELBOW);
        let snapshot = PoseSnapshot::capture(&f).unwrap();
        let fields = snapshot.detail_fields();

        assert_eq!(fields[0], 0);
        assert_eq!(fields[1], 0);
        assert_eq!(fields[2], encode_rotation(f.right_elbow.upper_arm));
        assert_eq!(fields[3], encode_rotation(f.right_elbow.forearm));
        assert_eq!(fields[4], 0);
        assert_eq!(fields[5], 0);
        assert_eq!(fields[6], 0);
        assert_eq!(fields[7], pack_fingers(&FingerCurls::FIST));
        assert_eq!(fields[8], pack_fingers(&FingerCurls::OPEN));
        assert!(snapshot.wants_detail());
    }

    #[test]
    fn test_spine_and_head_lean_fields() {
        let f = frame(ChannelFlags::SPINE | ChannelFlags::HEAD_LEAN);
        let fields = PoseSnapshot::capture(&f).unwrap().detail_fields();

        assert_eq!(fields[4], encode_rotation(f.spine.upper_spine));
        assert_eq!(fields[5], encode_rotation(f.spine.lower_spine));
        let lean = decode_rotation(fields[6]);
        assert!(angular_distance(lean, f.spine.head_lean()) <= ROTATION_ERROR_BOUND);
    }

    #[test]
    fn test_head_lean_alone_sends_nothing() {
        let f = frame(ChannelFlags::HEAD_LEAN);
        let snapshot = PoseSnapshot::capture(&f).unwrap();
        assert!(!snapshot.wants_detail());
        assert!(snapshot.head_lean().is_some());
        assert!(snapshot.spine_rotations().is_none());
    }

    #[test]
    fn test_small_lean_packed_but_not_applied() {
        let mut f = frame(ChannelFlags::SPINE | ChannelFlags::HEAD_LEAN);
        f.spine.head_lean_angle = 0.2;
        let snapshot = PoseSnapshot::capture(&f).unwrap();

        assert_ne!(snapshot.detail_fields()[DetailField::HeadLean.index()], 0);
        assert!(snapshot.local_head_lean(0.5).is_none());

        f.spine.head_lean_angle = -0.6;
        let snapshot = PoseSnapshot::capture(&f).unwrap();
        assert!(snapshot.local_head_lean(0.5).is_some());
    }

    #[test]
    fn test_body_rotation() {
        let snapshot = PoseSnapshot::capture(&frame(0)).unwrap();
        let decoded = snapshot.body_message().decoded_rotation();
        assert!(angular_distance(decoded, Quat::from_yaw(30.0)) <= ROTATION_ERROR_BOUND);
    }

    proptest::proptest! {
        #[test]
        fn prop_presence_mirrors_channels(bits in 0u8..16) {
            let snapshot = PoseSnapshot::capture(&frame(bits)).unwrap();
            let presence = snapshot.detail_message().presence();
            proptest::prop_assert_eq!(presence, ChannelFlags::new(bits));
        }
    }
}
