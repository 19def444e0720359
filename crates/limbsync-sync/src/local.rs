//! Local rig application
//!
//! Each frame the local player's rig is overwritten from the current
//! [`PoseSnapshot`]. The same snapshot is what peers receive.

use limbsync_core::{Quat, Side};
use limbsync_pose::{BoneTable, Joint, PoseSnapshot, Skeleton, VisibilityMode};

use crate::SyncConfig;

/// State of the host's generic IK controller on the local rig
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IkState {
    /// The rig has no IK controller
    Absent,
    /// IK runs and owns the arms
    Enabled,
    /// IK is present but switched off, arms are free to drive
    Disabled,
}

/// The local player's rig
pub trait LocalRig: Skeleton {
    /// Yaw of the head target in degrees
    fn head_target_yaw(&self) -> f32;

    fn ik_state(&self) -> IkState;

    /// Let the host map head and hand targets onto the rig
    fn map_tracked_targets(&mut self);
}

/// Write a snapshot onto the local rig.
///
/// Root and spine are always written. Head lean is applied only above the
/// configured threshold. Elbows are written only while the IK controller is
/// present and disabled, and only for enabled sides.
pub fn apply_local_pose<L>(
    rig: &mut L,
    bones: &BoneTable<L::Bone>,
    snapshot: &PoseSnapshot,
    config: &SyncConfig,
) where
    L: LocalRig + ?Sized,
{
    rig.set_root_rotation(snapshot.chest_rotation);

    if let Some((upper, lower)) = snapshot.spine_rotations() {
        bones.set(rig, Joint::LowerSpine, lower);
        bones.set(rig, Joint::UpperSpine, upper);
    }

    if let Some(lean) = snapshot.local_head_lean(config.head_lean_threshold_deg) {
        if let Some(head) = bones.rotation(&*rig, Joint::Head) {
            bones.set(rig, Joint::Head, lean * head);
        }
    }

    rig.map_tracked_targets();

    if rig.ik_state() != IkState::Disabled {
        return;
    }
    let align = config.arm_align_offset();
    for side in Side::BOTH {
        let (Some(elbow), Some((upper, fore))) = (snapshot.elbow(side), bones.arm(side)) else {
            continue;
        };
        rig.set_rotation(upper, elbow.upper_arm * align);
        rig.set_rotation(fore, elbow.forearm * align);
    }
}

/// Run `serialize` with the root rotation visible to the generic path.
///
/// In hidden mode the root is reduced to the head yaw for the duration of
/// the call and restored right after.
pub fn with_visible_root<L, F, R>(rig: &mut L, mode: VisibilityMode, serialize: F) -> R
where
    L: LocalRig + ?Sized,
    F: FnOnce(&mut L) -> R,
{
    if !mode.is_hidden() {
        return serialize(rig);
    }
    let true_root = rig.root_rotation();
    rig.set_root_rotation(Quat::from_yaw(rig.head_target_yaw()));
    let result = serialize(rig);
    rig.set_root_rotation(true_root);
    result
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use limbsync_core::Vec3;
    use limbsync_pose::{ElbowResult, MapSkeleton, SpineResult, TrackingFrame};
    use limbsync_wire::ChannelFlags;

    /// Map-backed local rig for tests
    pub(crate) struct TestRig {
        pub skeleton: MapSkeleton,
        pub head_yaw: f32,
        pub ik: IkState,
        pub mapped: u32,
    }

    impl TestRig {
        pub(crate) fn new(ik: IkState) -> Self {
            Self {
                skeleton: MapSkeleton::full(),
                head_yaw: 75.0,
                ik,
                mapped: 0,
            }
        }
    }

    impl Skeleton for TestRig {
        type Bone = usize;

        fn find(&self, path: &str) -> Option<usize> {
            self.skeleton.find(path)
        }

        fn rotation(&self, bone: usize) -> Quat {
            self.skeleton.rotation(bone)
        }

        fn set_rotation(&mut self, bone: usize, rotation: Quat) {
            self.skeleton.set_rotation(bone, rotation)
        }

        fn root_rotation(&self) -> Quat {
            self.skeleton.root_rotation()
        }

        fn set_root_rotation(&mut self, rotation: Quat) {
            self.skeleton.set_root_rotation(rotation)
        }
    }

    impl LocalRig for TestRig {
        fn head_target_yaw(&self) -> f32 {
            self.head_yaw
        }

        fn ik_state(&self) -> IkState {
            self.ik
        }

        fn map_tracked_targets(&mut self) {
            self.mapped += 1;
        }
    }

    fn snapshot(channels: u8, lean_deg: f32) -> PoseSnapshot {
        let frame = TrackingFrame {
            chest_rotation: Some(Quat::from_yaw(15.0)),
            channels: ChannelFlags::new(channels),
            spine: SpineResult {
                upper_spine: Quat::from_euler(0.0, 8.0, 0.0),
                lower_spine: Quat::from_euler(0.0, 4.0, 0.0),
                head_lean_angle: lean_deg,
                head_lean_axis: Vec3::new(0.0, 0.0, 1.0),
            },
            left_elbow: ElbowResult {
                upper_arm: Quat::from_yaw(-30.0),
                forearm: Quat::from_yaw(-60.0),
            },
            ..TrackingFrame::default()
        };
        PoseSnapshot::capture(&frame).unwrap()
    }

    #[test]
    fn test_root_and_spine_written() {
        let mut rig = TestRig::new(IkState::Enabled);
        let bones = BoneTable::resolve(&rig);
        let snap = snapshot(ChannelFlags::SPINE, 0.0);

        apply_local_pose(&mut rig, &bones, &snap, &SyncConfig::default());

        assert_eq!(rig.root_rotation(), Quat::from_yaw(15.0));
        assert_eq!(
            rig.skeleton.joint_rotation(Joint::UpperSpine),
            Some(Quat::from_euler(0.0, 8.0, 0.0))
        );
        assert_eq!(rig.mapped, 1);
    }

    #[test]
    fn test_small_head_lean_not_applied() {
        let mut rig = TestRig::new(IkState::Enabled);
        let bones = BoneTable::resolve(&rig);
        let config = SyncConfig::default();

        apply_local_pose(&mut rig, &bones, &snapshot(ChannelFlags::HEAD_LEAN, 0.2), &config);
        assert_eq!(rig.skeleton.joint_rotation(Joint::Head), Some(Quat::IDENTITY));

        apply_local_pose(&mut rig, &bones, &snapshot(ChannelFlags::HEAD_LEAN, 10.0), &config);
        let head = rig.skeleton.joint_rotation(Joint::Head).unwrap();
        assert!(head.angle_to(&Quat::IDENTITY) > 0.1);
    }

    #[test]
    fn test_head_lean_composes_onto_current_head() {
        let mut rig = TestRig::new(IkState::Enabled);
        let head0 = Quat::from_euler(-20.0, 6.0, 0.0);
        rig.skeleton.set_joint_rotation(Joint::Head, head0);
        let bones = BoneTable::resolve(&rig);
        let snap = snapshot(ChannelFlags::HEAD_LEAN, 10.0);

        apply_local_pose(&mut rig, &bones, &snap, &SyncConfig::default());

        let lean = snap.head_lean().unwrap();
        assert_eq!(rig.skeleton.joint_rotation(Joint::Head), Some(lean * head0));
    }

    #[test]
    fn test_elbows_need_disabled_ik() {
        let config = SyncConfig::default();
        let snap = snapshot(ChannelFlags::LEFT_ELBOW | ChannelFlags::RIGHT_ELBOW, 0.0);

        for ik in [IkState::Absent, IkState::Enabled] {
            let mut rig = TestRig::new(ik);
            let bones = BoneTable::resolve(&rig);
            apply_local_pose(&mut rig, &bones, &snap, &config);
            assert_eq!(rig.skeleton.joint_rotation(Joint::LeftUpperArm), Some(Quat::IDENTITY));
        }

        let mut rig = TestRig::new(IkState::Disabled);
        let bones = BoneTable::resolve(&rig);
        apply_local_pose(&mut rig, &bones, &snap, &config);
        assert_eq!(
            rig.skeleton.joint_rotation(Joint::LeftForearm),
            Some(Quat::from_yaw(-60.0) * config.arm_align_offset())
        );
    }

    #[test]
    fn test_hidden_root_restored() {
        let mut rig = TestRig::new(IkState::Absent);
        rig.set_root_rotation(Quat::from_euler(40.0, 20.0, 10.0));

        let seen = with_visible_root(&mut rig, VisibilityMode::Hidden, |r| r.root_rotation());
        assert_eq!(seen, Quat::from_yaw(75.0));
        assert_eq!(rig.root_rotation(), Quat::from_euler(40.0, 20.0, 10.0));

        let seen = with_visible_root(&mut rig, VisibilityMode::Normal, |r| r.root_rotation());
        assert_eq!(seen, Quat::from_euler(40.0, 20.0, 10.0));
    }
}
