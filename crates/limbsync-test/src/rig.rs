//! Headless local rig

use limbsync_core::Quat;
use limbsync_pose::{Joint, MapSkeleton, Skeleton};
use limbsync_sync::{IkState, LocalRig};

/// In-memory stand-in for the local player's rig
#[derive(Debug, Clone)]
pub struct SimRig {
    pub skeleton: MapSkeleton,
    pub head_target_yaw: f32,
    pub ik: IkState,
    pub target_mappings: u64,
}

impl SimRig {
    pub fn new() -> Self {
        SimRig {
            skeleton: MapSkeleton::full(),
            head_target_yaw: 0.0,
            ik: IkState::Disabled,
            target_mappings: 0,
        }
    }

    pub fn joint_rotation(&self, joint: Joint) -> Option<Quat> {
        self.skeleton.joint_rotation(joint)
    }
}

impl Default for SimRig {
    fn default() -> Self {
        Self::new()
    }
}

impl Skeleton for SimRig {
    type Bone = usize;

    fn find(&self, path: &str) -> Option<usize> {
        self.skeleton.find(path)
    }

    fn rotation(&self, bone: usize) -> Quat {
        self.skeleton.rotation(bone)
    }

    fn set_rotation(&mut self, bone: usize, rotation: Quat) {
        self.skeleton.set_rotation(bone, rotation);
    }

    fn root_rotation(&self) -> Quat {
        self.skeleton.root_rotation()
    }

    fn set_root_rotation(&mut self, rotation: Quat) {
        self.skeleton.set_root_rotation(rotation);
    }
}

impl LocalRig for SimRig {
    fn head_target_yaw(&self) -> f32 {
        self.head_target_yaw
    }

    fn ik_state(&self) -> IkState {
        self.ik
    }

    fn map_tracked_targets(&mut self) {
        self.target_mappings += 1;
    }
}
