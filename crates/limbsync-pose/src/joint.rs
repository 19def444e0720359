//! Joint identifiers and their bone paths in the host rig

use limbsync_core::Side;

/// Joint driven by limbsync
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Joint {
    // Torso
    LowerSpine,
    UpperSpine,
    Head,

    // Left arm
    LeftUpperArm,
    LeftForearm,

    // Right arm
    RightUpperArm,
    RightForearm,
}

/// Number of joints
pub const JOINT_COUNT: usize = 7;

impl Joint {
    /// All joints, parents before children
    pub fn all() -> &'static [Joint] {
        &[
            Joint::LowerSpine,
            Joint::UpperSpine,
            Joint::Head,
            Joint::LeftUpperArm,
            Joint::LeftForearm,
            Joint::RightUpperArm,
            Joint::RightForearm,
        ]
    }

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Hierarchical path of the bone below the rig root
    pub fn path(self) -> &'static str {
        match self {
            Joint::LowerSpine => "rig/body/spine",
            Joint::UpperSpine => "rig/body/spine/chest",
            Joint::Head => "rig/body/head",
            Joint::LeftUpperArm => "rig/body/shoulder.L/upper_arm.L",
            Joint::LeftForearm => "rig/body/shoulder.L/upper_arm.L/forearm.L",
            Joint::RightUpperArm => "rig/body/shoulder.R/upper_arm.R",
            Joint::RightForearm => "rig/body/shoulder.R/upper_arm.R/forearm.R",
        }
    }

    /// Joint whose presence is required before this one is bound
    pub fn required_parent(self) -> Option<Joint> {
        match self {
            Joint::LeftForearm => Some(Joint::LeftUpperArm),
            Joint::RightForearm => Some(Joint::RightUpperArm),
            _ => None,
        }
    }

    #[inline]
    pub fn upper_arm(side: Side) -> Joint {
        match side {
            Side::Left => Joint::LeftUpperArm,
            Side::Right => Joint::RightUpperArm,
        }
    }

    #[inline]
    pub fn forearm(side: Side) -> Joint {
        match side {
            Side::Left => Joint::LeftForearm,
            Side::Right => Joint::RightForearm,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_joint_indices_are_dense() {
        assert_eq!(Joint::all().len(), JOINT_COUNT);
        for (i, joint) in Joint::all().iter().enumerate() {
            assert_eq!(joint.index(), i);
        }
    }

    #[test]
    fn test_forearm_paths_nest_under_upper_arm() {
        for side in Side::BOTH {
            let upper = Joint::upper_arm(side);
            let fore = Joint::forearm(side);
            assert!(fore.path().starts_with(upper.path()));
            assert_eq!(fore.required_parent(), Some(upper));
            assert!(upper.path().ends_with(side.bone_suffix()));
        }
    }
}
