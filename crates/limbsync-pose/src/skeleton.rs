//! Skeleton bindings
//!
//! The host owns the bone tree. limbsync only needs to find bones by path once,
//! then read and write their world rotations through opaque handles.

use std::collections::HashMap;

use limbsync_core::{Quat, Side};

use crate::{Joint, JOINT_COUNT};

/// Host bone tree
pub trait Skeleton {
    /// Opaque bone handle, cheap to copy
    type Bone: Copy;

    /// Look up a bone by hierarchical path below the rig root
    fn find(&self, path: &str) -> Option<Self::Bone>;

    /// World rotation of a bone
    fn rotation(&self, bone: Self::Bone) -> Quat;

    /// Overwrite the world rotation of a bone
    fn set_rotation(&mut self, bone: Self::Bone, rotation: Quat);

    /// World rotation of the rig root
    fn root_rotation(&self) -> Quat;

    fn set_root_rotation(&mut self, rotation: Quat);
}

/// Joint → bone handle table, resolved once per actor
#[derive(Debug, Clone, Copy)]
pub struct BoneTable<B> {
    bones: [Option<B>; JOINT_COUNT],
}

impl<B: Copy> BoneTable<B> {
    /// Table with nothing bound; every access is a no-op
    pub fn empty() -> Self {
        BoneTable {
            bones: [None; JOINT_COUNT],
        }
    }

    /// Resolve every joint against a skeleton. A forearm is only bound when
    /// its upper arm is, so a half-bound arm is never driven.
    pub fn resolve<S>(skeleton: &S) -> Self
    where
        S: Skeleton<Bone = B> + ?Sized,
    {
        let mut table = Self::empty();
        for &joint in Joint::all() {
            let parent_bound = joint
                .required_parent()
                .map_or(true, |p| table.bones[p.index()].is_some());
            if parent_bound {
                table.bones[joint.index()] = skeleton.find(joint.path());
            }
            if table.bones[joint.index()].is_none() {
                tracing::debug!(joint = ?joint, path = joint.path(), "bone not bound");
            }
        }
        table
    }

    #[inline]
    pub fn get(&self, joint: Joint) -> Option<B> {
        self.bones[joint.index()]
    }

    /// Both bones of an arm, or `None` unless both are bound
    pub fn arm(&self, side: Side) -> Option<(B, B)> {
        Some((
            self.get(Joint::upper_arm(side))?,
            self.get(Joint::forearm(side))?,
        ))
    }

    pub fn bound_count(&self) -> usize {
        self.bones.iter().filter(|b| b.is_some()).count()
    }

    /// Current rotation of a joint, if bound
    pub fn rotation<S>(&self, skeleton: &S, joint: Joint) -> Option<Quat>
    where
        S: Skeleton<Bone = B> + ?Sized,
    {
        self.get(joint).map(|bone| skeleton.rotation(bone))
    }

    /// Write a joint. Returns `false` (and does nothing) if the joint is unbound.
    pub fn set<S>(&self, skeleton: &mut S, joint: Joint, rotation: Quat) -> bool
    where
        S: Skeleton<Bone = B> + ?Sized,
    {
        match self.get(joint) {
            Some(bone) => {
                skeleton.set_rotation(bone, rotation);
                true
            }
            None => false,
        }
    }

    /// Move a joint toward `target` by `t` along the shortest arc
    pub fn slerp_toward<S>(&self, skeleton: &mut S, joint: Joint, target: Quat, t: f32) -> bool
    where
        S: Skeleton<Bone = B> + ?Sized,
    {
        match self.get(joint) {
            Some(bone) => {
                let current = skeleton.rotation(bone);
                skeleton.set_rotation(bone, current.slerp(&target, t));
                true
            }
            None => false,
        }
    }
}

impl<B: Copy> Default for BoneTable<B> {
    fn default() -> Self {
        Self::empty()
    }
}

/// Path-keyed skeleton held in memory.
///
/// Useful for headless peers, replays and tests; bones are plain indices.
#[derive(Debug, Clone, Default)]
pub struct MapSkeleton {
    paths: HashMap<String, usize>,
    rotations: Vec<Quat>,
    root: Quat,
}

impl MapSkeleton {
    pub fn new() -> Self {
        Self::default()
    }

    /// Skeleton containing every joint limbsync drives
    pub fn full() -> Self {
        Self::with_joints(Joint::all())
    }

    /// Skeleton containing only the given joints
    pub fn with_joints(joints: &[Joint]) -> Self {
        let mut skeleton = Self::new();
        for joint in joints {
            skeleton.add_bone(joint.path(), Quat::IDENTITY);
        }
        skeleton
    }

    /// Add (or reset) a bone at `path`
    pub fn add_bone(&mut self, path: &str, rotation: Quat) -> usize {
        if let Some(&idx) = self.paths.get(path) {
            self.rotations[idx] = rotation;
            return idx;
        }
        let idx = self.rotations.len();
        self.rotations.push(rotation);
        self.paths.insert(path.to_string(), idx);
        idx
    }

    /// Rotation of the bone bound to a joint, if the skeleton has it
    pub fn joint_rotation(&self, joint: Joint) -> Option<Quat> {
        self.paths.get(joint.path()).map(|&idx| self.rotations[idx])
    }

    pub fn set_joint_rotation(&mut self, joint: Joint, rotation: Quat) {
        if let Some(&idx) = self.paths.get(joint.path()) {
            self.rotations[idx] = rotation;
        }
    }
}

impl Skeleton for MapSkeleton {
    type Bone = usize;

    fn find(&self, path: &str) -> Option<usize> {
        self.paths.get(path).copied()
    }

    fn rotation(&self, bone: usize) -> Quat {
        self.rotations.get(bone).copied().unwrap_or_default()
    }

    fn set_rotation(&mut self, bone: usize, rotation: Quat) {
        if let Some(slot) = self.rotations.get_mut(bone) {
            *slot = rotation;
        }
    }

    fn root_rotation(&self) -> Quat {
        self.root
    }

    fn set_root_rotation(&mut self, rotation: Quat) {
        self.root = rotation;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_full_skeleton() {
        let skeleton = MapSkeleton::full();
        let table = BoneTable::resolve(&skeleton);
        assert_eq!(table.bound_count(), JOINT_COUNT);
        assert!(table.arm(Side::Left).is_some());
        assert!(table.arm(Side::Right).is_some());
    }

    #[test]
    fn test_forearm_requires_upper_arm() {
        let skeleton = MapSkeleton::with_joints(&[Joint::Head, Joint::LeftForearm]);
        let table = BoneTable::resolve(&skeleton);

        assert!(table.get(Joint::Head).is_some());
        assert!(table.get(Joint::LeftForearm).is_none());
        assert!(table.arm(Side::Left).is_none());
        assert_eq!(table.bound_count(), 1);
    }

    #[test]
    fn test_unbound_write_is_noop() {
        let mut skeleton = MapSkeleton::with_joints(&[Joint::Head]);
        let table = BoneTable::resolve(&skeleton);

        assert!(!table.set(&mut skeleton, Joint::LowerSpine, Quat::from_yaw(10.0)));
        assert!(table.set(&mut skeleton, Joint::Head, Quat::from_yaw(10.0)));
        assert_eq!(skeleton.joint_rotation(Joint::Head), Some(Quat::from_yaw(10.0)));
        assert_eq!(skeleton.joint_rotation(Joint::LowerSpine), None);
    }

    #[test]
    fn test_slerp_toward() {
        let mut skeleton = MapSkeleton::full();
        let table = BoneTable::resolve(&skeleton);
        let target = Quat::from_yaw(90.0);

        table.slerp_toward(&mut skeleton, Joint::UpperSpine, target, 0.5);
        let rot = skeleton.joint_rotation(Joint::UpperSpine).unwrap();
        assert!(rot.angle_to(&Quat::from_yaw(45.0)) < 1e-3);
    }
}
