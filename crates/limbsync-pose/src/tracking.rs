//! Upstream tracking input
//!
//! The tracker pipeline is opaque to limbsync. Each tick it is asked for the
//! current solver results through [`TrackingSource`].

use limbsync_core::{Quat, Side, Vec3};
use limbsync_wire::{ChannelFlags, FingerCurls};

/// Who may see the full root rotation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum VisibilityMode {
    /// Root rotation is exposed on the generic path and sent as a body message
    #[default]
    Normal,
    /// Root rotation is reduced to yaw on the generic path and no body message
    /// is sent; opted-in peers still receive detail messages
    Hidden,
}

impl VisibilityMode {
    #[inline]
    pub fn is_hidden(self) -> bool {
        matches!(self, VisibilityMode::Hidden)
    }
}

/// Spine solver output
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SpineResult {
    pub upper_spine: Quat,
    pub lower_spine: Quat,
    /// Head lean in degrees around `head_lean_axis`
    pub head_lean_angle: f32,
    pub head_lean_axis: Vec3,
}

impl SpineResult {
    /// Head lean as a relative rotation
    pub fn head_lean(&self) -> Quat {
        Quat::from_axis_angle(self.head_lean_angle, self.head_lean_axis)
    }
}

/// Elbow solver output for one arm
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ElbowResult {
    pub upper_arm: Quat,
    pub forearm: Quat,
}

/// Per-tick view of the tracker pipeline
pub trait TrackingSource {
    /// Tracking is switched on and not overridden by the kill switch
    fn is_enabled(&self) -> bool;

    /// Trackers are initialized and calibrated
    fn is_ready(&self) -> bool;

    /// Rotation of the chest-follow target; `None` until it exists
    fn chest_rotation(&self) -> Option<Quat>;

    fn channels(&self) -> ChannelFlags;

    fn visibility(&self) -> VisibilityMode;

    fn spine(&self) -> SpineResult;

    fn elbow(&self, side: Side) -> ElbowResult;

    fn fingers(&self, side: Side) -> FingerCurls;
}

/// Tracking state pushed by the host each frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackingFrame {
    pub enabled: bool,
    pub ready: bool,
    pub chest_rotation: Option<Quat>,
    pub channels: ChannelFlags,
    pub visibility: VisibilityMode,
    pub spine: SpineResult,
    pub left_elbow: ElbowResult,
    pub right_elbow: ElbowResult,
    pub left_fingers: FingerCurls,
    pub right_fingers: FingerCurls,
}

impl Default for TrackingFrame {
    fn default() -> Self {
        TrackingFrame {
            enabled: true,
            ready: true,
            chest_rotation: Some(Quat::IDENTITY),
            channels: ChannelFlags::NONE,
            visibility: VisibilityMode::Normal,
            spine: SpineResult::default(),
            left_elbow: ElbowResult::default(),
            right_elbow: ElbowResult::default(),
            left_fingers: FingerCurls::OPEN,
            right_fingers: FingerCurls::OPEN,
        }
    }
}

impl TrackingSource for TrackingFrame {
    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn is_ready(&self) -> bool {
        self.ready
    }

    fn chest_rotation(&self) -> Option<Quat> {
        self.chest_rotation
    }

    fn channels(&self) -> ChannelFlags {
        self.channels
    }

    fn visibility(&self) -> VisibilityMode {
        self.visibility
    }

    fn spine(&self) -> SpineResult {
        self.spine
    }

    fn elbow(&self, side: Side) -> ElbowResult {
        match side {
            Side::Left => self.left_elbow,
            Side::Right => self.right_elbow,
        }
    }

    fn fingers(&self, side: Side) -> FingerCurls {
        match side {
            Side::Left => self.left_fingers,
            Side::Right => self.right_fingers,
        }
    }
}
