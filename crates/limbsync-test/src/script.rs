//! Scripted tracking input

use limbsync_core::{Quat, Vec3};
use limbsync_pose::{ElbowResult, SpineResult, TrackingFrame, VisibilityMode};
use limbsync_wire::{ChannelFlags, FingerCurls};

/// Tracking input as a function of time in seconds
pub trait PoseScript {
    fn frame(&self, t: f32) -> TrackingFrame;
}

impl<F> PoseScript for F
where
    F: Fn(f32) -> TrackingFrame,
{
    fn frame(&self, t: f32) -> TrackingFrame {
        self(t)
    }
}

/// Slow upper-body sway driving every channel in `channels`
#[derive(Debug, Clone, Copy)]
pub struct Sway {
    pub channels: ChannelFlags,
    pub visibility: VisibilityMode,
    /// Motion stops at this time and the pose holds
    pub hold_after: f32,
}

impl Sway {
    pub fn new(channels: ChannelFlags) -> Self {
        Sway {
            channels,
            visibility: VisibilityMode::Normal,
            hold_after: f32::INFINITY,
        }
    }

    pub fn hidden(mut self) -> Self {
        self.visibility = VisibilityMode::Hidden;
        self
    }

    pub fn hold_after(mut self, seconds: f32) -> Self {
        self.hold_after = seconds;
        self
    }
}

impl PoseScript for Sway {
    fn frame(&self, t: f32) -> TrackingFrame {
        let t = t.min(self.hold_after);
        let wave = (t * 0.8).sin();
        let curl = 0.5 + 0.5 * (t * 1.3).sin();

        TrackingFrame {
            chest_rotation: Some(Quat::from_euler(30.0 * wave, 5.0 * wave, 0.0)),
            channels: self.channels,
            visibility: self.visibility,
            spine: SpineResult {
                upper_spine: Quat::from_euler(25.0 * wave, 10.0, 0.0),
                lower_spine: Quat::from_euler(15.0 * wave, 4.0, 0.0),
                head_lean_angle: 8.0 * wave,
                head_lean_axis: Vec3::new(0.0, 0.0, 1.0),
            },
            left_elbow: ElbowResult {
                upper_arm: Quat::from_euler(-40.0 + 20.0 * wave, 0.0, 10.0),
                forearm: Quat::from_euler(-70.0 + 30.0 * wave, 0.0, 0.0),
            },
            right_elbow: ElbowResult {
                upper_arm: Quat::from_euler(40.0 - 20.0 * wave, 0.0, -10.0),
                forearm: Quat::from_euler(70.0 - 30.0 * wave, 0.0, 0.0),
            },
            left_fingers: FingerCurls::new([curl; 5]),
            right_fingers: FingerCurls::new([1.0 - curl; 5]),
            ..TrackingFrame::default()
        }
    }
}
