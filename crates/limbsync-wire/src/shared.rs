//! Generic shared-state frame
//!
//! Every actor in the room streams a generic frame through the host's default
//! serializer. limbsync reads it directly for opted-in senders so it can drop
//! the root rotation (it is yaw-only in hidden mode and superseded by body
//! messages otherwise).

use limbsync_core::{Quat, Vec3};

use crate::{
    decode_color, decode_hand, decode_rotation, decode_world_position, encode_color,
    encode_hand, encode_rotation, encode_world_position, Rgba8,
};

/// Status bits inside [`SharedFrame::status`]
pub struct StatusBits;

impl StatusBits {
    pub const REPLACEMENT_VOICE: u32 = 0x0000_0200;
    pub const ACCESSORY_HELD: u32 = 0x0000_2000;
    pub const ACCESSORY_LEFT_HANDED: u32 = 0x0000_4000;
    pub const LOUDNESS_SHIFT: u32 = 24;
}

/// Generic per-actor frame as produced by the host serializer
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SharedFrame {
    pub root_rotation: u32,
    pub head_rotation: u32,
    pub left_hand: u64,
    pub right_hand: u64,
    pub position: u64,
    pub status: u32,
    pub accessory_pos_rot: u64,
    pub accessory_color: u32,
}

/// Hand-local position and rotation
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct HandState {
    pub position: Vec3,
    pub rotation: Quat,
}

/// A held accessory (board, prop) attached to one hand
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HeldAccessory {
    pub left_handed: bool,
    pub local_position: Vec3,
    pub rotation: Quat,
    pub color: Rgba8,
}

/// Decoded contents of a [`SharedFrame`]
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SharedState {
    /// `None` when the root rotation was deliberately skipped
    pub root_rotation: Option<Quat>,
    pub head_rotation: Quat,
    pub left_hand: HandState,
    pub right_hand: HandState,
    pub position: Vec3,
    pub replacement_voice: bool,
    /// Speaking loudness in [0, 1]
    pub loudness: f32,
    pub accessory: Option<HeldAccessory>,
}

impl SharedFrame {
    /// Pack a shared state with an explicit root rotation
    pub fn encode(state: &SharedState, root_rotation: Quat) -> Self {
        let loudness = (state.loudness.clamp(0.0, 1.0) * 255.0).round() as u32;
        let mut status = loudness << StatusBits::LOUDNESS_SHIFT;
        if state.replacement_voice {
            status |= StatusBits::REPLACEMENT_VOICE;
        }

        let (accessory_pos_rot, accessory_color) = match state.accessory {
            Some(acc) => {
                status |= StatusBits::ACCESSORY_HELD;
                if acc.left_handed {
                    status |= StatusBits::ACCESSORY_LEFT_HANDED;
                }
                (
                    encode_hand(acc.local_position, acc.rotation),
                    encode_color(acc.color),
                )
            }
            None => (0, 0),
        };

        SharedFrame {
            root_rotation: encode_rotation(root_rotation),
            head_rotation: encode_rotation(state.head_rotation),
            left_hand: encode_hand(state.left_hand.position, state.left_hand.rotation),
            right_hand: encode_hand(state.right_hand.position, state.right_hand.rotation),
            position: encode_world_position(state.position),
            status,
            accessory_pos_rot,
            accessory_color,
        }
    }

    /// Decode the frame. With `include_root == false` the root rotation is left out.
    pub fn decode(&self, include_root: bool) -> SharedState {
        let (lp, lr) = decode_hand(self.left_hand);
        let (rp, rr) = decode_hand(self.right_hand);

        let accessory = if self.status & StatusBits::ACCESSORY_HELD != 0 {
            let (pos, rot) = decode_hand(self.accessory_pos_rot);
            rot.is_finite().then(|| HeldAccessory {
                left_handed: self.status & StatusBits::ACCESSORY_LEFT_HANDED != 0,
                local_position: pos.clamp_length(1.0),
                rotation: rot,
                color: decode_color(self.accessory_color),
            })
        } else {
            None
        };

        SharedState {
            root_rotation: include_root.then(|| decode_rotation(self.root_rotation)),
            head_rotation: decode_rotation(self.head_rotation),
            left_hand: HandState {
                position: lp,
                rotation: lr,
            },
            right_hand: HandState {
                position: rp,
                rotation: rr,
            },
            position: decode_world_position(self.position),
            replacement_voice: self.status & StatusBits::REPLACEMENT_VOICE != 0,
            loudness: ((self.status >> StatusBits::LOUDNESS_SHIFT) & 0xFF) as f32 / 255.0,
            accessory,
        }
    }
}
