//! Hand position + rotation packing
//!
//! A hand travels as one 64-bit word: the hand-local position (bounded to
//! [`HAND_POSITION_BOUND`] per axis) in the high half and the smallest-three
//! rotation in the low half.

use limbsync_core::{Quat, Vec3};

use crate::{decode_rotation, decode_vector_bounded, encode_rotation, encode_vector_bounded};

/// Per-axis extent of a hand-local position, in meters
pub const HAND_POSITION_BOUND: f32 = 1.0;

/// Pack a hand-local position and rotation
pub fn encode_hand(position: Vec3, rotation: Quat) -> u64 {
    let pos = encode_vector_bounded(position, HAND_POSITION_BOUND) as u64;
    let rot = encode_rotation(rotation) as u64;
    (pos << 32) | rot
}

/// Unpack a hand-local position and rotation
pub fn decode_hand(packed: u64) -> (Vec3, Quat) {
    let position = decode_vector_bounded((packed >> 32) as u32, HAND_POSITION_BOUND);
    let rotation = decode_rotation(packed as u32);
    (position, rotation)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{angular_distance, vector_step, ROTATION_ERROR_BOUND};

    #[test]
    fn test_hand_roundtrip() {
        let pos = Vec3::new(0.25, -0.4, 0.9);
        let rot = Quat::from_axis_angle(35.0, Vec3::new(1.0, 1.0, 0.0));

        let (p, r) = decode_hand(encode_hand(pos, rot));
        let tolerance = vector_step(HAND_POSITION_BOUND) / 2.0 + 1e-6;
        assert!((p.x - pos.x).abs() <= tolerance);
        assert!((p.y - pos.y).abs() <= tolerance);
        assert!((p.z - pos.z).abs() <= tolerance);
        assert!(angular_distance(r, rot) <= ROTATION_ERROR_BOUND);
    }

    #[test]
    fn test_halves_are_independent() {
        let rot = Quat::from_yaw(90.0);
        let a = encode_hand(Vec3::ZERO, rot);
        let b = encode_hand(Vec3::new(0.5, 0.5, 0.5), rot);
        assert_eq!(a as u32, b as u32);
        assert_ne!(a >> 32, b >> 32);
    }
}
