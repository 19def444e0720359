//! Smallest-three rotation packing
//!
//! Layout (32 bits):
//! - Bits 31-30: index of the dropped component (w=0, x=1, y=2, z=3)
//! - Bits 29-20: first kept component
//! - Bits 19-10: second kept component
//! - Bits 9-0: third kept component
//!
//! The dropped component is the one with the largest magnitude. The sign of the
//! whole quaternion is flipped so it is non-negative, which lets the decoder
//! rebuild it from the unit-norm constraint. The kept components always lie in
//! `[-1/√2, 1/√2]` and are quantized linearly over that range.
//!
//! Precision is lost once per hop: re-encoding a decoded rotation lands within
//! one quantization step of the input fields, except when the rebuilt
//! component no longer compares largest, in which case the index flips and the
//! fields are re-derived (still within the angular bound).

use std::f32::consts::FRAC_1_SQRT_2;

use limbsync_core::Quat;

/// Bits per kept component
pub const ROTATION_COMPONENT_BITS: u32 = 10;

const COMPONENT_MAX: u32 = (1 << ROTATION_COMPONENT_BITS) - 1;
const COMPONENT_MASK: u32 = COMPONENT_MAX;
const INDEX_SHIFT: u32 = 30;
const FIELD_SHIFTS: [u32; 3] = [20, 10, 0];

/// Quantization step of a kept component
pub const ROTATION_STEP: f32 = 2.0 * FRAC_1_SQRT_2 / COMPONENT_MAX as f32;

/// Worst-case angle (radians) between a rotation and its decoded packing.
///
/// Half a step on each kept component plus the error it induces on the
/// rebuilt one stays below 0.0065 rad; the bound leaves headroom for f32.
pub const ROTATION_ERROR_BOUND: f32 = 0.01;

/// Pack a rotation. Non-unit input is renormalized; degenerate input packs identity.
pub fn encode_rotation(q: Quat) -> u32 {
    let c = q.normalize().to_array();

    // Strict comparison keeps the lower index on ties (w > x > y > z).
    let mut largest = 0;
    for i in 1..4 {
        if c[i].abs() > c[largest].abs() {
            largest = i;
        }
    }
    let sign = if c[largest] < 0.0 { -1.0 } else { 1.0 };

    let mut packed = (largest as u32) << INDEX_SHIFT;
    let kept = (0..4).filter(|&i| i != largest);
    for (i, shift) in kept.zip(FIELD_SHIFTS) {
        packed |= quantize_component(c[i] * sign) << shift;
    }
    packed
}

/// Unpack a rotation. The result is always unit-norm.
pub fn decode_rotation(packed: u32) -> Quat {
    let largest = (packed >> INDEX_SHIFT) as usize;

    let mut c = [0.0f32; 4];
    let mut sum_sq = 0.0;
    let kept = (0..4).filter(|&i| i != largest);
    for (i, shift) in kept.zip(FIELD_SHIFTS) {
        let v = dequantize_component((packed >> shift) & COMPONENT_MASK);
        c[i] = v;
        sum_sq += v * v;
    }
    c[largest] = (1.0 - sum_sq).max(0.0).sqrt();

    Quat::from_array(c).normalize()
}

/// Angle in radians between two rotations (sign-agnostic)
#[inline]
pub fn angular_distance(a: Quat, b: Quat) -> f32 {
    a.angle_to(&b)
}

/// Index of the dropped component recorded in a packed rotation
#[inline]
pub fn dropped_component(packed: u32) -> usize {
    (packed >> INDEX_SHIFT) as usize
}

#[inline]
fn quantize_component(v: f32) -> u32 {
    let t = ((v / FRAC_1_SQRT_2).clamp(-1.0, 1.0) + 1.0) * 0.5;
    (t * COMPONENT_MAX as f32).round() as u32
}

#[inline]
fn dequantize_component(q: u32) -> f32 {
    ((q as f32 / COMPONENT_MAX as f32) * 2.0 - 1.0) * FRAC_1_SQRT_2
}
