//! Bounded position packing
//!
//! Each axis is clamped to `[-bound, bound]` and quantized independently, so
//! the encoder can never overflow its bit field.
//!
//! - 32-bit layout: x bits 29-20, y bits 19-10, z bits 9-0 (bits 31-30 zero)
//! - 64-bit world layout: x bits 62-42, y bits 41-21, z bits 20-0

use limbsync_core::Vec3;

/// Bits per axis in a 32-bit packed vector
pub const VECTOR_AXIS_BITS: u32 = 10;

/// Bits per axis in a 64-bit packed world position
pub const WORLD_AXIS_BITS: u32 = 21;

/// Extent of a packed world position on every axis
pub const WORLD_BOUND: f32 = 1024.0;

const VECTOR_AXIS_MAX: u32 = (1 << VECTOR_AXIS_BITS) - 1;
const WORLD_AXIS_MAX: u32 = (1 << WORLD_AXIS_BITS) - 1;

/// Quantization step of one axis for a given bound
#[inline]
pub fn vector_step(bound: f32) -> f32 {
    2.0 * bound / VECTOR_AXIS_MAX as f32
}

/// Quantization step of one world axis
#[inline]
pub fn world_step() -> f32 {
    2.0 * WORLD_BOUND / WORLD_AXIS_MAX as f32
}

/// Pack a vector whose axes lie in `[-bound, bound]`. Out-of-range axes are clamped.
pub fn encode_vector_bounded(v: Vec3, bound: f32) -> u32 {
    let bound = sanitize_bound(bound);
    let x = quantize_axis(v.x, bound, VECTOR_AXIS_MAX);
    let y = quantize_axis(v.y, bound, VECTOR_AXIS_MAX);
    let z = quantize_axis(v.z, bound, VECTOR_AXIS_MAX);
    (x << (2 * VECTOR_AXIS_BITS)) | (y << VECTOR_AXIS_BITS) | z
}

/// Unpack a vector packed with the same `bound`
pub fn decode_vector_bounded(packed: u32, bound: f32) -> Vec3 {
    let bound = sanitize_bound(bound);
    let x = (packed >> (2 * VECTOR_AXIS_BITS)) & VECTOR_AXIS_MAX;
    let y = (packed >> VECTOR_AXIS_BITS) & VECTOR_AXIS_MAX;
    let z = packed & VECTOR_AXIS_MAX;
    Vec3::new(
        dequantize_axis(x, bound, VECTOR_AXIS_MAX),
        dequantize_axis(y, bound, VECTOR_AXIS_MAX),
        dequantize_axis(z, bound, VECTOR_AXIS_MAX),
    )
}

/// Pack a world-space position (about 1 mm resolution within ±1024 m)
pub fn encode_world_position(v: Vec3) -> u64 {
    let x = quantize_axis(v.x, WORLD_BOUND, WORLD_AXIS_MAX) as u64;
    let y = quantize_axis(v.y, WORLD_BOUND, WORLD_AXIS_MAX) as u64;
    let z = quantize_axis(v.z, WORLD_BOUND, WORLD_AXIS_MAX) as u64;
    (x << (2 * WORLD_AXIS_BITS)) | (y << WORLD_AXIS_BITS) | z
}

/// Unpack a world-space position
pub fn decode_world_position(packed: u64) -> Vec3 {
    let mask = WORLD_AXIS_MAX as u64;
    let x = ((packed >> (2 * WORLD_AXIS_BITS)) & mask) as u32;
    let y = ((packed >> WORLD_AXIS_BITS) & mask) as u32;
    let z = (packed & mask) as u32;
    Vec3::new(
        dequantize_axis(x, WORLD_BOUND, WORLD_AXIS_MAX),
        dequantize_axis(y, WORLD_BOUND, WORLD_AXIS_MAX),
        dequantize_axis(z, WORLD_BOUND, WORLD_AXIS_MAX),
    )
}

#[inline]
fn sanitize_bound(bound: f32) -> f32 {
    if bound.is_finite() && bound > f32::EPSILON {
        bound
    } else {
        f32::EPSILON
    }
}

#[inline]
fn quantize_axis(v: f32, bound: f32, max: u32) -> u32 {
    let v = if v.is_nan() { 0.0 } else { v };
    // f64 keeps the 21-bit world fields exact.
    let t = ((v as f64 / bound as f64).clamp(-1.0, 1.0) + 1.0) * 0.5;
    (t * max as f64).round() as u32
}

#[inline]
fn dequantize_axis(q: u32, bound: f32, max: u32) -> f32 {
    (((q as f64 / max as f64) * 2.0 - 1.0) * bound as f64) as f32
}
