//! Color packing
//!
//! Colors travel as `0xRRGGBBAA`, one byte per channel. Packing an `Rgba8` is
//! lossless; float colors lose whatever precision 8 bits cannot hold.

/// 8-bit-per-channel color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rgba8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba8 {
    pub const WHITE: Rgba8 = Rgba8::new(255, 255, 255, 255);

    #[inline]
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Opaque color from three channels
    #[inline]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    /// Convert float channels in [0, 1]; out-of-range and NaN values are clamped
    pub fn from_f32(rgba: [f32; 4]) -> Self {
        let [r, g, b, a] = rgba.map(channel_to_u8);
        Self::new(r, g, b, a)
    }

    pub fn to_f32(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a].map(|c| c as f32 / 255.0)
    }
}

/// Pack a color into `0xRRGGBBAA`
#[inline]
pub fn encode_color(color: Rgba8) -> u32 {
    u32::from_be_bytes([color.r, color.g, color.b, color.a])
}

/// Unpack a color from `0xRRGGBBAA`
#[inline]
pub fn decode_color(packed: u32) -> Rgba8 {
    let [r, g, b, a] = packed.to_be_bytes();
    Rgba8::new(r, g, b, a)
}

#[inline]
fn channel_to_u8(c: f32) -> u8 {
    if c.is_nan() {
        return 0;
    }
    (c.clamp(0.0, 1.0) * 255.0).round() as u8
}
