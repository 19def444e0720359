//! Finger curl compression
//!
//! Five curls per hand, each clamped to [0, 1] and quantized to 6 bits, packed
//! thumb-first from the low bits: thumb 5-0, index 11-6, middle 17-12,
//! ring 23-18, pinky 29-24. Bits 31-30 are always zero.

/// Bits per finger curl
pub const FINGER_BITS: u32 = 6;

/// Number of fingers per hand
pub const FINGER_COUNT: usize = 5;

const FINGER_MAX: u32 = (1 << FINGER_BITS) - 1;

/// Quantization step of a curl value
pub const FINGER_STEP: f32 = 1.0 / FINGER_MAX as f32;

/// Finger identifier, in wire order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Finger {
    Thumb = 0,
    Index = 1,
    Middle = 2,
    Ring = 3,
    Pinky = 4,
}

impl Finger {
    pub const ALL: [Finger; FINGER_COUNT] = [
        Finger::Thumb,
        Finger::Index,
        Finger::Middle,
        Finger::Ring,
        Finger::Pinky,
    ];
}

/// Curl of every finger on one hand (0 = open, 1 = fully curled)
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FingerCurls(pub [f32; FINGER_COUNT]);

impl FingerCurls {
    pub const OPEN: FingerCurls = FingerCurls([0.0; FINGER_COUNT]);
    pub const FIST: FingerCurls = FingerCurls([1.0; FINGER_COUNT]);

    #[inline]
    pub fn new(curls: [f32; FINGER_COUNT]) -> Self {
        FingerCurls(curls)
    }

    #[inline]
    pub fn get(&self, finger: Finger) -> f32 {
        self.0[finger as usize]
    }

    #[inline]
    pub fn set(&mut self, finger: Finger, curl: f32) {
        self.0[finger as usize] = curl;
    }

    /// Linear interpolation toward `other`
    pub fn lerp(&self, other: &FingerCurls, t: f32) -> FingerCurls {
        let mut out = *self;
        for (a, b) in out.0.iter_mut().zip(other.0.iter()) {
            *a += (b - *a) * t;
        }
        out
    }
}

/// Pack one hand's curls. Values outside [0, 1] are clamped, NaN reads as open.
pub fn pack_fingers(curls: &FingerCurls) -> u32 {
    curls
        .0
        .iter()
        .enumerate()
        .fold(0u32, |packed, (i, &curl)| {
            packed | (quantize_curl(curl) << (i as u32 * FINGER_BITS))
        })
}

/// Unpack one hand's curls
pub fn unpack_fingers(packed: u32) -> FingerCurls {
    let mut curls = [0.0; FINGER_COUNT];
    for (i, curl) in curls.iter_mut().enumerate() {
        let q = (packed >> (i as u32 * FINGER_BITS)) & FINGER_MAX;
        *curl = q as f32 / FINGER_MAX as f32;
    }
    FingerCurls(curls)
}

#[inline]
fn quantize_curl(curl: f32) -> u32 {
    if curl.is_nan() {
        return 0;
    }
    (curl.clamp(0.0, 1.0) * FINGER_MAX as f32).round() as u32
}
