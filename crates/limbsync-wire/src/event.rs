//! Event codes raised on the room transport

/// Event code carried alongside every limbsync payload
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum EventCode {
    /// One packed body rotation
    Body = 0xB0,

    /// Nine packed detail fields (arms, spine, head lean, fingers)
    Detail = 0xB1,
}

impl EventCode {
    /// Parse from wire byte
    pub fn from_byte(b: u8) -> Option<Self> {
        match b {
            0xB0 => Some(EventCode::Body),
            0xB1 => Some(EventCode::Detail),
            _ => None,
        }
    }

    /// Convert to wire byte
    #[inline]
    pub fn to_byte(self) -> u8 {
        self as u8
    }

    /// Exact payload size in bytes
    #[inline]
    pub fn payload_len(self) -> usize {
        match self {
            EventCode::Body => crate::BODY_PAYLOAD_SIZE,
            EventCode::Detail => crate::DETAIL_PAYLOAD_SIZE,
        }
    }
}
