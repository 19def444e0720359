//! Delivery classes and small shared enums
//!
//! limbsync distinguishes two delivery classes:
//! - Reliable: ordered, retransmitted (room properties, session control)
//! - Unreliable: fire-and-forget, may be lost, duplicated or reordered (pose data)

/// Delivery class requested from the transport
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum Delivery {
    /// Retransmitted until acknowledged
    Reliable = 0x00,

    /// Sent once, loss tolerant
    #[default]
    Unreliable = 0x01,
}

impl Delivery {
    /// Parse from wire byte
    pub fn from_byte(b: u8) -> Option<Self> {
        match b {
            0x00 => Some(Delivery::Reliable),
            0x01 => Some(Delivery::Unreliable),
            _ => None,
        }
    }

    #[inline]
    pub fn to_byte(self) -> u8 {
        self as u8
    }

    #[inline]
    pub fn is_reliable(self) -> bool {
        matches!(self, Delivery::Reliable)
    }
}

/// Body side
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub const BOTH: [Side; 2] = [Side::Left, Side::Right];

    /// Suffix used by the rig's bone naming (`upper_arm.L`)
    #[inline]
    pub fn bone_suffix(self) -> &'static str {
        match self {
            Side::Left => "L",
            Side::Right => "R",
        }
    }
}

/// Result of a lifecycle hook that may short-circuit the host's default behavior
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Handled {
    /// The host should run its default behavior
    #[default]
    No,
    /// limbsync took over; the host must skip its default behavior
    Yes,
}

impl Handled {
    #[inline]
    pub fn is_handled(self) -> bool {
        matches!(self, Handled::Yes)
    }

    /// Whether the host's default behavior should still run
    #[inline]
    pub fn run_default(self) -> bool {
        !self.is_handled()
    }
}

impl From<bool> for Handled {
    fn from(handled: bool) -> Self {
        if handled {
            Handled::Yes
        } else {
            Handled::No
        }
    }
}
