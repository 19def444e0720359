//! Detail channel flags

/// Detail channel flags (1 byte)
///
/// On the sender these are the locally enabled channels; on the receiver they
/// are derived from which fields of a detail message carry data.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ChannelFlags(pub u8);

impl ChannelFlags {
    pub const NONE: ChannelFlags = ChannelFlags(0);

    // Flag bits
    pub const LEFT_ELBOW: u8 = 0b0000_0001;
    pub const RIGHT_ELBOW: u8 = 0b0000_0010;
    pub const SPINE: u8 = 0b0000_0100;
    pub const HEAD_LEAN: u8 = 0b0000_1000;

    pub const ALL: ChannelFlags =
        ChannelFlags(Self::LEFT_ELBOW | Self::RIGHT_ELBOW | Self::SPINE | Self::HEAD_LEAN);

    #[inline]
    pub fn new(bits: u8) -> Self {
        ChannelFlags(bits)
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub fn has_left_elbow(self) -> bool {
        self.0 & Self::LEFT_ELBOW != 0
    }

    #[inline]
    pub fn has_right_elbow(self) -> bool {
        self.0 & Self::RIGHT_ELBOW != 0
    }

    #[inline]
    pub fn has_elbow(self, left: bool) -> bool {
        if left {
            self.has_left_elbow()
        } else {
            self.has_right_elbow()
        }
    }

    #[inline]
    pub fn has_spine(self) -> bool {
        self.0 & Self::SPINE != 0
    }

    #[inline]
    pub fn has_head_lean(self) -> bool {
        self.0 & Self::HEAD_LEAN != 0
    }

    /// Whether a detail message goes out at all. Head lean rides along with
    /// the spine and never triggers a send on its own.
    #[inline]
    pub fn wants_detail(self) -> bool {
        self.0 & (Self::LEFT_ELBOW | Self::RIGHT_ELBOW | Self::SPINE) != 0
    }

    #[inline]
    pub fn set_left_elbow(&mut self, value: bool) {
        self.set(Self::LEFT_ELBOW, value);
    }

    #[inline]
    pub fn set_right_elbow(&mut self, value: bool) {
        self.set(Self::RIGHT_ELBOW, value);
    }

    #[inline]
    pub fn set_spine(&mut self, value: bool) {
        self.set(Self::SPINE, value);
    }

    #[inline]
    pub fn set_head_lean(&mut self, value: bool) {
        self.set(Self::HEAD_LEAN, value);
    }

    #[inline]
    fn set(&mut self, bit: u8, value: bool) {
        if value {
            self.0 |= bit;
        } else {
            self.0 &= !bit;
        }
    }
}

impl From<u8> for ChannelFlags {
    fn from(bits: u8) -> Self {
        ChannelFlags(bits)
    }
}

impl From<ChannelFlags> for u8 {
    fn from(flags: ChannelFlags) -> Self {
        flags.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_operations() {
        let mut flags = ChannelFlags::NONE;
        assert!(flags.is_empty());

        flags.set_left_elbow(true);
        assert!(flags.has_left_elbow());
        assert!(flags.has_elbow(true));
        assert!(!flags.has_elbow(false));

        flags.set_spine(true);
        assert!(flags.has_spine());
        assert!(flags.has_left_elbow());

        flags.set_left_elbow(false);
        assert!(!flags.has_left_elbow());
        assert!(flags.has_spine());
    }

    #[test]
    fn test_head_lean_alone_sends_no_detail() {
        let flags = ChannelFlags::new(ChannelFlags::HEAD_LEAN);
        assert!(!flags.wants_detail());

        let flags = ChannelFlags::new(ChannelFlags::RIGHT_ELBOW);
        assert!(flags.wants_detail());
        assert!(ChannelFlags::ALL.wants_detail());
    }
}
