//! Body and detail messages
//!
//! Both messages are positional arrays of little-endian `u32` words:
//! - Body (4 bytes): the packed root rotation
//! - Detail (36 bytes): `[leftUpperArm, leftForearm, rightUpperArm,
//!   rightForearm, upperSpine, lowerSpine, headLean, leftFingers, rightFingers]`
//!
//! A rotation field of `0` means "channel disabled". A real unit quaternion can
//! never pack to `0` (see [`crate::rotation`]), so the sentinel is unambiguous.

use bytes::{Buf, BufMut, Bytes, BytesMut};
use limbsync_core::{Quat, Side, SyncError, SyncResult};

use crate::{decode_rotation, unpack_fingers, ChannelFlags, EventCode, FingerCurls};

/// Body payload size in bytes
pub const BODY_PAYLOAD_SIZE: usize = 4;

/// Number of words in a detail message
pub const DETAIL_FIELD_COUNT: usize = 9;

/// Detail payload size in bytes
pub const DETAIL_PAYLOAD_SIZE: usize = DETAIL_FIELD_COUNT * 4;

/// Position of each word in a detail message
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DetailField {
    LeftUpperArm = 0,
    LeftForearm = 1,
    RightUpperArm = 2,
    RightForearm = 3,
    UpperSpine = 4,
    LowerSpine = 5,
    HeadLean = 6,
    LeftFingers = 7,
    RightFingers = 8,
}

impl DetailField {
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    #[inline]
    pub fn upper_arm(side: Side) -> Self {
        match side {
            Side::Left => DetailField::LeftUpperArm,
            Side::Right => DetailField::RightUpperArm,
        }
    }

    #[inline]
    pub fn forearm(side: Side) -> Self {
        match side {
            Side::Left => DetailField::LeftForearm,
            Side::Right => DetailField::RightForearm,
        }
    }

    #[inline]
    pub fn fingers(side: Side) -> Self {
        match side {
            Side::Left => DetailField::LeftFingers,
            Side::Right => DetailField::RightFingers,
        }
    }
}

/// Packed root rotation
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BodyMessage {
    pub rotation: u32,
}

impl BodyMessage {
    #[inline]
    pub fn new(rotation: u32) -> Self {
        BodyMessage { rotation }
    }

    pub fn to_bytes(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(BODY_PAYLOAD_SIZE);
        buf.put_u32_le(self.rotation);
        buf.freeze()
    }

    pub fn parse(mut buf: &[u8]) -> SyncResult<Self> {
        if buf.len() < BODY_PAYLOAD_SIZE {
            return Err(SyncError::BufferTooShort {
                expected: BODY_PAYLOAD_SIZE,
                actual: buf.len(),
            });
        }
        Ok(BodyMessage {
            rotation: buf.get_u32_le(),
        })
    }

    pub fn decoded_rotation(&self) -> Quat {
        decode_rotation(self.rotation)
    }
}

/// Nine packed detail words
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DetailMessage {
    pub fields: [u32; DETAIL_FIELD_COUNT],
}

impl DetailMessage {
    #[inline]
    pub fn new(fields: [u32; DETAIL_FIELD_COUNT]) -> Self {
        DetailMessage { fields }
    }

    #[inline]
    pub fn field(&self, field: DetailField) -> u32 {
        self.fields[field.index()]
    }

    /// Decoded rotation, or `None` if the field carries the "no data" sentinel
    pub fn rotation(&self, field: DetailField) -> Option<Quat> {
        match self.field(field) {
            0 => None,
            packed => Some(decode_rotation(packed)),
        }
    }

    /// Finger curls for one hand. Fingers are always sent; `0` means an open hand.
    pub fn fingers(&self, side: Side) -> FingerCurls {
        unpack_fingers(self.field(DetailField::fingers(side)))
    }

    /// Channels carrying data. An elbow counts when either of its bones does.
    pub fn presence(&self) -> ChannelFlags {
        let present = |f: DetailField| self.field(f) != 0;

        let mut flags = ChannelFlags::NONE;
        flags.set_left_elbow(present(DetailField::LeftUpperArm) || present(DetailField::LeftForearm));
        flags.set_right_elbow(
            present(DetailField::RightUpperArm) || present(DetailField::RightForearm),
        );
        flags.set_spine(present(DetailField::UpperSpine) || present(DetailField::LowerSpine));
        flags.set_head_lean(present(DetailField::HeadLean));
        flags
    }

    pub fn to_bytes(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(DETAIL_PAYLOAD_SIZE);
        for word in self.fields {
            buf.put_u32_le(word);
        }
        buf.freeze()
    }

    /// Parse from bytes. Trailing bytes beyond the fixed layout are ignored.
    pub fn parse(mut buf: &[u8]) -> SyncResult<Self> {
        if buf.len() < DETAIL_PAYLOAD_SIZE {
            return Err(SyncError::BufferTooShort {
                expected: DETAIL_PAYLOAD_SIZE,
                actual: buf.len(),
            });
        }
        let mut fields = [0u32; DETAIL_FIELD_COUNT];
        for word in fields.iter_mut() {
            *word = buf.get_u32_le();
        }
        Ok(DetailMessage { fields })
    }
}

/// Any limbsync message
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Message {
    Body(BodyMessage),
    Detail(DetailMessage),
}

impl Message {
    /// Parse a payload received under `code`
    pub fn parse(code: u8, payload: &[u8]) -> SyncResult<Self> {
        match EventCode::from_byte(code) {
            Some(EventCode::Body) => BodyMessage::parse(payload).map(Message::Body),
            Some(EventCode::Detail) => DetailMessage::parse(payload).map(Message::Detail),
            None => Err(SyncError::UnknownEvent(code)),
        }
    }

    pub fn code(&self) -> EventCode {
        match self {
            Message::Body(_) => EventCode::Body,
            Message::Detail(_) => EventCode::Detail,
        }
    }

    pub fn to_bytes(&self) -> Bytes {
        match self {
            Message::Body(m) => m.to_bytes(),
            Message::Detail(m) => m.to_bytes(),
        }
    }
}
