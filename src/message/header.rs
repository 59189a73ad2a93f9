//! The 12 byte header carried by every Simple Message frame.

use motosm_wire::{MotoWireRead, MotoWireSized, MotoWireWrite, WireError};

/// Message type tag, authoritative for body parsing.
///
/// Unknown tags are preserved as [`MsgType::Unknown`] so a frame can be re-encoded bit-exactly
/// even when this crate does not know its body layout.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum MsgType {
    /// Controller status topic.
    RobotStatus,
    /// Single group trajectory point.
    JointTrajPtFull,
    /// Single group feedback topic.
    JointFeedback,
    /// Motion control service request.
    MotoMotionCtrl,
    /// Motion control service reply.
    MotoMotionReply,
    /// Read a single IO bit.
    MotoReadIoBit,
    /// Reply to [`MsgType::MotoReadIoBit`].
    MotoReadIoBitReply,
    /// Write a single IO bit.
    MotoWriteIoBit,
    /// Reply to [`MsgType::MotoWriteIoBit`].
    MotoWriteIoBitReply,
    /// Read an IO group.
    MotoReadIoGroup,
    /// Reply to [`MsgType::MotoReadIoGroup`].
    MotoReadIoGroupReply,
    /// Write an IO group.
    MotoWriteIoGroup,
    /// Reply to [`MsgType::MotoWriteIoGroup`].
    MotoWriteIoGroupReply,
    /// IO control reply.
    MotoIoCtrlReply,
    /// Multi group trajectory point.
    MotoJointTrajPtFullEx,
    /// Multi group feedback topic.
    MotoJointFeedbackEx,
    /// Tool selection service request.
    MotoSelectTool,
    /// DH parameter query (header-only request, 128 float reply).
    MotoGetDhParameters,
    /// Real-time joint state, sent by the controller over UDP.
    MotoRealTimeMotionJointStateEx,
    /// Real-time joint command, the external controller's UDP reply.
    MotoRealTimeMotionJointCommandEx,
    /// A tag this crate does not know. The raw value is preserved.
    Unknown(i32),
}

impl From<i32> for MsgType {
    fn from(value: i32) -> Self {
        match value {
            13 => Self::RobotStatus,
            14 => Self::JointTrajPtFull,
            15 => Self::JointFeedback,
            2001 => Self::MotoMotionCtrl,
            2002 => Self::MotoMotionReply,
            2003 => Self::MotoReadIoBit,
            2004 => Self::MotoReadIoBitReply,
            2005 => Self::MotoWriteIoBit,
            2006 => Self::MotoWriteIoBitReply,
            2007 => Self::MotoReadIoGroup,
            2008 => Self::MotoReadIoGroupReply,
            2009 => Self::MotoWriteIoGroup,
            2010 => Self::MotoWriteIoGroupReply,
            2011 => Self::MotoIoCtrlReply,
            2016 => Self::MotoJointTrajPtFullEx,
            2017 => Self::MotoJointFeedbackEx,
            2018 => Self::MotoSelectTool,
            2020 => Self::MotoGetDhParameters,
            2030 => Self::MotoRealTimeMotionJointStateEx,
            2031 => Self::MotoRealTimeMotionJointCommandEx,
            other => Self::Unknown(other),
        }
    }
}

impl From<MsgType> for i32 {
    fn from(value: MsgType) -> Self {
        match value {
            MsgType::RobotStatus => 13,
            MsgType::JointTrajPtFull => 14,
            MsgType::JointFeedback => 15,
            MsgType::MotoMotionCtrl => 2001,
            MsgType::MotoMotionReply => 2002,
            MsgType::MotoReadIoBit => 2003,
            MsgType::MotoReadIoBitReply => 2004,
            MsgType::MotoWriteIoBit => 2005,
            MsgType::MotoWriteIoBitReply => 2006,
            MsgType::MotoReadIoGroup => 2007,
            MsgType::MotoReadIoGroupReply => 2008,
            MsgType::MotoWriteIoGroup => 2009,
            MsgType::MotoWriteIoGroupReply => 2010,
            MsgType::MotoIoCtrlReply => 2011,
            MsgType::MotoJointTrajPtFullEx => 2016,
            MsgType::MotoJointFeedbackEx => 2017,
            MsgType::MotoSelectTool => 2018,
            MsgType::MotoGetDhParameters => 2020,
            MsgType::MotoRealTimeMotionJointStateEx => 2030,
            MsgType::MotoRealTimeMotionJointCommandEx => 2031,
            MsgType::Unknown(other) => other,
        }
    }
}

/// Communication style of a frame.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum CommType {
    /// Not a valid communication type.
    Invalid,
    /// Unsolicited one-way message, published continuously.
    Topic,
    /// Request half of a service exchange.
    ServiceRequest,
    /// Reply half of a service exchange.
    ServiceReply,
    /// Out-of-range value, preserved raw.
    Unknown(i32),
}

impl From<i32> for CommType {
    fn from(value: i32) -> Self {
        match value {
            0 => Self::Invalid,
            1 => Self::Topic,
            2 => Self::ServiceRequest,
            3 => Self::ServiceReply,
            other => Self::Unknown(other),
        }
    }
}

impl From<CommType> for i32 {
    fn from(value: CommType) -> Self {
        match value {
            CommType::Invalid => 0,
            CommType::Topic => 1,
            CommType::ServiceRequest => 2,
            CommType::ServiceReply => 3,
            CommType::Unknown(other) => other,
        }
    }
}

/// Service outcome carried in the header of reply frames.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ReplyType {
    /// Not a reply, or outcome unknown.
    Invalid,
    /// The service succeeded.
    Success,
    /// The service failed.
    Failure,
    /// Out-of-range value, preserved raw.
    Unknown(i32),
}

impl From<i32> for ReplyType {
    fn from(value: i32) -> Self {
        match value {
            0 => Self::Invalid,
            1 => Self::Success,
            2 => Self::Failure,
            other => Self::Unknown(other),
        }
    }
}

impl From<ReplyType> for i32 {
    fn from(value: ReplyType) -> Self {
        match value {
            ReplyType::Invalid => 0,
            ReplyType::Success => 1,
            ReplyType::Failure => 2,
            ReplyType::Unknown(other) => other,
        }
    }
}

macro_rules! impl_wire_for_i32_enum {
    ($ty:ty) => {
        impl MotoWireRead for $ty {
            fn unpack_from_slice(buf: &[u8]) -> Result<Self, WireError> {
                i32::unpack_from_slice(buf).map(Self::from)
            }
        }

        impl MotoWireWrite for $ty {
            fn pack_to_slice_unchecked<'buf>(&self, buf: &'buf mut [u8]) -> &'buf [u8] {
                i32::from(*self).pack_to_slice_unchecked(buf)
            }

            fn packed_len(&self) -> usize {
                Self::PACKED_LEN
            }
        }

        impl MotoWireSized for $ty {
            const PACKED_LEN: usize = i32::PACKED_LEN;

            type Buffer = [u8; 4];

            fn buffer() -> Self::Buffer {
                [0u8; 4]
            }
        }
    };
}

impl_wire_for_i32_enum!(MsgType);
impl_wire_for_i32_enum!(CommType);
impl_wire_for_i32_enum!(ReplyType);

pub(crate) use impl_wire_for_i32_enum;

/// The three `i32` fields prefixing every Simple Message body.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Header {
    /// Tag identifying the body layout.
    pub msg_type: MsgType,
    /// Topic, service request or service reply.
    pub comm_type: CommType,
    /// Service outcome, [`ReplyType::Invalid`] outside replies.
    pub reply_type: ReplyType,
}

impl MotoWireRead for Header {
    fn unpack_from_slice(buf: &[u8]) -> Result<Self, WireError> {
        if buf.len() < Self::PACKED_LEN {
            return Err(WireError::BufferTooShort {
                expected: Self::PACKED_LEN,
                got: buf.len(),
            });
        }

        Ok(Self {
            msg_type: MsgType::unpack_from_slice(&buf[0..4])?,
            comm_type: CommType::unpack_from_slice(&buf[4..8])?,
            reply_type: ReplyType::unpack_from_slice(&buf[8..12])?,
        })
    }
}

impl MotoWireWrite for Header {
    fn pack_to_slice_unchecked<'buf>(&self, buf: &'buf mut [u8]) -> &'buf [u8] {
        self.msg_type.pack_to_slice_unchecked(&mut buf[0..4]);
        self.comm_type.pack_to_slice_unchecked(&mut buf[4..8]);
        self.reply_type.pack_to_slice_unchecked(&mut buf[8..12]);

        &buf[0..Self::PACKED_LEN]
    }

    fn packed_len(&self) -> usize {
        Self::PACKED_LEN
    }
}

impl MotoWireSized for Header {
    const PACKED_LEN: usize = 12;

    type Buffer = [u8; 12];

    fn buffer() -> Self::Buffer {
        [0u8; 12]
    }
}
