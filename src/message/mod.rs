//! The Simple Message wire catalogue: framing, header and every body this crate understands.
//!
//! Every frame is a 4 byte little-endian length prefix (counting the bytes *after* the
//! prefix), a 12 byte [`Header`] and a body whose layout is selected by
//! [`Header::msg_type`]. Frames with an unknown tag decode to [`MessageBody::Invalid`] with
//! the raw body bytes retained, so they can be ignored or re-encoded losslessly.

mod header;
mod io_cmd;
mod joint_data;
mod motion_ctrl;
mod real_time;
mod robot_status;

pub use header::{CommType, Header, MsgType, ReplyType};
pub use io_cmd::{
    IoCtrlReply, ReadIoBit, ReadIoBitReply, ReadIoGroup, ReadIoGroupReply, WriteIoBit,
    WriteIoBitReply, WriteIoGroup, WriteIoGroupReply,
};
pub use joint_data::{
    JointFeedback, JointFeedbackEx, JointTrajPtExData, JointTrajPtFull, JointTrajPtFullEx,
    JointVector, ValidFields,
};
pub use motion_ctrl::{
    CommandType, DH_LINKS_PER_GROUP, DhLink, DhParameters, MotoMotionCtrl, MotoMotionReply,
    ResultType, SelectTool, subcode,
};
pub use real_time::{
    RealTimeJointCommandEx, RealTimeJointCommandExData, RealTimeJointStateEx,
    RealTimeJointStateExData, RealTimeMode,
};
pub use robot_status::{PendantMode, RobotStatus, Ternary};

use crate::error::Error;
use motosm_wire::{MotoWireRead, MotoWireSized, MotoWireWrite};

/// Bytes taken by the length prefix.
pub const PREFIX_LEN: usize = 4;

/// Bytes taken by the header.
pub const HEADER_LEN: usize = Header::PACKED_LEN;

/// A decoded message body, tagged by [`MsgType`].
#[derive(Debug, Clone, PartialEq)]
pub enum MessageBody {
    /// Tag 13.
    RobotStatus(RobotStatus),
    /// Tag 14.
    JointTrajPtFull(JointTrajPtFull),
    /// Tag 15.
    JointFeedback(JointFeedback),
    /// Tag 2001.
    MotionCtrl(MotoMotionCtrl),
    /// Tag 2002.
    MotionReply(MotoMotionReply),
    /// Tag 2003.
    ReadIoBit(ReadIoBit),
    /// Tag 2004.
    ReadIoBitReply(ReadIoBitReply),
    /// Tag 2005.
    WriteIoBit(WriteIoBit),
    /// Tag 2006.
    WriteIoBitReply(WriteIoBitReply),
    /// Tag 2007.
    ReadIoGroup(ReadIoGroup),
    /// Tag 2008.
    ReadIoGroupReply(ReadIoGroupReply),
    /// Tag 2009.
    WriteIoGroup(WriteIoGroup),
    /// Tag 2010.
    WriteIoGroupReply(WriteIoGroupReply),
    /// Tag 2011.
    IoCtrlReply(IoCtrlReply),
    /// Tag 2016.
    JointTrajPtFullEx(JointTrajPtFullEx),
    /// Tag 2017.
    JointFeedbackEx(JointFeedbackEx),
    /// Tag 2018.
    SelectTool(SelectTool),
    /// Tag 2020 with an empty body: the DH parameter request.
    GetDhParameters,
    /// Tag 2020 with a 512 byte body: the DH parameter reply.
    DhParameters(DhParameters),
    /// Tag 2030.
    RealTimeJointStateEx(RealTimeJointStateEx),
    /// Tag 2031.
    RealTimeJointCommandEx(RealTimeJointCommandEx),
    /// A tag this crate does not know. Raw body bytes of the declared length.
    Invalid(Vec<u8>),
}

impl MessageBody {
    /// The wire tag for this body.
    ///
    /// [`MessageBody::Invalid`] has no tag of its own; the original tag lives in the header of
    /// the frame it was decoded from.
    pub fn msg_type(&self) -> MsgType {
        match self {
            Self::RobotStatus(_) => MsgType::RobotStatus,
            Self::JointTrajPtFull(_) => MsgType::JointTrajPtFull,
            Self::JointFeedback(_) => MsgType::JointFeedback,
            Self::MotionCtrl(_) => MsgType::MotoMotionCtrl,
            Self::MotionReply(_) => MsgType::MotoMotionReply,
            Self::ReadIoBit(_) => MsgType::MotoReadIoBit,
            Self::ReadIoBitReply(_) => MsgType::MotoReadIoBitReply,
            Self::WriteIoBit(_) => MsgType::MotoWriteIoBit,
            Self::WriteIoBitReply(_) => MsgType::MotoWriteIoBitReply,
            Self::ReadIoGroup(_) => MsgType::MotoReadIoGroup,
            Self::ReadIoGroupReply(_) => MsgType::MotoReadIoGroupReply,
            Self::WriteIoGroup(_) => MsgType::MotoWriteIoGroup,
            Self::WriteIoGroupReply(_) => MsgType::MotoWriteIoGroupReply,
            Self::IoCtrlReply(_) => MsgType::MotoIoCtrlReply,
            Self::JointTrajPtFullEx(_) => MsgType::MotoJointTrajPtFullEx,
            Self::JointFeedbackEx(_) => MsgType::MotoJointFeedbackEx,
            Self::SelectTool(_) => MsgType::MotoSelectTool,
            Self::GetDhParameters | Self::DhParameters(_) => MsgType::MotoGetDhParameters,
            Self::RealTimeJointStateEx(_) => MsgType::MotoRealTimeMotionJointStateEx,
            Self::RealTimeJointCommandEx(_) => MsgType::MotoRealTimeMotionJointCommandEx,
            Self::Invalid(_) => MsgType::Unknown(-1),
        }
    }

    fn decode(msg_type: MsgType, buf: &[u8]) -> Result<Self, Error> {
        let body = match msg_type {
            MsgType::RobotStatus => Self::RobotStatus(RobotStatus::unpack_from_slice(buf)?),
            MsgType::JointTrajPtFull => {
                Self::JointTrajPtFull(JointTrajPtFull::unpack_from_slice(buf)?)
            }
            MsgType::JointFeedback => Self::JointFeedback(JointFeedback::unpack_from_slice(buf)?),
            MsgType::MotoMotionCtrl => Self::MotionCtrl(MotoMotionCtrl::unpack_from_slice(buf)?),
            MsgType::MotoMotionReply => Self::MotionReply(MotoMotionReply::unpack_from_slice(buf)?),
            MsgType::MotoReadIoBit => Self::ReadIoBit(ReadIoBit::unpack_from_slice(buf)?),
            MsgType::MotoReadIoBitReply => {
                Self::ReadIoBitReply(ReadIoBitReply::unpack_from_slice(buf)?)
            }
            MsgType::MotoWriteIoBit => Self::WriteIoBit(WriteIoBit::unpack_from_slice(buf)?),
            MsgType::MotoWriteIoBitReply => {
                Self::WriteIoBitReply(WriteIoBitReply::unpack_from_slice(buf)?)
            }
            MsgType::MotoReadIoGroup => Self::ReadIoGroup(ReadIoGroup::unpack_from_slice(buf)?),
            MsgType::MotoReadIoGroupReply => {
                Self::ReadIoGroupReply(ReadIoGroupReply::unpack_from_slice(buf)?)
            }
            MsgType::MotoWriteIoGroup => Self::WriteIoGroup(WriteIoGroup::unpack_from_slice(buf)?),
            MsgType::MotoWriteIoGroupReply => {
                Self::WriteIoGroupReply(WriteIoGroupReply::unpack_from_slice(buf)?)
            }
            MsgType::MotoIoCtrlReply => Self::IoCtrlReply(IoCtrlReply::unpack_from_slice(buf)?),
            MsgType::MotoJointTrajPtFullEx => {
                Self::JointTrajPtFullEx(JointTrajPtFullEx::decode(buf)?)
            }
            MsgType::MotoJointFeedbackEx => Self::JointFeedbackEx(JointFeedbackEx::decode(buf)?),
            MsgType::MotoSelectTool => Self::SelectTool(SelectTool::unpack_from_slice(buf)?),
            // The request and reply share a tag; only the reply has a body
            MsgType::MotoGetDhParameters if buf.is_empty() => Self::GetDhParameters,
            MsgType::MotoGetDhParameters => {
                Self::DhParameters(DhParameters::unpack_from_slice(buf)?)
            }
            MsgType::MotoRealTimeMotionJointStateEx => {
                Self::RealTimeJointStateEx(RealTimeJointStateEx::decode(buf)?)
            }
            MsgType::MotoRealTimeMotionJointCommandEx => {
                Self::RealTimeJointCommandEx(RealTimeJointCommandEx::decode(buf)?)
            }
            MsgType::Unknown(_) => Self::Invalid(buf.to_vec()),
        };

        Ok(body)
    }
}

impl MotoWireWrite for MessageBody {
    fn pack_to_slice_unchecked<'buf>(&self, buf: &'buf mut [u8]) -> &'buf [u8] {
        match self {
            Self::RobotStatus(body) => body.pack_to_slice_unchecked(buf),
            Self::JointTrajPtFull(body) => body.pack_to_slice_unchecked(buf),
            Self::JointFeedback(body) => body.pack_to_slice_unchecked(buf),
            Self::MotionCtrl(body) => body.pack_to_slice_unchecked(buf),
            Self::MotionReply(body) => body.pack_to_slice_unchecked(buf),
            Self::ReadIoBit(body) => body.pack_to_slice_unchecked(buf),
            Self::ReadIoBitReply(body) => body.pack_to_slice_unchecked(buf),
            Self::WriteIoBit(body) => body.pack_to_slice_unchecked(buf),
            Self::WriteIoBitReply(body) => body.pack_to_slice_unchecked(buf),
            Self::ReadIoGroup(body) => body.pack_to_slice_unchecked(buf),
            Self::ReadIoGroupReply(body) => body.pack_to_slice_unchecked(buf),
            Self::WriteIoGroup(body) => body.pack_to_slice_unchecked(buf),
            Self::WriteIoGroupReply(body) => body.pack_to_slice_unchecked(buf),
            Self::IoCtrlReply(body) => body.pack_to_slice_unchecked(buf),
            Self::JointTrajPtFullEx(body) => body.pack_to_slice_unchecked(buf),
            Self::JointFeedbackEx(body) => body.pack_to_slice_unchecked(buf),
            Self::SelectTool(body) => body.pack_to_slice_unchecked(buf),
            Self::GetDhParameters => &buf[0..0],
            Self::DhParameters(body) => body.pack_to_slice_unchecked(buf),
            Self::RealTimeJointStateEx(body) => body.pack_to_slice_unchecked(buf),
            Self::RealTimeJointCommandEx(body) => body.pack_to_slice_unchecked(buf),
            Self::Invalid(raw) => raw.as_slice().pack_to_slice_unchecked(buf),
        }
    }

    fn packed_len(&self) -> usize {
        match self {
            Self::RobotStatus(_) => RobotStatus::PACKED_LEN,
            Self::JointTrajPtFull(_) => JointTrajPtFull::PACKED_LEN,
            Self::JointFeedback(_) => JointFeedback::PACKED_LEN,
            Self::MotionCtrl(_) => MotoMotionCtrl::PACKED_LEN,
            Self::MotionReply(_) => MotoMotionReply::PACKED_LEN,
            Self::ReadIoBit(_) => ReadIoBit::PACKED_LEN,
            Self::ReadIoBitReply(_) => ReadIoBitReply::PACKED_LEN,
            Self::WriteIoBit(_) => WriteIoBit::PACKED_LEN,
            Self::WriteIoBitReply(_) => WriteIoBitReply::PACKED_LEN,
            Self::ReadIoGroup(_) => ReadIoGroup::PACKED_LEN,
            Self::ReadIoGroupReply(_) => ReadIoGroupReply::PACKED_LEN,
            Self::WriteIoGroup(_) => WriteIoGroup::PACKED_LEN,
            Self::WriteIoGroupReply(_) => WriteIoGroupReply::PACKED_LEN,
            Self::IoCtrlReply(_) => IoCtrlReply::PACKED_LEN,
            Self::JointTrajPtFullEx(body) => body.packed_len(),
            Self::JointFeedbackEx(body) => body.packed_len(),
            Self::SelectTool(_) => SelectTool::PACKED_LEN,
            Self::GetDhParameters => 0,
            Self::DhParameters(_) => DhParameters::PACKED_LEN,
            Self::RealTimeJointStateEx(body) => body.packed_len(),
            Self::RealTimeJointCommandEx(body) => body.packed_len(),
            Self::Invalid(raw) => raw.len(),
        }
    }
}

macro_rules! impl_body_from {
    ($variant:ident, $ty:ty) => {
        impl From<$ty> for MessageBody {
            fn from(value: $ty) -> Self {
                Self::$variant(value)
            }
        }
    };
}

impl_body_from!(RobotStatus, RobotStatus);
impl_body_from!(JointTrajPtFull, JointTrajPtFull);
impl_body_from!(JointFeedback, JointFeedback);
impl_body_from!(MotionCtrl, MotoMotionCtrl);
impl_body_from!(MotionReply, MotoMotionReply);
impl_body_from!(ReadIoBit, ReadIoBit);
impl_body_from!(ReadIoBitReply, ReadIoBitReply);
impl_body_from!(WriteIoBit, WriteIoBit);
impl_body_from!(WriteIoBitReply, WriteIoBitReply);
impl_body_from!(ReadIoGroup, ReadIoGroup);
impl_body_from!(ReadIoGroupReply, ReadIoGroupReply);
impl_body_from!(WriteIoGroup, WriteIoGroup);
impl_body_from!(WriteIoGroupReply, WriteIoGroupReply);
impl_body_from!(IoCtrlReply, IoCtrlReply);
impl_body_from!(JointTrajPtFullEx, JointTrajPtFullEx);
impl_body_from!(JointFeedbackEx, JointFeedbackEx);
impl_body_from!(SelectTool, SelectTool);
impl_body_from!(DhParameters, DhParameters);
impl_body_from!(RealTimeJointStateEx, RealTimeJointStateEx);
impl_body_from!(RealTimeJointCommandEx, RealTimeJointCommandEx);

/// One complete Simple Message frame.
#[derive(Debug, Clone, PartialEq)]
pub struct SimpleMessage {
    /// Frame header. `msg_type` is kept consistent with the body by the constructors and is
    /// authoritative when re-encoding frames decoded with an unknown tag.
    pub header: Header,
    /// The frame body.
    pub body: MessageBody,
}

impl SimpleMessage {
    /// A topic (unsolicited, one-way) message.
    pub fn topic(body: impl Into<MessageBody>) -> Self {
        let body = body.into();

        Self {
            header: Header {
                msg_type: body.msg_type(),
                comm_type: CommType::Topic,
                reply_type: ReplyType::Invalid,
            },
            body,
        }
    }

    /// A service request.
    pub fn service_request(body: impl Into<MessageBody>) -> Self {
        let body = body.into();

        Self {
            header: Header {
                msg_type: body.msg_type(),
                comm_type: CommType::ServiceRequest,
                reply_type: ReplyType::Invalid,
            },
            body,
        }
    }

    /// A service reply with the given header-level outcome.
    pub fn service_reply(body: impl Into<MessageBody>, reply_type: ReplyType) -> Self {
        let body = body.into();

        Self {
            header: Header {
                msg_type: body.msg_type(),
                comm_type: CommType::ServiceReply,
                reply_type,
            },
            body,
        }
    }

    /// The header-only DH parameter request (tag 2020).
    pub fn dh_parameter_request() -> Self {
        Self {
            header: Header {
                msg_type: MsgType::MotoGetDhParameters,
                comm_type: CommType::ServiceRequest,
                reply_type: ReplyType::Invalid,
            },
            body: MessageBody::GetDhParameters,
        }
    }

    /// Encode prefix + header + body into a fresh buffer.
    pub fn encode_to_vec(&self) -> Vec<u8> {
        let body_len = self.body.packed_len();

        let mut buf = vec![0u8; PREFIX_LEN + HEADER_LEN + body_len];

        ((HEADER_LEN + body_len) as i32).pack_to_slice_unchecked(&mut buf[0..PREFIX_LEN]);
        self.header
            .pack_to_slice_unchecked(&mut buf[PREFIX_LEN..PREFIX_LEN + HEADER_LEN]);
        self.body
            .pack_to_slice_unchecked(&mut buf[PREFIX_LEN + HEADER_LEN..]);

        buf
    }

    /// Decode one frame from the start of `buf`, returning the message and the number of bytes
    /// consumed.
    ///
    /// Fails with [`Error::InvalidHeader`] when there are not even enough bytes for the prefix
    /// and header, and with [`Error::ShortFrame`] when the buffer holds fewer bytes than the
    /// prefix declares.
    pub fn decode(buf: &[u8]) -> Result<(Self, usize), Error> {
        if buf.len() < PREFIX_LEN + HEADER_LEN {
            return Err(Error::InvalidHeader { got: buf.len() });
        }

        let prefix = i32::unpack_from_slice(&buf[0..PREFIX_LEN])?;

        if prefix < HEADER_LEN as i32 {
            return Err(Error::InvalidHeader { got: buf.len() });
        }

        let frame_len = PREFIX_LEN + prefix as usize;

        if buf.len() < frame_len {
            return Err(Error::ShortFrame {
                needed: frame_len,
                got: buf.len(),
            });
        }

        let header = Header::unpack_from_slice(&buf[PREFIX_LEN..PREFIX_LEN + HEADER_LEN])?;
        let body = MessageBody::decode(header.msg_type, &buf[PREFIX_LEN + HEADER_LEN..frame_len])?;

        Ok((Self { header, body }, frame_len))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MOT_MAX_GR, ROS_MAX_JOINT};
    use pretty_assertions::assert_eq;

    fn roundtrip(msg: SimpleMessage) -> SimpleMessage {
        let encoded = msg.encode_to_vec();

        let (decoded, consumed) = SimpleMessage::decode(&encoded).expect("decode");

        assert_eq!(consumed, encoded.len());

        decoded
    }

    #[test]
    fn prefix_counts_bytes_after_itself() {
        let msg = SimpleMessage::topic(RobotStatus::default());

        let encoded = msg.encode_to_vec();

        assert_eq!(encoded.len(), 4 + 12 + 28);
        assert_eq!(&encoded[0..4], &40i32.to_le_bytes());
    }

    #[test]
    fn joint_traj_pt_full_roundtrip() {
        let mut pos = [0.0f32; ROS_MAX_JOINT];
        pos.copy_from_slice(&[1.0, 2.0, 3.0123, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0]);

        let msg = SimpleMessage::topic(JointTrajPtFull {
            groupno: 0,
            sequence: 42,
            valid_fields: ValidFields::all(),
            time: 1.5,
            pos,
            vel: [0.0; ROS_MAX_JOINT],
            acc: [0.0; ROS_MAX_JOINT],
        });

        let encoded = msg.encode_to_vec();

        // 4 prefix + 12 header + 136 body
        assert_eq!(encoded.len(), 152);

        assert_eq!(roundtrip(msg.clone()), msg);
    }

    #[test]
    fn body_sizes_match_the_vendor_catalogue() {
        use motosm_wire::MotoWireSized;

        assert_eq!(RobotStatus::PACKED_LEN, 28);
        assert_eq!(JointTrajPtFull::PACKED_LEN, 136);
        assert_eq!(JointFeedback::PACKED_LEN, 132);
        assert_eq!(MotoMotionCtrl::PACKED_LEN, 52);
        assert_eq!(MotoMotionReply::PACKED_LEN, 60);
        assert_eq!(SelectTool::PACKED_LEN, 12);
        assert_eq!(DhParameters::PACKED_LEN, 512);
        assert_eq!(RealTimeJointStateExData::PACKED_LEN, 84);
        assert_eq!(RealTimeJointCommandExData::PACKED_LEN, 44);
    }

    #[test]
    fn motion_reply_roundtrip_preserves_unknown_subcode() {
        let msg = SimpleMessage::service_reply(
            MotoMotionReply::new(CommandType::StartServos, ResultType::Alarm, 5999),
            ReplyType::Success,
        );

        let decoded = roundtrip(msg);

        let MessageBody::MotionReply(reply) = decoded.body else {
            panic!("wrong body variant");
        };

        assert_eq!(reply.result, ResultType::Alarm);
        assert_eq!(reply.subcode, 5999);
    }

    #[test]
    fn unknown_result_code_roundtrips_raw() {
        let msg = SimpleMessage::service_reply(
            MotoMotionReply::new(CommandType::Unknown(999_999), ResultType::Unknown(77), 0),
            ReplyType::Failure,
        );

        assert_eq!(roundtrip(msg.clone()), msg);
    }

    #[test]
    fn sequence_sentinel_is_preserved() {
        let msg = SimpleMessage::service_request(MotoMotionCtrl::new(CommandType::StopMotion));

        let encoded = msg.encode_to_vec();

        // sequence = -1 sits after groupno in the body
        assert_eq!(&encoded[20..24], &[0xff; 4]);
        assert_eq!(roundtrip(msg.clone()), msg);
    }

    #[test]
    fn ternary_unknown_reencodes_as_minus_one() {
        let mut encoded = SimpleMessage::topic(RobotStatus::default()).encode_to_vec();

        // Overwrite `drives_powered` with an out-of-range value
        encoded[16..20].copy_from_slice(&17i32.to_le_bytes());

        let (decoded, _) = SimpleMessage::decode(&encoded).unwrap();

        let MessageBody::RobotStatus(status) = decoded.body else {
            panic!("wrong body variant");
        };

        assert_eq!(status.drives_powered, Ternary::Unknown);
        assert_eq!(
            &SimpleMessage::topic(status).encode_to_vec()[16..20],
            &(-1i32).to_le_bytes()
        );
    }

    #[test]
    fn valid_fields_unknown_bits_are_retained() {
        let msg = SimpleMessage::topic(JointFeedback {
            valid_fields: ValidFields::from_bits_retain(0b1_0011),
            ..JointFeedback::default()
        });

        let decoded = roundtrip(msg);

        let MessageBody::JointFeedback(feedback) = decoded.body else {
            panic!("wrong body variant");
        };

        assert_eq!(feedback.valid_fields.bits(), 0b1_0011);
        assert!(feedback.valid_fields.contains(ValidFields::TIME));
    }

    #[test]
    fn ex_length_is_fixed_prefix_plus_subrecords() {
        let mut points = heapless::Vec::<JointTrajPtExData, MOT_MAX_GR>::new();
        points.push(JointTrajPtExData::default()).unwrap();
        points
            .push(JointTrajPtExData {
                groupno: 1,
                ..JointTrajPtExData::default()
            })
            .unwrap();

        let msg = SimpleMessage::topic(JointTrajPtFullEx {
            sequence: 0,
            points,
        });

        let encoded = msg.encode_to_vec();

        assert_eq!(encoded.len(), 4 + 12 + 8 + 2 * 132);
        assert_eq!(roundtrip(msg.clone()), msg);
    }

    #[test]
    fn ex_group_count_over_limit_is_refused() {
        let mut groups = heapless::Vec::<JointFeedback, MOT_MAX_GR>::new();
        groups.push(JointFeedback::default()).unwrap();

        let mut encoded = SimpleMessage::topic(JointFeedbackEx { groups }).encode_to_vec();

        // Claim five groups
        encoded[16..20].copy_from_slice(&5i32.to_le_bytes());

        assert!(matches!(
            SimpleMessage::decode(&encoded),
            Err(Error::InvalidGroupCount { count: 5 })
        ));
    }

    #[test]
    fn unknown_tag_decodes_to_invalid_with_raw_bytes() {
        let mut encoded = SimpleMessage::topic(SelectTool {
            groupno: 0,
            tool: 3,
            sequence: -1,
        })
        .encode_to_vec();

        // Rewrite the tag to something undefined
        encoded[4..8].copy_from_slice(&4242i32.to_le_bytes());

        let (decoded, consumed) = SimpleMessage::decode(&encoded).unwrap();

        assert_eq!(consumed, encoded.len());
        assert_eq!(decoded.header.msg_type, MsgType::Unknown(4242));

        let MessageBody::Invalid(raw) = &decoded.body else {
            panic!("wrong body variant");
        };

        assert_eq!(raw.len(), 12);

        // And the frame re-encodes bit-exactly
        assert_eq!(decoded.encode_to_vec(), encoded);
    }

    #[test]
    fn short_frame_is_reported() {
        let encoded = SimpleMessage::topic(RobotStatus::default()).encode_to_vec();

        assert!(matches!(
            SimpleMessage::decode(&encoded[0..20]),
            Err(Error::ShortFrame { needed: 44, got: 20 })
        ));
    }

    #[test]
    fn truncated_header_is_reported() {
        assert!(matches!(
            SimpleMessage::decode(&[0u8; 7]),
            Err(Error::InvalidHeader { got: 7 })
        ));
    }

    #[test]
    fn dh_parameter_tag_dispatches_on_body_presence() {
        let request = SimpleMessage::dh_parameter_request();

        let encoded = request.encode_to_vec();

        assert_eq!(encoded.len(), 16);
        assert_eq!(roundtrip(request.clone()), request);

        let reply = SimpleMessage::service_reply(DhParameters::default(), ReplyType::Success);

        assert_eq!(reply.encode_to_vec().len(), 16 + 512);
        assert_eq!(roundtrip(reply.clone()), reply);
    }

    #[test]
    fn real_time_state_roundtrip() {
        let mut groups = heapless::Vec::<RealTimeJointStateExData, MOT_MAX_GR>::new();
        groups
            .push(RealTimeJointStateExData {
                groupno: 0,
                pos: [0.25; ROS_MAX_JOINT],
                vel: [0.0; ROS_MAX_JOINT],
            })
            .unwrap();

        let msg = SimpleMessage::topic(RealTimeJointStateEx {
            message_id: 1234,
            mode: RealTimeMode::JointVelocity,
            groups,
        });

        assert_eq!(msg.encode_to_vec().len(), 16 + 12 + 84);
        assert_eq!(roundtrip(msg.clone()), msg);
    }

    #[test]
    fn real_time_command_roundtrip() {
        let mut groups = heapless::Vec::<RealTimeJointCommandExData, MOT_MAX_GR>::new();
        groups
            .push(RealTimeJointCommandExData {
                groupno: 0,
                command: [0.1; ROS_MAX_JOINT],
            })
            .unwrap();
        groups
            .push(RealTimeJointCommandExData {
                groupno: 1,
                command: [0.0; ROS_MAX_JOINT],
            })
            .unwrap();

        let msg = SimpleMessage::topic(RealTimeJointCommandEx {
            message_id: 77,
            groups,
        });

        assert_eq!(msg.encode_to_vec().len(), 16 + 8 + 2 * 44);
        assert_eq!(roundtrip(msg.clone()), msg);
    }

    #[test]
    fn io_bodies_roundtrip() {
        let msgs = [
            SimpleMessage::service_request(ReadIoBit { address: 27010 }),
            SimpleMessage::service_reply(
                ReadIoBitReply {
                    value: 1,
                    result_code: 0,
                },
                ReplyType::Success,
            ),
            SimpleMessage::service_request(WriteIoBit {
                address: 27010,
                value: 1,
            }),
            SimpleMessage::service_reply(WriteIoBitReply { result_code: 0 }, ReplyType::Success),
            SimpleMessage::service_request(ReadIoGroup { address: 1001 }),
            SimpleMessage::service_reply(
                ReadIoGroupReply {
                    value: 0xa5,
                    result_code: 0,
                },
                ReplyType::Success,
            ),
            SimpleMessage::service_request(WriteIoGroup {
                address: 1001,
                value: 0x5a,
            }),
            SimpleMessage::service_reply(WriteIoGroupReply { result_code: 0 }, ReplyType::Success),
            SimpleMessage::service_reply(
                IoCtrlReply {
                    result: 0,
                    subcode: 0,
                },
                ReplyType::Success,
            ),
        ];

        for msg in msgs {
            assert_eq!(roundtrip(msg.clone()), msg);
        }
    }
}
