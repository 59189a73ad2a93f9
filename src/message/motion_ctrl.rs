//! Motion control service bodies (tags 2001/2002/2018/2020) and their command/result codes.

use super::joint_data::JointVector;
use crate::MOT_MAX_GR;
use motosm_wire::{MotoWireRead, MotoWireSized, MotoWireWrite, WireError};

/// Command carried by a [`MotoMotionCtrl`] request and echoed in replies.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum CommandType {
    /// Ask whether the controller can accept motion.
    CheckMotionReady,
    /// Ask for the per-group trajectory queue depth.
    CheckQueueCnt,
    /// Stop the current motion.
    StopMotion,
    /// Start the servo motors.
    StartServos,
    /// Stop the servo motors and motion.
    StopServos,
    /// Clear the active alarm.
    ResetAlarm,
    /// Enter trajectory streaming mode.
    StartTrajMode,
    /// Leave trajectory streaming mode.
    StopTrajMode,
    /// End the session.
    Disconnect,
    /// Enter the real-time UDP motion mode.
    StartRealTimeMotionMode,
    /// Leave the real-time UDP motion mode.
    StopRealTimeMotionMode,
    /// A command code this crate does not know, preserved raw.
    Unknown(i32),
}

impl From<i32> for CommandType {
    fn from(value: i32) -> Self {
        match value {
            200101 => Self::CheckMotionReady,
            200102 => Self::CheckQueueCnt,
            200111 => Self::StopMotion,
            200112 => Self::StartServos,
            200113 => Self::StopServos,
            200114 => Self::ResetAlarm,
            200121 => Self::StartTrajMode,
            200122 => Self::StopTrajMode,
            200130 => Self::Disconnect,
            200140 => Self::StartRealTimeMotionMode,
            200141 => Self::StopRealTimeMotionMode,
            other => Self::Unknown(other),
        }
    }
}

impl From<CommandType> for i32 {
    fn from(value: CommandType) -> Self {
        match value {
            CommandType::CheckMotionReady => 200101,
            CommandType::CheckQueueCnt => 200102,
            CommandType::StopMotion => 200111,
            CommandType::StartServos => 200112,
            CommandType::StopServos => 200113,
            CommandType::ResetAlarm => 200114,
            CommandType::StartTrajMode => 200121,
            CommandType::StopTrajMode => 200122,
            CommandType::Disconnect => 200130,
            CommandType::StartRealTimeMotionMode => 200140,
            CommandType::StopRealTimeMotionMode => 200141,
            CommandType::Unknown(other) => other,
        }
    }
}

/// High level result code of a [`MotoMotionReply`].
///
/// The vendor headers alias `TRUE = 0` to `Success` and `FALSE = 2` to `Failure`; this crate
/// exposes one canonical name per numeric value.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ResultType {
    /// The request succeeded (also the `TRUE` alias for ready checks).
    Success,
    /// The controller is busy.
    Busy,
    /// The request failed (also the `FALSE` alias for ready checks).
    Failure,
    /// The request carried invalid data; see the subcode.
    Invalid,
    /// An alarm is active.
    Alarm,
    /// The controller is not ready; see the subcode.
    NotReady,
    /// A MotoPlus API call failed on the controller.
    MpFailure,
    /// A result code this crate does not know, preserved raw.
    Unknown(i32),
}

impl From<i32> for ResultType {
    fn from(value: i32) -> Self {
        match value {
            0 => Self::Success,
            1 => Self::Busy,
            2 => Self::Failure,
            3 => Self::Invalid,
            4 => Self::Alarm,
            5 => Self::NotReady,
            6 => Self::MpFailure,
            other => Self::Unknown(other),
        }
    }
}

impl From<ResultType> for i32 {
    fn from(value: ResultType) -> Self {
        match value {
            ResultType::Success => 0,
            ResultType::Busy => 1,
            ResultType::Failure => 2,
            ResultType::Invalid => 3,
            ResultType::Alarm => 4,
            ResultType::NotReady => 5,
            ResultType::MpFailure => 6,
            ResultType::Unknown(other) => other,
        }
    }
}

super::header::impl_wire_for_i32_enum!(CommandType);
super::header::impl_wire_for_i32_enum!(ResultType);

/// Detailed reply subcodes. Values outside these lists are passed through as raw integers.
pub mod subcode {
    /// Invalid data, unspecified.
    pub const INVALID_UNSPECIFIED: i32 = 3000;
    /// Message size mismatch.
    pub const INVALID_MSGSIZE: i32 = 3001;
    /// Malformed header.
    pub const INVALID_MSGHEADER: i32 = 3002;
    /// Unexpected message type.
    pub const INVALID_MSGTYPE: i32 = 3003;
    /// Group number out of range.
    pub const INVALID_GROUPNO: i32 = 3004;
    /// Bad trajectory sequence number.
    pub const INVALID_SEQUENCE: i32 = 3005;
    /// Unknown command code.
    pub const INVALID_COMMAND: i32 = 3006;
    /// Invalid command data.
    pub const INVALID_DATA: i32 = 3010;
    /// Start position does not match the robot.
    pub const INVALID_DATA_START_POS: i32 = 3011;
    /// Bad joint speed.
    pub const INVALID_DATA_SPEED: i32 = 3012;
    /// Bad joint acceleration.
    pub const INVALID_DATA_ACCEL: i32 = 3013;
    /// Not enough data fields marked valid.
    pub const INVALID_DATA_INSUFFICIENT: i32 = 3014;
    /// Bad trajectory point time.
    pub const INVALID_DATA_TIME: i32 = 3015;
    /// Bad tool number.
    pub const INVALID_DATA_TOOLNO: i32 = 3016;

    /// Not ready, unspecified.
    pub const NOT_READY_UNSPECIFIED: i32 = 5000;
    /// An alarm is active.
    pub const NOT_READY_ALARM: i32 = 5001;
    /// An error is active.
    pub const NOT_READY_ERROR: i32 = 5002;
    /// The controller is e-stopped.
    pub const NOT_READY_ESTOP: i32 = 5003;
    /// The pendant is not in PLAY mode.
    pub const NOT_READY_NOT_PLAY: i32 = 5004;
    /// The pendant is not in REMOTE mode.
    pub const NOT_READY_NOT_REMOTE: i32 = 5005;
    /// Servo power is off.
    pub const NOT_READY_SERVO_OFF: i32 = 5006;
    /// The controller is in HOLD.
    pub const NOT_READY_HOLD: i32 = 5007;
    /// The MotoPlus job has not started.
    pub const NOT_READY_NOT_STARTED: i32 = 5008;
    /// The controller is waiting for the remote peer.
    pub const NOT_READY_WAITING_ROS: i32 = 5009;
    /// A skill send is in progress.
    pub const NOT_READY_SKILLSEND: i32 = 5010;
    /// PFL (safety) function active.
    pub const NOT_READY_PFL_ACTIVE: i32 = 5011;
}

/// Motion control service request (tag 2001).
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct MotoMotionCtrl {
    /// Target control group, `-1` when the command is not group specific.
    pub groupno: i32,
    /// Caller-chosen tracking number echoed by the reply, `-1` for unspecified.
    pub sequence: i32,
    /// The command to execute.
    pub command: CommandType,
    /// Command data, unused by the currently defined commands.
    pub data: JointVector,
}

impl MotoMotionCtrl {
    /// A request for `command` with no group, sequence or data.
    pub fn new(command: CommandType) -> Self {
        Self::for_group(-1, command)
    }

    /// A request for `command` aimed at `groupno`.
    pub fn for_group(groupno: i32, command: CommandType) -> Self {
        Self {
            groupno,
            sequence: -1,
            command,
            data: [0.0; 10],
        }
    }
}

impl MotoWireRead for MotoMotionCtrl {
    fn unpack_from_slice(buf: &[u8]) -> Result<Self, WireError> {
        if buf.len() < Self::PACKED_LEN {
            return Err(WireError::BufferTooShort {
                expected: Self::PACKED_LEN,
                got: buf.len(),
            });
        }

        Ok(Self {
            groupno: i32::unpack_from_slice(&buf[0..4])?,
            sequence: i32::unpack_from_slice(&buf[4..8])?,
            command: CommandType::unpack_from_slice(&buf[8..12])?,
            data: JointVector::unpack_from_slice(&buf[12..52])?,
        })
    }
}

impl MotoWireWrite for MotoMotionCtrl {
    fn pack_to_slice_unchecked<'buf>(&self, buf: &'buf mut [u8]) -> &'buf [u8] {
        self.groupno.pack_to_slice_unchecked(&mut buf[0..4]);
        self.sequence.pack_to_slice_unchecked(&mut buf[4..8]);
        self.command.pack_to_slice_unchecked(&mut buf[8..12]);
        self.data.pack_to_slice_unchecked(&mut buf[12..52]);

        &buf[0..Self::PACKED_LEN]
    }

    fn packed_len(&self) -> usize {
        Self::PACKED_LEN
    }
}

impl MotoWireSized for MotoMotionCtrl {
    const PACKED_LEN: usize = 52;

    type Buffer = [u8; 52];

    fn buffer() -> Self::Buffer {
        [0u8; 52]
    }
}

/// Motion control service reply (tag 2002).
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct MotoMotionReply {
    /// Group the reply concerns, `-1` when not group specific.
    pub groupno: i32,
    /// Echo of the request sequence.
    pub sequence: i32,
    /// Echo of the request command (or message type for non-ctrl requests).
    pub command: CommandType,
    /// High level outcome.
    pub result: ResultType,
    /// Detailed outcome, see [`subcode`]. `0` when unused.
    pub subcode: i32,
    /// Reply data; `data[0]` is the queue depth for [`CommandType::CheckQueueCnt`].
    pub data: JointVector,
}

impl MotoMotionReply {
    /// A reply to `command` with the given outcome and no data.
    pub fn new(command: CommandType, result: ResultType, subcode: i32) -> Self {
        Self {
            groupno: -1,
            sequence: -1,
            command,
            result,
            subcode,
            data: [0.0; 10],
        }
    }
}

impl MotoWireRead for MotoMotionReply {
    fn unpack_from_slice(buf: &[u8]) -> Result<Self, WireError> {
        if buf.len() < Self::PACKED_LEN {
            return Err(WireError::BufferTooShort {
                expected: Self::PACKED_LEN,
                got: buf.len(),
            });
        }

        Ok(Self {
            groupno: i32::unpack_from_slice(&buf[0..4])?,
            sequence: i32::unpack_from_slice(&buf[4..8])?,
            command: CommandType::unpack_from_slice(&buf[8..12])?,
            result: ResultType::unpack_from_slice(&buf[12..16])?,
            subcode: i32::unpack_from_slice(&buf[16..20])?,
            data: JointVector::unpack_from_slice(&buf[20..60])?,
        })
    }
}

impl MotoWireWrite for MotoMotionReply {
    fn pack_to_slice_unchecked<'buf>(&self, buf: &'buf mut [u8]) -> &'buf [u8] {
        self.groupno.pack_to_slice_unchecked(&mut buf[0..4]);
        self.sequence.pack_to_slice_unchecked(&mut buf[4..8]);
        self.command.pack_to_slice_unchecked(&mut buf[8..12]);
        self.result.pack_to_slice_unchecked(&mut buf[12..16]);
        self.subcode.pack_to_slice_unchecked(&mut buf[16..20]);
        self.data.pack_to_slice_unchecked(&mut buf[20..60]);

        &buf[0..Self::PACKED_LEN]
    }

    fn packed_len(&self) -> usize {
        Self::PACKED_LEN
    }
}

impl MotoWireSized for MotoMotionReply {
    const PACKED_LEN: usize = 60;

    type Buffer = [u8; 60];

    fn buffer() -> Self::Buffer {
        [0u8; 60]
    }
}

/// Tool selection request (tag 2018).
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct SelectTool {
    /// Target control group.
    pub groupno: i32,
    /// Tool file number to activate.
    pub tool: i32,
    /// Tracking number echoed by the reply, `-1` for unspecified.
    pub sequence: i32,
}

impl MotoWireRead for SelectTool {
    fn unpack_from_slice(buf: &[u8]) -> Result<Self, WireError> {
        if buf.len() < Self::PACKED_LEN {
            return Err(WireError::BufferTooShort {
                expected: Self::PACKED_LEN,
                got: buf.len(),
            });
        }

        Ok(Self {
            groupno: i32::unpack_from_slice(&buf[0..4])?,
            tool: i32::unpack_from_slice(&buf[4..8])?,
            sequence: i32::unpack_from_slice(&buf[8..12])?,
        })
    }
}

impl MotoWireWrite for SelectTool {
    fn pack_to_slice_unchecked<'buf>(&self, buf: &'buf mut [u8]) -> &'buf [u8] {
        self.groupno.pack_to_slice_unchecked(&mut buf[0..4]);
        self.tool.pack_to_slice_unchecked(&mut buf[4..8]);
        self.sequence.pack_to_slice_unchecked(&mut buf[8..12]);

        &buf[0..Self::PACKED_LEN]
    }

    fn packed_len(&self) -> usize {
        Self::PACKED_LEN
    }
}

impl MotoWireSized for SelectTool {
    const PACKED_LEN: usize = 12;

    type Buffer = [u8; 12];

    fn buffer() -> Self::Buffer {
        [0u8; 12]
    }
}

/// Denavit-Hartenberg parameters of one link.
#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct DhLink {
    /// Joint angle offset, radians.
    pub theta: f32,
    /// Link offset, millimetres.
    pub d: f32,
    /// Link length, millimetres.
    pub a: f32,
    /// Link twist, radians.
    pub alpha: f32,
}

impl MotoWireRead for DhLink {
    fn unpack_from_slice(buf: &[u8]) -> Result<Self, WireError> {
        if buf.len() < Self::PACKED_LEN {
            return Err(WireError::BufferTooShort {
                expected: Self::PACKED_LEN,
                got: buf.len(),
            });
        }

        Ok(Self {
            theta: f32::unpack_from_slice(&buf[0..4])?,
            d: f32::unpack_from_slice(&buf[4..8])?,
            a: f32::unpack_from_slice(&buf[8..12])?,
            alpha: f32::unpack_from_slice(&buf[12..16])?,
        })
    }
}

impl MotoWireWrite for DhLink {
    fn pack_to_slice_unchecked<'buf>(&self, buf: &'buf mut [u8]) -> &'buf [u8] {
        self.theta.pack_to_slice_unchecked(&mut buf[0..4]);
        self.d.pack_to_slice_unchecked(&mut buf[4..8]);
        self.a.pack_to_slice_unchecked(&mut buf[8..12]);
        self.alpha.pack_to_slice_unchecked(&mut buf[12..16]);

        &buf[0..Self::PACKED_LEN]
    }

    fn packed_len(&self) -> usize {
        Self::PACKED_LEN
    }
}

impl MotoWireSized for DhLink {
    const PACKED_LEN: usize = 16;

    type Buffer = [u8; 16];

    fn buffer() -> Self::Buffer {
        [0u8; 16]
    }
}

/// Number of links reported per group in a [`DhParameters`] reply.
pub const DH_LINKS_PER_GROUP: usize = 8;

/// DH parameter reply body for tag 2020: eight links for each of the four possible groups,
/// 512 bytes in total. Groups that do not exist report all-zero links.
#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct DhParameters {
    /// `groups[groupno][link]`.
    pub groups: [[DhLink; DH_LINKS_PER_GROUP]; MOT_MAX_GR],
}

impl MotoWireRead for DhParameters {
    fn unpack_from_slice(buf: &[u8]) -> Result<Self, WireError> {
        if buf.len() < Self::PACKED_LEN {
            return Err(WireError::BufferTooShort {
                expected: Self::PACKED_LEN,
                got: buf.len(),
            });
        }

        let mut groups = [[DhLink::default(); DH_LINKS_PER_GROUP]; MOT_MAX_GR];

        for (idx, chunk) in buf[0..Self::PACKED_LEN]
            .chunks_exact(DhLink::PACKED_LEN)
            .enumerate()
        {
            groups[idx / DH_LINKS_PER_GROUP][idx % DH_LINKS_PER_GROUP] =
                DhLink::unpack_from_slice(chunk)?;
        }

        Ok(Self { groups })
    }
}

impl MotoWireWrite for DhParameters {
    fn pack_to_slice_unchecked<'buf>(&self, buf: &'buf mut [u8]) -> &'buf [u8] {
        for (idx, link) in self.groups.iter().flatten().enumerate() {
            link.pack_to_slice_unchecked(&mut buf[idx * DhLink::PACKED_LEN..]);
        }

        &buf[0..Self::PACKED_LEN]
    }

    fn packed_len(&self) -> usize {
        Self::PACKED_LEN
    }
}

impl MotoWireSized for DhParameters {
    const PACKED_LEN: usize = MOT_MAX_GR * DH_LINKS_PER_GROUP * DhLink::PACKED_LEN;

    type Buffer = [u8; 512];

    fn buffer() -> Self::Buffer {
        [0u8; 512]
    }
}
