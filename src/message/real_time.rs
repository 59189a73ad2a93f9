//! Real-time motion UDP bodies (tags 2030/2031).

use super::joint_data::JointVector;
use crate::{MOT_MAX_GR, error::Error};
use motosm_wire::{MotoWireRead, MotoWireSized, MotoWireWrite, WireError};

/// How the controller interprets the command datum of each joint while the real-time session
/// is active. Set when the session starts and carried in every state packet.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub enum RealTimeMode {
    /// Commands are ignored; positions and velocities stay constant.
    #[default]
    Idle,
    /// Each command datum is a target joint position, radians.
    JointPosition,
    /// Each command datum is a target joint velocity, rad/s.
    JointVelocity,
    /// A mode this crate does not know, preserved raw.
    Unknown(i32),
}

impl From<i32> for RealTimeMode {
    fn from(value: i32) -> Self {
        match value {
            0 => Self::Idle,
            1 => Self::JointPosition,
            2 => Self::JointVelocity,
            other => Self::Unknown(other),
        }
    }
}

impl From<RealTimeMode> for i32 {
    fn from(value: RealTimeMode) -> Self {
        match value {
            RealTimeMode::Idle => 0,
            RealTimeMode::JointPosition => 1,
            RealTimeMode::JointVelocity => 2,
            RealTimeMode::Unknown(other) => other,
        }
    }
}

super::header::impl_wire_for_i32_enum!(RealTimeMode);

/// Per-group payload of a [`RealTimeJointStateEx`].
#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct RealTimeJointStateExData {
    /// Control group, zero based.
    pub groupno: i32,
    /// Current joint positions, radians.
    pub pos: JointVector,
    /// Current joint velocities, rad/s.
    pub vel: JointVector,
}

impl MotoWireRead for RealTimeJointStateExData {
    fn unpack_from_slice(buf: &[u8]) -> Result<Self, WireError> {
        if buf.len() < Self::PACKED_LEN {
            return Err(WireError::BufferTooShort {
                expected: Self::PACKED_LEN,
                got: buf.len(),
            });
        }

        Ok(Self {
            groupno: i32::unpack_from_slice(&buf[0..4])?,
            pos: JointVector::unpack_from_slice(&buf[4..44])?,
            vel: JointVector::unpack_from_slice(&buf[44..84])?,
        })
    }
}

impl MotoWireWrite for RealTimeJointStateExData {
    fn pack_to_slice_unchecked<'buf>(&self, buf: &'buf mut [u8]) -> &'buf [u8] {
        self.groupno.pack_to_slice_unchecked(&mut buf[0..4]);
        self.pos.pack_to_slice_unchecked(&mut buf[4..44]);
        self.vel.pack_to_slice_unchecked(&mut buf[44..84]);

        &buf[0..Self::PACKED_LEN]
    }

    fn packed_len(&self) -> usize {
        Self::PACKED_LEN
    }
}

impl MotoWireSized for RealTimeJointStateExData {
    const PACKED_LEN: usize = 84;

    type Buffer = [u8; 84];

    fn buffer() -> Self::Buffer {
        [0u8; 84]
    }
}

/// Real-time joint state (tag 2030), sent by the controller once per cycle.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct RealTimeJointStateEx {
    /// Monotonic cycle counter. Commands must echo it.
    pub message_id: i32,
    /// Active command interpretation.
    pub mode: RealTimeMode,
    /// One record per active group.
    pub groups: heapless::Vec<RealTimeJointStateExData, MOT_MAX_GR>,
}

impl RealTimeJointStateEx {
    pub(crate) fn decode(buf: &[u8]) -> Result<Self, Error> {
        let message_id = i32::unpack_from_slice(buf)?;
        let mode = RealTimeMode::unpack_from_slice(buf.get(4..).unwrap_or_default())?;
        let count = super::joint_data::unpack_group_count(buf.get(8..).unwrap_or_default())?;

        let tail = buf
            .get(12..12 + count * RealTimeJointStateExData::PACKED_LEN)
            .ok_or(WireError::BufferTooShort {
                expected: 12 + count * RealTimeJointStateExData::PACKED_LEN,
                got: buf.len(),
            })?;

        Ok(Self {
            message_id,
            mode,
            groups: heapless::Vec::unpack_from_slice(tail)?,
        })
    }
}

impl MotoWireWrite for RealTimeJointStateEx {
    fn pack_to_slice_unchecked<'buf>(&self, buf: &'buf mut [u8]) -> &'buf [u8] {
        let len = self.packed_len();

        self.message_id.pack_to_slice_unchecked(&mut buf[0..4]);
        self.mode.pack_to_slice_unchecked(&mut buf[4..8]);
        (self.groups.len() as i32).pack_to_slice_unchecked(&mut buf[8..12]);
        self.groups.pack_to_slice_unchecked(&mut buf[12..len]);

        &buf[0..len]
    }

    fn packed_len(&self) -> usize {
        12 + self.groups.packed_len()
    }
}

/// Per-group payload of a [`RealTimeJointCommandEx`].
#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct RealTimeJointCommandExData {
    /// Control group, zero based.
    pub groupno: i32,
    /// Command datum per joint; meaning depends on the session's [`RealTimeMode`].
    pub command: JointVector,
}

impl MotoWireRead for RealTimeJointCommandExData {
    fn unpack_from_slice(buf: &[u8]) -> Result<Self, WireError> {
        if buf.len() < Self::PACKED_LEN {
            return Err(WireError::BufferTooShort {
                expected: Self::PACKED_LEN,
                got: buf.len(),
            });
        }

        Ok(Self {
            groupno: i32::unpack_from_slice(&buf[0..4])?,
            command: JointVector::unpack_from_slice(&buf[4..44])?,
        })
    }
}

impl MotoWireWrite for RealTimeJointCommandExData {
    fn pack_to_slice_unchecked<'buf>(&self, buf: &'buf mut [u8]) -> &'buf [u8] {
        self.groupno.pack_to_slice_unchecked(&mut buf[0..4]);
        self.command.pack_to_slice_unchecked(&mut buf[4..44]);

        &buf[0..Self::PACKED_LEN]
    }

    fn packed_len(&self) -> usize {
        Self::PACKED_LEN
    }
}

impl MotoWireSized for RealTimeJointCommandExData {
    const PACKED_LEN: usize = 44;

    type Buffer = [u8; 44];

    fn buffer() -> Self::Buffer {
        [0u8; 44]
    }
}

/// Real-time joint command (tag 2031): the external controller's reply to one state packet,
/// echoing its `message_id`.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct RealTimeJointCommandEx {
    /// Must equal the `message_id` of the state packet this command answers.
    pub message_id: i32,
    /// One record per active group.
    pub groups: heapless::Vec<RealTimeJointCommandExData, MOT_MAX_GR>,
}

impl RealTimeJointCommandEx {
    pub(crate) fn decode(buf: &[u8]) -> Result<Self, Error> {
        let message_id = i32::unpack_from_slice(buf)?;
        let count = super::joint_data::unpack_group_count(buf.get(4..).unwrap_or_default())?;

        let tail = buf
            .get(8..8 + count * RealTimeJointCommandExData::PACKED_LEN)
            .ok_or(WireError::BufferTooShort {
                expected: 8 + count * RealTimeJointCommandExData::PACKED_LEN,
                got: buf.len(),
            })?;

        Ok(Self {
            message_id,
            groups: heapless::Vec::unpack_from_slice(tail)?,
        })
    }
}

impl MotoWireWrite for RealTimeJointCommandEx {
    fn pack_to_slice_unchecked<'buf>(&self, buf: &'buf mut [u8]) -> &'buf [u8] {
        let len = self.packed_len();

        self.message_id.pack_to_slice_unchecked(&mut buf[0..4]);
        (self.groups.len() as i32).pack_to_slice_unchecked(&mut buf[4..8]);
        self.groups.pack_to_slice_unchecked(&mut buf[8..len]);

        &buf[0..len]
    }

    fn packed_len(&self) -> usize {
        8 + self.groups.packed_len()
    }
}
