//! Trajectory point and joint feedback bodies, single group and multi group ("Ex") variants.

use crate::{MOT_MAX_GR, ROS_MAX_JOINT, error::Error};
use motosm_wire::{MotoWireRead, MotoWireSized, MotoWireWrite, WireError};

bitflags::bitflags! {
    /// Declares which of the optional fields of a trajectory or feedback record carry
    /// meaningful data.
    ///
    /// The mask is carried opaquely: unknown bits are preserved on round-trip and the codec
    /// never validates the numeric payload against it.
    #[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
    pub struct ValidFields: i32 {
        /// `time` is valid.
        const TIME = 1;
        /// `pos` is valid.
        const POSITION = 2;
        /// `vel` is valid.
        const VELOCITY = 4;
        /// `acc` is valid.
        const ACCELERATION = 8;
    }
}

impl MotoWireRead for ValidFields {
    fn unpack_from_slice(buf: &[u8]) -> Result<Self, WireError> {
        i32::unpack_from_slice(buf).map(Self::from_bits_retain)
    }
}

impl MotoWireWrite for ValidFields {
    fn pack_to_slice_unchecked<'buf>(&self, buf: &'buf mut [u8]) -> &'buf [u8] {
        self.bits().pack_to_slice_unchecked(buf)
    }

    fn packed_len(&self) -> usize {
        Self::PACKED_LEN
    }
}

impl MotoWireSized for ValidFields {
    const PACKED_LEN: usize = 4;

    type Buffer = [u8; 4];

    fn buffer() -> Self::Buffer {
        [0u8; 4]
    }
}

/// A joint vector on the wire: always [`ROS_MAX_JOINT`] floats, right-padded with zeros when the
/// group has fewer joints.
pub type JointVector = [f32; ROS_MAX_JOINT];

/// Single group trajectory point (tag 14).
#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct JointTrajPtFull {
    /// Control group, zero based.
    pub groupno: i32,
    /// Index of this point in the trajectory. `0` is the initial point, which should match the
    /// current robot position. `-1` means unspecified.
    pub sequence: i32,
    /// Which of `time`/`pos`/`vel`/`acc` are filled in.
    pub valid_fields: ValidFields,
    /// Time from trajectory start, seconds.
    pub time: f32,
    /// Desired joint positions, radians, base to tool order.
    pub pos: JointVector,
    /// Desired joint velocities, rad/s.
    pub vel: JointVector,
    /// Desired joint accelerations, rad/s².
    pub acc: JointVector,
}

impl MotoWireRead for JointTrajPtFull {
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
            valid_fields: ValidFields::unpack_from_slice(&buf[8..12])?,
            time: f32::unpack_from_slice(&buf[12..16])?,
            pos: JointVector::unpack_from_slice(&buf[16..56])?,
            vel: JointVector::unpack_from_slice(&buf[56..96])?,
            acc: JointVector::unpack_from_slice(&buf[96..136])?,
        })
    }
}

impl MotoWireWrite for JointTrajPtFull {
    fn pack_to_slice_unchecked<'buf>(&self, buf: &'buf mut [u8]) -> &'buf [u8] {
        self.groupno.pack_to_slice_unchecked(&mut buf[0..4]);
        self.sequence.pack_to_slice_unchecked(&mut buf[4..8]);
        self.valid_fields.pack_to_slice_unchecked(&mut buf[8..12]);
        self.time.pack_to_slice_unchecked(&mut buf[12..16]);
        self.pos.pack_to_slice_unchecked(&mut buf[16..56]);
        self.vel.pack_to_slice_unchecked(&mut buf[56..96]);
        self.acc.pack_to_slice_unchecked(&mut buf[96..136]);

        &buf[0..Self::PACKED_LEN]
    }

    fn packed_len(&self) -> usize {
        Self::PACKED_LEN
    }
}

impl MotoWireSized for JointTrajPtFull {
    const PACKED_LEN: usize = 136;

    type Buffer = [u8; 136];

    fn buffer() -> Self::Buffer {
        [0u8; 136]
    }
}

/// Single group joint feedback topic (tag 15). Also the per-group sub-record of
/// [`JointFeedbackEx`].
#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct JointFeedback {
    /// Control group, zero based.
    pub groupno: i32,
    /// Which of `time`/`pos`/`vel`/`acc` are filled in.
    pub valid_fields: ValidFields,
    /// Controller timestamp, seconds.
    pub time: f32,
    /// Feedback joint positions, radians.
    pub pos: JointVector,
    /// Feedback joint velocities, rad/s.
    pub vel: JointVector,
    /// Feedback joint accelerations, rad/s².
    pub acc: JointVector,
}

impl MotoWireRead for JointFeedback {
    fn unpack_from_slice(buf: &[u8]) -> Result<Self, WireError> {
        if buf.len() < Self::PACKED_LEN {
            return Err(WireError::BufferTooShort {
                expected: Self::PACKED_LEN,
                got: buf.len(),
            });
        }

        Ok(Self {
            groupno: i32::unpack_from_slice(&buf[0..4])?,
            valid_fields: ValidFields::unpack_from_slice(&buf[4..8])?,
            time: f32::unpack_from_slice(&buf[8..12])?,
            pos: JointVector::unpack_from_slice(&buf[12..52])?,
            vel: JointVector::unpack_from_slice(&buf[52..92])?,
            acc: JointVector::unpack_from_slice(&buf[92..132])?,
        })
    }
}

impl MotoWireWrite for JointFeedback {
    fn pack_to_slice_unchecked<'buf>(&self, buf: &'buf mut [u8]) -> &'buf [u8] {
        self.groupno.pack_to_slice_unchecked(&mut buf[0..4]);
        self.valid_fields.pack_to_slice_unchecked(&mut buf[4..8]);
        self.time.pack_to_slice_unchecked(&mut buf[8..12]);
        self.pos.pack_to_slice_unchecked(&mut buf[12..52]);
        self.vel.pack_to_slice_unchecked(&mut buf[52..92]);
        self.acc.pack_to_slice_unchecked(&mut buf[92..132]);

        &buf[0..Self::PACKED_LEN]
    }

    fn packed_len(&self) -> usize {
        Self::PACKED_LEN
    }
}

impl MotoWireSized for JointFeedback {
    const PACKED_LEN: usize = 132;

    type Buffer = [u8; 132];

    fn buffer() -> Self::Buffer {
        [0u8; 132]
    }
}

/// Per-group payload of a [`JointTrajPtFullEx`]. Same layout as [`JointFeedback`] but a
/// command rather than feedback.
#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct JointTrajPtExData {
    /// Control group, zero based.
    pub groupno: i32,
    /// Which of `time`/`pos`/`vel`/`acc` are filled in.
    pub valid_fields: ValidFields,
    /// Time from trajectory start, seconds.
    pub time: f32,
    /// Desired joint positions, radians.
    pub pos: JointVector,
    /// Desired joint velocities, rad/s.
    pub vel: JointVector,
    /// Desired joint accelerations, rad/s².
    pub acc: JointVector,
}

impl MotoWireRead for JointTrajPtExData {
    fn unpack_from_slice(buf: &[u8]) -> Result<Self, WireError> {
        JointFeedback::unpack_from_slice(buf).map(|fb| Self {
            groupno: fb.groupno,
            valid_fields: fb.valid_fields,
            time: fb.time,
            pos: fb.pos,
            vel: fb.vel,
            acc: fb.acc,
        })
    }
}

impl MotoWireWrite for JointTrajPtExData {
    fn pack_to_slice_unchecked<'buf>(&self, buf: &'buf mut [u8]) -> &'buf [u8] {
        self.groupno.pack_to_slice_unchecked(&mut buf[0..4]);
        self.valid_fields.pack_to_slice_unchecked(&mut buf[4..8]);
        self.time.pack_to_slice_unchecked(&mut buf[8..12]);
        self.pos.pack_to_slice_unchecked(&mut buf[12..52]);
        self.vel.pack_to_slice_unchecked(&mut buf[52..92]);
        self.acc.pack_to_slice_unchecked(&mut buf[92..132]);

        &buf[0..Self::PACKED_LEN]
    }

    fn packed_len(&self) -> usize {
        Self::PACKED_LEN
    }
}

impl MotoWireSized for JointTrajPtExData {
    const PACKED_LEN: usize = 132;

    type Buffer = [u8; 132];

    fn buffer() -> Self::Buffer {
        [0u8; 132]
    }
}

/// Reads the leading group count of an "Ex" body and refuses anything outside
/// `1..=MOT_MAX_GR`.
pub(crate) fn unpack_group_count(buf: &[u8]) -> Result<usize, Error> {
    let count = i32::unpack_from_slice(buf)?;

    if !(1..=MOT_MAX_GR as i32).contains(&count) {
        return Err(Error::InvalidGroupCount { count });
    }

    Ok(count as usize)
}

/// Multi group trajectory point (tag 2016): one atomic point for 1..=[`MOT_MAX_GR`] groups.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct JointTrajPtFullEx {
    /// Index of this point in the trajectory, `-1` for unspecified.
    pub sequence: i32,
    /// One sub-record per commanded group.
    pub points: heapless::Vec<JointTrajPtExData, MOT_MAX_GR>,
}

impl JointTrajPtFullEx {
    pub(crate) fn decode(buf: &[u8]) -> Result<Self, Error> {
        let count = unpack_group_count(buf)?;
        let sequence = i32::unpack_from_slice(&buf[4..])?;

        let tail = buf
            .get(8..8 + count * JointTrajPtExData::PACKED_LEN)
            .ok_or(WireError::BufferTooShort {
                expected: 8 + count * JointTrajPtExData::PACKED_LEN,
                got: buf.len(),
            })?;

        Ok(Self {
            sequence,
            points: heapless::Vec::unpack_from_slice(tail)?,
        })
    }
}

impl MotoWireWrite for JointTrajPtFullEx {
    fn pack_to_slice_unchecked<'buf>(&self, buf: &'buf mut [u8]) -> &'buf [u8] {
        let len = self.packed_len();

        (self.points.len() as i32).pack_to_slice_unchecked(&mut buf[0..4]);
        self.sequence.pack_to_slice_unchecked(&mut buf[4..8]);
        self.points.pack_to_slice_unchecked(&mut buf[8..len]);

        &buf[0..len]
    }

    fn packed_len(&self) -> usize {
        8 + self.points.packed_len()
    }
}

/// Multi group joint feedback (tag 2017).
#[derive(Debug, Default, Clone, PartialEq)]
pub struct JointFeedbackEx {
    /// One feedback record per group.
    pub groups: heapless::Vec<JointFeedback, MOT_MAX_GR>,
}

impl JointFeedbackEx {
    pub(crate) fn decode(buf: &[u8]) -> Result<Self, Error> {
        let count = unpack_group_count(buf)?;

        let tail = buf
            .get(4..4 + count * JointFeedback::PACKED_LEN)
            .ok_or(WireError::BufferTooShort {
                expected: 4 + count * JointFeedback::PACKED_LEN,
                got: buf.len(),
            })?;

        Ok(Self {
            groups: heapless::Vec::unpack_from_slice(tail)?,
        })
    }

    /// Feedback for the given group, if present.
    pub fn group(&self, groupno: i32) -> Option<&JointFeedback> {
        self.groups.iter().find(|group| group.groupno == groupno)
    }
}

impl MotoWireWrite for JointFeedbackEx {
    fn pack_to_slice_unchecked<'buf>(&self, buf: &'buf mut [u8]) -> &'buf [u8] {
        let len = self.packed_len();

        (self.groups.len() as i32).pack_to_slice_unchecked(&mut buf[0..4]);
        self.groups.pack_to_slice_unchecked(&mut buf[4..len]);

        &buf[0..len]
    }

    fn packed_len(&self) -> usize {
        4 + self.groups.packed_len()
    }
}
