//! Controller status topic (tag 13).

use motosm_wire::{MotoWireRead, MotoWireSized, MotoWireWrite, WireError};

/// A three-valued controller flag.
///
/// The controller reports `-1` when it cannot determine a value. Any other out-of-range integer
/// also decodes to [`Ternary::Unknown`] and re-encodes as `-1`.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub enum Ternary {
    /// State could not be determined.
    #[default]
    Unknown,
    /// Off/false/disabled.
    False,
    /// On/true/enabled.
    True,
}

impl From<i32> for Ternary {
    fn from(value: i32) -> Self {
        match value {
            0 => Self::False,
            1 => Self::True,
            _ => Self::Unknown,
        }
    }
}

impl From<Ternary> for i32 {
    fn from(value: Ternary) -> Self {
        match value {
            Ternary::Unknown => -1,
            Ternary::False => 0,
            Ternary::True => 1,
        }
    }
}

impl Ternary {
    /// `true` only for a definite [`Ternary::True`].
    pub fn is_true(self) -> bool {
        self == Self::True
    }
}

/// The controller/pendant operating mode.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub enum PendantMode {
    /// Mode could not be determined (encodes as `-1`).
    #[default]
    Unknown,
    /// Manual (TEACH) mode.
    Manual,
    /// Auto (PLAY) mode.
    Auto,
}

impl From<i32> for PendantMode {
    fn from(value: i32) -> Self {
        match value {
            1 => Self::Manual,
            2 => Self::Auto,
            _ => Self::Unknown,
        }
    }
}

impl From<PendantMode> for i32 {
    fn from(value: PendantMode) -> Self {
        match value {
            PendantMode::Unknown => -1,
            PendantMode::Manual => 1,
            PendantMode::Auto => 2,
        }
    }
}

super::header::impl_wire_for_i32_enum!(Ternary);
super::header::impl_wire_for_i32_enum!(PendantMode);

/// Controller status (tag 13), published continuously on the state port.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct RobotStatus {
    /// Servo power state.
    pub drives_powered: Ternary,
    /// Controller E-stop state.
    pub e_stopped: Ternary,
    /// Active alarm code, `0` when none.
    pub error_code: i32,
    /// Whether an alarm is active.
    pub in_error: Ternary,
    /// Whether a motion command is currently executing.
    pub in_motion: Ternary,
    /// Pendant mode: TEACH or PLAY.
    pub mode: PendantMode,
    /// Whether the controller is ready to receive motion.
    pub motion_possible: Ternary,
}

impl MotoWireRead for RobotStatus {
    fn unpack_from_slice(buf: &[u8]) -> Result<Self, WireError> {
        if buf.len() < Self::PACKED_LEN {
            return Err(WireError::BufferTooShort {
                expected: Self::PACKED_LEN,
                got: buf.len(),
            });
        }

        Ok(Self {
            drives_powered: Ternary::unpack_from_slice(&buf[0..4])?,
            e_stopped: Ternary::unpack_from_slice(&buf[4..8])?,
            error_code: i32::unpack_from_slice(&buf[8..12])?,
            in_error: Ternary::unpack_from_slice(&buf[12..16])?,
            in_motion: Ternary::unpack_from_slice(&buf[16..20])?,
            mode: PendantMode::unpack_from_slice(&buf[20..24])?,
            motion_possible: Ternary::unpack_from_slice(&buf[24..28])?,
        })
    }
}

impl MotoWireWrite for RobotStatus {
    fn pack_to_slice_unchecked<'buf>(&self, buf: &'buf mut [u8]) -> &'buf [u8] {
        self.drives_powered.pack_to_slice_unchecked(&mut buf[0..4]);
        self.e_stopped.pack_to_slice_unchecked(&mut buf[4..8]);
        self.error_code.pack_to_slice_unchecked(&mut buf[8..12]);
        self.in_error.pack_to_slice_unchecked(&mut buf[12..16]);
        self.in_motion.pack_to_slice_unchecked(&mut buf[16..20]);
        self.mode.pack_to_slice_unchecked(&mut buf[20..24]);
        self.motion_possible.pack_to_slice_unchecked(&mut buf[24..28]);

        &buf[0..Self::PACKED_LEN]
    }

    fn packed_len(&self) -> usize {
        Self::PACKED_LEN
    }
}

impl MotoWireSized for RobotStatus {
    const PACKED_LEN: usize = 28;

    type Buffer = [u8; 28];

    fn buffer() -> Self::Buffer {
        [0u8; 28]
    }
}
