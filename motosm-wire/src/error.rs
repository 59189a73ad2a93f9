//! Encode/decode error.

/// Wire encode/decode errors.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum WireError {
    /// The given buffer is too short to pack into or unpack from.
    BufferTooShort {
        /// The number of bytes required.
        expected: usize,
        /// The number of bytes available.
        got: usize,
    },
    /// A raw value on the wire cannot be represented by the target type.
    InvalidValue,
}

impl std::error::Error for WireError {}

impl core::fmt::Display for WireError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            WireError::BufferTooShort { expected, got } => {
                write!(f, "buffer too short: need {} bytes, got {}", expected, got)
            }
            WireError::InvalidValue => f.write_str("invalid value for target type"),
        }
    }
}
