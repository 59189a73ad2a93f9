//! IO read/write service bodies (tags 2003-2011).
//!
//! These are trivial request/reply pairs; addresses follow the controller's concurrent IO
//! numbering.

use motosm_wire::{MotoWireRead, MotoWireSized, MotoWireWrite, WireError};

macro_rules! io_body {
    ($(#[$doc:meta])* $name:ident { $($(#[$field_doc:meta])* $field:ident),+ }, $len:expr) => {
        $(#[$doc])*
        #[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
        pub struct $name {
            $(
                $(#[$field_doc])*
                pub $field: u32,
            )+
        }

        impl MotoWireRead for $name {
            fn unpack_from_slice(buf: &[u8]) -> Result<Self, WireError> {
                if buf.len() < Self::PACKED_LEN {
                    return Err(WireError::BufferTooShort {
                        expected: Self::PACKED_LEN,
                        got: buf.len(),
                    });
                }

                let mut offset = 0;

                Ok(Self {
                    $(
                        $field: {
                            let value = u32::unpack_from_slice(&buf[offset..offset + 4])?;
                            offset += 4;
                            let _ = offset;
                            value
                        },
                    )+
                })
            }
        }

        impl MotoWireWrite for $name {
            fn pack_to_slice_unchecked<'buf>(&self, buf: &'buf mut [u8]) -> &'buf [u8] {
                let mut offset = 0;

                $(
                    self.$field.pack_to_slice_unchecked(&mut buf[offset..offset + 4]);
                    offset += 4;
                    let _ = offset;
                )+

                &buf[0..Self::PACKED_LEN]
            }

            fn packed_len(&self) -> usize {
                Self::PACKED_LEN
            }
        }

        impl MotoWireSized for $name {
            const PACKED_LEN: usize = $len;

            type Buffer = [u8; $len];

            fn buffer() -> Self::Buffer {
                [0u8; $len]
            }
        }
    };
}

io_body!(
    /// Read a single IO bit (tag 2003).
    ReadIoBit {
        /// Concurrent IO address to read.
        address
    },
    4
);

io_body!(
    /// Reply to [`ReadIoBit`] (tag 2004).
    ReadIoBitReply {
        /// The bit value, `0` or `1`.
        value,
        /// `0` on success, an IO subcode otherwise.
        result_code
    },
    8
);

io_body!(
    /// Write a single IO bit (tag 2005).
    WriteIoBit {
        /// Concurrent IO address to write.
        address,
        /// The bit value, `0` or `1`.
        value
    },
    8
);

io_body!(
    /// Reply to [`WriteIoBit`] (tag 2006).
    WriteIoBitReply {
        /// `0` on success, an IO subcode otherwise.
        result_code
    },
    4
);

io_body!(
    /// Read one byte-wide IO group (tag 2007).
    ReadIoGroup {
        /// Group address to read.
        address
    },
    4
);

io_body!(
    /// Reply to [`ReadIoGroup`] (tag 2008).
    ReadIoGroupReply {
        /// The group value, low eight bits.
        value,
        /// `0` on success, an IO subcode otherwise.
        result_code
    },
    8
);

io_body!(
    /// Write one byte-wide IO group (tag 2009).
    WriteIoGroup {
        /// Group address to write.
        address,
        /// The group value, low eight bits.
        value
    },
    8
);

io_body!(
    /// Reply to [`WriteIoGroup`] (tag 2010).
    WriteIoGroupReply {
        /// `0` on success, an IO subcode otherwise.
        result_code
    },
    4
);

/// IO control reply (tag 2011).
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct IoCtrlReply {
    /// `0` on success.
    pub result: u32,
    /// Detailed IO failure code.
    pub subcode: i32,
}

impl MotoWireRead for IoCtrlReply {
    fn unpack_from_slice(buf: &[u8]) -> Result<Self, WireError> {
        if buf.len() < Self::PACKED_LEN {
            return Err(WireError::BufferTooShort {
                expected: Self::PACKED_LEN,
                got: buf.len(),
            });
        }

        Ok(Self {
            result: u32::unpack_from_slice(&buf[0..4])?,
            subcode: i32::unpack_from_slice(&buf[4..8])?,
        })
    }
}

impl MotoWireWrite for IoCtrlReply {
    fn pack_to_slice_unchecked<'buf>(&self, buf: &'buf mut [u8]) -> &'buf [u8] {
        self.result.pack_to_slice_unchecked(&mut buf[0..4]);
        self.subcode.pack_to_slice_unchecked(&mut buf[4..8]);

        &buf[0..Self::PACKED_LEN]
    }

    fn packed_len(&self) -> usize {
        Self::PACKED_LEN
    }
}

impl MotoWireSized for IoCtrlReply {
    const PACKED_LEN: usize = 8;

    type Buffer = [u8; 8];

    fn buffer() -> Self::Buffer {
        [0u8; 8]
    }
}
