//! Traits used to pack/unpack structs and enums from Simple Message packets on the wire.
//!
//! Simple Message bodies are byte-aligned little-endian records with no padding, so everything
//! here works in whole bytes. Implementations for the protocol's message types live in the
//! `motosm` crate; this crate only provides the traits and implementations for primitives and
//! fixed-length arrays.

#![deny(missing_docs)]
#![deny(trivial_casts)]
#![deny(trivial_numeric_casts)]
#![deny(unused_import_braces)]
#![deny(unused_qualifications)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

mod error;
mod impls;

pub use error::WireError;

/// A type that can be read from a little-endian wire representation.
pub trait MotoWireRead: Sized {
    /// Unpack this type from the beginning of the given buffer.
    fn unpack_from_slice(buf: &[u8]) -> Result<Self, WireError>;
}

/// A type that can be written to its little-endian wire representation.
pub trait MotoWireWrite {
    /// Pack the type and write it into the beginning of `buf`.
    ///
    /// # Panics
    ///
    /// This method must panic if `buf` is too short to hold the packed data.
    fn pack_to_slice_unchecked<'buf>(&self, buf: &'buf mut [u8]) -> &'buf [u8];

    /// Pack the type and write it into the beginning of `buf`.
    fn pack_to_slice<'buf>(&self, buf: &'buf mut [u8]) -> Result<&'buf [u8], WireError> {
        if buf.len() < self.packed_len() {
            return Err(WireError::BufferTooShort {
                expected: self.packed_len(),
                got: buf.len(),
            });
        }

        Ok(self.pack_to_slice_unchecked(buf))
    }

    /// Get the length in bytes of this item when packed.
    ///
    /// Takes `&self` because some message bodies carry a runtime-length tail of per-group
    /// sub-records.
    fn packed_len(&self) -> usize;
}

/// Implemented for types with a known packed size at compile time.
pub trait MotoWireSized {
    /// Packed size in bytes.
    const PACKED_LEN: usize;

    /// Used to define an array of the correct length. This type should ALWAYS be of the form
    /// `[u8; N]` where `N` is a fixed value or const generic as per the type this trait is
    /// implemented on.
    type Buffer: AsRef<[u8]> + AsMut<[u8]>;

    /// Create a zeroed buffer sized to contain the packed representation of this item.
    fn buffer() -> Self::Buffer;
}

/// A readable type with compile-time-known size.
pub trait MotoWireReadSized: MotoWireRead + MotoWireSized {}

impl<T> MotoWireReadSized for T where T: MotoWireRead + MotoWireSized {}

/// A writeable type with compile-time-known size.
pub trait MotoWireWriteSized: MotoWireWrite + MotoWireSized {
    /// Pack this item to a fixed size array.
    fn pack(&self) -> Self::Buffer;
}
