//! Builtin implementations for primitives and arrays.

use crate::{MotoWireRead, MotoWireReadSized, MotoWireSized, MotoWireWrite, MotoWireWriteSized, WireError};

macro_rules! impl_primitive_wire_field {
    ($ty:ty, $size:expr) => {
        impl MotoWireWrite for $ty {
            fn pack_to_slice_unchecked<'buf>(&self, buf: &'buf mut [u8]) -> &'buf [u8] {
                let chunk = &mut buf[0..$size];

                chunk.copy_from_slice(&self.to_le_bytes());

                chunk
            }

            fn packed_len(&self) -> usize {
                $size
            }
        }

        impl MotoWireRead for $ty {
            fn unpack_from_slice(buf: &[u8]) -> Result<Self, WireError> {
                buf.get(0..$size)
                    .ok_or(WireError::BufferTooShort {
                        expected: $size,
                        got: buf.len(),
                    })
                    .and_then(|raw| raw.try_into().map_err(|_| WireError::InvalidValue))
                    .map(Self::from_le_bytes)
            }
        }

        impl MotoWireSized for $ty {
            const PACKED_LEN: usize = $size;

            type Buffer = [u8; $size];

            fn buffer() -> Self::Buffer {
                [0u8; $size]
            }
        }

        impl MotoWireWriteSized for $ty {
            fn pack(&self) -> Self::Buffer {
                self.to_le_bytes()
            }
        }
    };
}

impl_primitive_wire_field!(u8, 1);
impl_primitive_wire_field!(u16, 2);
impl_primitive_wire_field!(u32, 4);
impl_primitive_wire_field!(u64, 8);
impl_primitive_wire_field!(i8, 1);
impl_primitive_wire_field!(i16, 2);
impl_primitive_wire_field!(i32, 4);
impl_primitive_wire_field!(i64, 8);
impl_primitive_wire_field!(f32, 4);
impl_primitive_wire_field!(f64, 8);

impl MotoWireWrite for &[u8] {
    fn pack_to_slice_unchecked<'buf>(&self, buf: &'buf mut [u8]) -> &'buf [u8] {
        let buf = &mut buf[0..self.len()];

        buf.copy_from_slice(self);

        buf
    }

    fn packed_len(&self) -> usize {
        self.len()
    }
}

// Blanket impl for references
impl<T> MotoWireWrite for &T
where
    T: MotoWireWrite,
{
    fn pack_to_slice_unchecked<'buf>(&self, buf: &'buf mut [u8]) -> &'buf [u8] {
        MotoWireWrite::pack_to_slice_unchecked(*self, buf)
    }

    fn packed_len(&self) -> usize {
        MotoWireWrite::packed_len(*self)
    }
}

// Blanket impl for arrays of known-sized types, e.g. the ubiquitous ten-joint `[f32; 10]`
impl<const N: usize, T> MotoWireRead for [T; N]
where
    T: MotoWireReadSized,
{
    fn unpack_from_slice(buf: &[u8]) -> Result<Self, WireError> {
        if buf.len() < T::PACKED_LEN * N {
            return Err(WireError::BufferTooShort {
                expected: T::PACKED_LEN * N,
                got: buf.len(),
            });
        }

        heapless::Vec::<T, N>::unpack_from_slice(&buf[0..T::PACKED_LEN * N])
            .and_then(|res| res.into_array().map_err(|_e| WireError::InvalidValue))
    }
}

impl<const N: usize, T> MotoWireWrite for [T; N]
where
    T: MotoWireWrite + MotoWireSized,
{
    fn pack_to_slice_unchecked<'buf>(&self, buf: &'buf mut [u8]) -> &'buf [u8] {
        for (item, chunk) in self.iter().zip(buf.chunks_exact_mut(T::PACKED_LEN)) {
            item.pack_to_slice_unchecked(chunk);
        }

        &buf[0..T::PACKED_LEN * N]
    }

    fn packed_len(&self) -> usize {
        T::PACKED_LEN * N
    }
}

// Heapless crate support
impl<const N: usize, T> MotoWireRead for heapless::Vec<T, N>
where
    T: MotoWireReadSized,
{
    fn unpack_from_slice(buf: &[u8]) -> Result<Self, WireError> {
        buf.chunks_exact(T::PACKED_LEN)
            .map(T::unpack_from_slice)
            .collect::<Result<heapless::Vec<_, N>, WireError>>()
    }
}

impl<const N: usize, T> MotoWireWrite for heapless::Vec<T, N>
where
    T: MotoWireWrite + MotoWireSized,
{
    fn pack_to_slice_unchecked<'buf>(&self, buf: &'buf mut [u8]) -> &'buf [u8] {
        for (item, chunk) in self.iter().zip(buf.chunks_exact_mut(T::PACKED_LEN)) {
            item.pack_to_slice_unchecked(chunk);
        }

        &buf[0..T::PACKED_LEN * self.len()]
    }

    fn packed_len(&self) -> usize {
        T::PACKED_LEN * self.len()
    }
}
