use motosm_wire::{MotoWireRead, WireError};
use pretty_assertions::assert_eq;

#[test]
fn unpack_primitives_little_endian() {
    let buf = [0x66u8, 0x55, 0x44, 0x33];

    assert_eq!(u32::unpack_from_slice(&buf), Ok(0x3344_5566));
}

#[test]
fn unpack_ignores_trailing_bytes() {
    let buf = [0x01u8, 0x00, 0x00, 0x00, 0xde, 0xad];

    assert_eq!(i32::unpack_from_slice(&buf), Ok(1));
}

#[test]
fn unpack_signed_sentinel() {
    assert_eq!(i32::unpack_from_slice(&[0xff; 4]), Ok(-1));
}

#[test]
fn unpack_joint_vector() {
    let mut buf = [0u8; 40];
    buf[0..4].copy_from_slice(&3.0123f32.to_le_bytes());

    let pos = <[f32; 10]>::unpack_from_slice(&buf).unwrap();

    assert_eq!(pos[0], 3.0123);
    assert_eq!(&pos[1..], &[0.0; 9]);
}

#[test]
fn unpack_buffer_too_short() {
    assert_eq!(
        <[f32; 10]>::unpack_from_slice(&[0u8; 39]),
        Err(WireError::BufferTooShort {
            expected: 40,
            got: 39
        })
    );
}

#[test]
fn unpack_heapless_vec_consumes_whole_chunks() {
    let buf = [0x01u8, 0x00, 0x02, 0x00, 0x03, 0x00];

    let items = heapless::Vec::<u16, 4>::unpack_from_slice(&buf).unwrap();

    assert_eq!(items.as_slice(), &[1, 2, 3]);
}
