use motosm_wire::{MotoWireWrite, MotoWireWriteSized, WireError};
use pretty_assertions::assert_eq;

#[test]
fn pack_primitives_little_endian() {
    let mut buf = [0u8; 8];

    let out = 0x3344_5566_u32.pack_to_slice(&mut buf).unwrap();

    assert_eq!(out, &[0x66, 0x55, 0x44, 0x33]);
}

#[test]
fn pack_signed_sentinel() {
    // `sequence = -1` is the protocol's "unspecified" marker and must encode as all-ones
    assert_eq!((-1i32).pack(), [0xff, 0xff, 0xff, 0xff]);
}

#[test]
fn pack_float() {
    let mut buf = [0u8; 4];

    let out = 1.5f32.pack_to_slice(&mut buf).unwrap();

    assert_eq!(out, &1.5f32.to_le_bytes());
}

#[test]
fn pack_joint_vector() {
    let mut pos = [0.0f32; 10];
    pos[0] = 1.0;
    pos[1] = 2.0;

    let mut buf = [0u8; 40];

    let out = pos.pack_to_slice(&mut buf).unwrap();

    assert_eq!(out.len(), 40);
    assert_eq!(&out[0..4], &1.0f32.to_le_bytes());
    assert_eq!(&out[4..8], &2.0f32.to_le_bytes());
    // Unused joint slots stay zeroed on the wire
    assert_eq!(&out[8..40], &[0u8; 32]);
}

#[test]
fn pack_buffer_too_short() {
    let mut buf = [0u8; 2];

    assert_eq!(
        0u32.pack_to_slice(&mut buf),
        Err(WireError::BufferTooShort {
            expected: 4,
            got: 2
        })
    );
}

#[test]
fn pack_heapless_vec_runtime_length() {
    let mut items = heapless::Vec::<u32, 4>::new();
    items.push(0xaabbccdd).unwrap();
    items.push(0x11223344).unwrap();

    let mut buf = [0u8; 16];

    let out = items.pack_to_slice(&mut buf).unwrap();

    assert_eq!(items.packed_len(), 8);
    assert_eq!(out, &[0xdd, 0xcc, 0xbb, 0xaa, 0x44, 0x33, 0x22, 0x11]);
}
