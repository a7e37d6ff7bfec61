//! Canonical byte encoding used to measure stored structures.
//!
//! Integers are LEB128 varints; byte strings are varint-length-prefixed.
//! Both writers have matching size functions so a footprint can be computed
//! without materializing the encoding.

/// Encode a u64 as a variable-length integer.
///
/// Uses 1-10 bytes depending on the value:
/// - 0-127: 1 byte
/// - 128-16383: 2 bytes
/// - etc.
pub fn encode_varint(mut value: u64, buf: &mut Vec<u8>) {
    while value >= 0x80 {
        buf.push((value as u8) | 0x80);
        value >>= 7;
    }
    buf.push(value as u8);
}

/// Calculate the number of bytes needed to encode a value as varint.
pub fn varint_size(value: u64) -> usize {
    if value == 0 {
        return 1;
    }
    let bits = 64 - value.leading_zeros() as usize;
    (bits + 6) / 7
}

/// Encode a length-prefixed byte slice.
pub fn encode_bytes(data: &[u8], buf: &mut Vec<u8>) {
    encode_varint(data.len() as u64, buf);
    buf.extend_from_slice(data);
}

/// Encoded size of a length-prefixed byte slice of `len` bytes.
#[inline]
pub fn bytes_size(len: usize) -> usize {
    varint_size(len as u64) + len
}
