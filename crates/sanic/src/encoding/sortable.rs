use crate::{EncodingError, Result, layout::BITS_PER_CHAR};

/// 64 URL-safe symbols in ascending ASCII order, so that encoded strings of
/// equal length sort exactly like the integers they encode.
const ALPHABET: &[u8; 64] = b"-0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ_abcdefghijklmnopqrstuvwxyz";
const NO_VALUE: u8 = 255;
const CHAR_MASK: u64 = 0x3F;

/// Longest encoding of a valid layout: 60 bits, 10 characters.
pub const MAX_ENCODED_LEN: usize = 10;

/// Lookup table for decoding
const LOOKUP: [u8; 256] = {
    let mut lut = [NO_VALUE; 256];
    let mut i = 0;
    while i < ALPHABET.len() {
        lut[ALPHABET[i] as usize] = i as u8;
        i += 1;
    }
    lut
};

/// Encodes `id` as a fixed-width string of `total_bits / 6` characters.
///
/// The first character carries the most significant bits and short values are
/// padded with `-`, the zero symbol. Bits above `total_bits` are dropped.
///
/// # Errors
///
/// Returns [`EncodingError::InvalidBitWidth`] if `total_bits` is zero, not a
/// multiple of 6, or above 60.
///
/// # Example
///
/// ```
/// use sanic::encode;
///
/// assert_eq!(encode(0, 42).unwrap(), "-------");
/// assert_eq!(encode(63, 12).unwrap(), "-z");
/// assert!(encode(1, 59).is_err());
/// ```
pub fn encode(id: i64, total_bits: u32) -> Result<String, EncodingError> {
    if total_bits == 0
        || total_bits % BITS_PER_CHAR != 0
        || total_bits / BITS_PER_CHAR > MAX_ENCODED_LEN as u32
    {
        return Err(EncodingError::InvalidBitWidth { total_bits });
    }
    Ok(encode_chars(id, (total_bits / BITS_PER_CHAR) as usize))
}

/// Encodes the low `6 * buf.len()` bits of `id` into `buf` without
/// allocating.
pub fn encode_to_buf(id: i64, buf: &mut [u8]) {
    // Reinterpret the bits so shifts are logical.
    let raw = id as u64;
    for (i, out) in buf.iter_mut().rev().enumerate() {
        let shift = u32::try_from(i)
            .ok()
            .and_then(|i| i.checked_mul(BITS_PER_CHAR))
            .unwrap_or(u32::MAX);
        let value = raw.checked_shr(shift).unwrap_or(0) & CHAR_MASK;
        *out = ALPHABET[value as usize];
    }
}

/// Decodes a string produced by [`encode`] back into the ID.
///
/// The length of the string is not checked against any particular layout.
///
/// # Errors
///
/// - [`EncodingError::InvalidLength`] if the string is empty or longer than
///   [`MAX_ENCODED_LEN`].
/// - [`EncodingError::InvalidCharacter`] if a byte is outside the alphabet.
pub fn decode(s: &str) -> Result<i64, EncodingError> {
    let bytes = s.as_bytes();
    if bytes.is_empty() || bytes.len() > MAX_ENCODED_LEN {
        return Err(EncodingError::InvalidLength { len: bytes.len() });
    }

    let mut acc = 0_i64;
    for (index, &byte) in bytes.iter().enumerate() {
        let value = LOOKUP[byte as usize];
        if value == NO_VALUE {
            return Err(EncodingError::InvalidCharacter { byte, index });
        }
        acc = (acc << BITS_PER_CHAR) | i64::from(value);
    }
    Ok(acc)
}

pub(crate) fn encode_chars(id: i64, len: usize) -> String {
    let mut buf = [0_u8; MAX_ENCODED_LEN];
    let buf = &mut buf[..len.min(MAX_ENCODED_LEN)];
    encode_to_buf(id, buf);
    buf.iter().copied().map(char::from).collect()
}
