/// Errors from the fixed-width display encoding.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, thiserror::Error)]
#[non_exhaustive]
pub enum EncodingError {
    /// The bit width is zero, not a multiple of 6, or wider than 60 bits.
    #[error("cannot encode {total_bits} bits as whole characters")]
    InvalidBitWidth { total_bits: u32 },

    /// The encoded string is empty or longer than any valid layout.
    #[error("invalid length: {len}")]
    InvalidLength { len: usize },

    /// The encoded string contains a byte outside the alphabet.
    #[error("invalid byte {byte:#04x} at index {index}")]
    InvalidCharacter { byte: u8, index: usize },
}
