//! Bit/byte conversions. Bits are little-endian within each byte.

/// Pack bits into bytes, least significant bit first. A trailing partial byte is zero-padded.
pub fn bits_to_bytes(bits: &[bool]) -> Vec<u8> {
    bits.chunks(8)
        .map(|chunk| {
            chunk
                .iter()
                .enumerate()
                .fold(0u8, |byte, (i, bit)| byte | (u8::from(*bit) << i))
        })
        .collect()
}

pub fn bytes_to_bits(bytes: &[u8]) -> Vec<bool> {
    bytes
        .iter()
        .flat_map(|byte| (0..8).map(move |i| (byte >> i) & 1 == 1))
        .collect()
}

/// The `len` low bits of `value`, least significant first.
pub fn u64_to_bits(value: u64, len: usize) -> Vec<bool> {
    (0..len)
        .map(|i| i < 64 && (value >> i) & 1 == 1)
        .collect()
}
