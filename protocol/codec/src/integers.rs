//! Integer encodings.
//!
//! Variable-length integers follow the bin_prot layout: small non-negative values are a single
//! byte, everything else is a marker byte followed by a little-endian two's complement body.
//! Field-sized values use [`FixedUint`], a fixed number of little-endian bytes with a range
//! check on decode.

use num_bigint::BigUint;

use crate::binable::take;
use crate::error::CodecError;

const CODE_NEG_INT8: u8 = 0xff;
const CODE_INT16: u8 = 0xfe;
const CODE_INT32: u8 = 0xfd;
const CODE_INT64: u8 = 0xfc;

fn int_range(bits: u32) -> (i128, i128) {
    let max = 1i128 << (bits - 1);
    (-max, max)
}

/// Write `n` as a bin_prot integer of width `bits` (32 or 64).
pub fn write_bin_int(out: &mut Vec<u8>, n: i64, bits: u32) -> Result<(), CodecError> {
    let (min, max) = int_range(bits);
    let wide = i128::from(n);
    if wide < min || wide >= max {
        return Err(CodecError::IntOutOfRange {
            bits,
            value: n.to_string(),
        });
    }
    if n >= 0 {
        if n < 0x80 {
            out.push(n as u8);
        } else if n < 0x8000 {
            out.push(CODE_INT16);
            out.extend_from_slice(&(n as u16).to_le_bytes());
        } else if n < 0x8000_0000 {
            out.push(CODE_INT32);
            out.extend_from_slice(&(n as u32).to_le_bytes());
        } else {
            out.push(CODE_INT64);
            out.extend_from_slice(&(n as u64).to_le_bytes());
        }
    } else if n >= -0x80 {
        out.push(CODE_NEG_INT8);
        out.push(n as u8);
    } else if n >= -0x8000 {
        out.push(CODE_INT16);
        out.extend_from_slice(&(n as u16).to_le_bytes());
    } else if n >= -0x8000_0000 {
        out.push(CODE_INT32);
        out.extend_from_slice(&(n as u32).to_le_bytes());
    } else {
        out.push(CODE_INT64);
        out.extend_from_slice(&(n as u64).to_le_bytes());
    }
    Ok(())
}

/// Read a bin_prot integer of width `bits` (32 or 64).
pub fn read_bin_int(bytes: &[u8], offset: usize, bits: u32) -> Result<(i64, usize), CodecError> {
    let code = take(bytes, offset, 1)?[0];
    let offset = offset + 1;
    if code < 0x80 {
        return Ok((i64::from(code), offset));
    }
    let size = match code {
        CODE_NEG_INT8 => 1,
        CODE_INT16 => 2,
        CODE_INT32 => 4,
        CODE_INT64 => 8,
        other => return Err(CodecError::InvalidStartByte(other)),
    };
    let width = (bits / 8) as usize;
    let body = take(bytes, offset, size)?;
    if size > width {
        return Err(CodecError::IntOutOfRange {
            bits,
            value: format!("{size}-byte body"),
        });
    }

    // sign-extend the body to the full width using its top bit
    let fill = if body[size - 1] >> 7 == 1 { 0xff } else { 0x00 };
    let mut raw = 0u128;
    for i in (0..width).rev() {
        let byte = body.get(i).copied().unwrap_or(fill);
        raw = (raw << 8) | u128::from(byte);
    }
    let (min, max) = int_range(bits);
    let mut value = raw as i128;
    if value >= max {
        value -= 2 * max;
    }
    if value < min || value >= max {
        return Err(CodecError::IntOutOfRange {
            bits,
            value: value.to_string(),
        });
    }
    Ok((value as i64, offset + size))
}

/// Unsigned integer stored in `ceil(bits / 8)` little-endian bytes.
///
/// Values must lie in `[0, 2^bits)` and, when a modulus is set, below the modulus.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FixedUint {
    bits: u32,
    modulus: Option<BigUint>,
}

impl FixedUint {
    pub fn new(bits: u32) -> Self {
        Self {
            bits,
            modulus: None,
        }
    }

    pub fn with_modulus(bits: u32, modulus: BigUint) -> Self {
        Self {
            bits,
            modulus: Some(modulus),
        }
    }

    pub fn byte_len(&self) -> usize {
        self.bits.div_ceil(8) as usize
    }

    pub fn bits(&self) -> u32 {
        self.bits
    }

    fn check(&self, value: &BigUint) -> Result<(), CodecError> {
        let in_bits = value.bits() <= u64::from(self.bits);
        let in_modulus = self.modulus.as_ref().map_or(true, |m| value < m);
        if in_bits && in_modulus {
            Ok(())
        } else {
            Err(CodecError::UintOutOfRange {
                bits: self.bits,
                value: value.to_string(),
            })
        }
    }

    pub fn write(&self, value: &BigUint, out: &mut Vec<u8>) -> Result<(), CodecError> {
        self.check(value)?;
        let mut bytes = value.to_bytes_le();
        bytes.resize(self.byte_len(), 0);
        out.extend_from_slice(&bytes);
        Ok(())
    }

    pub fn read(&self, bytes: &[u8], offset: usize) -> Result<(BigUint, usize), CodecError> {
        let len = self.byte_len();
        let value = BigUint::from_bytes_le(take(bytes, offset, len)?);
        self.check(&value)?;
        Ok((value, offset + len))
    }
}
