use crate::error::CodecError;
use crate::integers::{read_bin_int, write_bin_int};

/// A value with a canonical binary encoding.
///
/// `read_bytes` is the raw reader. Callers that compose readers go through [`read_at`], which
/// enforces the offset contract; top-level decoding goes through [`Binable::from_bytes`].
pub trait Binable: Sized {
    fn write_bytes(&self, out: &mut Vec<u8>) -> Result<(), CodecError>;

    fn read_bytes(bytes: &[u8], offset: usize) -> Result<(Self, usize), CodecError>;

    fn to_bytes(&self) -> Result<Vec<u8>, CodecError> {
        let mut out = Vec::new();
        self.write_bytes(&mut out)?;
        Ok(out)
    }

    /// Decode a complete buffer. Every byte must be consumed.
    fn from_bytes(bytes: &[u8]) -> Result<Self, CodecError> {
        let (value, end) = read_at::<Self>(bytes, 0)?;
        if end < bytes.len() {
            return Err(CodecError::LeftoverBytes {
                consumed: end,
                total: bytes.len(),
            });
        }
        Ok(value)
    }
}

/// Read a value at `offset`, checking that the read starts inside the buffer and ends
/// between the start offset and the end of the buffer.
pub fn read_at<T: Binable>(bytes: &[u8], offset: usize) -> Result<(T, usize), CodecError> {
    if offset >= bytes.len() {
        return Err(CodecError::OffsetOutOfBounds {
            offset,
            len: bytes.len(),
        });
    }
    let (value, end) = T::read_bytes(bytes, offset)?;
    if end < offset || end > bytes.len() {
        return Err(CodecError::InvalidReadOffset {
            start: offset,
            end,
            len: bytes.len(),
        });
    }
    Ok((value, end))
}

/// Borrow `len` bytes starting at `offset`.
pub fn take(bytes: &[u8], offset: usize, len: usize) -> Result<&[u8], CodecError> {
    let available = bytes.len().saturating_sub(offset);
    if available < len {
        return Err(CodecError::InsufficientBytes {
            needed: len,
            available,
        });
    }
    Ok(&bytes[offset..offset + len])
}

/// Write the discriminant of a tagged union.
pub fn write_tag(out: &mut Vec<u8>, tag: u8) {
    out.push(tag);
}

/// Read the discriminant of a tagged union with `variants` cases.
pub fn read_tag(bytes: &[u8], offset: usize, variants: u8) -> Result<(u8, usize), CodecError> {
    let tag = take(bytes, offset, 1)?[0];
    if tag >= variants {
        return Err(CodecError::UnknownTag { tag, variants });
    }
    Ok((tag, offset + 1))
}

impl Binable for bool {
    fn write_bytes(&self, out: &mut Vec<u8>) -> Result<(), CodecError> {
        out.push(u8::from(*self));
        Ok(())
    }

    fn read_bytes(bytes: &[u8], offset: usize) -> Result<(Self, usize), CodecError> {
        match take(bytes, offset, 1)?[0] {
            0 => Ok((false, offset + 1)),
            1 => Ok((true, offset + 1)),
            other => Err(CodecError::InvalidBool(other)),
        }
    }
}

impl Binable for i32 {
    fn write_bytes(&self, out: &mut Vec<u8>) -> Result<(), CodecError> {
        write_bin_int(out, i64::from(*self), 32)
    }

    fn read_bytes(bytes: &[u8], offset: usize) -> Result<(Self, usize), CodecError> {
        let (value, end) = read_bin_int(bytes, offset, 32)?;
        let value = i32::try_from(value).map_err(|_| CodecError::IntOutOfRange {
            bits: 32,
            value: value.to_string(),
        })?;
        Ok((value, end))
    }
}

impl Binable for i64 {
    fn write_bytes(&self, out: &mut Vec<u8>) -> Result<(), CodecError> {
        write_bin_int(out, *self, 64)
    }

    fn read_bytes(bytes: &[u8], offset: usize) -> Result<(Self, usize), CodecError> {
        read_bin_int(bytes, offset, 64)
    }
}

// Unsigned values travel through the signed codec: the upper half of the range is written as
// the corresponding negative number.
impl Binable for u32 {
    fn write_bytes(&self, out: &mut Vec<u8>) -> Result<(), CodecError> {
        write_bin_int(out, i64::from(*self as i32), 32)
    }

    fn read_bytes(bytes: &[u8], offset: usize) -> Result<(Self, usize), CodecError> {
        let (value, end) = <i32 as Binable>::read_bytes(bytes, offset)?;
        Ok((value as u32, end))
    }
}

impl Binable for u64 {
    fn write_bytes(&self, out: &mut Vec<u8>) -> Result<(), CodecError> {
        write_bin_int(out, *self as i64, 64)
    }

    fn read_bytes(bytes: &[u8], offset: usize) -> Result<(Self, usize), CodecError> {
        let (value, end) = read_bin_int(bytes, offset, 64)?;
        Ok((value as u64, end))
    }
}

impl Binable for String {
    fn write_bytes(&self, out: &mut Vec<u8>) -> Result<(), CodecError> {
        LengthPrefixed::write(self.as_bytes(), out)
    }

    fn read_bytes(bytes: &[u8], offset: usize) -> Result<(Self, usize), CodecError> {
        let (raw, end) = LengthPrefixed::read_bytes(bytes, offset)?;
        let value = String::from_utf8(raw.0).map_err(|_| CodecError::InvalidUtf8)?;
        Ok((value, end))
    }
}

/// Raw bytes behind a one-byte length prefix.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LengthPrefixed(pub Vec<u8>);

impl LengthPrefixed {
    fn write(data: &[u8], out: &mut Vec<u8>) -> Result<(), CodecError> {
        let len = u8::try_from(data.len()).map_err(|_| CodecError::StringTooLong(data.len()))?;
        out.push(len);
        out.extend_from_slice(data);
        Ok(())
    }
}

impl Binable for LengthPrefixed {
    fn write_bytes(&self, out: &mut Vec<u8>) -> Result<(), CodecError> {
        Self::write(&self.0, out)
    }

    fn read_bytes(bytes: &[u8], offset: usize) -> Result<(Self, usize), CodecError> {
        let len = usize::from(take(bytes, offset, 1)?[0]);
        let data = take(bytes, offset + 1, len)?;
        Ok((Self(data.to_vec()), offset + 1 + len))
    }
}

/// Prefixes the inner encoding with the version byte `V`.
///
/// Decoding fails on any other version byte, even when the remaining payload would parse.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Versioned<T, const V: u8>(pub T);

impl<T, const V: u8> Versioned<T, V> {
    pub const VERSION: u8 = V;

    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T: Binable, const V: u8> Binable for Versioned<T, V> {
    fn write_bytes(&self, out: &mut Vec<u8>) -> Result<(), CodecError> {
        out.push(V);
        self.0.write_bytes(out)
    }

    fn read_bytes(bytes: &[u8], offset: usize) -> Result<(Self, usize), CodecError> {
        let actual = take(bytes, offset, 1)?[0];
        if actual != V {
            return Err(CodecError::VersionMismatch {
                expected: V,
                actual,
            });
        }
        let (inner, end) = read_at(bytes, offset + 1)?;
        Ok((Self(inner), end))
    }
}

/// Post-decode validation hook used by [`Checked`].
pub trait Validate {
    fn validate(&self) -> Result<(), CodecError>;
}

/// Runs [`Validate::validate`] after the inner value is decoded.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Checked<T>(pub T);

impl<T: Binable + Validate> Binable for Checked<T> {
    fn write_bytes(&self, out: &mut Vec<u8>) -> Result<(), CodecError> {
        self.0.write_bytes(out)
    }

    fn read_bytes(bytes: &[u8], offset: usize) -> Result<(Self, usize), CodecError> {
        let (inner, end) = T::read_bytes(bytes, offset)?;
        inner.validate()?;
        Ok((Self(inner), end))
    }
}
