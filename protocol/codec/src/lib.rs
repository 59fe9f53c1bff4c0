//! Binary wire codec shared by every signed structure.
//!
//! Values implement [`Binable`]: a write into a byte buffer and a read at an offset that
//! returns the next offset. Composite layouts are built from records (fields concatenated in
//! declaration order), tagged unions (one tag byte plus payload), the [`Versioned`] wrapper and
//! the [`Checked`] wrapper. Top-level decoding with [`Binable::from_bytes`] rejects leftover
//! input.

pub mod base58;
pub mod binable;
pub mod bits;
pub mod error;
pub mod integers;

pub use base58::{version_bytes, Base58Check};
pub use binable::{read_at, read_tag, take, write_tag, Binable, Checked, LengthPrefixed, Validate, Versioned};
pub use bits::{bits_to_bytes, bytes_to_bits, u64_to_bits};
pub use error::CodecError;
pub use integers::FixedUint;

/// Implements [`Binable`] for a struct by concatenating its fields in the listed order.
///
/// The field order is part of the wire format: `binable_record!(Account { public_key, balance })`
/// encodes the public key bytes followed by the balance bytes.
#[macro_export]
macro_rules! binable_record {
    ($ty:ident { $($field:ident),+ $(,)? }) => {
        impl $crate::Binable for $ty {
            fn write_bytes(&self, out: &mut Vec<u8>) -> Result<(), $crate::CodecError> {
                $( $crate::Binable::write_bytes(&self.$field, out)?; )+
                Ok(())
            }

            fn read_bytes(bytes: &[u8], offset: usize) -> Result<(Self, usize), $crate::CodecError> {
                $( let ($field, offset) = $crate::read_at(bytes, offset)?; )+
                Ok((Self { $($field),+ }, offset))
            }
        }
    };
}
