//! Inputs to the sponge, before they are flattened into field elements.
//!
//! [`HashInput`] is the current representation: whole field elements plus bit chunks that are
//! packed greedily into as few field elements as fit. [`HashInputLegacy`] is the older
//! representation: field elements plus a flat list of bits.

use crate::field::{Field, SIZE_IN_BITS};

/// Number of bits packed into one field element by the legacy packing.
pub const LEGACY_BITS_PER_FIELD: usize = SIZE_IN_BITS - 1;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HashInput {
    pub fields: Vec<Field>,
    /// `(value, bit_length)` chunks; `value` must fit in `bit_length` bits.
    pub packed: Vec<(Field, u32)>,
}

impl HashInput {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_fields(fields: Vec<Field>) -> Self {
        Self {
            fields,
            packed: Vec::new(),
        }
    }

    pub fn from_packed(value: Field, bits: u32) -> Self {
        Self {
            fields: Vec::new(),
            packed: vec![(value, bits)],
        }
    }

    pub fn append(mut self, other: HashInput) -> Self {
        self.extend(other);
        self
    }

    pub fn extend(&mut self, other: HashInput) {
        self.fields.extend(other.fields);
        self.packed.extend(other.packed);
    }

    /// Append the input of a value.
    pub fn push<T: ToInput + ?Sized>(&mut self, value: &T) {
        self.extend(value.to_input());
    }

    /// Flatten into field elements: `fields` first, then the packed chunks.
    ///
    /// Chunks are concatenated into a running accumulator (earlier chunks in the high bits) until
    /// adding the next chunk would reach 255 bits, at which point the accumulator is emitted and
    /// the chunk starts a new one.
    pub fn pack_to_fields(&self) -> Vec<Field> {
        let mut fields = self.fields.clone();
        if self.packed.is_empty() {
            return fields;
        }
        let mut current = Field::ZERO;
        let mut size = 0u32;
        for &(value, bits) in &self.packed {
            size += bits;
            if (size as usize) < SIZE_IN_BITS {
                current = current * Field::pow2(bits) + value;
            } else {
                fields.push(current);
                size = bits;
                current = value;
            }
        }
        fields.push(current);
        fields
    }
}

/// Values that contribute to a current-regime hash.
pub trait ToInput {
    fn to_input(&self) -> HashInput;

    fn pack_to_fields(&self) -> Vec<Field> {
        self.to_input().pack_to_fields()
    }
}

impl ToInput for Field {
    fn to_input(&self) -> HashInput {
        HashInput::from_fields(vec![*self])
    }
}

impl ToInput for bool {
    fn to_input(&self) -> HashInput {
        HashInput::from_packed(Field::from_bool(*self), 1)
    }
}

impl ToInput for u32 {
    fn to_input(&self) -> HashInput {
        HashInput::from_packed(Field::from(*self), 32)
    }
}

impl ToInput for u64 {
    fn to_input(&self) -> HashInput {
        HashInput::from_packed(Field::from(*self), 64)
    }
}

impl<T: ToInput> ToInput for [T] {
    fn to_input(&self) -> HashInput {
        self.iter().fold(HashInput::empty(), |acc, item| acc.append(item.to_input()))
    }
}

impl<T: ToInput, const N: usize> ToInput for [T; N] {
    fn to_input(&self) -> HashInput {
        self.as_slice().to_input()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HashInputLegacy {
    pub fields: Vec<Field>,
    pub bits: Vec<bool>,
}

impl HashInputLegacy {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_fields(fields: Vec<Field>) -> Self {
        Self {
            fields,
            bits: Vec::new(),
        }
    }

    pub fn from_bits(bits: Vec<bool>) -> Self {
        Self {
            fields: Vec::new(),
            bits,
        }
    }

    pub fn append(mut self, other: HashInputLegacy) -> Self {
        self.extend(other);
        self
    }

    pub fn extend(&mut self, other: HashInputLegacy) {
        self.fields.extend(other.fields);
        self.bits.extend(other.bits);
    }

    pub fn push<T: ToInputLegacy + ?Sized>(&mut self, value: &T) {
        self.extend(value.to_input_legacy());
    }

    /// `fields`, then the bits in little-endian chunks of 254.
    pub fn pack_to_fields_legacy(&self) -> Vec<Field> {
        let mut fields = self.fields.clone();
        fields.extend(
            self.bits
                .chunks(LEGACY_BITS_PER_FIELD)
                .map(Field::from_bits_mod_order),
        );
        fields
    }

    /// Every field element as 255 bits, followed by the raw bits.
    pub fn to_bits(&self) -> Vec<bool> {
        let mut bits: Vec<bool> = self.fields.iter().flat_map(Field::to_bits).collect();
        bits.extend_from_slice(&self.bits);
        bits
    }
}

/// Values that contribute to a legacy-regime hash.
pub trait ToInputLegacy {
    fn to_input_legacy(&self) -> HashInputLegacy;
}

impl ToInputLegacy for bool {
    fn to_input_legacy(&self) -> HashInputLegacy {
        HashInputLegacy::from_bits(vec![*self])
    }
}

impl ToInputLegacy for u32 {
    fn to_input_legacy(&self) -> HashInputLegacy {
        HashInputLegacy::from_bits(protocol_codec::u64_to_bits(u64::from(*self), 32))
    }
}

impl ToInputLegacy for u64 {
    fn to_input_legacy(&self) -> HashInputLegacy {
        HashInputLegacy::from_bits(protocol_codec::u64_to_bits(*self, 64))
    }
}
