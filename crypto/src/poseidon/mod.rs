//! Poseidon sponge over the Pallas base field.
//!
//! [`Poseidon`] is the current regime and [`PoseidonLegacy`] the legacy one. They share the
//! permutation and absorption code and differ only in parameters; both stay available because
//! different message types hash with different regimes.

pub mod params;
pub mod prefixes;

pub use params::{PoseidonParams, RATE, WIDTH};

use crate::error::CryptoError;
use crate::field::Field;

pub type State = [Field; WIDTH];

/// Encode an ASCII prefix as a field element: its bytes as a little-endian integer.
pub fn prefix_to_field(prefix: &str) -> Result<Field, CryptoError> {
    let bytes = prefix.as_bytes();
    if bytes.len() >= 32 {
        return Err(CryptoError::PrefixTooLong {
            prefix: prefix.to_string(),
            len: bytes.len(),
        });
    }
    Ok(Field::from_le_bytes_mod_order(bytes))
}

pub fn permute(params: &PoseidonParams, state: &mut State) {
    let mut offset = 0;
    if params.has_initial_round_constant {
        for (slot, constant) in state.iter_mut().zip(params.round_constants[0]) {
            *slot = *slot + constant;
        }
        offset = 1;
    }
    for round in 0..params.full_rounds {
        for slot in state.iter_mut() {
            *slot = slot.pow(params.sbox_power);
        }
        let previous = *state;
        let constants = params.round_constants[round + offset];
        for (i, slot) in state.iter_mut().enumerate() {
            let mixed = params.mds[i]
                .iter()
                .zip(previous.iter())
                .fold(Field::ZERO, |acc, (m, s)| acc + *m * *s);
            *slot = mixed + constants[i];
        }
    }
}

/// Absorb `input` in blocks of [`RATE`], zero-padding the last block. An empty input still
/// runs one permutation.
pub fn absorb(params: &PoseidonParams, mut state: State, input: &[Field]) -> State {
    if input.is_empty() {
        permute(params, &mut state);
        return state;
    }
    for block in input.chunks(RATE) {
        for (i, value) in block.iter().enumerate() {
            state[i] = state[i] + *value;
        }
        permute(params, &mut state);
    }
    state
}

/// A sponge regime. Implementors only choose the parameters.
pub trait Sponge {
    fn params() -> &'static PoseidonParams;

    fn initial_state() -> State {
        [Field::ZERO; WIDTH]
    }

    fn update(state: State, input: &[Field]) -> State {
        absorb(Self::params(), state, input)
    }

    fn hash(input: &[Field]) -> Field {
        Self::update(Self::initial_state(), input)[0]
    }

    /// The state after absorbing only the prefix.
    fn salt(prefix: &str) -> Result<State, CryptoError> {
        Ok(Self::update(Self::initial_state(), &[prefix_to_field(prefix)?]))
    }

    fn hash_with_prefix(prefix: &str, input: &[Field]) -> Result<Field, CryptoError> {
        Ok(Self::update(Self::salt(prefix)?, input)[0])
    }

    fn empty_hash_with_prefix(prefix: &str) -> Result<Field, CryptoError> {
        Ok(Self::salt(prefix)?[0])
    }
}

/// Current regime (55 rounds, `x^7`).
#[derive(Clone, Copy, Debug, Default)]
pub struct Poseidon;

impl Sponge for Poseidon {
    fn params() -> &'static PoseidonParams {
        PoseidonParams::kimchi()
    }
}

/// Legacy regime (63 rounds, `x^5`, initial round constant).
#[derive(Clone, Copy, Debug, Default)]
pub struct PoseidonLegacy;

impl Sponge for PoseidonLegacy {
    fn params() -> &'static PoseidonParams {
        PoseidonParams::legacy()
    }
}
