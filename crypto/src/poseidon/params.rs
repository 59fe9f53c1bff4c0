//! Permutation parameters for the two sponge regimes.
//!
//! Both regimes use a width-3 state with rate 2. Round constants and the MDS matrix are the
//! network's published Pallas tables (`fp_kimchi` and `fp_legacy` in `mina-poseidon`), moved
//! into this crate's field type on first use.

use core::fmt::Display;

use mina_poseidon::pasta::{fp_kimchi, fp_legacy};
use num_bigint::BigUint;
use once_cell::sync::Lazy;

use crate::field::Field;

pub const WIDTH: usize = 3;
pub const RATE: usize = 2;

static KIMCHI: Lazy<PoseidonParams> = Lazy::new(|| {
    let published = fp_kimchi::params();
    PoseidonParams::from_published(55, 7, false, &published.round_constants, &published.mds)
});

static LEGACY: Lazy<PoseidonParams> = Lazy::new(|| {
    let published = fp_legacy::params();
    PoseidonParams::from_published(63, 5, true, &published.round_constants, &published.mds)
});

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PoseidonParams {
    pub full_rounds: usize,
    pub sbox_power: u64,
    /// Add round-constant row 0 before the first round.
    pub has_initial_round_constant: bool,
    pub round_constants: Vec<[Field; WIDTH]>,
    pub mds: [[Field; WIDTH]; WIDTH],
}

impl PoseidonParams {
    /// Current regime: 55 full rounds, `x^7`.
    pub fn kimchi() -> &'static Self {
        &KIMCHI
    }

    /// Legacy regime: 63 full rounds, `x^5`, with an initial round constant.
    pub fn legacy() -> &'static Self {
        &LEGACY
    }

    fn from_published<'a, F, Rows, Row>(
        full_rounds: usize,
        sbox_power: u64,
        has_initial_round_constant: bool,
        round_constants: Rows,
        mds: Rows,
    ) -> Self
    where
        F: Display + 'a,
        Rows: IntoIterator<Item = Row>,
        Row: IntoIterator<Item = &'a F>,
    {
        let rows = full_rounds + usize::from(has_initial_round_constant);
        let round_constants: Vec<[Field; WIDTH]> =
            round_constants.into_iter().take(rows).map(import_row).collect();
        assert_eq!(round_constants.len(), rows, "published table is missing round-constant rows");
        let mds: Vec<[Field; WIDTH]> = mds.into_iter().map(import_row).collect();
        Self {
            full_rounds,
            sbox_power,
            has_initial_round_constant,
            round_constants,
            mds: core::array::from_fn(|i| mds[i]),
        }
    }
}

fn import_row<'a, F, Row>(row: Row) -> [Field; WIDTH]
where
    F: Display + 'a,
    Row: IntoIterator<Item = &'a F>,
{
    let values: Vec<Field> = row.into_iter().map(import).collect();
    core::array::from_fn(|i| values[i])
}

/// Reads a published constant through its printed integer. Recent arkworks releases print
/// decimal (zero as the empty string); older ones print `Fp256 "(<64 hex digits>)"`.
fn import<F: Display>(value: &F) -> Field {
    let text = value.to_string();
    let digits = match text.split_once('(') {
        Some((_, inner)) => inner.trim_end_matches(|c| c == ')' || c == '"'),
        None => text.as_str(),
    };
    let digits = digits.trim_start_matches("0x");
    let radix = if digits.len() == 64 || digits.bytes().any(|b| b.is_ascii_alphabetic()) {
        16
    } else {
        10
    };
    let integer = if digits.is_empty() {
        BigUint::default()
    } else {
        BigUint::parse_bytes(digits.as_bytes(), radix)
            .unwrap_or_else(|| panic!("published constant {text:?} is not an integer"))
    };
    Field::from_le_bytes_mod_order(&integer.to_bytes_le())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn regimes_have_expected_shape() {
        let kimchi = PoseidonParams::kimchi();
        assert_eq!(kimchi.full_rounds, 55);
        assert_eq!(kimchi.sbox_power, 7);
        assert_eq!(kimchi.round_constants.len(), 55);

        let legacy = PoseidonParams::legacy();
        assert_eq!(legacy.full_rounds, 63);
        assert_eq!(legacy.sbox_power, 5);
        assert_eq!(legacy.round_constants.len(), 64);
        assert_ne!(kimchi.round_constants[0], legacy.round_constants[0]);
    }

    #[test]
    fn printed_integers_in_both_forms() {
        struct Printed(&'static str);
        impl Display for Printed {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.write_str(self.0)
            }
        }
        let hex = Printed(
            "Fp256 \"(1A9BD250757E29EF4959B9BEF59B4E60E20A56307D6491E7B7EA1FAC679C7903)\"",
        );
        let decimal =
            Printed("12035446894107573964500871153637039653510326950134440362813193268448863222019");
        assert_eq!(import(&hex), import(&decimal));
        assert_eq!(import(&Printed("")), Field::ZERO);
        assert_eq!(import(&Printed("42")), Field::from_u64(42));
    }
}
