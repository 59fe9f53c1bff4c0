//! Non-zero affine points on Pallas, `y^2 = x^3 + 5`.
//!
//! The projective form lives only inside scalar multiplication and addition, which delegate to
//! `pasta_curves`. Converting back to affine fails on the identity, so a [`Group`] value is
//! never the point at infinity.

use group::Curve;
use once_cell::sync::Lazy;
use pasta_curves::arithmetic::CurveAffine;
use pasta_curves::pallas;

use crate::error::CryptoError;
use crate::field::{Field, Scalar};

/// The constant `b` in the curve equation.
pub const CURVE_B: u64 = 5;

// x = 1 with the odd square root of 1 + 5.
static GENERATOR: Lazy<Group> = Lazy::new(|| {
    Group::decompress(Field::ONE, true).expect("x = 1 lies on the curve")
});

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Group {
    pub x: Field,
    pub y: Field,
}

impl Group {
    /// The protocol generator `(1, y)` with odd `y`.
    pub fn generator() -> Self {
        *GENERATOR
    }

    /// `x^3 + b`, the right-hand side of the curve equation.
    pub fn curve_rhs(x: Field) -> Field {
        x.square() * x + Field::from_u64(CURVE_B)
    }

    pub fn from_affine(x: Field, y: Field) -> Result<Self, CryptoError> {
        if y.square() != Self::curve_rhs(x) {
            return Err(CryptoError::NotOnCurve {
                x: x.to_string(),
                y: y.to_string(),
            });
        }
        Ok(Self { x, y })
    }

    /// Recover `y` from `x` and its parity.
    pub fn decompress(x: Field, is_odd: bool) -> Result<Self, CryptoError> {
        let y = Self::curve_rhs(x)
            .sqrt()
            .ok_or_else(|| CryptoError::InvalidPublicKey(x.to_string()))?;
        let y = if y.is_odd() == is_odd { y } else { -y };
        Ok(Self { x, y })
    }

    pub fn to_projective(&self) -> Result<pallas::Point, CryptoError> {
        let affine: Option<pallas::Affine> = pallas::Affine::from_xy(self.x.0, self.y.0).into();
        affine.map(pallas::Point::from).ok_or_else(|| CryptoError::NotOnCurve {
            x: self.x.to_string(),
            y: self.y.to_string(),
        })
    }

    pub fn from_projective(point: &pallas::Point) -> Result<Self, CryptoError> {
        let coordinates: Option<pasta_curves::arithmetic::Coordinates<pallas::Affine>> =
            point.to_affine().coordinates().into();
        let coordinates = coordinates.ok_or(CryptoError::PointAtInfinity)?;
        Ok(Self {
            x: Field(*coordinates.x()),
            y: Field(*coordinates.y()),
        })
    }

    pub fn scale(&self, scalar: Scalar) -> Result<Self, CryptoError> {
        Self::from_projective(&(self.to_projective()? * scalar.0))
    }

    pub fn add(&self, other: &Self) -> Result<Self, CryptoError> {
        Self::from_projective(&(self.to_projective()? + other.to_projective()?))
    }

    pub fn sub(&self, other: &Self) -> Result<Self, CryptoError> {
        Self::from_projective(&(self.to_projective()? - other.to_projective()?))
    }

    pub fn negate(&self) -> Self {
        Self {
            x: self.x,
            y: -self.y,
        }
    }
}
