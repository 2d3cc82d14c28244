pub mod energy;
pub mod power;
pub mod rate;

use std::ops::Mul;

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

/// Magnitudes below this are floating-point noise from the solver, such as phantom night-time
/// solar.
pub const NOISE_THRESHOLD: f64 = 1e-6;

#[derive(
    Clone,
    Copy,
    Default,
    Deserialize,
    Eq,
    Hash,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
    derive_more::Add,
    derive_more::AddAssign,
    derive_more::From,
    derive_more::Neg,
    derive_more::Sub,
    derive_more::SubAssign,
    derive_more::Sum,
)]
#[from(f64, OrderedFloat<f64>)]
#[must_use]
pub struct Quantity<const POWER: isize, const TIME: isize, const COST: isize>(
    pub OrderedFloat<f64>,
);

impl<const POWER: isize, const TIME: isize, const COST: isize> Quantity<POWER, TIME, COST> {
    pub const ZERO: Self = Self(OrderedFloat(0.0));

    /// Snap non-finite values and noise magnitudes to exactly zero.
    pub const fn denoise(self) -> Self {
        if self.0.0.is_finite() && self.0.0.abs() >= NOISE_THRESHOLD { self } else { Self::ZERO }
    }

    #[must_use]
    pub const fn get(self) -> f64 {
        self.0.0
    }
}

impl<const POWER: isize, const TIME: isize, const COST: isize> Mul<f64>
    for Quantity<POWER, TIME, COST>
{
    type Output = Self;

    fn mul(self, rhs: f64) -> Self::Output {
        Self(self.0 * rhs)
    }
}
