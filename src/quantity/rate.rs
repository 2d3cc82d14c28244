use std::{
    fmt::{Debug, Display, Formatter},
    iter::Sum,
    ops::Add,
};

use serde::Serialize;

use crate::quantity::Quantity;

/// Dollar per kilowatt-hour, the energy charge.
pub type KilowattHourRate = Quantity<-1, -1, 1>;

/// Dollar per kilowatt of peak demand, the demand charge.
pub type KilowattRate = Quantity<-1, 0, 1>;

/// Common ground of energy and demand rates, so that the tier walk is written once.
pub trait Rate:
    Copy + Ord + Display + Debug + Serialize + From<f64> + Add<Output = Self> + Sum
{
    const ZERO: Self;

    /// Unit of the tier `max` boundary.
    const CAP_UNIT: &'static str;
}

impl Rate for KilowattHourRate {
    const ZERO: Self = Self::ZERO;
    const CAP_UNIT: &'static str = "kWh";
}

impl Rate for KilowattRate {
    const ZERO: Self = Self::ZERO;
    const CAP_UNIT: &'static str = "kW";
}

impl Display for KilowattHourRate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.4} $/kWh", self.0)
    }
}

impl Debug for KilowattHourRate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.5}$/kWh", self.0)
    }
}

impl Display for KilowattRate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2} $/kW", self.0)
    }
}

impl Debug for KilowattRate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.3}$/kW", self.0)
    }
}
