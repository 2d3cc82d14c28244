use std::fmt::{Debug, Display, Formatter};

use crate::quantity::Quantity;

pub type KilowattHours = Quantity<1, 1, 0>;

impl KilowattHours {
    #[must_use]
    pub const fn megawatt_hours(self) -> f64 {
        self.0.0 / 1000.0
    }
}

impl Display for KilowattHours {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2} MWh", self.megawatt_hours())
    }
}

impl Debug for KilowattHours {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.3}kWh", self.0)
    }
}
