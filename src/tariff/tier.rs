use serde::Serialize;

use crate::{quantity::rate::Rate, tariff::schedule::PeriodIndex};

/// Charge bucket of a rate component, told apart by the component name.
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq, Serialize)]
pub enum ComponentKind {
    Generation,
    Delivery,
    Other,
}

impl ComponentKind {
    const DELIVERY_PATTERNS: [&'static str; 4] = ["deliv", "dist", "trans", "wires"];

    #[must_use]
    pub fn classify(name: Option<&str>) -> Self {
        let Some(name) = name else {
            return Self::Other;
        };
        let name = name.to_lowercase();
        if name.contains("gen") {
            Self::Generation
        } else if Self::DELIVERY_PATTERNS.iter().any(|pattern| name.contains(pattern)) {
            Self::Delivery
        } else {
            Self::Other
        }
    }
}

/// One charge within a tier, for example the generation part of a bundled rate.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Component<R> {
    pub name: Option<String>,
    pub rate: R,
    pub adjustment: R,

    /// Upper usage boundary of the tier, kWh or kW depending on the rate.
    pub cap: Option<f64>,
}

impl<R: Rate> Component<R> {
    #[must_use]
    pub fn kind(&self) -> ComponentKind {
        ComponentKind::classify(self.name.as_deref())
    }

    pub fn total(&self) -> R {
        self.rate + self.adjustment
    }
}

/// A tier block as found in the document: either one rate or several component rates.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum Tier<R> {
    Single(Component<R>),
    Multi(Vec<Component<R>>),
}

impl<R> Tier<R> {
    #[must_use]
    pub fn components(&self) -> &[Component<R>] {
        match self {
            Self::Single(component) => std::slice::from_ref(component),
            Self::Multi(components) => components,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
pub enum StructureSource {
    TimeOfUse,

    /// Single-period fallback taken from the flat structure.
    Flat,
}

/// Periods of a rate structure, each a list of tiers in order.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RateStructure<R> {
    pub source: StructureSource,
    pub periods: Vec<Vec<Tier<R>>>,
}

impl<R: Rate> RateStructure<R> {
    #[must_use]
    pub fn period(&self, index: PeriodIndex) -> Option<&[Tier<R>]> {
        self.periods.get(index.position()).map(Vec::as_slice)
    }

    pub fn period_indices(&self) -> impl Iterator<Item = PeriodIndex> {
        (0..self.periods.len()).map(PeriodIndex::from_position)
    }

    /// Total rate of the period's first tier, if that tier has anything to sum.
    #[must_use]
    pub fn first_tier_rate(&self, index: PeriodIndex) -> Option<R> {
        let tier = self.period(index)?.first()?;
        TierRow::try_from_tier(index, 1, tier).map(|row| row.total)
    }

    /// Flatten the structure into one row per usable (period, tier).
    #[must_use]
    pub fn build_tier_rows(&self) -> Vec<TierRow<R>> {
        self.period_indices()
            .zip(&self.periods)
            .flat_map(|(period, tiers)| {
                (1..).zip(tiers).filter_map(move |(tier_number, tier)| {
                    TierRow::try_from_tier(period, tier_number, tier)
                })
            })
            .collect()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TierRow<R> {
    pub period: PeriodIndex,

    /// Tier number within the period, counted from 1.
    pub tier: u32,

    pub generation: R,
    pub delivery: R,
    pub other: R,
    pub total: R,

    /// The most restrictive component boundary.
    pub max: Option<f64>,
}

impl<R: Rate> TierRow<R> {
    fn try_from_tier(period: PeriodIndex, tier_number: u32, tier: &Tier<R>) -> Option<Self> {
        let components = tier.components();
        if components.is_empty() {
            return None;
        }
        let sum_of = |kind: ComponentKind| -> R {
            components
                .iter()
                .filter(|component| component.kind() == kind)
                .map(Component::total)
                .sum()
        };
        let generation = sum_of(ComponentKind::Generation);
        let delivery = sum_of(ComponentKind::Delivery);
        let other = sum_of(ComponentKind::Other);
        let max = components
            .iter()
            .filter_map(|component| component.cap)
            .filter(|cap| cap.is_finite())
            .reduce(f64::min);
        Some(Self {
            period,
            tier: tier_number,
            generation,
            delivery,
            other,
            total: generation + delivery + other,
            max,
        })
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;
    use crate::quantity::rate::{KilowattHourRate, KilowattRate};

    fn component<R: Rate>(
        name: Option<&str>,
        rate: f64,
        adjustment: f64,
        cap: Option<f64>,
    ) -> Component<R> {
        Component {
            name: name.map(str::to_owned),
            rate: R::from(rate),
            adjustment: R::from(adjustment),
            cap,
        }
    }

    #[test]
    fn test_classify_component_names() {
        assert_eq!(ComponentKind::classify(Some("Generation")), ComponentKind::Generation);
        assert_eq!(ComponentKind::classify(Some("gen charge")), ComponentKind::Generation);
        assert_eq!(ComponentKind::classify(Some("Distribution")), ComponentKind::Delivery);
        assert_eq!(ComponentKind::classify(Some("Transmission")), ComponentKind::Delivery);
        assert_eq!(ComponentKind::classify(Some("WIRES")), ComponentKind::Delivery);
        assert_eq!(ComponentKind::classify(Some("Delivery")), ComponentKind::Delivery);
        assert_eq!(ComponentKind::classify(Some("Public purpose")), ComponentKind::Other);
        assert_eq!(ComponentKind::classify(None), ComponentKind::Other);
    }

    #[test]
    fn test_build_tier_rows_multi_component() {
        let structure = RateStructure::<KilowattHourRate> {
            source: StructureSource::TimeOfUse,
            periods: vec![vec![
                Tier::Multi(vec![
                    component(Some("Generation"), 0.10, 0.01, Some(500.0)),
                    component(Some("Delivery"), 0.05, 0.0, Some(300.0)),
                    component(Some("Fees"), 0.002, 0.0, None),
                ]),
                Tier::Multi(vec![]),
                Tier::Single(component(None, 0.20, 0.0, None)),
            ]],
        };
        let rows = structure.build_tier_rows();
        assert_eq!(rows.len(), 2);

        let first = &rows[0];
        assert_eq!(first.period.get(), 1);
        assert_eq!(first.tier, 1);
        assert_abs_diff_eq!(first.generation.get(), 0.11, epsilon = 1e-12);
        assert_abs_diff_eq!(first.delivery.get(), 0.05);
        assert_abs_diff_eq!(first.other.get(), 0.002);
        assert_abs_diff_eq!(first.total.get(), 0.162, epsilon = 1e-12);
        assert_eq!(first.max, Some(300.0));

        assert_eq!(rows[1].tier, 3, "the empty tier keeps its position");
        assert_abs_diff_eq!(rows[1].other.get(), 0.20);
        assert_eq!(rows[1].max, None);
    }

    #[test]
    fn test_first_tier_rate() {
        let structure = RateStructure::<KilowattRate> {
            source: StructureSource::Flat,
            periods: vec![
                vec![Tier::Single(component(None, 12.0, 0.5, None))],
                vec![Tier::Multi(vec![]), Tier::Single(component(None, 3.0, 0.0, None))],
            ],
        };
        let first = PeriodIndex::new(1).unwrap();
        let second = PeriodIndex::new(2).unwrap();
        assert_eq!(structure.first_tier_rate(first), Some(KilowattRate::from(12.5)));
        assert_eq!(structure.first_tier_rate(second), None);
        assert_eq!(structure.first_tier_rate(PeriodIndex::new(3).unwrap()), None);
    }
}
