use serde::{Deserialize, Serialize};
use serde_with::{DefaultOnError, serde_as};

use crate::{
    prelude::*,
    quantity::rate::{KilowattHourRate, KilowattRate, Rate},
    tariff::{
        schedule::{PeriodNumbering, ScheduleMatrix},
        tier::{Component, RateStructure, StructureSource, Tier},
    },
};

/// Tariff payload as served by the rate database: a bare rate or a listing of rates.
#[derive(Deserialize)]
#[serde(untagged)]
pub enum TariffDocument {
    Listing { items: Vec<RawTariff> },
    Single(Box<RawTariff>),
}

impl TariffDocument {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("failed to parse the tariff document")
    }

    /// Pick the rate labelled `label`, or the first listed rate.
    #[must_use]
    pub fn select(self, label: Option<&str>) -> Option<RawTariff> {
        match self {
            Self::Single(tariff) => Some(*tariff),
            Self::Listing { items } => {
                let position = label
                    .and_then(|label| {
                        items.iter().position(|item| item.label.as_deref() == Some(label))
                    })
                    .unwrap_or_default();
                items.into_iter().nth(position)
            }
        }
    }
}

type RawRow = Option<Vec<f64>>;

type RawStructure = Vec<Vec<Option<RawTier>>>;

#[serde_as]
#[derive(Default, Deserialize)]
pub struct RawTariff {
    #[serde(default)]
    pub label: Option<String>,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default, alias = "utility_name")]
    pub utility: Option<String>,

    #[serde_as(as = "DefaultOnError<Vec<Vec<DefaultOnError>>>")]
    #[serde(default, alias = "energyRateStructure")]
    energyratestructure: RawStructure,

    #[serde_as(as = "DefaultOnError<Vec<Vec<DefaultOnError>>>")]
    #[serde(default, alias = "demandRateStructure")]
    demandratestructure: RawStructure,

    #[serde_as(as = "DefaultOnError<Vec<Vec<DefaultOnError>>>")]
    #[serde(default, alias = "flatEnergyRateStructure")]
    flatenergyratestructure: RawStructure,

    #[serde_as(as = "DefaultOnError<Vec<Vec<DefaultOnError>>>")]
    #[serde(default, alias = "flatdemandstructure", alias = "flatDemandRateStructure")]
    flatdemandratestructure: RawStructure,

    #[serde_as(as = "DefaultOnError<Vec<DefaultOnError>>")]
    #[serde(default, alias = "energyWeekdaySchedule")]
    energyweekdayschedule: Vec<RawRow>,

    #[serde_as(as = "DefaultOnError<Vec<DefaultOnError>>")]
    #[serde(default, alias = "energyWeekendSchedule")]
    energyweekendschedule: Vec<RawRow>,

    #[serde_as(as = "DefaultOnError<Vec<DefaultOnError>>")]
    #[serde(default, alias = "demandWeekdaySchedule")]
    demandweekdayschedule: Vec<RawRow>,

    #[serde_as(as = "DefaultOnError<Vec<DefaultOnError>>")]
    #[serde(default, alias = "demandWeekendSchedule")]
    demandweekendschedule: Vec<RawRow>,
}

/// The two tier shapes seen in the wild.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawTier {
    Multi(Vec<RawComponent>),
    Single(RawComponent),
}

#[derive(Deserialize)]
struct RawComponent {
    #[serde(default)]
    name: Option<String>,

    #[serde(default)]
    rate: Option<f64>,

    #[serde(default, alias = "adjustment")]
    adj: Option<f64>,

    #[serde(default)]
    max: Option<f64>,
}

impl RawComponent {
    /// A component is usable when it carries a rate or an adjustment.
    fn into_component<R: Rate>(self) -> Option<Component<R>> {
        let rate = self.rate.filter(|rate| rate.is_finite());
        let adjustment = self.adj.filter(|adj| adj.is_finite());
        if rate.is_none() && adjustment.is_none() {
            return None;
        }
        Some(Component {
            name: self.name,
            rate: R::from(rate.unwrap_or_default()),
            adjustment: R::from(adjustment.unwrap_or_default()),
            cap: self.max,
        })
    }
}

impl RawTier {
    fn into_tier<R: Rate>(self) -> Tier<R> {
        match self {
            Self::Single(component) => component
                .into_component()
                .map_or_else(|| Tier::Multi(Vec::new()), Tier::Single),
            Self::Multi(components) => Tier::Multi(
                components.into_iter().filter_map(RawComponent::into_component).collect(),
            ),
        }
    }
}

fn into_structure<R: Rate>(
    time_of_use: RawStructure,
    flat: RawStructure,
    what: &str,
) -> Option<RateStructure<R>> {
    let (source, periods) = if !time_of_use.is_empty() {
        (StructureSource::TimeOfUse, time_of_use)
    } else if !flat.is_empty() {
        debug!(side = what, "no time-of-use structure, falling back to the flat one");
        (StructureSource::Flat, flat)
    } else {
        debug!(side = what, "no rate structure");
        return None;
    };
    let periods = periods
        .into_iter()
        .map(|tiers| {
            tiers
                .into_iter()
                .map(|tier| tier.map_or_else(|| Tier::Multi(Vec::new()), RawTier::into_tier))
                .collect()
        })
        .collect();
    Some(RateStructure { source, periods })
}

/// Canonical, immutable view of one tariff.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct RateSchedule {
    pub label: Option<String>,
    pub name: Option<String>,
    pub utility: Option<String>,
    pub energy: Option<RateStructure<KilowattHourRate>>,
    pub demand: Option<RateStructure<KilowattRate>>,
    pub energy_weekday: ScheduleMatrix,
    pub energy_weekend: ScheduleMatrix,
    pub demand_weekday: ScheduleMatrix,
    pub demand_weekend: ScheduleMatrix,
}

impl RawTariff {
    /// Resolve the aliases and the tier shapes once, so that the decoder sees one shape only.
    #[must_use]
    pub fn normalize(self, numbering: PeriodNumbering) -> RateSchedule {
        RateSchedule {
            energy: into_structure(
                self.energyratestructure,
                self.flatenergyratestructure,
                "energy",
            ),
            demand: into_structure(
                self.demandratestructure,
                self.flatdemandratestructure,
                "demand",
            ),
            energy_weekday: ScheduleMatrix::from_raw(&self.energyweekdayschedule, numbering),
            energy_weekend: ScheduleMatrix::from_raw(&self.energyweekendschedule, numbering),
            demand_weekday: ScheduleMatrix::from_raw(&self.demandweekdayschedule, numbering),
            demand_weekend: ScheduleMatrix::from_raw(&self.demandweekendschedule, numbering),
            label: self.label,
            name: self.name,
            utility: self.utility,
        }
    }
}

impl RateSchedule {
    /// Parse and normalize a tariff document in one go.
    pub fn from_json(
        json: &str,
        label: Option<&str>,
        numbering: PeriodNumbering,
    ) -> Result<Option<Self>> {
        Ok(TariffDocument::from_json(json)?.select(label).map(|tariff| tariff.normalize(numbering)))
    }

    /// Whether neither a time-of-use nor a flat structure is available.
    #[must_use]
    pub const fn has_no_structure(&self) -> bool {
        self.energy.is_none() && self.demand.is_none()
    }
}
