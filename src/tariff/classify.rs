use std::{
    cmp::Reverse,
    collections::BTreeMap,
    fmt::{Display, Formatter},
};

use comfy_table::Color;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::{
    prelude::*,
    quantity::rate::Rate,
    tariff::{
        schedule::{HourMap, PeriodIndex},
        tier::RateStructure,
    },
};

#[derive(Copy, Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum Classification {
    #[serde(rename = "Peak")]
    Peak,

    #[serde(rename = "Mid-Peak")]
    MidPeak,

    #[serde(rename = "Off-Peak")]
    OffPeak,
}

impl Display for Classification {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Peak => write!(f, "Peak"),
            Self::MidPeak => write!(f, "Mid-Peak"),
            Self::OffPeak => write!(f, "Off-Peak"),
        }
    }
}

impl Classification {
    pub const fn color(self) -> Color {
        match self {
            Self::Peak => Color::Red,
            Self::MidPeak => Color::DarkYellow,
            Self::OffPeak => Color::Green,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PeriodInfo<R> {
    pub weekday_hours: Vec<u8>,
    pub weekend_hours: Vec<u8>,
    pub first_tier_rate: Option<R>,

    /// `None` when the period has no known rate to rank by.
    pub label: Option<Classification>,
}

pub type PeriodTable<R> = BTreeMap<PeriodIndex, PeriodInfo<R>>;

/// Rank the rated periods. The most expensive is peak, the cheapest is off-peak and the rest
/// is mid-peak.
///
/// Ties break towards the lower period number for both the peak and the off-peak label.
/// A single rated period is only ever peak.
pub fn classify<R: Rate>(
    rates: impl IntoIterator<Item = (PeriodIndex, R)>,
) -> BTreeMap<PeriodIndex, Classification> {
    let ranked = rates
        .into_iter()
        .sorted_unstable_by_key(|(period, rate)| (Reverse(*rate), *period))
        .collect_vec();
    let Some(((peak, _), rest)) = ranked.split_first() else {
        return BTreeMap::new();
    };
    let off_peak =
        rest.iter().min_by_key(|(period, rate)| (*rate, *period)).map(|(period, _)| *period);

    let mut labels: BTreeMap<_, _> =
        rest.iter().map(|(period, _)| (*period, Classification::MidPeak)).collect();
    labels.insert(*peak, Classification::Peak);
    if let Some(off_peak) = off_peak {
        labels.insert(off_peak, Classification::OffPeak);
    }
    labels
}

/// Build the period table from the weekday and weekend hour maps.
///
/// When both maps are empty (flat tariffs) the structure's own periods are listed instead.
pub fn build_period_table<R: Rate>(
    weekday: &HourMap,
    weekend: &HourMap,
    structure: Option<&RateStructure<R>>,
) -> PeriodTable<R> {
    let periods = if weekday.is_empty() && weekend.is_empty() {
        structure.map(|structure| structure.period_indices().collect_vec()).unwrap_or_default()
    } else {
        weekday.keys().chain(weekend.keys()).copied().sorted_unstable().dedup().collect_vec()
    };

    let rates: BTreeMap<PeriodIndex, Option<R>> = periods
        .into_iter()
        .map(|period| {
            let rate = structure.and_then(|structure| structure.first_tier_rate(period));
            if rate.is_none() {
                debug!(%period, "no first-tier rate, the period stays unlabelled");
            }
            (period, rate)
        })
        .collect();
    let labels =
        classify(rates.iter().filter_map(|(period, rate)| rate.map(|rate| (*period, rate))));

    rates
        .into_iter()
        .map(|(period, first_tier_rate)| {
            let info = PeriodInfo {
                weekday_hours: weekday.get(&period).cloned().unwrap_or_default(),
                weekend_hours: weekend.get(&period).cloned().unwrap_or_default(),
                first_tier_rate,
                label: labels.get(&period).copied(),
            };
            (period, info)
        })
        .collect()
}
