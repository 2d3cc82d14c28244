use serde::Serialize;

use crate::{
    prelude::*,
    quantity::rate::{KilowattHourRate, KilowattRate, Rate},
    tariff::{
        classify::{PeriodTable, build_period_table},
        document::RateSchedule,
        schedule::{HourMap, ScheduleMatrix, build_hour_map},
        season::{MonthSignature, Season, month_signatures, segment_seasons},
        tier::{RateStructure, StructureSource, TierRow},
    },
};

/// Everything derived from one side (energy or demand) of a tariff.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SideDecoding<R> {
    /// `None` when neither a time-of-use nor a flat structure is present.
    pub source: Option<StructureSource>,

    pub weekday: HourMap,
    pub weekend: HourMap,
    pub periods: PeriodTable<R>,
    pub seasons: Vec<Season<MonthSignature>>,
    pub tiers: Vec<TierRow<R>>,
}

impl<R: Rate> SideDecoding<R> {
    fn decode(
        structure: Option<&RateStructure<R>>,
        weekday_matrix: &ScheduleMatrix,
        weekend_matrix: &ScheduleMatrix,
    ) -> Self {
        let weekday = build_hour_map(weekday_matrix);
        let weekend = build_hour_map(weekend_matrix);
        let periods = build_period_table(&weekday, &weekend, structure);
        let seasons = if weekday_matrix.is_empty() && weekend_matrix.is_empty() {
            Vec::new()
        } else {
            segment_seasons(&month_signatures(&periods, weekday_matrix, weekend_matrix))
        };
        Self {
            source: structure.map(|structure| structure.source),
            tiers: structure.map(RateStructure::build_tier_rows).unwrap_or_default(),
            weekday,
            weekend,
            periods,
            seasons,
        }
    }

    #[must_use]
    pub const fn has_structure(&self) -> bool {
        self.source.is_some()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TariffDecoding {
    pub label: Option<String>,
    pub name: Option<String>,
    pub utility: Option<String>,
    pub energy: SideDecoding<KilowattHourRate>,
    pub demand: SideDecoding<KilowattRate>,
}

/// Run the full decoding pipeline over both sides of the tariff.
#[instrument(skip_all, fields(label = schedule.label.as_deref()))]
#[must_use]
pub fn decode(schedule: &RateSchedule) -> TariffDecoding {
    let energy = SideDecoding::decode(
        schedule.energy.as_ref(),
        &schedule.energy_weekday,
        &schedule.energy_weekend,
    );
    let demand = SideDecoding::decode(
        schedule.demand.as_ref(),
        &schedule.demand_weekday,
        &schedule.demand_weekend,
    );
    debug!(
        n_energy_periods = energy.periods.len(),
        n_energy_seasons = energy.seasons.len(),
        n_demand_periods = demand.periods.len(),
        "decoded",
    );
    TariffDecoding {
        label: schedule.label.clone(),
        name: schedule.name.clone(),
        utility: schedule.utility.clone(),
        energy,
        demand,
    }
}
