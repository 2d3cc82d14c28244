use std::num::NonZeroU32;

use bon::Builder;
use chrono::{DateTime, Local, NaiveDate};
use enumset::{EnumSet, EnumSetType};
use serde::Serialize;
use serde_with::{TimestampMilliSeconds, serde_as};

use crate::{
    prelude::*,
    quantity::power::Kilowatts,
    results::{document::OptimizerResults, flow::Flow, slice::Window},
};

pub const DEFAULT_ANALYSIS_YEAR: i32 = 2024;

/// Optional chart layers.
#[derive(Debug, Hash, clap::ValueEnum, EnumSetType)]
pub enum Overlay {
    /// Derive the utility layer as the load not covered by the on-site sources.
    UtilityResidual,

    /// Show the flows into the battery.
    Charging,

    /// Show the flows exported to the grid.
    Exports,
}

/// One resampled time step.
#[serde_as]
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TimeSeriesPoint {
    #[serde_as(as = "TimestampMilliSeconds<i64>")]
    pub timestamp: DateTime<Local>,

    /// Fractional hour of the day.
    pub hour: f64,

    pub load: Kilowatts,
    pub utility_to_load: Kilowatts,
    pub utility_to_bess: Kilowatts,
    pub solar_to_load: Kilowatts,
    pub solar_to_bess: Kilowatts,
    pub solar_export: Kilowatts,
    pub bess_to_load: Kilowatts,
    pub bess_export: Kilowatts,
    pub genset_to_load: Kilowatts,
    pub genset_to_bess: Kilowatts,
    pub gen_export: Kilowatts,
    pub chp_to_load: Kilowatts,

    /// Imports minus exports, positive when the site draws from the grid.
    pub net_utility: Kilowatts,

    /// Load left for the utility once the on-site sources are stacked.
    pub utility_residual: Kilowatts,
}

impl TimeSeriesPoint {
    /// Height of the stacked supply area.
    #[must_use]
    pub fn stacked_supply(&self) -> Kilowatts {
        self.solar_to_load
            + self.bess_to_load
            + self.genset_to_load
            + self.chp_to_load
            + self.utility_residual
    }
}

/// Turn a window of the optimizer results into chart-ready points.
#[derive(Builder)]
#[builder(finish_fn(vis = ""))]
pub struct Composer<'a> {
    results: &'a OptimizerResults,
    window: Window,

    #[builder(default = EnumSet::all())]
    overlays: EnumSet<Overlay>,

    #[builder(default = DEFAULT_ANALYSIS_YEAR)]
    analysis_year: i32,
}

impl<S: composer_builder::IsComplete> ComposerBuilder<'_, S> {
    pub fn compose(self) -> Result<Vec<TimeSeriesPoint>> {
        self.build().compose()
    }
}

/// Window-aligned samples of a single flow.
struct Samples(Vec<f64>);

impl Samples {
    fn at(&self, i: usize) -> Kilowatts {
        Kilowatts::from(self.0.get(i).copied().unwrap_or_default())
    }
}

impl Composer<'_> {
    #[instrument(
        skip_all,
        fields(day_index = self.window.day_index, n_days = self.window.n_days),
    )]
    fn compose(self) -> Result<Vec<TimeSeriesPoint>> {
        let start_time = self.start_time()?;

        let load = self.results.series(Flow::Load);
        if !load.is_empty() && self.window.starts_after(load.len()) {
            warn!(n_steps = load.len(), "the window starts past the end of the results");
        }
        let load = Samples(self.window.slice(&load));
        let samples = |flow| Samples(self.window.slice(&self.results.series(flow)));
        let utility_to_load = samples(Flow::UtilityToLoad);
        let utility_to_bess = samples(Flow::UtilityToBess);
        let solar_to_load = samples(Flow::SolarToLoad);
        let solar_to_bess = samples(Flow::SolarToBess);
        let solar_export = samples(Flow::SolarExport);
        let bess_to_load = samples(Flow::BessToLoad);
        let bess_export = samples(Flow::BessExport);
        let genset_to_load = samples(Flow::GensetToLoad);
        let genset_to_bess = samples(Flow::GensetToBess);
        let gen_export = samples(Flow::GenExport);
        let chp_to_load = samples(Flow::ChpToLoad);

        let show_charging = self.overlays.contains(Overlay::Charging);
        let show_exports = self.overlays.contains(Overlay::Exports);
        let overlay = |enabled: bool, value: Kilowatts| {
            if enabled { value.denoise() } else { Kilowatts::ZERO }
        };

        let mut points = Vec::with_capacity(self.window.len());
        for i in 0..self.window.len() {
            // Past the calendar range, the points keep the start of the year.
            let timestamp = self
                .window
                .offset(i)
                .and_then(|offset| start_time.checked_add_signed(offset))
                .unwrap_or(start_time);

            let load = load.at(i).max(Kilowatts::ZERO).denoise();

            // Stack the on-site sources under the load in a fixed order.
            let mut headroom = load;
            let mut stack = |value: Kilowatts| {
                let value = value.denoise().clamp(Kilowatts::ZERO, headroom);
                headroom -= value;
                value
            };
            let solar = stack(solar_to_load.at(i));
            let bess = stack(bess_to_load.at(i));
            let genset = stack(genset_to_load.at(i));
            let chp = stack(chp_to_load.at(i));

            let utility_residual = if self.overlays.contains(Overlay::UtilityResidual) {
                headroom.max(Kilowatts::ZERO).denoise()
            } else {
                Kilowatts::ZERO
            };
            let net_utility = (utility_to_load.at(i) + utility_to_bess.at(i))
                - (solar_export.at(i) + bess_export.at(i) + gen_export.at(i));

            points.push(TimeSeriesPoint {
                timestamp,
                hour: self.window.hour_of_day(i),
                load,
                utility_to_load: utility_to_load.at(i).denoise(),
                utility_to_bess: overlay(show_charging, utility_to_bess.at(i)),
                solar_to_load: solar,
                solar_to_bess: overlay(show_charging, solar_to_bess.at(i)),
                solar_export: overlay(show_exports, solar_export.at(i)),
                bess_to_load: bess,
                bess_export: overlay(show_exports, bess_export.at(i)),
                genset_to_load: genset,
                genset_to_bess: overlay(show_charging, genset_to_bess.at(i)),
                gen_export: overlay(show_exports, gen_export.at(i)),
                chp_to_load: chp,
                net_utility: net_utility.denoise(),
                utility_residual,
            });
        }
        debug!(n_points = points.len(), "resampled");
        Ok(points)
    }

    /// Local midnight of January 1st of the analysis year.
    fn start_time(&self) -> Result<DateTime<Local>> {
        NaiveDate::from_ymd_opt(self.analysis_year, 1, 1)
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .and_then(|midnight| midnight.and_local_timezone(Local).earliest())
            .with_context(|| {
                format!("year {} has no local midnight on January 1st", self.analysis_year)
            })
    }
}

/// Resample one day at the given resolution with every overlay enabled.
pub fn resample(
    results: &OptimizerResults,
    day_index: usize,
    time_steps_per_hour: NonZeroU32,
) -> Result<Vec<TimeSeriesPoint>> {
    let window =
        Window::builder().day_index(day_index).time_steps_per_hour(time_steps_per_hour).build();
    Composer::builder().results(results).window(window).compose()
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use itertools::Itertools;
    use serde_json::json;

    use super::*;

    const N_QUARTERS: usize = 35040;

    fn quarter_hourly_results() -> Result<OptimizerResults> {
        let load = (0..N_QUARTERS).map(|i| 10.0 + (i % 96) as f64 / 10.0).collect_vec();
        let solar = (0..N_QUARTERS)
            .map(|i| if (24..72).contains(&(i % 96)) { 15.0 } else { 1e-9 })
            .collect_vec();
        OptimizerResults::from_value(json!({
            "Settings": {"time_steps_per_hour": 4},
            "ElectricLoad": {"load_series_kw": load},
            "PV": {
                "electric_to_load_series_kw": solar,
                "electric_to_grid_series_kw": vec![0.5; N_QUARTERS],
            },
            "ElectricStorage": {"storage_to_load_series_kw": vec![3.0; N_QUARTERS]},
            "ElectricUtility": {
                "electric_to_load_series_kw": vec![4.0; N_QUARTERS],
                "electric_to_storage_series_kw": vec![1.0; N_QUARTERS],
            },
        }))
    }

    #[test]
    fn test_resample_quarter_hourly_day() -> Result {
        let results = quarter_hourly_results()?;
        let points = resample(&results, 1, results.time_steps_per_hour())?;
        assert_eq!(points.len(), 96);
        for (i, point) in points.iter().enumerate() {
            assert_abs_diff_eq!(point.hour, i as f64 * 0.25);
        }
        assert!(points.iter().tuple_windows().all(|(a, b)| a.hour < b.hour));
        assert_abs_diff_eq!(points[95].hour, 23.75);
        assert_eq!((points[1].timestamp - points[0].timestamp).num_minutes(), 15);
        Ok(())
    }

    #[test]
    fn test_stack_never_exceeds_load() -> Result {
        let results = quarter_hourly_results()?;
        let points = resample(&results, 3, NonZeroU32::new(4).unwrap())?;
        for point in &points {
            assert!(point.utility_residual >= Kilowatts::ZERO);
            assert!(point.stacked_supply().get() <= point.load.get() + 1e-6, "{point:?}");
        }
        Ok(())
    }

    #[test]
    fn test_noise_is_clamped() -> Result {
        let results = quarter_hourly_results()?;
        let points = resample(&results, 0, NonZeroU32::new(4).unwrap())?;
        assert_eq!(points[0].solar_to_load, Kilowatts::ZERO);
        assert_abs_diff_eq!(points[30].solar_to_load.get(), 13.0);
        assert_eq!(points[30].utility_residual, Kilowatts::ZERO);
        Ok(())
    }

    #[test]
    fn test_net_utility() -> Result {
        let results = quarter_hourly_results()?;
        let points = resample(&results, 0, NonZeroU32::new(4).unwrap())?;
        assert_abs_diff_eq!(points[0].net_utility.get(), 4.5);
        Ok(())
    }

    #[test]
    fn test_overlays_disabled() -> Result {
        let results = quarter_hourly_results()?;
        let window = Window::builder()
            .day_index(0)
            .time_steps_per_hour(NonZeroU32::new(4).unwrap())
            .build();
        let points = Composer::builder()
            .results(&results)
            .window(window)
            .overlays(EnumSet::empty())
            .compose()?;
        assert_eq!(points[0].utility_residual, Kilowatts::ZERO);
        assert_eq!(points[0].utility_to_bess, Kilowatts::ZERO);
        assert_eq!(points[0].solar_export, Kilowatts::ZERO);
        assert_abs_diff_eq!(points[0].net_utility.get(), 4.5);
        Ok(())
    }

    #[test]
    fn test_day_out_of_range_is_zero_filled() -> Result {
        let results = quarter_hourly_results()?;
        let points = resample(&results, 500, NonZeroU32::new(4).unwrap())?;
        assert_eq!(points.len(), 96);
        assert!(points.iter().all(|point| point.load == Kilowatts::ZERO));
        assert!(points.iter().all(|point| point.utility_residual == Kilowatts::ZERO));
        Ok(())
    }

    #[test]
    fn test_far_day_is_zero_filled() -> Result {
        let results = quarter_hourly_results()?;
        for day_index in [30_000_000, usize::MAX] {
            let points = resample(&results, day_index, NonZeroU32::new(4).unwrap())?;
            assert_eq!(points.len(), 96);
            assert!(points.iter().all(|point| point.load == Kilowatts::ZERO));
            assert_abs_diff_eq!(points[95].hour, 23.75);
        }
        Ok(())
    }

    #[test]
    fn test_timestamps_do_not_drift() -> Result {
        let results = OptimizerResults::default();
        let seven = NonZeroU32::new(7).unwrap();
        let day_0 = resample(&results, 0, seven)?;
        let day_1 = resample(&results, 1, seven)?;
        assert_eq!(day_0.len(), 168);
        assert_eq!((day_1[0].timestamp - day_0[0].timestamp).num_milliseconds(), 86_400_000);
        assert_eq!((day_0[7].timestamp - day_0[0].timestamp).num_minutes(), 60);
        Ok(())
    }

    #[test]
    fn test_stack_is_clipped_to_load() -> Result {
        let results = OptimizerResults::from_value(json!({
            "ElectricLoad": {"load_series_kw": [-5.0, 10.0, 10.0, 3.0]},
            "PV": {"electric_to_load_series_kw": [2.0, -4.0, 6.0, 1.0]},
            "ElectricStorage": {"storage_to_load_series_kw": [0.0, 1.0, 3.0, 0.0]},
            "Generator": {"electric_to_load_series_kw": [1.0, 8.0, 4.0, 5.0]},
            "CHP": {"electric_to_load_series_kw": [1.0, 6.0, 2.0, 5.0]},
        }))?;
        let window = Window::builder().day_index(0).build();
        for overlays in [EnumSet::all(), EnumSet::empty()] {
            let points =
                Composer::builder().results(&results).window(window).overlays(overlays).compose()?;
            for point in &points {
                assert!(point.load >= Kilowatts::ZERO);
                assert!(point.solar_to_load >= Kilowatts::ZERO, "{point:?}");
                assert!(point.utility_residual >= Kilowatts::ZERO, "{point:?}");
                assert!(point.stacked_supply().get() <= point.load.get() + 1e-6, "{point:?}");
            }

            // Negative load leaves no headroom at all.
            assert_eq!(points[0].stacked_supply(), Kilowatts::ZERO);

            // Negative solar is dropped, the generator and CHP fill the rest.
            assert_eq!(points[1].solar_to_load, Kilowatts::ZERO);
            assert_abs_diff_eq!(points[1].genset_to_load.get(), 8.0);
            assert_abs_diff_eq!(points[1].chp_to_load.get(), 1.0);

            // CHP gets whatever the earlier layers left.
            assert_abs_diff_eq!(points[2].chp_to_load.get(), 0.0);
            assert_abs_diff_eq!(points[3].genset_to_load.get(), 2.0);
            assert_eq!(points[3].chp_to_load, Kilowatts::ZERO);
        }
        Ok(())
    }
}
