use serde::{Serialize, Serializer};

use crate::{
    fmt::MONTH_NAMES,
    quantity::{energy::KilowattHours, power::Kilowatts},
    results::{document::OptimizerResults, flow::Flow, slice::step_duration},
    tariff::schedule::{N_HOURS, N_MONTHS},
};

const DAYS_IN_MONTH: [usize; N_MONTHS] = [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];

/// Energy delivered per source within one calendar month.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct MonthlyEnergy {
    pub month: &'static str,

    #[serde(rename = "pv_total_mwh", serialize_with = "as_megawatt_hours")]
    pub pv_total: KilowattHours,

    #[serde(rename = "bess_discharge_mwh", serialize_with = "as_megawatt_hours")]
    pub bess_discharge: KilowattHours,

    #[serde(rename = "generator_mwh", serialize_with = "as_megawatt_hours")]
    pub generator: KilowattHours,

    #[serde(rename = "chp_mwh", serialize_with = "as_megawatt_hours")]
    pub chp: KilowattHours,
}

fn as_megawatt_hours<S: Serializer>(
    energy: &KilowattHours,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(energy.megawatt_hours())
}

/// Month of the time step, `None` past the end of a 365-day year.
fn month_of(step: usize, steps_per_day: usize) -> Option<usize> {
    let mut day = step / steps_per_day;
    for (month, n_days) in DAYS_IN_MONTH.into_iter().enumerate() {
        if day < n_days {
            return Some(month);
        }
        day -= n_days;
    }
    None
}

/// Sum every source into monthly buckets.
#[must_use]
pub fn monthly_rollup(results: &OptimizerResults) -> Vec<MonthlyEnergy> {
    let time_steps_per_hour = results.time_steps_per_hour();
    let steps_per_day = N_HOURS * time_steps_per_hour.get() as usize;
    let step = step_duration(time_steps_per_hour);

    let mut months = MONTH_NAMES.map(|month| MonthlyEnergy { month, ..MonthlyEnergy::default() });
    let mut accumulate = |flows: &[Flow], field: fn(&mut MonthlyEnergy) -> &mut KilowattHours| {
        for flow in flows {
            for (i, power) in results.series(*flow).into_iter().enumerate() {
                let Some(month) = month_of(i, steps_per_day) else {
                    break;
                };
                *field(&mut months[month]) += Kilowatts::from(power).denoise() * step;
            }
        }
    };
    accumulate(&[Flow::SolarToLoad, Flow::SolarExport, Flow::SolarToBess], |month| {
        &mut month.pv_total
    });
    accumulate(&[Flow::BessToLoad, Flow::BessExport], |month| &mut month.bess_discharge);
    accumulate(&[Flow::GensetToLoad], |month| &mut month.generator);
    accumulate(&[Flow::ChpToLoad], |month| &mut month.chp);
    months.into()
}
