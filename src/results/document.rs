use std::num::NonZeroU32;

use itertools::Itertools;
use serde_json::{Map, Value};

use crate::{
    prelude::*,
    results::{
        flow::{Flow, Section},
        locate::pick,
    },
    tariff::schedule::N_HOURS,
};

/// Nominal number of hours in the optimized year.
pub const HOURS_PER_YEAR: usize = 8760;

/// Optimizer output with the API envelopes peeled off.
#[derive(Clone, Debug, Default)]
pub struct OptimizerResults {
    /// Technology sections keyed by name.
    sections: Map<String, Value>,

    /// Resolution declared by the document, if any.
    time_steps_per_hour: Option<NonZeroU32>,

    /// Errors the optimizer reported instead of solving.
    errors: Vec<String>,
}

impl OptimizerResults {
    /// Envelopes tried from the most to the least specific.
    const SITE_POINTERS: [&'static str; 3] = ["/outputs/Scenario/Site", "/outputs", ""];

    const RESOLUTION_POINTERS: [&'static str; 4] = [
        "/Settings/time_steps_per_hour",
        "/inputs/Settings/time_steps_per_hour",
        "/inputs/Scenario/time_steps_per_hour",
        "/outputs/Scenario/time_steps_per_hour",
    ];

    const ERROR_POINTERS: [&'static str; 2] = ["/Messages/errors", "/outputs/Messages/errors"];

    pub fn from_json(json: &str) -> Result<Self> {
        let root: Value = serde_json::from_str(json).context("failed to parse optimizer results")?;
        Self::from_value(root)
    }

    pub fn from_value(root: Value) -> Result<Self> {
        ensure!(root.is_object(), "optimizer results must be a JSON object");

        let time_steps_per_hour = Self::RESOLUTION_POINTERS
            .iter()
            .filter_map(|pointer| root.pointer(pointer))
            .find_map(|value| {
                let resolution = value.as_u64().and_then(|value| u32::try_from(value).ok());
                let resolution = resolution.and_then(NonZeroU32::new);
                if resolution.is_none() {
                    debug!(%value, "ignoring unusable time resolution");
                }
                resolution
            });

        let sections = Self::SITE_POINTERS
            .iter()
            .filter_map(|pointer| root.pointer(pointer))
            .filter_map(Value::as_object)
            .find(|object| looks_like_site(object))
            .cloned()
            .or_else(|| root.as_object().cloned())
            .unwrap_or_default();
        let errors = Self::ERROR_POINTERS
            .iter()
            .filter_map(|pointer| root.pointer(pointer))
            .filter_map(Value::as_array)
            .flatten()
            .map(render_error)
            .collect::<Vec<_>>();
        debug!(
            n_sections = sections.len(),
            ?time_steps_per_hour,
            n_errors = errors.len(),
            "loaded optimizer results",
        );

        Ok(Self { sections, time_steps_per_hour, errors })
    }

    /// Errors reported by the optimizer, one message per entry.
    #[must_use]
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// Declared resolution, `1` when the document is silent.
    #[must_use]
    pub fn time_steps_per_hour(&self) -> NonZeroU32 {
        self.time_steps_per_hour.unwrap_or(NonZeroU32::MIN)
    }

    /// Section objects under the first present alias. Several sites of one technology
    /// (for example a list of PV arrays) yield several objects.
    #[must_use]
    pub fn section(&self, section: Section) -> Vec<&Map<String, Value>> {
        let Some(value) = section.aliases().iter().find_map(|alias| self.sections.get(*alias))
        else {
            return Vec::new();
        };
        match value {
            Value::Object(object) => vec![object],
            Value::Array(items) => items.iter().filter_map(Value::as_object).collect(),
            _ => Vec::new(),
        }
    }

    /// Full-year series of the flow, summed across sites. Empty when absent.
    #[must_use]
    pub fn series(&self, flow: Flow) -> Vec<f64> {
        let series = self
            .section(flow.section())
            .into_iter()
            .map(|section| pick(section, flow.keys()))
            .reduce(|mut total, series| {
                if total.len() < series.len() {
                    total.resize(series.len(), 0.0);
                }
                total.iter_mut().zip(series).for_each(|(total, value)| *total += value);
                total
            })
            .unwrap_or_default();
        if series.is_empty() {
            debug!(?flow, "series is absent, it reads as all-zero");
        }
        series
    }

    /// Last selectable day, judging by the load length.
    #[must_use]
    pub fn max_day_index(&self, time_steps_per_hour: NonZeroU32) -> usize {
        let steps_per_day = N_HOURS * time_steps_per_hour.get() as usize;
        let n_steps = match self.series(Flow::Load).len() {
            0 => HOURS_PER_YEAR * time_steps_per_hour.get() as usize,
            n_steps => n_steps,
        };
        (n_steps / steps_per_day).saturating_sub(1)
    }
}

/// An error entry is either a message or a list of trace lines.
fn render_error(error: &Value) -> String {
    match error {
        Value::String(message) => message.clone(),
        Value::Array(lines) => lines
            .iter()
            .map(|line| line.as_str().map_or_else(|| line.to_string(), str::to_owned))
            .join("\n"),
        _ => error.to_string(),
    }
}

fn looks_like_site(object: &Map<String, Value>) -> bool {
    object.keys().any(|key| {
        [Section::ElectricLoad, Section::Pv, Section::ElectricStorage, Section::ElectricUtility]
            .iter()
            .any(|section| section.aliases().contains(&key.as_str()))
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_unwrap_current_envelope() -> Result {
        let results = OptimizerResults::from_value(json!({
            "inputs": {"Settings": {"time_steps_per_hour": 4}},
            "outputs": {"ElectricLoad": {"load_series_kw": [1, 2, 3]}},
        }))?;
        assert_eq!(results.time_steps_per_hour().get(), 4);
        assert_eq!(results.series(Flow::Load), vec![1.0, 2.0, 3.0]);
        Ok(())
    }

    #[test]
    fn test_unwrap_legacy_envelope() -> Result {
        let results = OptimizerResults::from_value(json!({
            "outputs": {"Scenario": {"Site": {
                "LoadProfile": {"year_one_electric_load_series_kw": [5, 5]},
                "Storage": {"year_one_to_load_series_kw": [0, 1]},
            }}},
        }))?;
        assert_eq!(results.time_steps_per_hour().get(), 1);
        assert_eq!(results.series(Flow::Load), vec![5.0, 5.0]);
        assert_eq!(results.series(Flow::BessToLoad), vec![0.0, 1.0]);
        assert!(results.series(Flow::SolarToLoad).is_empty());
        Ok(())
    }

    #[test]
    fn test_bare_document() -> Result {
        let results = OptimizerResults::from_value(json!({
            "Settings": {"time_steps_per_hour": 0},
            "PV": [
                {"electric_to_load_series_kw": [1, 1, 1]},
                {"electric_to_load_series_kw": [2, 2]},
            ],
        }))?;
        assert_eq!(results.time_steps_per_hour().get(), 1);
        assert_eq!(results.series(Flow::SolarToLoad), vec![3.0, 3.0, 1.0]);
        Ok(())
    }

    #[test]
    fn test_reported_errors() -> Result {
        let results = OptimizerResults::from_value(json!({
            "Messages": {"errors": [
                "infeasible problem",
                ["MethodError: no method matching", "  at solve.jl:42"],
                {"code": 7},
            ]},
            "outputs": {"Messages": {"errors": ["precompilation failed"]}},
        }))?;
        assert_eq!(
            results.errors(),
            [
                "infeasible problem",
                "MethodError: no method matching\n  at solve.jl:42",
                r#"{"code":7}"#,
                "precompilation failed",
            ],
        );
        Ok(())
    }

    #[test]
    fn test_no_errors() -> Result {
        let results = OptimizerResults::from_value(json!({
            "Messages": {"errors": [], "warnings": ["slow solve"]},
            "ElectricLoad": {"load_series_kw": [1]},
        }))?;
        assert!(results.errors().is_empty());
        Ok(())
    }

    #[test]
    fn test_rejects_non_object() {
        assert!(OptimizerResults::from_value(json!([1, 2, 3])).is_err());
        assert!(OptimizerResults::from_json("not json").is_err());
    }

    #[test]
    fn test_max_day_index() -> Result {
        let results = OptimizerResults::from_value(json!({
            "ElectricLoad": {"load_series_kw": vec![1.0; 35040]},
        }))?;
        let four = NonZeroU32::new(4).unwrap();
        assert_eq!(results.max_day_index(four), 364);
        assert_eq!(results.max_day_index(NonZeroU32::MIN), 1459);
        assert_eq!(OptimizerResults::default().max_day_index(four), 364);
        Ok(())
    }
}
