use serde_json::{Map, Value};

/// Smallest magnitude that still counts as a real sample.
const SIGNIFICANT: f64 = 1e-9;

/// Read a JSON array as a series. Entries that are not finite numbers read as zero.
#[must_use]
pub fn as_series(value: &Value) -> Option<Vec<f64>> {
    let items = value.as_array()?;
    Some(
        items
            .iter()
            .map(|item| item.as_f64().filter(|value| value.is_finite()).unwrap_or_default())
            .collect(),
    )
}

#[must_use]
pub fn is_significant(series: &[f64]) -> bool {
    series.iter().any(|value| value.abs() > SIGNIFICANT)
}

/// Take the first candidate with real data, else the first candidate that exists at all.
#[must_use]
pub fn pick_first_significant(candidates: impl IntoIterator<Item = Vec<f64>>) -> Option<Vec<f64>> {
    let mut fallback = None;
    for series in candidates {
        if is_significant(&series) {
            return Some(series);
        }
        fallback.get_or_insert(series);
    }
    fallback
}

/// Find the series stored under one of the alias keys.
///
/// An all-zero array under an earlier key does not mask real data under a later one.
/// Returns an empty series when none of the keys is present.
#[must_use]
pub fn pick(container: &Map<String, Value>, candidate_keys: &[&str]) -> Vec<f64> {
    pick_first_significant(
        candidate_keys.iter().filter_map(|key| container.get(*key)).filter_map(as_series),
    )
    .unwrap_or_default()
}
