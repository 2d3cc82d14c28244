use std::{num::NonZeroU32, ops::Range};

use bon::Builder;
use chrono::TimeDelta;

use crate::tariff::schedule::N_HOURS;

const NANOS_PER_SECOND: u128 = 1_000_000_000;
const NANOS_PER_HOUR: u128 = 3600 * NANOS_PER_SECOND;

/// Duration of one time step, to the nanosecond.
#[must_use]
pub fn step_duration(time_steps_per_hour: NonZeroU32) -> TimeDelta {
    TimeDelta::nanoseconds(3_600_000_000_000 / i64::from(time_steps_per_hour.get()))
}

/// Contiguous run of whole days at a fixed sub-hourly resolution.
#[derive(Copy, Clone, Debug, Builder, Eq, PartialEq)]
pub struct Window {
    /// 0-based day of the year.
    pub day_index: usize,

    #[builder(default = 1)]
    pub n_days: usize,

    #[builder(default = NonZeroU32::MIN)]
    pub time_steps_per_hour: NonZeroU32,
}

impl Window {
    #[must_use]
    pub const fn steps_per_day(&self) -> usize {
        N_HOURS * self.time_steps_per_hour.get() as usize
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.steps_per_day().saturating_mul(self.n_days)
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Global step indices the window covers.
    #[must_use]
    pub const fn steps(&self) -> Range<usize> {
        let start = self.day_index.saturating_mul(self.steps_per_day());
        start..start.saturating_add(self.len())
    }

    /// Whether the window starts past the end of a series of `n_steps` samples.
    #[must_use]
    pub const fn starts_after(&self, n_steps: usize) -> bool {
        self.steps().start >= n_steps
    }

    /// Fractional hour of the day for the window's `i`-th step.
    #[must_use]
    pub fn hour_of_day(&self, i: usize) -> f64 {
        #[expect(clippy::cast_precision_loss)]
        let step = (i % self.steps_per_day()) as f64;
        step / f64::from(self.time_steps_per_hour.get())
    }

    /// Offset of the window's `i`-th step from the start of the year, computed from the global
    /// step index so that it never drifts. `None` when it does not fit a [`TimeDelta`].
    #[must_use]
    pub fn offset(&self, i: usize) -> Option<TimeDelta> {
        let step = self.steps().start.saturating_add(i) as u128;
        let nanos = step.checked_mul(NANOS_PER_HOUR)? / u128::from(self.time_steps_per_hour.get());
        let seconds = i64::try_from(nanos / NANOS_PER_SECOND).ok()?;
        let subsec_nanos = u32::try_from(nanos % NANOS_PER_SECOND).ok()?;
        TimeDelta::new(seconds, subsec_nanos)
    }

    /// Cut the window out of the series, zero-filling whatever lies past its end.
    #[must_use]
    pub fn slice(&self, series: &[f64]) -> Vec<f64> {
        let steps = self.steps();
        let available = series.get(steps.start.min(series.len())..steps.end.min(series.len()));
        let mut window = available.unwrap_or_default().to_vec();
        window.resize(self.len(), 0.0);
        window
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    fn quarter_hourly(day_index: usize) -> Window {
        Window::builder()
            .day_index(day_index)
            .time_steps_per_hour(NonZeroU32::new(4).unwrap())
            .build()
    }

    #[test]
    fn test_steps() {
        let window = quarter_hourly(1);
        assert_eq!(window.steps_per_day(), 96);
        assert_eq!(window.steps(), 96..192);
        assert_eq!(window.len(), 96);
    }

    #[test]
    fn test_slice_zero_fills_tail() {
        let window = Window::builder().day_index(1).build();
        let series = (0..30).map(f64::from).collect::<Vec<_>>();
        let sliced = window.slice(&series);
        assert_eq!(sliced.len(), 24);
        assert_eq!(sliced[..6], [24.0, 25.0, 26.0, 27.0, 28.0, 29.0]);
        assert!(sliced[6..].iter().all(|value| *value == 0.0));
    }

    #[test]
    fn test_slice_beyond_data() {
        let window = Window::builder().day_index(400).n_days(2).build();
        assert!(window.starts_after(8760));
        assert_eq!(window.slice(&[1.0; 8760]), vec![0.0; 48]);
        assert_eq!(window.slice(&[]), vec![0.0; 48]);
    }

    #[test]
    fn test_hour_of_day() {
        let window = quarter_hourly(0);
        assert_abs_diff_eq!(window.hour_of_day(1), 0.25);
        assert_abs_diff_eq!(window.hour_of_day(95), 23.75);

        let two_days = Window::builder().day_index(0).n_days(2).build();
        assert_abs_diff_eq!(two_days.hour_of_day(25), 1.0);
    }

    #[test]
    fn test_offset_does_not_drift() {
        let seven = NonZeroU32::new(7).unwrap();
        let day = |day_index| {
            Window::builder().day_index(day_index).time_steps_per_hour(seven).build()
        };
        assert_eq!(day(1).offset(0), Some(TimeDelta::days(1)));
        assert_eq!(day(364).offset(0), Some(TimeDelta::days(364)));
        assert_eq!(day(0).offset(7), Some(TimeDelta::hours(1)));
        assert_eq!(quarter_hourly(0).offset(1), Some(TimeDelta::minutes(15)));
    }

    #[test]
    fn test_offset_overflow() {
        assert_eq!(quarter_hourly(usize::MAX).offset(0), None);
        assert_eq!(quarter_hourly(30_000_000).offset(0), Some(TimeDelta::days(30_000_000)));
    }

    #[test]
    fn test_step_duration() {
        assert_eq!(step_duration(NonZeroU32::new(4).unwrap()), TimeDelta::minutes(15));
        let seventh = step_duration(NonZeroU32::new(7).unwrap());
        assert_eq!(seventh.num_nanoseconds(), Some(514_285_714_285));
    }
}
