use std::{
    fmt::{Debug, Display, Formatter},
    ops::RangeInclusive,
};

pub const MONTH_NAMES: [&str; 12] =
    ["Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec"];

/// Compressed display of a sorted hour-of-day list, for example `6-9, 14`.
///
/// A single hour renders bare. Longer runs render as `start-end` where `end` is the hour
/// *after* the last included one, so `[6, 7, 8]` reads `6-9`.
pub struct HourRanges<'a>(pub &'a [u8]);

impl HourRanges<'_> {
    fn runs(&self) -> Vec<RangeInclusive<u8>> {
        let mut runs: Vec<RangeInclusive<u8>> = Vec::new();
        for &hour in self.0 {
            if let Some(run) = runs.last_mut()
                && u16::from(hour) <= u16::from(*run.end()) + 1
            {
                if hour > *run.end() {
                    *run = *run.start()..=hour;
                }
                continue;
            }
            runs.push(hour..=hour);
        }
        runs
    }
}

impl Display for HourRanges<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for (i, run) in self.runs().into_iter().enumerate() {
            if i != 0 {
                write!(f, ", ")?;
            }
            if run.start() == run.end() {
                write!(f, "{}", run.start())?;
            } else {
                write!(f, "{}-{}", run.start(), u16::from(*run.end()) + 1)?;
            }
        }
        Ok(())
    }
}

impl Debug for HourRanges<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(self, f)
    }
}

#[must_use]
pub fn hours_to_ranges(hours: &[u8]) -> String {
    HourRanges(hours).to_string()
}

/// Inclusive 0-based month span, rendered like `Jun-Sep`.
pub struct MonthSpan(pub RangeInclusive<usize>);

impl Display for MonthSpan {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = |month: usize| MONTH_NAMES.get(month).copied().unwrap_or("?");
        if self.0.start() == self.0.end() {
            write!(f, "{}", name(*self.0.start()))
        } else {
            write!(f, "{}-{}", name(*self.0.start()), name(*self.0.end()))
        }
    }
}
