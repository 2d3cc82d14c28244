use std::{collections::BTreeMap, ops::RangeInclusive};

use itertools::Itertools;
use serde::Serialize;

use crate::{
    fmt::MonthSpan,
    tariff::{
        classify::{Classification, PeriodTable},
        schedule::{N_MONTHS, ScheduleMatrix},
    },
};

#[derive(Clone, Debug, Default, Eq, Hash, PartialEq, Serialize)]
pub struct HourSets {
    pub weekday_hours: Vec<u8>,
    pub weekend_hours: Vec<u8>,
}

/// Hours each classification covers within one month.
pub type MonthSignature = BTreeMap<Classification, HourSets>;

/// Contiguous inclusive month span sharing one signature.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Season<S> {
    /// 0-based, inclusive.
    pub start: usize,

    /// 0-based, inclusive.
    pub end: usize,

    pub detail: S,
}

impl<S> Season<S> {
    #[must_use]
    pub const fn months(&self) -> RangeInclusive<usize> {
        self.start..=self.end
    }

    #[must_use]
    pub const fn n_months(&self) -> usize {
        self.end - self.start + 1
    }

    #[must_use]
    pub const fn span(&self) -> MonthSpan {
        MonthSpan(self.months())
    }
}

/// Walk the months in order, opening a new season whenever the signature changes.
///
/// December and January are never merged, even with equal signatures.
pub fn segment_seasons<S: PartialEq + Clone>(signatures: &[S]) -> Vec<Season<S>> {
    signatures
        .iter()
        .enumerate()
        .chunk_by(|(_, signature)| *signature)
        .into_iter()
        .filter_map(|(signature, chunk)| {
            let (start, end) = chunk.map(|(month, _)| month).minmax().into_option()?;
            Some(Season { start, end, detail: signature.clone() })
        })
        .collect()
}

/// Per-month signatures of the labelled periods.
#[must_use]
pub fn month_signatures<R>(
    periods: &PeriodTable<R>,
    weekday: &ScheduleMatrix,
    weekend: &ScheduleMatrix,
) -> [MonthSignature; N_MONTHS] {
    std::array::from_fn(|month| {
        let mut signature = MonthSignature::new();
        for (period, hours) in weekday.month_hours(month) {
            if let Some(label) = periods.get(&period).and_then(|info| info.label) {
                signature.entry(label).or_default().weekday_hours.extend(hours);
            }
        }
        for (period, hours) in weekend.month_hours(month) {
            if let Some(label) = periods.get(&period).and_then(|info| info.label) {
                signature.entry(label).or_default().weekend_hours.extend(hours);
            }
        }
        for sets in signature.values_mut() {
            sets.weekday_hours.sort_unstable();
            sets.weekend_hours.sort_unstable();
        }
        signature
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        quantity::rate::KilowattHourRate,
        tariff::{
            classify::PeriodInfo,
            schedule::{N_HOURS, PeriodIndex, PeriodNumbering},
        },
    };

    #[test]
    fn test_identical_signatures_make_one_season() {
        let seasons = segment_seasons(&["same"; 12]);
        assert_eq!(seasons.len(), 1);
        assert_eq!(seasons[0].months(), 0..=11);
    }

    #[test]
    fn test_distinct_signatures_make_singletons() {
        let signatures = (0..12).map(|month| format!("month-{month}")).collect_vec();
        let seasons = segment_seasons(&signatures);
        assert_eq!(seasons.len(), 12);
        assert!(seasons.iter().enumerate().all(|(i, season)| season.months() == (i..=i)));
    }

    #[test]
    fn test_no_wraparound_merge() {
        let signatures = ["w", "w", "s", "s", "s", "s", "s", "s", "s", "w", "w", "w"];
        let seasons = segment_seasons(&signatures);
        assert_eq!(
            seasons.iter().map(|season| (season.start, season.end, season.detail)).collect_vec(),
            vec![(0, 1, "w"), (2, 8, "s"), (9, 11, "w")],
        );
        assert_eq!(seasons[1].n_months(), 7);
        assert_eq!(seasons[1].span().to_string(), "Mar-Sep");
    }

    #[test]
    fn test_month_signatures_follow_labels() {
        let winter = vec![1.0; N_HOURS];
        let summer = (0..N_HOURS).map(|hour| if hour >= 16 { 2.0 } else { 1.0 }).collect_vec();
        let rows = (0..N_MONTHS)
            .map(|month| if (5..=8).contains(&month) { summer.clone() } else { winter.clone() })
            .map(Some)
            .collect_vec();
        let weekday = ScheduleMatrix::from_raw(&rows, PeriodNumbering::OneBased);
        let weekend = ScheduleMatrix::default();

        let info = |rate: f64, label| PeriodInfo {
            weekday_hours: Vec::new(),
            weekend_hours: Vec::new(),
            first_tier_rate: Some(KilowattHourRate::from(rate)),
            label: Some(label),
        };
        let periods = PeriodTable::from([
            (PeriodIndex::new(1).unwrap(), info(0.1, Classification::OffPeak)),
            (PeriodIndex::new(2).unwrap(), info(0.4, Classification::Peak)),
        ]);

        let signatures = month_signatures(&periods, &weekday, &weekend);
        assert_eq!(signatures[0].len(), 1);
        assert_eq!(signatures[6][&Classification::Peak].weekday_hours, (16..24_u8).collect_vec());
        assert!(signatures[6][&Classification::Peak].weekend_hours.is_empty());

        let seasons = segment_seasons(&signatures);
        assert_eq!(
            seasons.iter().map(Season::months).collect_vec(),
            vec![0..=4, 5..=8, 9..=11],
        );
    }
}
