use std::{collections::BTreeMap, num::NonZeroU32};

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::prelude::*;

pub const N_MONTHS: usize = 12;
pub const N_HOURS: usize = 24;

/// Time-of-use period number, counted from 1.
///
/// Raw value `0` is the «unassigned» sentinel and never becomes a period.
#[derive(
    Copy,
    Clone,
    Debug,
    Deserialize,
    Eq,
    Hash,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
    derive_more::Display,
)]
#[serde(transparent)]
pub struct PeriodIndex(NonZeroU32);

impl PeriodIndex {
    #[must_use]
    pub const fn new(value: u32) -> Option<Self> {
        match NonZeroU32::new(value) {
            Some(value) => Some(Self(value)),
            None => None,
        }
    }

    /// Period stored at the given position of a rate structure.
    #[must_use]
    pub fn from_position(position: usize) -> Self {
        Self(NonZeroU32::MIN.saturating_add(u32::try_from(position).unwrap_or(u32::MAX)))
    }

    #[must_use]
    pub const fn get(self) -> u32 {
        self.0.get()
    }

    /// Position of the period in a rate structure.
    #[must_use]
    pub const fn position(self) -> usize {
        (self.0.get() - 1) as usize
    }
}

/// How the raw schedule matrices number their periods.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, clap::ValueEnum)]
pub enum PeriodNumbering {
    /// Values are period numbers, `0` means «unassigned».
    #[default]
    OneBased,

    /// Values are rate structure positions as in raw URDB documents.
    ZeroBased,
}

impl PeriodNumbering {
    const fn canonical(self, value: u32) -> u32 {
        match self {
            Self::OneBased => value,
            Self::ZeroBased => value.saturating_add(1),
        }
    }
}

pub type MonthRow = [u32; N_HOURS];

/// 12 × 24 period matrix. Months whose raw row was malformed or absent are `None`.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct ScheduleMatrix([Option<MonthRow>; N_MONTHS]);

impl ScheduleMatrix {
    /// Build the matrix from raw month rows, dropping every row which is not exactly
    /// 24 non-negative integers. Rows past the twelfth are ignored.
    pub fn from_raw<R: AsRef<[f64]>>(rows: &[Option<R>], numbering: PeriodNumbering) -> Self {
        let mut months = [None; N_MONTHS];
        for (month, row) in rows.iter().take(N_MONTHS).enumerate() {
            let parsed = row.as_ref().and_then(|row| parse_row(row.as_ref(), numbering));
            if row.is_some() && parsed.is_none() {
                debug!(month, "dropping malformed schedule row");
            }
            months[month] = parsed;
        }
        Self(months)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.iter().all(Option::is_none)
    }

    /// Iterate over the populated months.
    pub fn rows(&self) -> impl Iterator<Item = (usize, &MonthRow)> {
        self.0.iter().enumerate().filter_map(|(month, row)| row.as_ref().map(|row| (month, row)))
    }

    /// Hours of the given month assigned to each period.
    #[must_use]
    pub fn month_hours(&self, month: usize) -> HourMap {
        self.0
            .get(month)
            .and_then(Option::as_ref)
            .map(|row| collect_hour_map(row_assignments(row)))
            .unwrap_or_default()
    }
}

fn parse_row(row: &[f64], numbering: PeriodNumbering) -> Option<MonthRow> {
    if row.len() != N_HOURS {
        return None;
    }
    let mut parsed = [0; N_HOURS];
    for (slot, value) in parsed.iter_mut().zip(row) {
        if !(value.fract() == 0.0 && (0.0..=f64::from(u32::MAX)).contains(value)) {
            return None;
        }
        #[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let value = *value as u32;
        *slot = numbering.canonical(value);
    }
    Some(parsed)
}

/// Period → sorted, de-duplicated hours of the day.
pub type HourMap = BTreeMap<PeriodIndex, Vec<u8>>;

fn row_assignments(row: &MonthRow) -> impl Iterator<Item = (PeriodIndex, u8)> + '_ {
    (0..).zip(row).filter_map(|(hour, value)| Some((PeriodIndex::new(*value)?, hour)))
}

fn collect_hour_map(assignments: impl Iterator<Item = (PeriodIndex, u8)>) -> HourMap {
    assignments
        .into_group_map()
        .into_iter()
        .map(|(period, hours)| (period, hours.into_iter().sorted_unstable().dedup().collect()))
        .collect()
}

/// Union of the hours each period occupies across all populated months.
#[must_use]
pub fn build_hour_map(matrix: &ScheduleMatrix) -> HourMap {
    collect_hour_map(matrix.rows().flat_map(|(_, row)| row_assignments(row)))
}
