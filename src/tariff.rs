//! Utility rate decoding: hour maps, period labels, seasons and tier rates.

pub mod classify;
pub mod decode;
pub mod document;
pub mod schedule;
pub mod season;
pub mod tier;

pub use self::{
    classify::{Classification, PeriodInfo, PeriodTable},
    decode::{SideDecoding, TariffDecoding, decode},
    document::{RateSchedule, TariffDocument},
    schedule::{HourMap, PeriodIndex, PeriodNumbering, ScheduleMatrix},
    season::{MonthSignature, Season},
    tier::{StructureSource, Tier, TierRow},
};
