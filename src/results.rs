//! Optimizer result resampling: series lookup, day windows and chart-ready points.

pub mod compose;
pub mod document;
pub mod flow;
pub mod locate;
pub mod monthly;
pub mod slice;

pub use self::{
    compose::{Composer, DEFAULT_ANALYSIS_YEAR, Overlay, TimeSeriesPoint, resample},
    document::OptimizerResults,
    flow::{Flow, Section},
    locate::pick,
    monthly::{MonthlyEnergy, monthly_rollup},
    slice::Window,
};
