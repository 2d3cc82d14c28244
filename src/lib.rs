#![allow(clippy::doc_markdown)]
#![doc = include_str!("../README.md")]

pub mod fmt;
pub mod prelude;
pub mod quantity;
pub mod results;
pub mod tables;
pub mod tariff;
