//! Core primitives for computing regional sea-surface-temperature indices
//!
//! - [`time`]: normalising heterogeneous date representations to day numbers
//! - [`grid`]: bounding-box regions, region masks and grid-cell areas
//! - [`utils::regression`]: least-squares line fits over series with gaps
//! - [`timeseries`]: the missing-aware [`timeseries::Sample`] type

pub mod grid;
pub mod time;
pub mod timeseries;
pub mod utils;

pub mod errors;
