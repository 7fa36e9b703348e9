//! Atlantic Multidecadal Oscillation (AMO) index
//!
//! Computes the AMO index following Enfield et al. (2001): sea-surface
//! temperature averaged over the North Atlantic (0-70°N, 75°W-5°E),
//! deseasonalized and linearly detrended.
//!
//! # Module Organisation
//!
//! - [`validation`]: shape checks between SST data, time axis and coordinates
//! - [`reduce`]: unweighted or area-weighted regional averaging
//! - [`deseason`]: climatology estimation and removal
//! - [`detrend`]: final least-squares detrend
//! - [`pipeline`]: [`AmoPipeline`] and the [`compute_amo_index`] shortcut
//! - [`config`]: [`AmoConfig`] with defaults matching the AMO definition
//!
//! Missing observations are `None` throughout and propagate to the output
//! rather than being replaced or dropped, so the index always has one value
//! per input time step.
//!
//! # Examples
//!
//! ```rust
//! use amo::{compute_amo_index, CoordinateGrid, SstData};
//! use ndarray::{Array2, Array3};
//!
//! let (rows, cols) = (8, 10);
//! let lat = Array2::from_shape_fn((rows, cols), |(i, _)| -10.0 + 10.0 * i as f64);
//! let lon = Array2::from_shape_fn((rows, cols), |(_, j)| -90.0 + 10.0 * j as f64);
//!
//! let dates: Vec<(i32, u32, u32)> = (2000..2005)
//!     .flat_map(|y| (1..=12).map(move |m| (y, m, 1)))
//!     .collect();
//! let sst = Array3::from_shape_fn((rows, cols, dates.len()), |(i, _, t)| {
//!     25.0 - 0.3 * i as f64 + (t % 12) as f64 * 0.1
//! });
//!
//! let index = compute_amo_index(
//!     &SstData::from_nan_array(&sst),
//!     dates,
//!     Some(&CoordinateGrid::new(lat, lon)),
//! )
//! .unwrap();
//! assert_eq!(index.len(), 60);
//! ```

pub mod config;
pub mod deseason;
pub mod detrend;
pub mod field;
pub mod pipeline;
pub mod reduce;
pub mod validation;

pub use amo_core::{errors, grid, time, timeseries, utils};

pub use config::{AmoConfig, SeasonalPhase, TrendAxis};
pub use errors::{AmoError, AmoResult};
pub use field::{CoordinateGrid, SstData, SstField};
pub use pipeline::{compute_amo_index, AmoIndex, AmoPipeline};
