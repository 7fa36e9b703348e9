//! Spatial reduction of an SST field to a single regional series
//!
//! Two cases are supported:
//!
//! - without coordinates every cell is averaged with equal weight
//! - with coordinates only cells inside the configured region count, each
//!   weighted by its surface area
//!
//! In both cases missing cells drop out of the numerator and the weight sum,
//! and a time step with no usable cells is missing in the result.
//!
//! ```rust
//! use amo::config::AmoConfig;
//! use amo::field::{GridCoordinates, SstField};
//! use amo::reduce::reduce;
//! use ndarray::{array, Array3};
//!
//! // Three cells along a meridian, only the middle one inside the AMO box
//! let values =
//!     Array3::from_shape_vec((3, 1, 1), vec![Some(10.0), Some(20.0), Some(30.0)]).unwrap();
//! let field = SstField::Grid {
//!     values,
//!     coordinates: Some(GridCoordinates {
//!         lat: array![[-5.0], [35.0], [85.0]],
//!         lon: array![[-40.0], [-40.0], [-40.0]],
//!     }),
//! };
//!
//! let reduced = reduce(&field, &AmoConfig::default()).unwrap();
//! assert!((reduced[0].unwrap() - 20.0).abs() < 1e-12);
//! ```

use crate::config::AmoConfig;
use crate::field::SstField;
use amo_core::errors::AmoResult;
use amo_core::grid::{grid_cell_area, region_mask};
use amo_core::timeseries::{FloatValue, Sample};
use log::{debug, warn};
use ndarray::{Array1, Array2, Array3, ArrayView2, Axis, Zip};

/// Cells taking part in the average and their weights
#[derive(Debug, Clone, PartialEq)]
pub struct RegionWeights {
    pub mask: Array2<bool>,
    pub weights: Array2<FloatValue>,
}

impl RegionWeights {
    /// Every cell included with equal weight
    pub fn uniform(shape: (usize, usize)) -> Self {
        Self {
            mask: Array2::from_elem(shape, true),
            weights: Array2::ones(shape),
        }
    }

    /// Cells inside the configured region, weighted by area
    pub fn for_region(
        lat: &Array2<FloatValue>,
        lon: &Array2<FloatValue>,
        config: &AmoConfig,
    ) -> AmoResult<Self> {
        Ok(Self {
            mask: region_mask(lat.view(), lon.view(), &config.region)?,
            weights: grid_cell_area(lat.view(), lon.view(), config.earth_radius)?,
        })
    }

    /// Number of cells inside the mask
    pub fn n_cells(&self) -> usize {
        self.mask.iter().filter(|&&inside| inside).count()
    }
}

/// Weighted mean of one time slice over masked, non-missing cells
fn reduce_step(values: ArrayView2<Sample>, region: &RegionWeights) -> Sample {
    let mut sum = 0.0;
    let mut weight_sum = 0.0;

    Zip::from(values)
        .and(&region.mask)
        .and(&region.weights)
        .for_each(|value, &inside, &weight| {
            if let (true, Some(v)) = (inside, value) {
                if weight.is_finite() && weight > 0.0 {
                    sum += weight * v;
                    weight_sum += weight;
                }
            }
        });

    (weight_sum > 0.0).then(|| sum / weight_sum)
}

/// Reduce every time step of a (rows, cols, time) field
#[cfg(not(feature = "parallel"))]
pub fn reduce_field(values: &Array3<Sample>, region: &RegionWeights) -> Array1<Sample> {
    values
        .axis_iter(Axis(2))
        .map(|slice| reduce_step(slice, region))
        .collect()
}

/// Reduce every time step of a (rows, cols, time) field
#[cfg(feature = "parallel")]
pub fn reduce_field(values: &Array3<Sample>, region: &RegionWeights) -> Array1<Sample> {
    use rayon::prelude::*;

    let reduced: Vec<Sample> = (0..values.len_of(Axis(2)))
        .into_par_iter()
        .map(|t| reduce_step(values.index_axis(Axis(2), t), region))
        .collect();
    Array1::from(reduced)
}

/// Reduce a validated field to its regional series.
///
/// A 1-D series is returned unchanged.
pub fn reduce(field: &SstField, config: &AmoConfig) -> AmoResult<Array1<Sample>> {
    let (values, coordinates) = match field {
        SstField::Series(series) => {
            debug!("SST is already a series of {} steps", series.len());
            return Ok(series.clone());
        }
        SstField::Grid {
            values,
            coordinates,
        } => (values, coordinates),
    };

    let (rows, cols, steps) = values.dim();
    let region = match coordinates {
        None => {
            debug!(
                "Averaging all {}x{} cells without weights over {} steps",
                rows, cols, steps
            );
            RegionWeights::uniform((rows, cols))
        }
        Some(coordinates) => {
            let region = RegionWeights::for_region(&coordinates.lat, &coordinates.lon, config)?;
            let n_cells = region.n_cells();
            if n_cells == 0 {
                warn!(
                    "No grid cells fall inside region {:?}; every reduced value will be missing",
                    config.region
                );
            } else {
                debug!(
                    "Area-weighted average over {} of {} cells over {} steps",
                    n_cells,
                    rows * cols,
                    steps
                );
            }
            region
        }
    };

    Ok(reduce_field(values, &region))
}
