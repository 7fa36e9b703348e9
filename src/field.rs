//! Input containers for SST data and coordinate grids
//!
//! [`SstData`] and [`CoordinateGrid`] accept arrays of any dimensionality so
//! that malformed inputs (a 2-D SST array, 1-D coordinate vectors) can be
//! represented and rejected explicitly by
//! [`validate_inputs`](crate::validation::validate_inputs). Validation turns
//! them into an [`SstField`], whose shapes are checked and fixed.

use amo_core::timeseries::{samples_from_nan_array, FloatValue, Sample};
use ndarray::{Array, Array1, Array2, Array3, ArrayD, Dimension};

/// Raw SST observations as supplied by the caller
#[derive(Debug, Clone, PartialEq)]
pub struct SstData(ArrayD<Sample>);

impl SstData {
    pub fn new<D: Dimension>(values: Array<Sample, D>) -> Self {
        Self(values.into_dyn())
    }

    /// Build from raw floats, treating NaN and infinities as missing
    pub fn from_nan_array<D: Dimension>(values: &Array<FloatValue, D>) -> Self {
        Self(samples_from_nan_array(values).into_dyn())
    }

    pub fn shape(&self) -> &[usize] {
        self.0.shape()
    }

    pub fn ndim(&self) -> usize {
        self.0.ndim()
    }

    pub fn values(&self) -> &ArrayD<Sample> {
        &self.0
    }
}

impl<D: Dimension> From<Array<Sample, D>> for SstData {
    fn from(values: Array<Sample, D>) -> Self {
        Self::new(values)
    }
}

/// Latitude and longitude of every spatial cell of the SST field
///
/// Latitude and longitude always travel together. Both must be 2-D meshes
/// with the spatial shape of the field; this is checked during validation.
#[derive(Debug, Clone, PartialEq)]
pub struct CoordinateGrid {
    lat: ArrayD<FloatValue>,
    lon: ArrayD<FloatValue>,
}

impl CoordinateGrid {
    pub fn new<D1: Dimension, D2: Dimension>(
        lat: Array<FloatValue, D1>,
        lon: Array<FloatValue, D2>,
    ) -> Self {
        Self {
            lat: lat.into_dyn(),
            lon: lon.into_dyn(),
        }
    }

    pub fn lat(&self) -> &ArrayD<FloatValue> {
        &self.lat
    }

    pub fn lon(&self) -> &ArrayD<FloatValue> {
        &self.lon
    }
}

/// Coordinate mesh whose shape has been checked against the SST field
#[derive(Debug, Clone, PartialEq)]
pub struct GridCoordinates {
    pub lat: Array2<FloatValue>,
    pub lon: Array2<FloatValue>,
}

/// SST data after validation, with time on the last axis
#[derive(Debug, Clone, PartialEq)]
pub enum SstField {
    /// Precomputed regional series
    Series(Array1<Sample>),
    /// Spatiotemporal field (rows, cols, time) with optional coordinates
    Grid {
        values: Array3<Sample>,
        coordinates: Option<GridCoordinates>,
    },
}

impl SstField {
    /// Number of time steps
    pub fn len_time(&self) -> usize {
        match self {
            SstField::Series(values) => values.len(),
            SstField::Grid { values, .. } => values.shape()[2],
        }
    }

    /// (rows, cols) of a gridded field
    pub fn spatial_shape(&self) -> Option<(usize, usize)> {
        match self {
            SstField::Series(_) => None,
            SstField::Grid { values, .. } => Some((values.shape()[0], values.shape()[1])),
        }
    }
}
