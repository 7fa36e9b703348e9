//! Shape checks run before any numeric work.
//!
//! This is the only gate between caller-supplied arrays and the numeric
//! stages: everything downstream relies on the shapes fixed here.

use crate::field::{CoordinateGrid, GridCoordinates, SstData, SstField};
use amo_core::errors::{AmoError, AmoResult};
use amo_core::timeseries::FloatValue;
use log::debug;
use ndarray::{ArrayD, Ix1, Ix2, Ix3};

/// Find the SST axis that holds time.
///
/// The time axis length must match at least one dimension of the data; when
/// several match, the last one is taken so that the conventional
/// (rows, cols, time) layout wins.
pub fn validate_time_axis(time_len: usize, shape: &[usize]) -> AmoResult<usize> {
    shape
        .iter()
        .rposition(|&d| d == time_len)
        .ok_or_else(|| AmoError::ShapeMismatch {
            time_len,
            shape: shape.to_vec(),
        })
}

fn as_mesh(values: &ArrayD<FloatValue>, name: &str) -> AmoResult<ndarray::Array2<FloatValue>> {
    if values.ndim() != 2 {
        return Err(AmoError::GridShapeMismatch(format!(
            "{name} must be a 2-D mesh, got a {}-D array with shape {:?}",
            values.ndim(),
            values.shape()
        )));
    }
    values
        .view()
        .into_dimensionality::<Ix2>()
        .map(|v| v.to_owned())
        .map_err(|e| AmoError::GridShapeMismatch(format!("{name}: {e}")))
}

/// Check that latitude and longitude are 2-D meshes matching the spatial
/// shape `(rows, cols)` of the field and each other.
pub fn validate_coordinates(
    coordinates: &CoordinateGrid,
    spatial_shape: (usize, usize),
) -> AmoResult<GridCoordinates> {
    let lat = as_mesh(coordinates.lat(), "latitude")?;
    let lon = as_mesh(coordinates.lon(), "longitude")?;

    if lat.shape() != lon.shape() {
        return Err(AmoError::GridShapeMismatch(format!(
            "latitude shape {:?} does not match longitude shape {:?}",
            lat.shape(),
            lon.shape()
        )));
    }
    if lat.dim() != spatial_shape {
        return Err(AmoError::GridShapeMismatch(format!(
            "coordinate shape {:?} does not match SST spatial shape {:?}",
            lat.shape(),
            [spatial_shape.0, spatial_shape.1]
        )));
    }
    Ok(GridCoordinates { lat, lon })
}

/// Validate SST data, time axis length and optional coordinates together.
///
/// Returns the field with time moved to the last axis of a 3-D array.
///
/// # Errors
///
/// - [`AmoError::ShapeMismatch`] if `time_len` matches no SST dimension
/// - [`AmoError::UnsupportedDimensionality`] if the data is neither 1-D nor 3-D
/// - [`AmoError::GridShapeMismatch`] if coordinates are not 2-D, disagree with
///   each other or with the spatial shape, or accompany a 1-D series
pub fn validate_inputs(
    sst: &SstData,
    time_len: usize,
    coordinates: Option<&CoordinateGrid>,
) -> AmoResult<SstField> {
    let time_axis = validate_time_axis(time_len, sst.shape())?;

    match sst.ndim() {
        1 => {
            if coordinates.is_some() {
                return Err(AmoError::GridShapeMismatch(
                    "coordinates were supplied for a 1-D series, which has no spatial dimensions"
                        .to_string(),
                ));
            }
            let values = sst
                .values()
                .view()
                .into_dimensionality::<Ix1>()
                .map_err(|_| AmoError::UnsupportedDimensionality { ndim: sst.ndim() })?
                .to_owned();
            Ok(SstField::Series(values))
        }
        3 => {
            let values = sst
                .values()
                .view()
                .into_dimensionality::<Ix3>()
                .map_err(|_| AmoError::UnsupportedDimensionality { ndim: sst.ndim() })?;
            let values = match time_axis {
                0 => values.permuted_axes([1, 2, 0]),
                1 => values.permuted_axes([0, 2, 1]),
                _ => values,
            };
            if time_axis != 2 {
                debug!(
                    "Time found on axis {} of SST data with shape {:?}; moving it last",
                    time_axis,
                    sst.shape()
                );
            }

            let (rows, cols, _) = values.dim();
            let coordinates = coordinates
                .map(|c| validate_coordinates(c, (rows, cols)))
                .transpose()?;

            Ok(SstField::Grid {
                values: values.to_owned(),
                coordinates,
            })
        }
        ndim => Err(AmoError::UnsupportedDimensionality { ndim }),
    }
}
