//! Geographic grid helpers: bounding-box regions, masks and cell areas
//!
//! Coordinate grids are full 2-D meshes where every cell carries its own
//! latitude and longitude, so curvilinear and rotated grids are handled the
//! same way as regular ones. Longitudes use the [-180, 180] convention.
//!
//! # Examples
//!
//! ```rust
//! use amo_core::grid::{region_mask, RegionBox};
//! use ndarray::array;
//!
//! let lat = array![[-5.0], [35.0], [85.0]];
//! let lon = array![[-40.0], [-40.0], [-40.0]];
//!
//! let mask = region_mask(lat.view(), lon.view(), &RegionBox::AMO).unwrap();
//! assert_eq!(mask, array![[false], [true], [false]]);
//! ```

use crate::errors::{AmoError, AmoResult};
use crate::timeseries::FloatValue;
use log::debug;
use ndarray::{Array2, ArrayView2, Axis, Zip};
use serde::{Deserialize, Serialize};

/// Mean radius of the Earth (m)
pub const EARTH_RADIUS: FloatValue = 6_371_000.0;

/// Latitude/longitude bounding box with inclusive edges
///
/// The western edge must be less than the eastern edge; boxes crossing the
/// antimeridian are not supported.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RegionBox {
    /// Southern edge (degrees north)
    pub lat_min: FloatValue,
    /// Northern edge (degrees north)
    pub lat_max: FloatValue,
    /// Western edge (degrees east)
    pub lon_min: FloatValue,
    /// Eastern edge (degrees east)
    pub lon_max: FloatValue,
}

impl RegionBox {
    /// North Atlantic box of the Enfield et al. (2001) AMO definition: 0-70°N, 75°W-5°E
    pub const AMO: RegionBox = RegionBox {
        lat_min: 0.0,
        lat_max: 70.0,
        lon_min: -75.0,
        lon_max: 5.0,
    };

    /// Create a region from latitude and longitude ranges
    ///
    /// # Errors
    ///
    /// [`AmoError::InvalidRegion`] if a bound is non-finite or a range is reversed.
    pub fn new(
        lat_range: (FloatValue, FloatValue),
        lon_range: (FloatValue, FloatValue),
    ) -> AmoResult<Self> {
        let region = Self {
            lat_min: lat_range.0,
            lat_max: lat_range.1,
            lon_min: lon_range.0,
            lon_max: lon_range.1,
        };
        region.validate()?;
        Ok(region)
    }

    /// Check that the bounds describe a non-empty, non-wrapping box
    pub fn validate(&self) -> AmoResult<()> {
        let bounds = [self.lat_min, self.lat_max, self.lon_min, self.lon_max];
        if bounds.iter().any(|b| !b.is_finite()) {
            return Err(AmoError::InvalidRegion(format!(
                "bounds must be finite, got {:?}",
                self
            )));
        }
        if self.lat_min > self.lat_max {
            return Err(AmoError::InvalidRegion(format!(
                "latitude range is reversed: [{}, {}]",
                self.lat_min, self.lat_max
            )));
        }
        if self.lon_min > self.lon_max {
            return Err(AmoError::InvalidRegion(format!(
                "longitude range is reversed: [{}, {}] (antimeridian wraparound is not supported)",
                self.lon_min, self.lon_max
            )));
        }
        Ok(())
    }

    /// Whether a point lies inside the box (edges included)
    pub fn contains(&self, lat: FloatValue, lon: FloatValue) -> bool {
        (self.lat_min..=self.lat_max).contains(&lat) && (self.lon_min..=self.lon_max).contains(&lon)
    }
}

impl Default for RegionBox {
    fn default() -> Self {
        Self::AMO
    }
}

fn check_same_shape(lat: &ArrayView2<FloatValue>, lon: &ArrayView2<FloatValue>) -> AmoResult<()> {
    if lat.shape() != lon.shape() {
        return Err(AmoError::GridShapeMismatch(format!(
            "latitude shape {:?} does not match longitude shape {:?}",
            lat.shape(),
            lon.shape()
        )));
    }
    Ok(())
}

/// Boolean mask that is true for every grid cell inside `region`
///
/// Cells with non-finite coordinates are outside every region.
pub fn region_mask(
    lat: ArrayView2<FloatValue>,
    lon: ArrayView2<FloatValue>,
    region: &RegionBox,
) -> AmoResult<Array2<bool>> {
    check_same_shape(&lat, &lon)?;
    Ok(Zip::from(&lat)
        .and(&lon)
        .map_collect(|&la, &lo| region.contains(la, lo)))
}

/// Wrap a longitude difference into [-180, 180)
fn wrap_degrees(delta: FloatValue) -> FloatValue {
    (delta + 180.0).rem_euclid(360.0) - 180.0
}

/// Latitude and longitude steps (degrees) of every cell along one grid axis
type GridSteps = (Array2<FloatValue>, Array2<FloatValue>);

/// Finite-difference (north, east) steps in degrees along `axis`
///
/// Central differences are used where both neighbours have finite
/// coordinates and one-sided differences where only one does. Cells with
/// non-finite coordinates, or with no usable neighbour, get NaN steps.
///
/// Returns `None` when the axis has a single cell and no spacing can be derived.
fn steps_along(
    lat: &ArrayView2<FloatValue>,
    lon: &ArrayView2<FloatValue>,
    axis: Axis,
) -> Option<GridSteps> {
    let n = lat.len_of(axis);
    if n < 2 {
        return None;
    }
    let valid = Zip::from(lat)
        .and(lon)
        .map_collect(|la, lo| la.is_finite() && lo.is_finite());

    let mut dlat = Array2::from_elem(lat.raw_dim(), FloatValue::NAN);
    let mut dlon = Array2::from_elem(lat.raw_dim(), FloatValue::NAN);
    for ((r, c), &ok) in valid.indexed_iter() {
        if !ok {
            continue;
        }
        let at = |k: usize| if axis == Axis(0) { (k, c) } else { (r, k) };
        let i = if axis == Axis(0) { r } else { c };
        let prev = (i > 0).then(|| at(i - 1)).filter(|&p| valid[p]);
        let next = (i + 1 < n).then(|| at(i + 1)).filter(|&q| valid[q]);

        let (hi, lo, scale) = match (prev, next) {
            (Some(p), Some(q)) => (q, p, 0.5),
            (Some(p), None) => ((r, c), p, 1.0),
            (None, Some(q)) => (q, (r, c), 1.0),
            (None, None) => continue,
        };
        dlat[[r, c]] = (lat[hi] - lat[lo]) * scale;
        dlon[[r, c]] = wrap_degrees(lon[hi] - lon[lo]) * scale;
    }
    Some((dlat, dlon))
}

/// Surface area (m²) of every cell of a coordinate mesh on a sphere
///
/// Each cell is approximated by the parallelogram spanned by the local grid
/// steps along its two axes, converted from degrees to metres at the cell's
/// latitude. When no step can be derived along an axis (a single-cell axis,
/// or neighbours with non-finite coordinates such as land fill values) the
/// other axis' step rotated by 90° is used instead, and a cell with no step
/// on either axis gets a nominal 1° x 1° size. Weights therefore stay
/// proportional to the cosine of latitude in degenerate cases, and every
/// cell with finite coordinates away from the poles has a positive area.
///
/// # Examples
///
/// ```rust
/// use amo_core::grid::{grid_cell_area, EARTH_RADIUS};
/// use ndarray::array;
///
/// let lat = array![[0.0, 0.0], [60.0, 60.0]];
/// let lon = array![[0.0, 1.0], [0.0, 1.0]];
/// let areas = grid_cell_area(lat.view(), lon.view(), EARTH_RADIUS).unwrap();
///
/// // Cells at 60°N are half the size of equatorial ones
/// assert!((areas[[1, 0]] / areas[[0, 0]] - 0.5).abs() < 1e-12);
/// ```
pub fn grid_cell_area(
    lat: ArrayView2<FloatValue>,
    lon: ArrayView2<FloatValue>,
    radius: FloatValue,
) -> AmoResult<Array2<FloatValue>> {
    check_same_shape(&lat, &lon)?;
    if !(radius.is_finite() && radius > 0.0) {
        return Err(AmoError::InvalidConfig(format!(
            "sphere radius must be positive, got {radius}"
        )));
    }

    let row_steps = steps_along(&lat, &lon, Axis(0));
    let col_steps = steps_along(&lat, &lon, Axis(1));
    let step_at = |steps: &Option<GridSteps>, r: usize, c: usize| {
        steps
            .as_ref()
            .map(|(dlat, dlon)| (dlat[[r, c]], dlon[[r, c]]))
            .filter(|(north, east)| north.is_finite() && east.is_finite())
    };

    let mut fallbacks = 0;
    let mut areas = Array2::zeros(lat.raw_dim());
    for ((r, c), area) in areas.indexed_iter_mut() {
        let row_step = step_at(&row_steps, r, c);
        let col_step = step_at(&col_steps, r, c);
        let isolated = (row_step.is_none() && row_steps.is_some())
            || (col_step.is_none() && col_steps.is_some());
        if isolated && lat[[r, c]].is_finite() && lon[[r, c]].is_finite() {
            fallbacks += 1;
        }

        // (north, east) steps in degrees
        let (a, b) = match (row_step, col_step) {
            (Some(a), Some(b)) => (a, b),
            (Some(a), None) => (a, (-a.1, a.0)),
            (None, Some(b)) => ((b.1, -b.0), b),
            (None, None) => ((1.0, 0.0), (0.0, 1.0)),
        };

        let coslat = lat[[r, c]].to_radians().cos();
        let to_metres = |(north, east): (FloatValue, FloatValue)| {
            (
                radius * north.to_radians(),
                radius * coslat * east.to_radians(),
            )
        };
        let (a_north, a_east) = to_metres(a);
        let (b_north, b_east) = to_metres(b);

        *area = (a_north * b_east - b_north * a_east).abs();
    }
    if row_steps.is_none() || col_steps.is_none() {
        debug!(
            "Grid of shape {:?} has a single-cell axis; using rotated steps for cell areas",
            lat.shape()
        );
    }
    if fallbacks > 0 {
        debug!(
            "{} cell(s) lack a neighbour with finite coordinates; using substitute steps",
            fallbacks
        );
    }
    Ok(areas)
}

#[cfg(test)]
mod tests {
    use super::*;
    use is_close::is_close;
    use ndarray::array;
    use std::f64::consts::PI;

    fn mesh(lats: &[FloatValue], lons: &[FloatValue]) -> (Array2<FloatValue>, Array2<FloatValue>) {
        let shape = (lats.len(), lons.len());
        (
            Array2::from_shape_fn(shape, |(i, _)| lats[i]),
            Array2::from_shape_fn(shape, |(_, j)| lons[j]),
        )
    }

    #[test]
    fn amo_box_edges_are_inclusive() {
        let region = RegionBox::AMO;
        assert!(region.contains(0.0, -75.0));
        assert!(region.contains(70.0, 5.0));
        assert!(region.contains(35.0, -40.0));
        assert!(!region.contains(-0.1, -40.0));
        assert!(!region.contains(70.1, -40.0));
        assert!(!region.contains(35.0, 5.1));
        assert!(!region.contains(35.0, -75.1));
        assert!(!region.contains(FloatValue::NAN, -40.0));
    }

    #[test]
    fn default_region_is_amo() {
        assert_eq!(RegionBox::default(), RegionBox::AMO);
    }

    #[test]
    fn reversed_ranges_are_invalid() {
        assert!(matches!(
            RegionBox::new((70.0, 0.0), (-75.0, 5.0)),
            Err(AmoError::InvalidRegion(_))
        ));
        assert!(matches!(
            RegionBox::new((0.0, 70.0), (170.0, -170.0)),
            Err(AmoError::InvalidRegion(_))
        ));
        assert!(matches!(
            RegionBox::new((0.0, FloatValue::INFINITY), (-75.0, 5.0)),
            Err(AmoError::InvalidRegion(_))
        ));
        assert!(RegionBox::new((-10.0, 10.0), (-20.0, 20.0)).is_ok());
    }

    #[test]
    fn mask_requires_matching_shapes() {
        let lat = array![[0.0, 1.0]];
        let lon = array![[0.0], [1.0]];
        assert!(matches!(
            region_mask(lat.view(), lon.view(), &RegionBox::AMO),
            Err(AmoError::GridShapeMismatch(_))
        ));
    }

    #[test]
    fn mask_on_mesh() {
        let (lat, lon) = mesh(&[-10.0, 30.0, 80.0], &[-100.0, -30.0, 0.0, 20.0]);
        let mask = region_mask(lat.view(), lon.view(), &RegionBox::AMO).unwrap();
        assert_eq!(
            mask,
            array![
                [false, false, false, false],
                [false, true, true, false],
                [false, false, false, false]
            ]
        );
    }

    #[test]
    fn global_grid_area_sums_to_sphere() {
        let lats: Vec<FloatValue> = (0..90).map(|i| -89.0 + 2.0 * i as FloatValue).collect();
        let lons: Vec<FloatValue> = (0..180).map(|j| -179.0 + 2.0 * j as FloatValue).collect();
        let (lat, lon) = mesh(&lats, &lons);

        let areas = grid_cell_area(lat.view(), lon.view(), EARTH_RADIUS).unwrap();
        let total: FloatValue = areas.sum();
        let sphere = 4.0 * PI * EARTH_RADIUS * EARTH_RADIUS;
        assert!(
            is_close!(total, sphere, rel_tol = 1e-3),
            "total {total} vs sphere {sphere}"
        );
    }

    #[test]
    fn transposed_mesh_gives_transposed_areas() {
        let (lat, lon) = mesh(&[0.0, 20.0, 40.0], &[-60.0, -50.0]);
        let areas = grid_cell_area(lat.view(), lon.view(), EARTH_RADIUS).unwrap();

        let lat_t = lat.t().to_owned();
        let lon_t = lon.t().to_owned();
        let areas_t = grid_cell_area(lat_t.view(), lon_t.view(), EARTH_RADIUS).unwrap();

        for ((r, c), &a) in areas.indexed_iter() {
            assert!(is_close!(a, areas_t[[c, r]]));
        }
    }

    #[test]
    fn longitude_steps_wrap_across_dateline() {
        let (lat, lon) = mesh(&[10.0, 11.0], &[178.0, 179.0, -180.0, -179.0]);
        let areas = grid_cell_area(lat.view(), lon.view(), EARTH_RADIUS).unwrap();
        let reference = areas[[0, 0]];
        for c in 0..4 {
            assert!(is_close!(areas[[0, c]], reference));
        }
    }

    #[test]
    fn single_column_areas_follow_cosine_of_latitude() {
        let lat = array![[0.0], [60.0]];
        let lon = array![[-40.0], [-40.0]];
        let areas = grid_cell_area(lat.view(), lon.view(), EARTH_RADIUS).unwrap();
        assert!(is_close!(areas[[1, 0]] / areas[[0, 0]], 0.5));
    }

    #[test]
    fn single_cell_uses_nominal_degree() {
        let lat = array![[0.0]];
        let lon = array![[10.0]];
        let areas = grid_cell_area(lat.view(), lon.view(), 1.0).unwrap();
        let one_degree = (1.0 as FloatValue).to_radians();
        assert!(is_close!(areas[[0, 0]], one_degree * one_degree));
    }

    #[test]
    fn cells_next_to_missing_coordinates_keep_an_area() {
        let lat = array![[30.0, FloatValue::NAN, 30.0]];
        let lon = array![[-40.0, FloatValue::NAN, -20.0]];
        let areas = grid_cell_area(lat.view(), lon.view(), EARTH_RADIUS).unwrap();

        assert!(areas[[0, 0]].is_finite() && areas[[0, 0]] > 0.0);
        assert!(is_close!(areas[[0, 0]], areas[[0, 2]]));
        assert!(areas[[0, 1]].is_nan());
    }

    #[test]
    fn missing_coordinates_fall_back_to_one_sided_steps() {
        // Land fill value in the middle of a regular 1° column
        let (lat, lon) = mesh(&[10.0, 11.0, 12.0, 13.0], &[-40.0, -39.0]);
        let mut lat_gap = lat.clone();
        let mut lon_gap = lon.clone();
        lat_gap[[2, 0]] = FloatValue::NAN;
        lon_gap[[2, 0]] = FloatValue::NAN;

        let areas = grid_cell_area(lat.view(), lon.view(), EARTH_RADIUS).unwrap();
        let gapped = grid_cell_area(lat_gap.view(), lon_gap.view(), EARTH_RADIUS).unwrap();

        for r in [0, 1, 3] {
            assert!(is_close!(gapped[[r, 0]], areas[[r, 0]], rel_tol = 1e-3));
        }
        assert!(gapped[[2, 0]].is_nan());
    }

    #[test]
    fn region_box_from_json() {
        let region: RegionBox = serde_json::from_str(
            r#"{"lat_min": -5.0, "lat_max": 5.0, "lon_min": -170.0, "lon_max": -120.0}"#,
        )
        .unwrap();
        assert_eq!(region, RegionBox::new((-5.0, 5.0), (-170.0, -120.0)).unwrap());
        assert!(serde_json::from_str::<RegionBox>(r#"{"lat_min": 0.0}"#).is_err());
    }

    #[test]
    fn radius_must_be_positive() {
        let lat = array![[0.0]];
        let lon = array![[0.0]];
        assert!(matches!(
            grid_cell_area(lat.view(), lon.view(), 0.0),
            Err(AmoError::InvalidConfig(_))
        ));
    }
}
