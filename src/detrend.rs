//! Final linear detrending of the anomaly series.

use amo_core::timeseries::{count_valid, FloatValue, Sample};
use amo_core::utils::regression::remove_linear_trend;
use log::warn;
use ndarray::Array1;

/// Subtract the least-squares line through the non-missing samples.
///
/// Missing samples stay missing. With fewer than two valid samples (or all
/// samples at the same abscissa) no line exists and the whole result is
/// missing rather than an error.
///
/// # Panics
///
/// Panics if `series` and `abscissa` differ in length.
pub fn detrend(series: &Array1<Sample>, abscissa: &[FloatValue]) -> Array1<Sample> {
    let values = series.to_vec();
    let detrended = remove_linear_trend(abscissa, &values);

    let n_valid = count_valid(&values);
    if n_valid > 0 && count_valid(&detrended) == 0 {
        warn!(
            "Cannot fit a trend through {} valid sample(s); index is missing",
            n_valid
        );
    }
    Array1::from(detrended)
}
