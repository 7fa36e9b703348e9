//! Sample types and missing-aware reductions shared by every pipeline stage.
//!
//! Missing observations (land, sea ice, gaps in the record) are carried as
//! `None` rather than a NaN sentinel so that no stage can accidentally do
//! arithmetic on them.

use ndarray::{Array, Dimension};

pub type FloatValue = f64;

/// A single observation that may be missing.
pub type Sample = Option<FloatValue>;

/// Convert a raw float into a [`Sample`], treating non-finite values as missing.
///
/// ```rust
/// use amo_core::timeseries::sample_from_float;
///
/// assert_eq!(sample_from_float(21.5), Some(21.5));
/// assert_eq!(sample_from_float(f64::NAN), None);
/// ```
pub fn sample_from_float(value: FloatValue) -> Sample {
    value.is_finite().then_some(value)
}

/// Convert a [`Sample`] back into a raw float with NaN for missing values.
pub fn sample_to_float(sample: Sample) -> FloatValue {
    sample.unwrap_or(FloatValue::NAN)
}

/// Map an array of raw floats to samples, NaN and infinities becoming missing.
pub fn samples_from_nan_array<D: Dimension>(values: &Array<FloatValue, D>) -> Array<Sample, D> {
    values.mapv(sample_from_float)
}

/// Mean of the non-missing samples, or `None` if every sample is missing.
pub fn mean_ignoring_missing<'a, I>(samples: I) -> Sample
where
    I: IntoIterator<Item = &'a Sample>,
{
    let (sum, count) = samples
        .into_iter()
        .flatten()
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));

    if count == 0 {
        None
    } else {
        Some(sum / count as FloatValue)
    }
}

/// Number of non-missing samples.
pub fn count_valid<'a, I>(samples: I) -> usize
where
    I: IntoIterator<Item = &'a Sample>,
{
    samples.into_iter().filter(|s| s.is_some()).count()
}
