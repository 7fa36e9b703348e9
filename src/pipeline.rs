//! End-to-end AMO index computation
//!
//! Stages run in a fixed order, each consuming the previous stage's output:
//!
//! 1. validation of the SST shape, time axis length and coordinates
//! 2. spatial reduction to a regional series
//! 3. seasonal cycle and mean removal
//! 4. final linear detrend
//!
//! Every fatal error is raised by the validation step (or while normalising
//! the time axis), before any numeric work is done.

use crate::config::AmoConfig;
use crate::deseason::deseasonalize;
use crate::detrend::detrend;
use crate::field::{CoordinateGrid, SstData, SstField};
use crate::reduce::reduce;
use crate::validation::validate_inputs;
use amo_core::errors::AmoResult;
use amo_core::time::{TimeAxis, TimeValue};
use amo_core::timeseries::{count_valid, sample_to_float, FloatValue, Sample};
use log::debug;
use ndarray::Array1;
use serde::Serialize;

/// AMO index aligned one-to-one with the input time axis
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AmoIndex {
    time: Vec<FloatValue>,
    values: Array1<Sample>,
}

impl AmoIndex {
    /// Day number of every sample
    pub fn time(&self) -> &[FloatValue] {
        &self.time
    }

    pub fn values(&self) -> &Array1<Sample> {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Number of non-missing samples
    pub fn valid_count(&self) -> usize {
        count_valid(&self.values)
    }

    /// Values as raw floats with NaN for missing samples
    pub fn to_nan_vec(&self) -> Vec<FloatValue> {
        self.values.iter().copied().map(sample_to_float).collect()
    }

    pub fn into_values(self) -> Array1<Sample> {
        self.values
    }
}

/// AMO index pipeline with a fixed configuration
///
/// The individual stages are exposed so callers can inspect intermediate
/// series; [`compute`](Self::compute) runs them all in order.
#[derive(Debug, Clone, Default)]
pub struct AmoPipeline {
    config: AmoConfig,
}

impl AmoPipeline {
    /// Create a pipeline, rejecting invalid configurations up front
    pub fn new(config: AmoConfig) -> AmoResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &AmoConfig {
        &self.config
    }

    /// Check shapes and move the time axis last
    pub fn validate(
        &self,
        sst: &SstData,
        time_len: usize,
        coordinates: Option<&CoordinateGrid>,
    ) -> AmoResult<SstField> {
        validate_inputs(sst, time_len, coordinates)
    }

    /// Reduce a validated field to the regional series
    pub fn reduce(&self, field: &SstField) -> AmoResult<Array1<Sample>> {
        reduce(field, &self.config)
    }

    /// Remove the seasonal cycle and overall mean
    pub fn deseasonalize(&self, series: &Array1<Sample>, time: &TimeAxis) -> Array1<Sample> {
        let abscissa = self.config.trend_axis.abscissa(time);
        deseasonalize(series, time, &abscissa, self.config.seasonal_phase)
    }

    /// Remove the final linear trend
    pub fn detrend(&self, series: &Array1<Sample>, time: &TimeAxis) -> Array1<Sample> {
        let abscissa = self.config.trend_axis.abscissa(time);
        detrend(series, &abscissa)
    }

    /// Compute the index from SST data, observation times and optional coordinates.
    ///
    /// `time` accepts anything convertible to [`TimeValue`]: day numbers,
    /// `(year, month, day)` triples, date strings or `chrono` values.
    pub fn compute<I, T>(
        &self,
        sst: &SstData,
        time: I,
        coordinates: Option<&CoordinateGrid>,
    ) -> AmoResult<AmoIndex>
    where
        I: IntoIterator<Item = T>,
        T: Into<TimeValue>,
    {
        let time: Vec<TimeValue> = time.into_iter().map(Into::into).collect();

        let field = self.validate(sst, time.len(), coordinates)?;
        let time = TimeAxis::new(time)?;
        debug!(
            "Computing AMO index over {} steps from SST with shape {:?}",
            time.len(),
            sst.shape()
        );

        let reduced = self.reduce(&field)?;
        let anomalies = self.deseasonalize(&reduced, &time);
        let values = self.detrend(&anomalies, &time);

        Ok(AmoIndex {
            time: time.day_numbers().to_vec(),
            values,
        })
    }
}

/// Compute the AMO index with the default configuration.
///
/// # Examples
///
/// ```rust
/// use amo::{compute_amo_index, SstData};
/// use ndarray::Array1;
///
/// // Ten years of monthly data at a constant temperature
/// let dates: Vec<(i32, u32, u32)> = (1990..2000)
///     .flat_map(|y| (1..=12).map(move |m| (y, m, 15)))
///     .collect();
/// let sst = SstData::new(Array1::from_elem(dates.len(), Some(18.5)));
///
/// let index = compute_amo_index(&sst, dates, None).unwrap();
/// assert_eq!(index.len(), 120);
/// assert!(index.values().iter().all(|v| v.unwrap().abs() < 1e-9));
/// ```
pub fn compute_amo_index<I, T>(
    sst: &SstData,
    time: I,
    coordinates: Option<&CoordinateGrid>,
) -> AmoResult<AmoIndex>
where
    I: IntoIterator<Item = T>,
    T: Into<TimeValue>,
{
    AmoPipeline::default().compute(sst, time, coordinates)
}
