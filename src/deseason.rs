//! Seasonal cycle removal
//!
//! The climatology is estimated from a linearly detrended copy of the series
//! so that long-term warming does not leak into the seasonal cycle, but it is
//! subtracted from the original values: the trend stays in the output and is
//! only removed by [`detrend`](crate::detrend::detrend).

use crate::config::SeasonalPhase;
use amo_core::time::TimeAxis;
use amo_core::timeseries::{mean_ignoring_missing, FloatValue, Sample};
use amo_core::utils::regression::remove_linear_trend;
use log::{debug, warn};
use ndarray::Array1;
use std::collections::BTreeMap;

/// Mean value of each seasonal phase, ignoring missing samples.
///
/// Phases that only have missing samples map to `None`.
pub fn climatology(values: &[Sample], phases: &[u32]) -> BTreeMap<u32, Sample> {
    assert_eq!(
        values.len(),
        phases.len(),
        "values must have same length as phases"
    );

    let mut grouped: BTreeMap<u32, Vec<Sample>> = BTreeMap::new();
    for (&value, &phase) in values.iter().zip(phases) {
        grouped.entry(phase).or_default().push(value);
    }
    grouped
        .into_iter()
        .map(|(phase, samples)| (phase, mean_ignoring_missing(&samples)))
        .collect()
}

/// Remove the seasonal cycle and the overall mean from `series`.
///
/// # Arguments
///
/// * `series` - Regional series aligned with `time`
/// * `time` - Observation times, used to assign seasonal phases
/// * `abscissa` - Values the climatology trend is fit against
/// * `seasonal_phase` - How samples are grouped into phases
///
/// # Returns
///
/// Anomalies relative to the climatology and the series mean. Missing inputs
/// and phases without observations give missing outputs. If fewer than two
/// samples are present no trend can be fit and the result is entirely missing.
///
/// # Panics
///
/// Panics if `series`, `time` and `abscissa` differ in length.
pub fn deseasonalize(
    series: &Array1<Sample>,
    time: &TimeAxis,
    abscissa: &[FloatValue],
    seasonal_phase: SeasonalPhase,
) -> Array1<Sample> {
    assert_eq!(series.len(), time.len(), "series must match the time axis");

    let original = series.to_vec();
    let working = remove_linear_trend(abscissa, &original);
    if working.iter().all(Option::is_none) && !original.is_empty() {
        warn!("Fewer than two valid samples to fit the climatology trend; result is missing");
        return Array1::from_elem(series.len(), None);
    }

    let phases = seasonal_phase.phases(time);
    let cycle = climatology(&working, &phases);
    let empty_phases: Vec<u32> = cycle
        .iter()
        .filter(|(_, mean)| mean.is_none())
        .map(|(&phase, _)| phase)
        .collect();
    if !empty_phases.is_empty() {
        warn!(
            "Seasonal phases {:?} have no valid samples; they will be missing",
            empty_phases
        );
    }
    debug!(
        "Estimated climatology over {} {:?} phases",
        cycle.len(),
        seasonal_phase
    );

    let overall_mean = mean_ignoring_missing(&original);

    original
        .iter()
        .zip(&phases)
        .map(|(value, phase)| {
            let seasonal = cycle.get(phase).copied().flatten();
            match (value, seasonal, overall_mean) {
                (Some(v), Some(s), Some(m)) => Some(v - s - m),
                _ => None,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TrendAxis;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    fn monthly_axis(years: i32) -> TimeAxis {
        let dates: Vec<(i32, u32, u32)> = (0..years)
            .flat_map(|y| (1..=12).map(move |m| (1950 + y, m, 15)))
            .collect();
        TimeAxis::new(dates).unwrap()
    }

    #[test]
    fn climatology_groups_by_phase() {
        let values = vec![Some(1.0), Some(10.0), Some(3.0), None, None, None];
        let phases = vec![1, 2, 1, 2, 3, 3];
        let cycle = climatology(&values, &phases);
        assert_eq!(cycle.len(), 3);
        assert_eq!(cycle[&1], Some(2.0));
        assert_eq!(cycle[&2], Some(10.0));
        assert_eq!(cycle[&3], None);
    }

    /// Seasonal pattern symmetric about mid-year, so it has no linear trend
    /// over whole years and the climatology fit sees a flat line.
    fn symmetric_cycle(month: u32) -> FloatValue {
        3.0 * (2.0 * PI * (month as FloatValue - 6.5) / 12.0).cos()
    }

    #[test]
    fn pure_seasonal_cycle_is_removed() {
        let time = monthly_axis(10);
        let series: Array1<Sample> = time
            .months()
            .iter()
            .map(|&m| Some(20.0 + symmetric_cycle(m)))
            .collect();

        let anomalies = deseasonalize(
            &series,
            &time,
            &TrendAxis::StepIndex.abscissa(&time),
            SeasonalPhase::CalendarMonth,
        );
        assert_eq!(anomalies.len(), series.len());
        for value in anomalies.iter() {
            assert_relative_eq!(value.unwrap(), 0.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn trend_survives_deseasonalizing() {
        let time = monthly_axis(20);
        let abscissa = TrendAxis::StepIndex.abscissa(&time);
        let series: Array1<Sample> = abscissa
            .iter()
            .zip(time.months())
            .map(|(&t, m)| Some(0.01 * t + symmetric_cycle(m)))
            .collect();

        let anomalies = deseasonalize(&series, &time, &abscissa, SeasonalPhase::CalendarMonth);

        // Seasonal cycle gone, trend kept, centred on zero
        let n = anomalies.len() as FloatValue;
        let t_mean = abscissa.iter().sum::<FloatValue>() / n;
        for (value, &t) in anomalies.iter().zip(&abscissa) {
            assert_relative_eq!(value.unwrap(), 0.01 * (t - t_mean), epsilon = 1e-9);
        }
    }

    #[test]
    fn missing_values_propagate() {
        let time = monthly_axis(3);
        let mut series: Array1<Sample> =
            (0..36).map(|i| Some(15.0 + (i % 12) as FloatValue)).collect();
        series[4] = None;
        // March never observed
        for year in 0..3 {
            series[year * 12 + 2] = None;
        }

        let anomalies = deseasonalize(
            &series,
            &time,
            time.day_numbers(),
            SeasonalPhase::CalendarMonth,
        );
        assert_eq!(anomalies.len(), 36);
        assert_eq!(anomalies[4], None);
        for year in 0..3 {
            assert_eq!(anomalies[year * 12 + 2], None);
        }
        assert!(anomalies[5].is_some());
    }

    #[test]
    fn too_few_samples_gives_missing_series() {
        let time = monthly_axis(1);
        let mut series: Array1<Sample> = Array1::from_elem(12, None);
        series[0] = Some(10.0);
        let anomalies = deseasonalize(
            &series,
            &time,
            time.day_numbers(),
            SeasonalPhase::CalendarMonth,
        );
        assert!(anomalies.iter().all(Option::is_none));
    }

    #[test]
    fn day_of_year_phases() {
        // 2000 (leap) then 2001, with a value fixed by the ordinal day
        let start = 730486.0; // 2000-01-01
        let days: Vec<FloatValue> = (0..731).map(|i| start + i as FloatValue).collect();
        let time = TimeAxis::from_day_numbers(days).unwrap();
        let phases = SeasonalPhase::DayOfYear.phases(&time);
        let series: Array1<Sample> = phases
            .iter()
            .map(|&d| Some(10.0 + (d % 7) as FloatValue))
            .collect();

        let anomalies = deseasonalize(
            &series,
            &time,
            time.day_numbers(),
            SeasonalPhase::DayOfYear,
        );
        assert_eq!(anomalies.len(), 731);
        assert!(anomalies.iter().all(Option::is_some));

        // 1 March 2000 is grouped with 2 March 2001
        let march_first_2000 = 31 + 29;
        let march_second_2001 = 366 + 31 + 28 + 1;
        assert_eq!(time.dates()[march_first_2000].to_string(), "2000-03-01");
        assert_eq!(time.dates()[march_second_2001].to_string(), "2001-03-02");
        assert_eq!(phases[march_first_2000], 61);
        assert_eq!(phases[march_second_2001], 61);

        // Each ordinal day of 2001 has the same anomaly as the same ordinal day of 2000
        for i in 0..365 {
            assert_eq!(phases[i], phases[i + 366]);
            let (a, b) = (anomalies[i].unwrap(), anomalies[i + 366].unwrap());
            assert_relative_eq!(a, b, epsilon = 1e-9);
        }
        // 31 December 2000 is alone in phase 366
        assert_eq!(phases[365], 366);
        assert_eq!(phases.iter().filter(|&&p| p == 366).count(), 1);
    }
}
