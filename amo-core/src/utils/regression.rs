//! Least-squares line fitting over series with missing samples.

use crate::timeseries::{FloatValue, Sample};

/// Straight line `y = intercept + slope * x`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearFit {
    pub slope: FloatValue,
    pub intercept: FloatValue,
}

impl LinearFit {
    pub fn value_at(&self, x: FloatValue) -> FloatValue {
        self.intercept + self.slope * x
    }
}

/// Ordinary least-squares fit of `y` against `x`, skipping missing samples.
///
/// Returns `None` when fewer than two points are available or all available
/// points share the same `x`, since no line can be fit.
///
/// # Panics
/// Panics if `x` and `y` have different lengths.
///
/// # Example
/// ```
/// use amo_core::utils::regression::fit_line;
///
/// let x = vec![0.0, 1.0, 2.0, 3.0];
/// let y = vec![Some(1.0), None, Some(5.0), Some(7.0)];
///
/// let fit = fit_line(&x, &y).unwrap();
/// assert!((fit.slope - 2.0).abs() < 1e-12);
/// assert!((fit.intercept - 1.0).abs() < 1e-12);
/// ```
pub fn fit_line(x: &[FloatValue], y: &[Sample]) -> Option<LinearFit> {
    assert_eq!(x.len(), y.len(), "x must have same length as y");

    let points: Vec<(FloatValue, FloatValue)> = x
        .iter()
        .zip(y.iter())
        .filter_map(|(&xi, yi)| yi.filter(|_| xi.is_finite()).map(|yi| (xi, yi)))
        .collect();

    if points.len() < 2 {
        return None;
    }

    // Centre before accumulating; day numbers are ~7e5 and would otherwise
    // swamp the variance in rounding error.
    let n = points.len() as FloatValue;
    let x_mean = points.iter().map(|(xi, _)| xi).sum::<FloatValue>() / n;
    let y_mean = points.iter().map(|(_, yi)| yi).sum::<FloatValue>() / n;

    let (sxx, sxy) = points.iter().fold((0.0, 0.0), |(sxx, sxy), (xi, yi)| {
        let dx = xi - x_mean;
        (sxx + dx * dx, sxy + dx * (yi - y_mean))
    });

    if sxx <= 0.0 {
        return None;
    }

    let slope = sxy / sxx;
    Some(LinearFit {
        slope,
        intercept: y_mean - slope * x_mean,
    })
}

/// Subtract the least-squares line from every non-missing sample.
///
/// Missing samples stay missing. When no line can be fit the result is
/// entirely missing.
pub fn remove_linear_trend(x: &[FloatValue], y: &[Sample]) -> Vec<Sample> {
    match fit_line(x, y) {
        Some(fit) => x
            .iter()
            .zip(y.iter())
            .map(|(&xi, yi)| yi.map(|v| v - fit.value_at(xi)))
            .collect(),
        None => vec![None; y.len()],
    }
}
