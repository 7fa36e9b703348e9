//! Pipeline configuration
//!
//! Defaults reproduce the Enfield et al. (2001) AMO definition, so
//! `AmoConfig::default()` is all most callers need. Alternate box averages
//! reuse the same pipeline with a different [`RegionBox`].

use amo_core::errors::{AmoError, AmoResult};
use amo_core::grid::{RegionBox, EARTH_RADIUS};
use amo_core::time::TimeAxis;
use amo_core::timeseries::FloatValue;
use serde::{Deserialize, Serialize};

/// Periodic phase used to group samples when estimating the seasonal cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SeasonalPhase {
    /// Calendar month (1-12), for monthly data
    #[default]
    CalendarMonth,
    /// Ordinal day of the year (1-366), for daily data
    ///
    /// Phases count days from 1 January, so after 28 February a leap-year
    /// date shares its phase with the next calendar date of a common year
    /// (1 March 2000 and 2 March 2001 are both day 61). Day 366 only occurs
    /// on 31 December of leap years.
    DayOfYear,
}

impl SeasonalPhase {
    /// Phase label of every point on the time axis
    pub fn phases(&self, time: &TimeAxis) -> Vec<u32> {
        match self {
            SeasonalPhase::CalendarMonth => time.months(),
            SeasonalPhase::DayOfYear => time.days_of_year(),
        }
    }
}

/// Abscissa used for least-squares trend fits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TrendAxis {
    /// Fit against the day number of each sample, so irregular spacing is respected
    #[default]
    DayNumber,
    /// Fit against the sample index 0, 1, 2, ...
    StepIndex,
}

impl TrendAxis {
    pub fn abscissa(&self, time: &TimeAxis) -> Vec<FloatValue> {
        match self {
            TrendAxis::DayNumber => time.day_numbers().to_vec(),
            TrendAxis::StepIndex => (0..time.len()).map(|i| i as FloatValue).collect(),
        }
    }
}

/// Settings for the AMO index pipeline
///
/// Missing fields take their defaults when deserialising, so a TOML document
/// only needs the settings it changes:
///
/// ```rust
/// use amo::config::{AmoConfig, SeasonalPhase};
///
/// let config = AmoConfig::from_toml_str(r#"seasonal_phase = "DayOfYear""#).unwrap();
/// assert_eq!(config.seasonal_phase, SeasonalPhase::DayOfYear);
/// assert_eq!(config.region, amo::grid::RegionBox::AMO);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AmoConfig {
    /// Grouping used for the climatological seasonal cycle.
    ///
    /// Default: calendar month
    pub seasonal_phase: SeasonalPhase,

    /// Abscissa for both the climatology trend and the final detrend.
    ///
    /// Default: day number
    pub trend_axis: TrendAxis,

    /// Sphere radius used for grid-cell areas (m).
    ///
    /// Only ratios of areas enter the index, so this matters for validation
    /// and for callers inspecting the weights.
    /// Default: 6 371 000 m
    pub earth_radius: FloatValue,

    /// Region averaged when coordinates are supplied.
    ///
    /// Default: 0-70°N, 75°W-5°E
    pub region: RegionBox,
}

impl Default for AmoConfig {
    fn default() -> Self {
        Self {
            seasonal_phase: SeasonalPhase::default(),
            trend_axis: TrendAxis::default(),
            earth_radius: EARTH_RADIUS,
            region: RegionBox::AMO,
        }
    }
}

impl AmoConfig {
    /// Parse a configuration from TOML and validate it
    pub fn from_toml_str(text: &str) -> AmoResult<Self> {
        let config: AmoConfig =
            toml::from_str(text).map_err(|e| AmoError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> AmoResult<String> {
        toml::to_string(self).map_err(|e| AmoError::InvalidConfig(e.to_string()))
    }

    /// Check the region bounds and sphere radius
    pub fn validate(&self) -> AmoResult<()> {
        self.region.validate()?;
        if !(self.earth_radius.is_finite() && self.earth_radius > 0.0) {
            return Err(AmoError::InvalidConfig(format!(
                "earth_radius must be positive, got {}",
                self.earth_radius
            )));
        }
        Ok(())
    }

    pub fn with_region(mut self, region: RegionBox) -> Self {
        self.region = region;
        self
    }

    pub fn with_seasonal_phase(mut self, seasonal_phase: SeasonalPhase) -> Self {
        self.seasonal_phase = seasonal_phase;
        self
    }

    pub fn with_trend_axis(mut self, trend_axis: TrendAxis) -> Self {
        self.trend_axis = trend_axis;
        self
    }
}
