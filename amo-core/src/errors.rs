use thiserror::Error;

/// Error type for invalid inputs to the index pipeline.
///
/// Every variant is fatal and is raised before any numeric work is done.
/// Soft degradations (too few points for a linear fit, empty regions) are not
/// errors; they produce missing samples instead.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AmoError {
    #[error("Time axis of length {time_len} matches no dimension of SST data with shape {shape:?}")]
    ShapeMismatch { time_len: usize, shape: Vec<usize> },
    #[error("Invalid coordinate grid: {0}")]
    GridShapeMismatch(String),
    #[error("SST data must be 1-D (time) or 3-D (rows, cols, time), got {ndim} dimensions")]
    UnsupportedDimensionality { ndim: usize },
    #[error("Cannot convert {value:?} to a day number: {reason}")]
    InvalidTime { value: String, reason: String },
    #[error("Invalid region: {0}")]
    InvalidRegion(String),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Convenience type for `Result<T, AmoError>`.
pub type AmoResult<T> = Result<T, AmoError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shape_mismatch_message() {
        let err = AmoError::ShapeMismatch {
            time_len: 12,
            shape: vec![10, 10, 24],
        };
        assert_eq!(
            err.to_string(),
            "Time axis of length 12 matches no dimension of SST data with shape [10, 10, 24]"
        );
    }

    #[test]
    fn grid_shape_mismatch_message() {
        let err = AmoError::GridShapeMismatch("latitude must be 2-D, got 1-D".to_string());
        assert_eq!(
            err.to_string(),
            "Invalid coordinate grid: latitude must be 2-D, got 1-D"
        );
    }

    #[test]
    fn error_is_send_and_sync() {
        fn assert_impl<T: Send + Sync + std::error::Error>() {}
        assert_impl::<AmoError>();
    }
}
