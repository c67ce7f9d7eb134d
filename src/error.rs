use thiserror::Error;

/// Fatal preconditions of a regression pass.
///
/// All of these are raised before any output volume is materialised.
#[derive(Debug, Error, PartialEq)]
pub enum RegressionError {
    #[error("Mask shape {mask:?} does not match volume spatial shape {volume:?}")]
    ShapeMismatch {
        volume: (usize, usize, usize),
        mask: (usize, usize, usize),
    },

    #[error("Expected {timepoints} independent values (one per volume), got {values}")]
    LengthMismatch { values: usize, timepoints: usize },

    #[error("Line {line}: '{content}' is not a finite real number")]
    Parse { line: usize, content: String },

    #[error("Independent value {value} at position {index} is not finite")]
    NonFinite { index: usize, value: f64 },

    #[error(
        "Independent values must be ascending: value {value} at position {index} follows {previous}"
    )]
    NotAscending {
        index: usize,
        previous: f64,
        value: f64,
    },
}
