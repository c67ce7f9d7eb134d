use crate::{enums::ValueOrdering, error::RegressionError};

use tracing::warn;

/// Ascending independent-variable values, one per T index.
#[derive(Clone, Debug, PartialEq)]
pub struct IndependentValues {
    values: Vec<f64>,
}

impl IndependentValues {
    /// Wrap values that are already in T-axis order.
    ///
    /// # Errors
    ///
    /// Returns `NonFinite` for NaN or infinite entries (with a 1-based
    /// position) and `NotAscending` if any value is smaller than the one
    /// before it.
    pub fn new(values: Vec<f64>) -> Result<Self, RegressionError> {
        if let Some(index) = values.iter().position(|v| !v.is_finite()) {
            return Err(RegressionError::NonFinite {
                index: index + 1,
                value: values[index],
            });
        }
        if let Some(index) = values.windows(2).position(|pair| pair[1] < pair[0]) {
            return Err(RegressionError::NotAscending {
                index: index + 1,
                previous: values[index],
                value: values[index + 1],
            });
        }
        Ok(Self { values })
    }

    /// Parse newline-separated numbers, skipping blank lines
    ///
    /// # Errors
    ///
    /// `Parse` for the first non-blank line that is not a finite real, then
    /// the ordering errors of [`IndependentValues::new`] when `ordering` is
    /// `Validate`.
    pub fn parse_lines<I, S>(lines: I, ordering: ValueOrdering) -> Result<Self, RegressionError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut values = Vec::new();
        for (i, line) in lines.into_iter().enumerate() {
            let trimmed = line.as_ref().trim();
            if trimmed.is_empty() {
                continue;
            }
            let value = trimmed
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| RegressionError::Parse {
                    line: i + 1,
                    content: trimmed.to_string(),
                })?;
            values.push(value);
        }

        if matches!(ordering, ValueOrdering::Sort) {
            let already_sorted = values.windows(2).all(|pair| pair[0] <= pair[1]);
            if !already_sorted {
                warn!("independent values were not in ascending order and have been sorted");
                values.sort_by(f64::total_cmp);
            }
        }

        Self::new(values)
    }

    /// Parse the contents of an independent-values file
    pub fn parse_str(text: &str, ordering: ValueOrdering) -> Result<Self, RegressionError> {
        Self::parse_lines(text.lines(), ordering)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    pub fn mean(&self) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }
        self.values.iter().sum::<f64>() / self.values.len() as f64
    }

    /// Σ(tᵢ − t̄)²
    pub fn sum_sq_dev(&self) -> f64 {
        let mean = self.mean();
        self.values.iter().map(|&t| (t - mean) * (t - mean)).sum()
    }

    /// True when a straight line cannot be fitted against these values
    pub fn is_degenerate(&self) -> bool {
        self.sum_sq_dev() == 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_skips_blank_lines() {
        let values = IndependentValues::parse_str("0.004\n\n  0.008 \n\t\n0.012\n", ValueOrdering::Validate)
            .unwrap();
        assert_eq!(values.as_slice(), &[0.004, 0.008, 0.012]);
    }

    #[test]
    fn test_parse_scientific_notation() {
        let values = IndependentValues::parse_str("1e-3\n2E-3\n+3.5e-3", ValueOrdering::Validate).unwrap();
        assert_eq!(values.as_slice(), &[0.001, 0.002, 0.0035]);
    }

    #[test]
    fn test_parse_error_reports_line() {
        let err = IndependentValues::parse_str("1.0\n\nabc\n2.0", ValueOrdering::Validate).unwrap_err();
        assert_eq!(
            err,
            RegressionError::Parse {
                line: 3,
                content: "abc".to_string(),
            }
        );
    }

    #[test]
    fn test_parse_rejects_non_finite() {
        assert!(matches!(
            IndependentValues::parse_str("1.0\nnan\n", ValueOrdering::Validate),
            Err(RegressionError::Parse { line: 2, .. })
        ));
        assert!(matches!(
            IndependentValues::parse_str("inf\n", ValueOrdering::Sort),
            Err(RegressionError::Parse { line: 1, .. })
        ));
    }

    #[test]
    fn test_parse_rejects_two_numbers_on_a_line() {
        assert!(matches!(
            IndependentValues::parse_str("1.0 2.0\n", ValueOrdering::Validate),
            Err(RegressionError::Parse { line: 1, .. })
        ));
    }

    #[test]
    fn test_new_rejects_non_finite_by_position() {
        let err = IndependentValues::new(vec![0.5, f64::INFINITY, 1.0]).unwrap_err();
        assert_eq!(
            err,
            RegressionError::NonFinite {
                index: 2,
                value: f64::INFINITY,
            }
        );
        assert_eq!(err.to_string(), "Independent value inf at position 2 is not finite");
        assert!(matches!(
            IndependentValues::new(vec![f64::NAN]),
            Err(RegressionError::NonFinite { index: 1, .. })
        ));
    }

    #[test]
    fn test_descending_values_rejected() {
        let err = IndependentValues::parse_str("3\n1\n2\n", ValueOrdering::Validate).unwrap_err();
        assert_eq!(
            err,
            RegressionError::NotAscending {
                index: 1,
                previous: 3.0,
                value: 1.0,
            }
        );
    }

    #[test]
    fn test_sort_ordering() {
        let values = IndependentValues::parse_str("3\n1\n2\n", ValueOrdering::Sort).unwrap();
        assert_eq!(values.as_slice(), &[1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_ties_are_ascending() {
        let values = IndependentValues::parse_str("1\n1\n2\n", ValueOrdering::Validate).unwrap();
        assert_eq!(values.len(), 3);
    }

    #[test]
    fn test_empty_input() {
        let values = IndependentValues::parse_str("\n\n", ValueOrdering::Validate).unwrap();
        assert!(values.is_empty());
        assert_eq!(values.mean(), 0.0);
        assert!(values.is_degenerate());
    }

    #[test]
    fn test_summary_statistics() {
        let values = IndependentValues::new(vec![0.0, 1.0, 2.0]).unwrap();
        assert!((values.mean() - 1.0).abs() < 1e-12);
        assert!((values.sum_sq_dev() - 2.0).abs() < 1e-12);
        assert!(!values.is_degenerate());
        assert!(IndependentValues::new(vec![5.0, 5.0]).unwrap().is_degenerate());
    }
}
