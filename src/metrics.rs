//! Error metrics
//!
//! Degenerate input yields the NaN "undefined metric" sentinel rather
//! than a panic or an error. Callers must check with `is_nan` before
//! using the value.

/// Root-mean-squared-error between actual and predicted sequences.
///
/// Returns NaN when the sequences are empty or differ in length.
pub fn rmse(actual: &[f64], predicted: &[f64]) -> f64 {
    if actual.len() != predicted.len() || actual.is_empty() {
        return f64::NAN;
    }

    let sum_sq: f64 = actual
        .iter()
        .zip(predicted.iter())
        .map(|(&y, &yhat)| (yhat - y) * (yhat - y))
        .sum();

    (sum_sq / actual.len() as f64).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_rmse_identical_sequences_is_zero() {
        let y = vec![14.2, 13.8, 13.1, 12.0];
        assert_eq!(rmse(&y, &y), 0.0);
    }

    #[test]
    fn test_rmse_known_value() {
        // Errors of 1 and -1 over two samples: sqrt((1 + 1) / 2) = 1
        let actual = vec![0.0, 0.0];
        let predicted = vec![1.0, -1.0];
        assert_relative_eq!(rmse(&actual, &predicted), 1.0);
    }

    #[test]
    fn test_rmse_is_non_negative() {
        let a = vec![1.0, -2.0, 3.5];
        let b = vec![-0.5, 4.0, 2.0];
        assert!(rmse(&a, &b) >= 0.0);
    }

    #[test]
    fn test_rmse_symmetric_in_arguments() {
        let a = vec![1.0, 2.0, 3.0];
        let b = vec![1.5, 1.0, 4.0];
        assert_relative_eq!(rmse(&a, &b), rmse(&b, &a));
    }

    #[test]
    fn test_rmse_empty_sequences_is_nan() {
        assert!(rmse(&[], &[]).is_nan());
    }

    #[test]
    fn test_rmse_mismatched_lengths_is_nan() {
        assert!(rmse(&[1.0, 2.0], &[1.0]).is_nan());
        assert!(rmse(&[1.0], &[1.0, 2.0]).is_nan());
    }
}
