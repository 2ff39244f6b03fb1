//! Tail-risk metrics on simulated terminal values.
//!
//! Both metrics are expressed in portfolio **value**, not as a loss or a
//! return. VaR at confidence `c` is the empirical `(1 - c)` quantile of the
//! terminal values taken from below, and CVaR is the mean of the values at or
//! below it, so CVaR ≤ VaR always holds.

/// Value-at-Risk of `values` at `confidence` (e.g. 0.95).
///
/// Sorts ascending, skips the lowest `floor((1 - c) * n)` values and returns
/// the next one. Returns 0 when nothing is left after skipping.
///
/// # Examples
///
/// ```
/// use riskfolio_risk::value_at_risk;
///
/// let values: Vec<f64> = (1..=100).map(f64::from).collect();
/// assert_eq!(value_at_risk(&values, 0.95), 6.0);
/// ```
pub fn value_at_risk(values: &[f64], confidence: f64) -> f64 {
    let skip = tail_count(values.len(), confidence);
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    sorted.get(skip).copied().unwrap_or(0.0)
}

/// Conditional Value-at-Risk of `values` at `confidence`.
///
/// Mean of every value at or below [`value_at_risk`]; falls back to the VaR
/// itself when no value qualifies.
pub fn conditional_value_at_risk(values: &[f64], confidence: f64) -> f64 {
    let threshold = value_at_risk(values, confidence);
    let (sum, count) = values
        .iter()
        .filter(|&&v| v <= threshold)
        .fold((0.0, 0_usize), |(sum, count), &v| (sum + v, count + 1));

    if count == 0 {
        threshold
    } else {
        sum / count as f64
    }
}

/// Number of lowest observations skipped before reading the VaR.
fn tail_count(len: usize, confidence: f64) -> usize {
    let tail = (1.0 - confidence) * len as f64;
    if tail.is_finite() && tail > 0.0 {
        tail.floor() as usize
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    fn hundred() -> Vec<f64> {
        // Deliberately unsorted.
        (1..=100).rev().map(f64::from).collect()
    }

    #[rstest]
    #[case(0.95, 6.0)]
    #[case(0.99, 2.0)]
    #[case(0.975, 3.0)]
    #[case(0.50, 51.0)]
    fn test_var_skips_tail(#[case] confidence: f64, #[case] expected: f64) {
        assert_eq!(value_at_risk(&hundred(), confidence), expected);
    }

    #[test]
    fn test_cvar_is_mean_of_tail() {
        // Values 1..=6 are at or below the 95% VaR of 6.
        assert_relative_eq!(conditional_value_at_risk(&hundred(), 0.95), 3.5);
    }

    #[test]
    fn test_var_is_member_and_cvar_not_above() {
        let values: Vec<f64> = (0..997)
            .map(|i| 1_000.0 + ((i * 37) % 997) as f64 * 0.5)
            .collect();
        for confidence in [0.5, 0.9, 0.95, 0.975, 0.99] {
            let var = value_at_risk(&values, confidence);
            let cvar = conditional_value_at_risk(&values, confidence);
            assert!(values.contains(&var));
            assert!(cvar <= var);
        }
    }

    #[test]
    fn test_empty_input_defaults_to_zero() {
        assert_eq!(value_at_risk(&[], 0.95), 0.0);
        assert_eq!(conditional_value_at_risk(&[], 0.95), 0.0);
    }

    #[test]
    fn test_zero_confidence_skips_everything() {
        assert_eq!(value_at_risk(&[3.0, 1.0, 2.0], 0.0), 0.0);
    }

    #[test]
    fn test_single_value() {
        assert_eq!(value_at_risk(&[123.0], 0.95), 123.0);
        assert_eq!(conditional_value_at_risk(&[123.0], 0.95), 123.0);
    }
}
