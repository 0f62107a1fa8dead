//! Descriptive statistics over score slices
//!
//! All scoring math in deal-rs runs over small slices (3-5 sub-scores,
//! ensemble samples, present categories), so these are straightforward
//! loops rather than a vectorized dependency. Standard deviation is the
//! sample (n-1) form throughout.

/// Arithmetic mean; 0.0 for an empty slice
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (n-1 denominator); 0.0 for fewer than two values
pub fn sample_stdev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let variance =
        values.iter().map(|v| (v - m) * (v - m)).sum::<f64>() / (values.len() - 1) as f64;
    variance.sqrt()
}

/// Median; averages the two middle values for an even count, 0.0 when empty
pub fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean() {
        assert_eq!(mean(&[]), 0.0);
        assert_eq!(mean(&[70.0, 72.0, 95.0]), 79.0);
    }

    #[test]
    fn test_sample_stdev() {
        assert_eq!(sample_stdev(&[42.0]), 0.0);
        assert_eq!(sample_stdev(&[50.0, 50.0, 50.0]), 0.0);
        // {2, 4, 4, 4, 5, 5, 7, 9}: sample variance 32/7
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert!((sample_stdev(&values) - (32.0_f64 / 7.0).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_median_odd_is_robust_to_outlier() {
        assert_eq!(median(&[70.0, 72.0, 95.0]), 72.0);
    }

    #[test]
    fn test_median_even_averages_middles() {
        assert_eq!(median(&[70.0, 80.0]), 75.0);
        assert_eq!(median(&[1.0, 2.0, 3.0, 10.0]), 2.5);
    }
}
