//! Univariate outlier detection with Tukey fences.
//!
//! A value is an outlier when it lies strictly outside
//! `[Q1 − k·IQR, Q3 + k·IQR]`, with quartiles taken by linear interpolation
//! and `k = 1.5` by default. Non-finite values are skipped. Samples smaller
//! than four values are handled the same way as larger ones; an empty
//! sample has no bounds and no outliers.
//!
//! ```
//! use u_report::outliers::count_outliers;
//!
//! let values = [1.0, 2.0, 3.0, 2.5, 100.0, 2.0, 3.0, 2.0];
//! assert_eq!(count_outliers(&values), 1);
//! ```

use serde::Serialize;

use crate::config::IQR_MULTIPLIER;

/// Quartiles and fences of a sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct IqrBounds {
    /// 25th percentile.
    pub q1: f64,
    /// 75th percentile.
    pub q3: f64,
    /// Q3 − Q1.
    pub iqr: f64,
    /// Q1 − k·IQR.
    pub lower: f64,
    /// Q3 + k·IQR.
    pub upper: f64,
}

impl IqrBounds {
    /// Returns `true` if `value` lies strictly outside the fences.
    #[inline]
    pub fn is_outlier(&self, value: f64) -> bool {
        value < self.lower || value > self.upper
    }
}

fn finite(values: &[f64]) -> Vec<f64> {
    values.iter().copied().filter(|v| v.is_finite()).collect()
}

/// Computes quartiles and fences with multiplier `k`.
///
/// Returns `None` when the sample has no finite values.
pub fn iqr_bounds(values: &[f64], k: f64) -> Option<IqrBounds> {
    let vals = finite(values);
    if vals.is_empty() {
        return None;
    }
    let q1 = u_numflow::stats::quantile(&vals, 0.25)?;
    let q3 = u_numflow::stats::quantile(&vals, 0.75)?;
    let iqr = q3 - q1;
    Some(IqrBounds {
        q1,
        q3,
        iqr,
        lower: q1 - k * iqr,
        upper: q3 + k * iqr,
    })
}

/// Counts IQR outliers with multiplier `k`.
pub fn count_outliers_with(values: &[f64], k: f64) -> usize {
    match iqr_bounds(values, k) {
        Some(bounds) => values
            .iter()
            .filter(|v| v.is_finite() && bounds.is_outlier(**v))
            .count(),
        None => 0,
    }
}

/// Counts IQR outliers with the standard 1.5 multiplier.
pub fn count_outliers(values: &[f64]) -> usize {
    count_outliers_with(values, IQR_MULTIPLIER)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn bounds_on_simple_sample() {
        let b = iqr_bounds(&[1.0, 2.0, 3.0, 4.0, 5.0], 1.5).expect("bounds");
        assert!((b.q1 - 2.0).abs() < 1e-12);
        assert!((b.q3 - 4.0).abs() < 1e-12);
        assert!((b.iqr - 2.0).abs() < 1e-12);
        assert!((b.lower + 1.0).abs() < 1e-12);
        assert!((b.upper - 7.0).abs() < 1e-12);
    }

    #[test]
    fn detects_both_sides() {
        let values = [-50.0, 10.0, 11.0, 12.0, 13.0, 14.0, 15.0, 80.0];
        assert_eq!(count_outliers(&values), 2);
    }

    #[test]
    fn empty_sample_has_no_outliers() {
        assert!(iqr_bounds(&[], 1.5).is_none());
        assert_eq!(count_outliers(&[]), 0);
    }

    #[test]
    fn tiny_samples_degrade_gracefully() {
        assert_eq!(count_outliers(&[42.0]), 0);
        assert_eq!(count_outliers(&[1.0, 2.0]), 0);
        assert_eq!(count_outliers(&[1.0, 2.0, 3.0]), 0);
    }

    #[test]
    fn constant_sample_flags_any_deviation() {
        let values = [5.0, 5.0, 5.0, 5.0, 5.0, 6.0];
        // IQR = 0, so the single deviating value is outside the fences
        assert_eq!(count_outliers(&values), 1);
    }

    #[test]
    fn non_finite_values_skipped() {
        let values = [1.0, 2.0, f64::NAN, 3.0, f64::INFINITY];
        assert_eq!(count_outliers(&values), 0);
    }

    #[test]
    fn larger_multiplier_flags_fewer() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 20.0];
        assert!(count_outliers_with(&values, 3.0) <= count_outliers_with(&values, 1.5));
    }

    proptest! {
        #[test]
        fn extremes_never_reduce_outlier_count(
            n in 8usize..64,
            start in -1000.0f64..1000.0,
            step in 0.1f64..10.0,
        ) {
            let mut values: Vec<f64> = (0..n).map(|i| start + step * i as f64).collect();
            let span = step * n as f64 * 1e6;
            let mut previous = count_outliers(&values);
            for i in 0..n / 4 {
                let magnitude = span * (i + 1) as f64;
                let extreme = if i % 2 == 0 { start + magnitude } else { start - magnitude };
                values.push(extreme);
                let current = count_outliers(&values);
                prop_assert!(current >= previous, "{current} < {previous} after adding {extreme}");
                previous = current;
            }
        }

        #[test]
        fn count_never_exceeds_sample(values in proptest::collection::vec(-1e6f64..1e6, 0..100)) {
            prop_assert!(count_outliers(&values) <= values.len());
        }
    }
}
