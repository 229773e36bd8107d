//! Second-order constructs built from raw indicators
//!
//! - [`supertrend`]: sequential bullish/bearish state machine with ratcheting bands
//! - [`slope`]: per-bar slope estimate of an indicator series

pub mod supertrend;

pub use supertrend::{supertrend, SuperTrend, TrendState};

use crate::indicators::Values;

/// Average change per bar over the last `span` bars:
/// `(values[i] - values[i - span]) / span`.
pub fn slope(values: &[Option<f64>], span: usize) -> Values {
    (0..values.len())
        .map(|i| {
            if span == 0 {
                return None;
            }
            let past = values[i.checked_sub(span)?]?;
            let current = values[i]?;
            Some((current - past) / span as f64)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slope() {
        let v = vec![None, Some(1.0), Some(2.0), Some(4.0)];
        let out = slope(&v, 2);
        assert_eq!(out, vec![None, None, None, Some(1.5)]);
    }

    #[test]
    fn test_slope_zero_span() {
        let v = vec![Some(1.0), Some(2.0)];
        assert_eq!(slope(&v, 0), vec![None, None]);
    }
}
