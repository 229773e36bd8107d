//! Technical indicator library
//!
//! Every indicator is a pure, order-preserving transform of a bar series (or of
//! another indicator) into a [`Values`] sequence index-aligned 1:1 with its
//! input. A value that needs `N` bars of lookback is `None` for the first
//! `N - 1` bars; `None` inputs propagate to `None` outputs.
//!
//! # Indicator Groups
//!
//! - **Averages**: EMA, SMA, rolling sum/min/max/stddev
//! - **Trend**: ADX with +DI/-DI, MACD
//! - **Momentum**: RSI, Stochastic, Williams %R, CCI, ROC
//! - **Volatility**: True Range, ATR, Bollinger Bands, Keltner Channel, rolling support/resistance
//! - **Volume**: OBV, VWAP, MFI

pub mod average;
pub mod momentum;
pub mod trend;
pub mod volatility;
pub mod volume;

pub use average::*;
pub use momentum::*;
pub use trend::*;
pub use volatility::*;
pub use volume::*;

use crate::OHLCV;

/// Indicator output: one optional value per input bar
pub type Values = Vec<Option<f64>>;

/// Lift raw numbers into [`Values`], treating non-finite numbers as undefined.
pub fn defined(values: &[f64]) -> Values {
    values.iter().map(|v| v.is_finite().then_some(*v)).collect()
}

/// Close prices of a bar series
pub fn closes<T: OHLCV>(bars: &[T]) -> Vec<f64> {
    bars.iter().map(|b| b.close()).collect()
}

/// Volumes of a bar series
pub fn volumes<T: OHLCV>(bars: &[T]) -> Vec<f64> {
    bars.iter().map(|b| b.volume()).collect()
}

/// Apply `f` to every trailing window of `window` values.
///
/// The output at `i` is defined only when all of `values[i + 1 - window..=i]`
/// are defined and `f` returns a value.
pub(crate) fn rolling<F>(values: &[Option<f64>], window: usize, f: F) -> Values
where
    F: Fn(&[f64]) -> Option<f64>,
{
    let mut out = Vec::with_capacity(values.len());
    let mut buf = Vec::with_capacity(window);

    for i in 0..values.len() {
        if window == 0 || i + 1 < window {
            out.push(None);
            continue;
        }
        buf.clear();
        for v in &values[i + 1 - window..=i] {
            match v {
                Some(x) => buf.push(*x),
                None => break,
            }
        }
        out.push(if buf.len() == window { f(&buf) } else { None });
    }

    out
}

/// Combine two aligned series element-wise; undefined if either side is.
pub(crate) fn zip_with<F>(a: &[Option<f64>], b: &[Option<f64>], f: F) -> Values
where
    F: Fn(f64, f64) -> f64,
{
    a.iter()
        .zip(b)
        .map(|(x, y)| match (x, y) {
            (Some(x), Some(y)) => Some(f(*x, *y)),
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defined_drops_non_finite() {
        let v = defined(&[1.0, f64::NAN, f64::INFINITY, 2.0]);
        assert_eq!(v, vec![Some(1.0), None, None, Some(2.0)]);
    }

    #[test]
    fn test_rolling_warmup_and_gaps() {
        let v = vec![Some(1.0), Some(2.0), None, Some(4.0), Some(5.0), Some(6.0)];
        let sums = rolling(&v, 2, |w| Some(w.iter().sum()));
        assert_eq!(sums, vec![None, Some(3.0), None, None, Some(9.0), Some(11.0)]);
    }

    #[test]
    fn test_rolling_zero_window() {
        let v = vec![Some(1.0); 3];
        assert_eq!(rolling(&v, 0, |w| Some(w[0])), vec![None; 3]);
    }
}
