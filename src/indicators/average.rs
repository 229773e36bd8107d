//! Moving averages and rolling statistics

use super::{defined, rolling, Values};

/// Exponential moving average of raw values.
///
/// Smoothing factor `2 / (window + 1)`, seeded from the first value rather than
/// from an SMA. The recursion starts at the first bar; outputs are reported
/// from bar `window - 1` onwards.
pub fn ema(values: &[f64], window: usize) -> Values {
    ema_of(&defined(values), window)
}

/// Exponential moving average of an indicator series.
///
/// The recursion is seeded at the first defined value. An undefined value
/// resets the recursion, so a gap is followed by a fresh warm-up.
pub fn ema_of(values: &[Option<f64>], window: usize) -> Values {
    if window == 0 {
        return vec![None; values.len()];
    }
    let alpha = 2.0 / (window as f64 + 1.0);
    let mut state: Option<f64> = None;
    let mut count = 0usize;

    values
        .iter()
        .map(|v| match *v {
            None => {
                state = None;
                count = 0;
                None
            }
            Some(x) => {
                let next = match state {
                    Some(prev) => alpha * x + (1.0 - alpha) * prev,
                    None => x,
                };
                state = Some(next);
                count += 1;
                (count >= window).then_some(next)
            }
        })
        .collect()
}

/// Simple (arithmetic) moving average of raw values
pub fn sma(values: &[f64], window: usize) -> Values {
    sma_of(&defined(values), window)
}

/// Simple moving average of an indicator series
pub fn sma_of(values: &[Option<f64>], window: usize) -> Values {
    rolling(values, window, |w| Some(w.iter().sum::<f64>() / w.len() as f64))
}

/// Rolling sum
pub fn rolling_sum(values: &[Option<f64>], window: usize) -> Values {
    rolling(values, window, |w| Some(w.iter().sum()))
}

/// Rolling minimum
pub fn rolling_min(values: &[Option<f64>], window: usize) -> Values {
    rolling(values, window, |w| w.iter().copied().reduce(f64::min))
}

/// Rolling maximum
pub fn rolling_max(values: &[Option<f64>], window: usize) -> Values {
    rolling(values, window, |w| w.iter().copied().reduce(f64::max))
}

/// Rolling population standard deviation (divides by `window`)
pub fn rolling_std(values: &[Option<f64>], window: usize) -> Values {
    rolling(values, window, |w| {
        let n = w.len() as f64;
        let mean = w.iter().sum::<f64>() / n;
        let var = w.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;
        Some(var.sqrt())
    })
}
