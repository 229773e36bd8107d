//! Momentum oscillators: RSI, Stochastic, Williams %R, CCI, ROC

use super::{defined, rolling, rolling_max, rolling_min, sma_of, Values};
use crate::{OHLCVExt, OHLCV};

/// Relative Strength Index with Wilder smoothing.
///
/// The first average gain/loss is the mean of the first `window` changes;
/// afterwards `avg = (avg * (window - 1) + x) / window`. Defined from bar
/// `window`. A window without losses reads 100, without any movement 50.
pub fn rsi(closes: &[f64], window: usize) -> Values {
    let n = closes.len();
    let mut out = vec![None; n];
    if window == 0 || n <= window {
        return out;
    }

    let w = window as f64;
    let change = |i: usize| closes[i] - closes[i - 1];

    let (mut avg_gain, mut avg_loss) = (1..=window).fold((0.0, 0.0), |(g, l), i| {
        let c = change(i);
        (g + c.max(0.0), l + (-c).max(0.0))
    });
    avg_gain /= w;
    avg_loss /= w;
    out[window] = rsi_value(avg_gain, avg_loss);

    for i in window + 1..n {
        let c = change(i);
        avg_gain = (avg_gain * (w - 1.0) + c.max(0.0)) / w;
        avg_loss = (avg_loss * (w - 1.0) + (-c).max(0.0)) / w;
        out[i] = rsi_value(avg_gain, avg_loss);
    }

    out
}

fn rsi_value(avg_gain: f64, avg_loss: f64) -> Option<f64> {
    if !avg_gain.is_finite() || !avg_loss.is_finite() {
        return None;
    }
    Some(match (avg_gain > 0.0, avg_loss > 0.0) {
        (_, true) => 100.0 - 100.0 / (1.0 + avg_gain / avg_loss),
        (true, false) => 100.0,
        (false, false) => 50.0,
    })
}

/// Highest high and lowest low over `window` bars
fn high_low_channel<T: OHLCV>(bars: &[T], window: usize) -> (Values, Values) {
    let highs: Vec<f64> = bars.iter().map(|b| b.high()).collect();
    let lows: Vec<f64> = bars.iter().map(|b| b.low()).collect();
    (
        rolling_max(&defined(&highs), window),
        rolling_min(&defined(&lows), window),
    )
}

/// Stochastic Oscillator output
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Stochastic {
    pub k: Values,
    pub d: Values,
}

/// Stochastic Oscillator: `%K = 100 * (close - LL) / (HH - LL)` over `window`,
/// `%D = SMA(smooth)` of %K. Undefined while the channel is flat.
pub fn stochastic<T: OHLCV>(bars: &[T], window: usize, smooth: usize) -> Stochastic {
    let (hh, ll) = high_low_channel(bars, window);
    let k: Values = bars
        .iter()
        .zip(hh.iter().zip(&ll))
        .map(|(bar, (hh, ll))| match (hh, ll) {
            (Some(hh), Some(ll)) if hh > ll => Some(100.0 * (bar.close() - ll) / (hh - ll)),
            _ => None,
        })
        .collect();
    let d = sma_of(&k, smooth);
    Stochastic { k, d }
}

/// Williams %R: `-100 * (HH - close) / (HH - LL)`, in [-100, 0].
pub fn williams_r<T: OHLCV>(bars: &[T], window: usize) -> Values {
    let (hh, ll) = high_low_channel(bars, window);
    bars.iter()
        .zip(hh.iter().zip(&ll))
        .map(|(bar, (hh, ll))| match (hh, ll) {
            (Some(hh), Some(ll)) if hh > ll => Some(-100.0 * (hh - bar.close()) / (hh - ll)),
            _ => None,
        })
        .collect()
}

/// Commodity Channel Index on the typical price.
///
/// `CCI = (TP - SMA(TP)) / (0.015 * meanDeviation)`; 0 when the mean
/// deviation vanishes.
pub fn cci<T: OHLCV>(bars: &[T], window: usize) -> Values {
    let tp: Vec<f64> = bars.iter().map(|b| b.typical_price()).collect();
    rolling(&defined(&tp), window, |w| {
        let n = w.len() as f64;
        let mean = w.iter().sum::<f64>() / n;
        let mean_dev = w.iter().map(|x| (x - mean).abs()).sum::<f64>() / n;
        let current = *w.last()?;
        if mean_dev.abs() < 1e-10 {
            Some(0.0)
        } else {
            Some((current - mean) / (0.015 * mean_dev))
        }
    })
}

/// Rate of Change: `(close - close[window bars ago]) / close[window bars ago] * 100`
pub fn roc(closes: &[f64], window: usize) -> Values {
    closes
        .iter()
        .enumerate()
        .map(|(i, c)| {
            let past = closes[i.checked_sub(window)?];
            (window > 0 && past != 0.0).then(|| (c - past) / past * 100.0)
        })
        .collect()
}
