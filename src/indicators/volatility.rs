//! Volatility indicators: True Range, ATR, Bollinger Bands, Keltner Channel and
//! rolling support/resistance.

use super::{closes, defined, ema, rolling_max, rolling_min, rolling_std, sma, sma_of, zip_with, Values};
use crate::OHLCV;

/// True Range: `max(high - low, |high - prevClose|, |low - prevClose|)`.
///
/// The first bar has no previous close, so its TR is `high - low`.
pub fn true_range<T: OHLCV>(bars: &[T]) -> Vec<f64> {
    bars.iter()
        .enumerate()
        .map(|(i, bar)| {
            let hl = bar.high() - bar.low();
            match i.checked_sub(1).map(|p| bars[p].close()) {
                Some(prev_close) => hl
                    .max((bar.high() - prev_close).abs())
                    .max((bar.low() - prev_close).abs()),
                None => hl,
            }
        })
        .collect()
}

/// Average True Range: rolling mean of TR over `window`
pub fn atr<T: OHLCV>(bars: &[T], window: usize) -> Values {
    sma_of(&defined(&true_range(bars)), window)
}

/// Bollinger Bands output
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Bollinger {
    pub high: Values,
    pub low: Values,
    pub mid: Values,
    /// Band width as a percentage of the middle band
    pub width: Values,
}

/// Bollinger Bands: `mid = SMA(window)`, bands at `mid ± std_dev * stddev(window)`.
pub fn bollinger(closes: &[f64], window: usize, std_dev: f64) -> Bollinger {
    let mid = sma(closes, window);
    let sd = rolling_std(&defined(closes), window);
    let high = zip_with(&mid, &sd, |m, s| m + std_dev * s);
    let low = zip_with(&mid, &sd, |m, s| m - std_dev * s);
    let width = high
        .iter()
        .zip(&low)
        .zip(&mid)
        .map(|((h, l), m)| match (h, l, m) {
            (Some(h), Some(l), Some(m)) if *m != 0.0 => Some((h - l) / m * 100.0),
            _ => None,
        })
        .collect();

    Bollinger {
        high,
        low,
        mid,
        width,
    }
}

/// Keltner Channel output
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Keltner {
    pub high: Values,
    pub low: Values,
    pub mid: Values,
}

/// Keltner Channel: `mid = EMA(window)` of close, bands offset by
/// `multiplier * ATR(atr_window)`.
pub fn keltner<T: OHLCV>(bars: &[T], window: usize, atr_window: usize, multiplier: f64) -> Keltner {
    let mid = ema(&closes(bars), window);
    let range = atr(bars, atr_window);
    Keltner {
        high: zip_with(&mid, &range, |m, a| m + multiplier * a),
        low: zip_with(&mid, &range, |m, a| m - multiplier * a),
        mid,
    }
}

/// Rolling support (min low) and resistance (max high) over `window` bars.
///
/// Returns `(support, resistance)`.
pub fn support_resistance<T: OHLCV>(bars: &[T], window: usize) -> (Values, Values) {
    let lows: Vec<f64> = bars.iter().map(|b| b.low()).collect();
    let highs: Vec<f64> = bars.iter().map(|b| b.high()).collect();
    (
        rolling_min(&defined(&lows), window),
        rolling_max(&defined(&highs), window),
    )
}
