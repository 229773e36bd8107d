//! Trend indicators: ADX with directional indicators, MACD

use super::{atr, ema, ema_of, rolling_sum, sma_of, zip_with, Values};
use crate::OHLCV;

/// MACD output
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Macd {
    /// EMA(fast) - EMA(slow)
    pub line: Values,
    /// EMA(signal) of the MACD line
    pub signal: Values,
    /// line - signal
    pub histogram: Values,
}

/// Moving Average Convergence Divergence
pub fn macd(closes: &[f64], fast: usize, slow: usize, signal: usize) -> Macd {
    let line = zip_with(&ema(closes, fast), &ema(closes, slow), |f, s| f - s);
    let signal = ema_of(&line, signal);
    let histogram = zip_with(&line, &signal, |l, s| l - s);
    Macd {
        line,
        signal,
        histogram,
    }
}

/// ADX output
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Adx {
    pub adx: Values,
    pub plus_di: Values,
    pub minus_di: Values,
}

/// Average Directional Index with +DI / -DI.
///
/// Directional movement comes from consecutive high/low deltas; a bar counts
/// toward +DM only when the up-move beats the down-move and is positive (and
/// symmetrically for -DM). DM is summed over `window` and divided by ATR.
/// `DX = 100 * |+DI - -DI| / (+DI + -DI)`, 0 when the denominator is 0.
/// ADX is the rolling mean of DX over `window`.
pub fn adx<T: OHLCV>(bars: &[T], window: usize) -> Adx {
    let n = bars.len();
    let mut plus_dm = vec![Some(0.0); n];
    let mut minus_dm = vec![Some(0.0); n];

    for i in 1..n {
        let up = bars[i].high() - bars[i - 1].high();
        let down = bars[i - 1].low() - bars[i].low();
        if up > down && up > 0.0 {
            plus_dm[i] = Some(up);
        }
        if down > up && down > 0.0 {
            minus_dm[i] = Some(down);
        }
    }

    let range = atr(bars, window);
    let directional = |dm: &[Option<f64>]| -> Values {
        zip_with(&rolling_sum(dm, window), &range, |sum, a| {
            if a > 0.0 {
                100.0 * sum / a
            } else {
                0.0
            }
        })
    };
    let plus_di = directional(&plus_dm);
    let minus_di = directional(&minus_dm);

    let dx = zip_with(&plus_di, &minus_di, |p, m| {
        let denom = p + m;
        if denom > 0.0 {
            100.0 * (p - m).abs() / denom
        } else {
            0.0
        }
    });

    Adx {
        adx: sma_of(&dx, window),
        plus_di,
        minus_di,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Bar;

    fn bar(o: f64, h: f64, l: f64, c: f64) -> Bar {
        Bar::new(0, o, h, l, c, 1000.0)
    }

    #[test]
    fn test_macd_warmup() {
        let closes: Vec<f64> = (0..60).map(|i| 100.0 + i as f64).collect();
        let m = macd(&closes, 12, 26, 9);
        assert!(m.line[..25].iter().all(Option::is_none));
        assert!(m.line[25].is_some());
        assert!(m.signal[32].is_none());
        assert!(m.signal[33].is_some());
        // rising series: fast EMA above slow EMA
        assert!(m.line[59].unwrap() > 0.0);
    }

    #[test]
    fn test_adx_strong_uptrend() {
        let bars: Vec<Bar> = (0..60)
            .map(|i| {
                let base = 100.0 + i as f64 * 2.0;
                bar(base, base + 1.5, base - 0.5, base + 1.0)
            })
            .collect();
        let out = adx(&bars, 14);
        assert!(out.adx[25].is_none());
        let last = out.adx[59].unwrap();
        assert!(last > 25.0, "adx = {last}");
        assert!(out.plus_di[59].unwrap() > out.minus_di[59].unwrap());
    }

    #[test]
    fn test_adx_flat_market_is_zero() {
        let bars: Vec<Bar> = (0..40).map(|_| bar(100.0, 100.0, 100.0, 100.0)).collect();
        let out = adx(&bars, 14);
        // zero range: ATR 0 -> DI 0 -> DX denominator 0 -> DX 0
        assert_eq!(out.adx[39], Some(0.0));
        assert_eq!(out.plus_di[39], Some(0.0));
    }
}
