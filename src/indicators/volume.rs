//! Volume indicators: OBV, VWAP, MFI

use super::Values;
use crate::{OHLCVExt, OHLCV};

/// On-Balance Volume: cumulative volume signed by the close-to-close direction.
///
/// Starts at 0 on the first bar; unchanged closes leave OBV unchanged.
pub fn obv<T: OHLCV>(bars: &[T]) -> Values {
    let mut total = 0.0;
    bars.iter()
        .enumerate()
        .map(|(i, bar)| {
            if i > 0 {
                let prev = bars[i - 1].close();
                if bar.close() > prev {
                    total += bar.volume();
                } else if bar.close() < prev {
                    total -= bar.volume();
                }
            }
            Some(total)
        })
        .collect()
}

/// Volume Weighted Average Price over the whole series.
///
/// Cumulative `typical price * volume` over cumulative volume; no session
/// reset. Undefined until some volume has traded.
pub fn vwap<T: OHLCV>(bars: &[T]) -> Values {
    let mut pv = 0.0;
    let mut vol = 0.0;
    bars.iter()
        .map(|bar| {
            pv += bar.typical_price() * bar.volume();
            vol += bar.volume();
            (vol > 0.0).then(|| pv / vol)
        })
        .collect()
}

/// Money Flow Index.
///
/// Raw money flow is `typical price * volume`, classed positive or negative by
/// the direction of the typical price versus the previous bar. Summed over the
/// last `window` bars: `MFI = 100 - 100 / (1 + positive / negative)`.
/// Defined from bar `window`; no negative flow reads 100, no flow at all 50.
pub fn mfi<T: OHLCV>(bars: &[T], window: usize) -> Values {
    let n = bars.len();
    let tp: Vec<f64> = bars.iter().map(|b| b.typical_price()).collect();
    let mut positive = vec![0.0; n];
    let mut negative = vec![0.0; n];

    for i in 1..n {
        let flow = tp[i] * bars[i].volume();
        if tp[i] > tp[i - 1] {
            positive[i] = flow;
        } else if tp[i] < tp[i - 1] {
            negative[i] = flow;
        }
    }

    (0..n)
        .map(|i| {
            if window == 0 || i < window {
                return None;
            }
            let pos: f64 = positive[i + 1 - window..=i].iter().sum();
            let neg: f64 = negative[i + 1 - window..=i].iter().sum();
            Some(if neg > 0.0 {
                100.0 - 100.0 / (1.0 + pos / neg)
            } else if pos > 0.0 {
                100.0
            } else {
                50.0
            })
        })
        .collect()
}
