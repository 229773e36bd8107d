//! Bullish reversal scan
//!
//! A narrower pipeline than the scoring engine: it looks only at the latest bar
//! and passes it through a fixed sequence of gates. The first failing gate is
//! reported as a [`Rejection`]; when every gate passes a [`ReversalSignal`] is
//! produced with entry, stop and two targets.
//!
//! Gates, in order:
//!
//! 1. ADX defined and below the threshold (non-trending market)
//! 2. Close below both the short and the mid EMA
//! 3. Short EMA slope small relative to price
//! 4. Hammer or bullish engulfing candle
//! 5. Volume at least `volume_multiple` times its rolling average
//! 6. ATR defined and positive

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::ReversalConfig;
use crate::detectors::{detect_reversal_pattern, BullishEngulfingDetector, ReversalPattern};
use crate::frame::IndicatorFrame;
use crate::{Result, ScanError, OHLCV};

/// A reversal setup found on the latest bar
///
/// Prices, EMAs and ADX are rounded to 2 decimals, ATR to 4; volumes are
/// truncated to whole shares.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReversalSignal {
    pub symbol: String,
    pub entry: f64,
    pub stop_loss: f64,
    pub target1: f64,
    pub target2: f64,
    pub atr: f64,
    pub adx: f64,
    pub ema_short: f64,
    pub ema_mid: f64,
    pub volume: u64,
    pub volume_sma: u64,
    pub pattern: ReversalPattern,
    /// Heuristic score in 30..=95, not a probability
    pub confidence: u8,
    pub timestamp: Option<i64>,
}

impl ReversalSignal {
    /// Entry minus stop
    pub fn risk(&self) -> f64 {
        self.entry - self.stop_loss
    }
}

/// The gate that rejected the latest bar
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Rejection {
    AdxUndefined,
    Trending { adx: f64 },
    AboveAverages,
    Sloping { slope: f64 },
    NoPattern,
    VolumeUndefined,
    LowVolume { volume: f64, required: f64 },
    AtrUndefined,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AdxUndefined => f.write_str("ADX undefined"),
            Self::Trending { adx } => write!(f, "trending market (ADX {adx:.2})"),
            Self::AboveAverages => f.write_str("close not below the short and mid EMAs"),
            Self::Sloping { slope } => write!(f, "short EMA still sloping ({slope:.4})"),
            Self::NoPattern => f.write_str("no reversal candle"),
            Self::VolumeUndefined => f.write_str("volume average undefined"),
            Self::LowVolume { volume, required } => {
                write!(f, "volume {volume:.0} below required {required:.0}")
            }
            Self::AtrUndefined => f.write_str("ATR undefined or zero"),
        }
    }
}

/// Result of running the gates on one series
#[derive(Debug, Clone, PartialEq)]
pub enum ReversalOutcome {
    Signal(ReversalSignal),
    Rejected(Rejection),
}

impl ReversalOutcome {
    pub fn signal(self) -> Option<ReversalSignal> {
        match self {
            Self::Signal(s) => Some(s),
            Self::Rejected(_) => None,
        }
    }
}

/// Run the reversal gates on the latest bar of `bars`.
///
/// `frame` must be the indicator frame computed from `bars`; the gates read
/// its latest row, while the candle patterns are matched on the bars. Needs
/// at least two bars since the stop and the engulfing check read the bar
/// before the latest.
pub fn evaluate<T: OHLCV>(
    symbol: &str,
    bars: &[T],
    frame: &IndicatorFrame,
    cfg: &ReversalConfig,
) -> Result<ReversalOutcome> {
    if frame.len() != bars.len() {
        return Err(ScanError::InvalidValue("indicator frame does not match the bar series"));
    }
    let (last, prev) = match (frame.latest(), frame.previous()) {
        (Some(last), Some(prev)) => (last, prev),
        _ => {
            return Err(ScanError::InsufficientHistory {
                need: 2,
                got: bars.len(),
            })
        }
    };
    let close = last.close;

    let adx = match last.adx {
        None => return Ok(ReversalOutcome::Rejected(Rejection::AdxUndefined)),
        Some(adx) if adx >= cfg.adx_threshold => {
            return Ok(ReversalOutcome::Rejected(Rejection::Trending { adx }))
        }
        Some(adx) => adx,
    };

    let (ema_short, ema_mid) = match (last.ema_short, last.ema_mid) {
        (Some(s), Some(m)) if close < s && close < m => (s, m),
        _ => return Ok(ReversalOutcome::Rejected(Rejection::AboveAverages)),
    };

    // undefined slope counts as still trending
    match last.ema_short_slope {
        Some(s) if s.abs() <= cfg.slope_ratio.get() * close => {}
        other => {
            return Ok(ReversalOutcome::Rejected(Rejection::Sloping {
                slope: other.unwrap_or(f64::NAN),
            }))
        }
    }

    let hammer = cfg.hammer();
    let pattern = match detect_reversal_pattern(bars, last.index, &hammer, &BullishEngulfingDetector) {
        Some(m) => m.pattern,
        None => return Ok(ReversalOutcome::Rejected(Rejection::NoPattern)),
    };

    let volume = last.volume;
    let volume_sma = match last.volume_sma {
        Some(v) => v,
        None => return Ok(ReversalOutcome::Rejected(Rejection::VolumeUndefined)),
    };
    let required = cfg.volume_multiple * volume_sma;
    if volume < required {
        return Ok(ReversalOutcome::Rejected(Rejection::LowVolume { volume, required }));
    }

    let atr = match last.atr {
        Some(a) if a > 0.0 => a,
        _ => return Ok(ReversalOutcome::Rejected(Rejection::AtrUndefined)),
    };

    let entry = close;
    let stop_loss = last.low.min(prev.low) - cfg.atr_stop_multiple * atr;
    let risk = entry - stop_loss;

    Ok(ReversalOutcome::Signal(ReversalSignal {
        symbol: symbol.to_string(),
        entry: round_to(entry, 2),
        stop_loss: round_to(stop_loss, 2),
        target1: round_to(entry + cfg.target1_multiple * risk, 2),
        target2: round_to(entry + cfg.target2_multiple * risk, 2),
        atr: round_to(atr, 4),
        adx: round_to(adx, 2),
        ema_short: round_to(ema_short, 2),
        ema_mid: round_to(ema_mid, 2),
        volume: volume as u64,
        volume_sma: volume_sma as u64,
        pattern,
        confidence: confidence(volume, volume_sma, adx, cfg),
        timestamp: last.timestamp,
    }))
}

/// `50 + trunc(volume_multiple * volume_sma / max(1, volume) * 10)
///  + trunc(max(0, adx_threshold - adx))`, clamped to 30..=95.
///
/// The volume term shrinks as volume grows.
pub fn confidence(volume: f64, volume_sma: f64, adx: f64, cfg: &ReversalConfig) -> u8 {
    let volume_term = (cfg.volume_multiple * volume_sma / volume.max(1.0) * 10.0) as i64;
    let adx_term = (cfg.adx_threshold - adx).max(0.0) as i64;
    (50 + volume_term + adx_term).clamp(30, 95) as u8
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (value * scale).round() / scale
}
