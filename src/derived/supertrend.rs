//! SuperTrend
//!
//! Basic bands sit at `mid ± multiplier * ATR` around the bar mid-price
//! `(high + low) / 2`. The trend state is folded bar by bar:
//!
//! - close above the previous upper band → Bullish
//! - close below the previous lower band → Bearish
//! - otherwise the previous state holds
//!
//! While a state holds from one bar to the next its trailing band ratchets:
//! the lower band never falls during a Bullish run and the upper band never
//! rises during a Bearish run.

use serde::{Deserialize, Serialize};

use crate::indicators::{atr, Values};
use crate::{OHLCVExt, OHLCV};

/// Binary SuperTrend state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrendState {
    #[default]
    Bullish,
    Bearish,
}

impl TrendState {
    #[inline]
    pub fn is_bullish(self) -> bool {
        matches!(self, TrendState::Bullish)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TrendState::Bullish => "Bullish",
            TrendState::Bearish => "Bearish",
        }
    }
}

impl std::fmt::Display for TrendState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-bar SuperTrend state and the ratcheted bands
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SuperTrend {
    pub states: Vec<TrendState>,
    pub upper: Values,
    pub lower: Values,
}

impl SuperTrend {
    fn with_capacity(n: usize) -> Self {
        Self {
            states: Vec::with_capacity(n),
            upper: Vec::with_capacity(n),
            lower: Vec::with_capacity(n),
        }
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Advance the state machine by one bar.
    ///
    /// The active band ratchets on every bar that keeps the previous state,
    /// including a bullish bar re-confirmed by closing above the upper band,
    /// not only on bars where neither band is crossed.
    fn step(&mut self, close: f64, mut upper: Option<f64>, mut lower: Option<f64>) {
        let prev_state = self.states.last().copied();
        let prev_upper = self.upper.last().copied().flatten();
        let prev_lower = self.lower.last().copied().flatten();

        let state = match prev_state {
            None => TrendState::Bullish,
            Some(prev) => {
                if prev_upper.is_some_and(|u| close > u) {
                    TrendState::Bullish
                } else if prev_lower.is_some_and(|l| close < l) {
                    TrendState::Bearish
                } else {
                    prev
                }
            }
        };

        if prev_state == Some(state) {
            match state {
                TrendState::Bullish => {
                    if let (Some(cur), Some(prev)) = (lower, prev_lower) {
                        lower = Some(cur.max(prev));
                    }
                }
                TrendState::Bearish => {
                    if let (Some(cur), Some(prev)) = (upper, prev_upper) {
                        upper = Some(cur.min(prev));
                    }
                }
            }
        }

        self.states.push(state);
        self.upper.push(upper);
        self.lower.push(lower);
    }
}

/// Compute SuperTrend over a bar series.
pub fn supertrend<T: OHLCV>(bars: &[T], atr_window: usize, multiplier: f64) -> SuperTrend {
    let range = atr(bars, atr_window);

    bars.iter()
        .zip(range)
        .fold(SuperTrend::with_capacity(bars.len()), |mut st, (bar, a)| {
            let mid = bar.mid_price();
            let upper = a.map(|a| mid + multiplier * a);
            let lower = a.map(|a| mid - multiplier * a);
            st.step(bar.close(), upper, lower);
            st
        })
}
