//! Two-bar reversal detectors

use super::{PatternDetector, PatternMatch, ReversalPattern};
use crate::{OHLCVExt, OHLCV};

// ============================================================
// BULLISH ENGULFING
// ============================================================

/// Bullish Engulfing - a bullish body opening below and closing above the
/// previous bearish body
#[derive(Debug, Clone, Copy, Default)]
pub struct BullishEngulfingDetector;

impl PatternDetector for BullishEngulfingDetector {
    fn pattern(&self) -> ReversalPattern {
        ReversalPattern::BullishEngulfing
    }

    fn min_bars(&self) -> usize {
        2
    }

    fn detect<T: OHLCV>(&self, bars: &[T], index: usize) -> Option<PatternMatch> {
        if index < 1 {
            return None;
        }
        let prev = bars.get(index - 1)?;
        let curr = bars.get(index)?;

        if !(curr.is_bullish() && prev.is_bearish()) {
            return None;
        }
        if curr.close() > prev.open() && curr.open() < prev.close() {
            return Some(PatternMatch {
                pattern: self.pattern(),
                start_index: index - 1,
                end_index: index,
            });
        }
        None
    }
}
