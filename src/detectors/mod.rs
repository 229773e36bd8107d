//! Candlestick reversal detectors
//!
//! The reversal scan accepts two bullish candles:
//!
//! - **Single-bar**: Hammer
//! - **Two-bar**: Bullish Engulfing

use serde::{Deserialize, Serialize};

use crate::{Result, OHLCV};

pub mod single_bar;
pub mod two_bar;

pub use single_bar::*;
pub use two_bar::*;

// ============================================================
// PATTERN TYPES
// ============================================================

/// Bullish reversal candle recognised by the reversal scan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReversalPattern {
    #[serde(rename = "hammer")]
    Hammer,
    #[serde(rename = "bull_engulf")]
    BullishEngulfing,
}

impl ReversalPattern {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Hammer => "hammer",
            Self::BullishEngulfing => "bull_engulf",
        }
    }
}

impl std::fmt::Display for ReversalPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of pattern detection - Copy, no allocations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatternMatch {
    pub pattern: ReversalPattern,
    pub start_index: usize,
    pub end_index: usize,
}

/// Pattern detector trait - static dispatch
pub trait PatternDetector: Send + Sync {
    fn pattern(&self) -> ReversalPattern;
    /// Bars the pattern spans, ending at the checked index
    fn min_bars(&self) -> usize;
    fn detect<T: OHLCV>(&self, bars: &[T], index: usize) -> Option<PatternMatch>;

    fn validate_config(&self) -> Result<()> {
        Ok(())
    }

    /// `detect`, or `None` when `index` is out of range or too early for
    /// the pattern to fit
    fn detect_at<T: OHLCV>(&self, bars: &[T], index: usize) -> Option<PatternMatch> {
        if index >= bars.len() || index + 1 < self.min_bars() {
            return None;
        }
        self.detect(bars, index)
    }
}

/// Check the bar at `index` for a hammer, then for a bullish engulfing.
///
/// The hammer wins when a bar satisfies both.
pub fn detect_reversal_pattern<T: OHLCV>(
    bars: &[T],
    index: usize,
    hammer: &HammerDetector,
    engulfing: &BullishEngulfingDetector,
) -> Option<PatternMatch> {
    hammer
        .detect_at(bars, index)
        .or_else(|| engulfing.detect_at(bars, index))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Bar;

    #[test]
    fn test_pattern_names() {
        assert_eq!(ReversalPattern::Hammer.as_str(), "hammer");
        assert_eq!(ReversalPattern::BullishEngulfing.to_string(), "bull_engulf");
        assert_eq!(
            serde_json_name(ReversalPattern::BullishEngulfing),
            "\"bull_engulf\""
        );
    }

    fn serde_json_name(p: ReversalPattern) -> String {
        serde_json::to_string(&p).unwrap()
    }

    #[test]
    fn test_hammer_takes_precedence() {
        // bearish bar, then a bullish hammer whose body engulfs it
        let bars = vec![
            Bar::new(0, 100.2, 100.3, 100.0, 100.1, 1000.0),
            Bar::new(1, 100.05, 100.32, 98.0, 100.3, 1000.0),
        ];
        let engulfing = BullishEngulfingDetector;
        assert!(engulfing.detect(&bars, 1).is_some());

        let found = detect_reversal_pattern(&bars, 1, &HammerDetector::default(), &engulfing)
            .unwrap();
        assert_eq!(found.pattern, ReversalPattern::Hammer);
        assert_eq!((found.start_index, found.end_index), (1, 1));
    }

    #[test]
    fn test_detect_at_respects_min_bars() {
        // a lone bullish bar can never close an engulfing pair
        let bars = vec![Bar::new(0, 99.5, 103.0, 99.0, 102.5, 1500.0)];
        assert_eq!(BullishEngulfingDetector.min_bars(), 2);
        assert!(BullishEngulfingDetector.detect_at(&bars, 0).is_none());
        assert!(HammerDetector::default().detect_at(&bars, 3).is_none());

        let hammer = vec![Bar::new(0, 100.0, 100.7, 97.0, 100.5, 1000.0)];
        let found = HammerDetector::default().detect_at(&hammer, 0).unwrap();
        assert_eq!(found.pattern, HammerDetector::default().pattern());
    }

    #[test]
    fn test_no_pattern() {
        let bars = vec![
            Bar::new(0, 100.0, 101.0, 99.0, 100.5, 1000.0),
            Bar::new(1, 100.5, 102.0, 100.0, 101.5, 1000.0),
        ];
        let found = detect_reversal_pattern(
            &bars,
            1,
            &HammerDetector::default(),
            &BullishEngulfingDetector,
        );
        assert!(found.is_none());
    }
}
