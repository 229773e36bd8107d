//! Single-bar reversal detectors

use super::{PatternDetector, PatternMatch, ReversalPattern};
use crate::{OHLCVExt, Result, ScanError, OHLCV};

// ============================================================
// HAMMER
// ============================================================

/// Hammer - long lower shadow, upper shadow shorter than the body
#[derive(Debug, Clone, Copy)]
pub struct HammerDetector {
    /// Lower shadow must exceed `shadow_factor * body`
    pub shadow_factor: f64,
}

impl Default for HammerDetector {
    fn default() -> Self {
        Self { shadow_factor: 2.0 }
    }
}

impl PatternDetector for HammerDetector {
    fn pattern(&self) -> ReversalPattern {
        ReversalPattern::Hammer
    }

    fn min_bars(&self) -> usize {
        1
    }

    fn detect<T: OHLCV>(&self, bars: &[T], index: usize) -> Option<PatternMatch> {
        let bar = bars.get(index)?;
        let body = bar.body();

        if bar.lower_shadow() <= self.shadow_factor * body {
            return None;
        }
        if bar.upper_shadow() >= body {
            return None;
        }

        Some(PatternMatch {
            pattern: self.pattern(),
            start_index: index,
            end_index: index,
        })
    }

    fn validate_config(&self) -> Result<()> {
        if !(self.shadow_factor.is_finite() && self.shadow_factor > 0.0) {
            return Err(ScanError::InvalidValue("hammer shadow_factor must be > 0"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Bar;

    #[test]
    fn test_hammer() {
        // body 0.5, lower shadow 3.0, upper shadow 0.2
        let bars = vec![Bar::new(0, 100.0, 100.7, 97.0, 100.5, 1000.0)];
        let found = HammerDetector::default().detect(&bars, 0).unwrap();
        assert_eq!(found.pattern, ReversalPattern::Hammer);
    }

    #[test]
    fn test_bearish_body_hammer() {
        let bars = vec![Bar::new(0, 100.5, 100.6, 97.0, 100.0, 1000.0)];
        assert!(HammerDetector::default().detect(&bars, 0).is_some());
    }

    #[test]
    fn test_short_lower_shadow_rejected() {
        // lower shadow 0.8 < 2 * body
        let bars = vec![Bar::new(0, 100.0, 100.6, 99.2, 100.5, 1000.0)];
        assert!(HammerDetector::default().detect(&bars, 0).is_none());
    }

    #[test]
    fn test_long_upper_shadow_rejected() {
        let bars = vec![Bar::new(0, 100.0, 101.5, 97.0, 100.5, 1000.0)];
        assert!(HammerDetector::default().detect(&bars, 0).is_none());
    }

    #[test]
    fn test_doji_rejected() {
        // zero body: upper shadow can never be shorter than it
        let bars = vec![Bar::new(0, 100.0, 100.0, 97.0, 100.0, 1000.0)];
        assert!(HammerDetector::default().detect(&bars, 0).is_none());
    }

    #[test]
    fn test_out_of_bounds() {
        let bars: Vec<Bar> = Vec::new();
        assert!(HammerDetector::default().detect(&bars, 0).is_none());
    }

    #[test]
    fn test_validate_config() {
        assert!(HammerDetector::default().validate_config().is_ok());
        let bad = HammerDetector { shadow_factor: 0.0 };
        assert!(bad.validate_config().is_err());
    }
}
