//! Engine configuration
//!
//! All window lengths, thresholds and multipliers used by the scoring and
//! reversal pipelines live here as named parameters. Every struct derives
//! `Serialize`/`Deserialize` with `#[serde(default)]`, so a partial document
//! only overrides what it names:
//!
//! ```rust
//! use swingscan::config::EngineConfig;
//!
//! let cfg: EngineConfig = serde_json::from_str(r#"{ "min_bars": 80 }"#).unwrap();
//! assert_eq!(cfg.min_bars, 80);
//! assert_eq!(cfg.indicators.rsi_window.get(), 14);
//! ```

use serde::{Deserialize, Serialize};

use crate::detectors::{HammerDetector, PatternDetector};
use crate::{Period, Ratio, Result, ScanError};

/// Default minimum number of bars for a valid analysis
pub const DEFAULT_MIN_BARS: usize = 60;

// ============================================================
// INDICATOR WINDOWS
// ============================================================

/// Window lengths and multipliers for the indicator frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndicatorConfig {
    pub ema_fast: Period,
    pub ema_short: Period,
    pub ema_mid: Period,
    pub ema_long: Period,
    pub sma_short: Period,
    pub sma_mid: Period,
    pub sma_long: Period,
    pub adx_window: Period,
    pub macd_fast: Period,
    pub macd_slow: Period,
    pub macd_signal: Period,
    pub rsi_window: Period,
    pub stoch_window: Period,
    pub stoch_smooth: Period,
    pub williams_window: Period,
    pub cci_window: Period,
    pub roc_window: Period,
    pub bb_window: Period,
    pub bb_std_dev: f64,
    pub atr_window: Period,
    pub keltner_window: Period,
    pub keltner_atr_window: Period,
    pub keltner_multiplier: f64,
    pub obv_ema_window: Period,
    pub mfi_window: Period,
    pub volume_sma_window: Period,
    pub supertrend_atr_window: Period,
    pub supertrend_multiplier: f64,
    pub sr_window: Period,
    pub slope_span: Period,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            ema_fast: Period::new_const(9),
            ema_short: Period::new_const(20),
            ema_mid: Period::new_const(50),
            ema_long: Period::new_const(200),
            sma_short: Period::new_const(20),
            sma_mid: Period::new_const(50),
            sma_long: Period::new_const(200),
            adx_window: Period::new_const(14),
            macd_fast: Period::new_const(12),
            macd_slow: Period::new_const(26),
            macd_signal: Period::new_const(9),
            rsi_window: Period::new_const(14),
            stoch_window: Period::new_const(14),
            stoch_smooth: Period::new_const(3),
            williams_window: Period::new_const(14),
            cci_window: Period::new_const(20),
            roc_window: Period::new_const(12),
            bb_window: Period::new_const(20),
            bb_std_dev: 2.0,
            atr_window: Period::new_const(14),
            keltner_window: Period::new_const(20),
            keltner_atr_window: Period::new_const(10),
            keltner_multiplier: 2.0,
            obv_ema_window: Period::new_const(20),
            mfi_window: Period::new_const(14),
            volume_sma_window: Period::new_const(20),
            supertrend_atr_window: Period::new_const(10),
            supertrend_multiplier: 3.0,
            sr_window: Period::new_const(20),
            slope_span: Period::new_const(2),
        }
    }
}

impl IndicatorConfig {
    pub fn validate(&self) -> Result<()> {
        let emas = [self.ema_fast, self.ema_short, self.ema_mid, self.ema_long];
        if emas.windows(2).any(|w| w[0] >= w[1]) {
            return Err(ScanError::InvalidConfig(
                "EMA windows must be strictly increasing: fast < short < mid < long".into(),
            ));
        }
        if self.macd_fast >= self.macd_slow {
            return Err(ScanError::InvalidConfig(format!(
                "macd_fast ({}) must be shorter than macd_slow ({})",
                self.macd_fast.get(),
                self.macd_slow.get()
            )));
        }
        positive("bb_std_dev", self.bb_std_dev)?;
        positive("keltner_multiplier", self.keltner_multiplier)?;
        positive("supertrend_multiplier", self.supertrend_multiplier)?;
        Ok(())
    }
}

// ============================================================
// SCORING THRESHOLDS
// ============================================================

/// Composite-score cut-offs for the discrete signal, checked high to low
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalThresholds {
    pub strong_buy: i32,
    pub buy: i32,
    pub hold: i32,
    pub sell: i32,
}

impl Default for SignalThresholds {
    fn default() -> Self {
        Self {
            strong_buy: 10,
            buy: 5,
            hold: -4,
            sell: -9,
        }
    }
}

/// Category-score cut-offs for the report labels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelThresholds {
    pub trend_strong: i32,
    pub trend_weak: i32,
    pub trend_sideways: i32,
    pub momentum_bullish: i32,
    pub momentum_bearish: i32,
    pub volume_strong: i32,
    pub volume_weak: i32,
}

impl Default for LabelThresholds {
    fn default() -> Self {
        Self {
            trend_strong: 4,
            trend_weak: 1,
            trend_sideways: -3,
            momentum_bullish: 3,
            momentum_bearish: -3,
            volume_strong: 2,
            volume_weak: -1,
        }
    }
}

/// Rule thresholds for the four category scorers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub adx_trending: f64,
    pub rsi_oversold: f64,
    pub rsi_overbought: f64,
    pub stoch_oversold: f64,
    pub stoch_overbought: f64,
    pub cci_oversold: f64,
    pub cci_overbought: f64,
    pub williams_oversold: f64,
    pub williams_overbought: f64,
    pub mfi_oversold: f64,
    pub mfi_overbought: f64,
    /// Volume above `volume_spike_multiple * volume SMA` scores as a spike
    pub volume_spike_multiple: f64,
    /// Volume below `volume_dry_multiple * volume SMA` scores as dried up
    pub volume_dry_multiple: f64,
    /// Distance to support/resistance, as a fraction of price, that counts as "near"
    pub sr_proximity: Ratio,
    /// Bollinger width (percent) under which a squeeze is annotated
    pub squeeze_width_pct: f64,
    /// ATR as percent of price above which high volatility is annotated
    pub high_atr_pct: f64,
    /// Target = close + `target_atr_multiple` * ATR
    pub target_atr_multiple: f64,
    /// Stop = support - `stop_atr_multiple` * ATR
    pub stop_atr_multiple: f64,
    pub signals: SignalThresholds,
    pub labels: LabelThresholds,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            adx_trending: 25.0,
            rsi_oversold: 30.0,
            rsi_overbought: 70.0,
            stoch_oversold: 20.0,
            stoch_overbought: 80.0,
            cci_oversold: -100.0,
            cci_overbought: 100.0,
            williams_oversold: -80.0,
            williams_overbought: -20.0,
            mfi_oversold: 20.0,
            mfi_overbought: 80.0,
            volume_spike_multiple: 1.5,
            volume_dry_multiple: 0.5,
            sr_proximity: Ratio::new_const(0.02),
            squeeze_width_pct: 5.0,
            high_atr_pct: 3.0,
            target_atr_multiple: 2.0,
            stop_atr_multiple: 1.0,
            signals: SignalThresholds::default(),
            labels: LabelThresholds::default(),
        }
    }
}

impl ScoringConfig {
    pub fn validate(&self) -> Result<()> {
        ordered("rsi", self.rsi_oversold, self.rsi_overbought)?;
        ordered("stochastic", self.stoch_oversold, self.stoch_overbought)?;
        ordered("cci", self.cci_oversold, self.cci_overbought)?;
        ordered("williams_r", self.williams_oversold, self.williams_overbought)?;
        ordered("mfi", self.mfi_oversold, self.mfi_overbought)?;
        positive("volume_spike_multiple", self.volume_spike_multiple)?;
        if !(0.0..self.volume_spike_multiple).contains(&self.volume_dry_multiple) {
            return Err(ScanError::InvalidConfig(
                "volume_dry_multiple must be in [0, volume_spike_multiple)".into(),
            ));
        }
        positive("target_atr_multiple", self.target_atr_multiple)?;
        positive("stop_atr_multiple", self.stop_atr_multiple)?;

        let s = &self.signals;
        if !(s.strong_buy > s.buy && s.buy > s.hold && s.hold > s.sell) {
            return Err(ScanError::InvalidConfig(
                "signal thresholds must be strictly descending".into(),
            ));
        }
        let l = &self.labels;
        if !(l.trend_strong > l.trend_weak && l.trend_weak > l.trend_sideways) {
            return Err(ScanError::InvalidConfig(
                "trend label thresholds must be strictly descending".into(),
            ));
        }
        if l.momentum_bullish <= l.momentum_bearish || l.volume_strong <= l.volume_weak {
            return Err(ScanError::InvalidConfig(
                "bullish/strong label thresholds must exceed bearish/weak ones".into(),
            ));
        }
        Ok(())
    }
}

// ============================================================
// REVERSAL SCAN
// ============================================================

/// Thresholds and multipliers for the bullish reversal scan
///
/// The scan reads its averages, ADX, ATR and slope from the indicator frame,
/// so their windows are set in [`IndicatorConfig`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReversalConfig {
    /// ADX must be below this for the market to count as non-trending
    pub adx_threshold: f64,
    /// Volume must reach this multiple of its rolling average
    pub volume_multiple: f64,
    /// Stop sits this many ATRs under the two-bar low
    pub atr_stop_multiple: f64,
    /// Maximum |slope| of the short EMA, as a fraction of price
    pub slope_ratio: Ratio,
    pub target1_multiple: f64,
    pub target2_multiple: f64,
    /// Hammer lower shadow must exceed this multiple of the body
    pub hammer_shadow_factor: f64,
}

impl Default for ReversalConfig {
    fn default() -> Self {
        Self {
            adx_threshold: 20.0,
            volume_multiple: 1.2,
            atr_stop_multiple: 1.3,
            slope_ratio: Ratio::new_const(0.002),
            target1_multiple: 1.5,
            target2_multiple: 3.0,
            hammer_shadow_factor: 2.0,
        }
    }
}

impl ReversalConfig {
    /// Hammer detector configured with this scan's shadow factor
    pub fn hammer(&self) -> HammerDetector {
        HammerDetector {
            shadow_factor: self.hammer_shadow_factor,
        }
    }

    pub fn validate(&self) -> Result<()> {
        positive("adx_threshold", self.adx_threshold)?;
        positive("volume_multiple", self.volume_multiple)?;
        positive("atr_stop_multiple", self.atr_stop_multiple)?;
        positive("target1_multiple", self.target1_multiple)?;
        positive("target2_multiple", self.target2_multiple)?;
        if self.target1_multiple >= self.target2_multiple {
            return Err(ScanError::InvalidConfig(
                "target1_multiple must be below target2_multiple".into(),
            ));
        }
        self.hammer().validate_config()
    }
}

// ============================================================
// ENGINE
// ============================================================

/// Complete engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Series shorter than this are skipped
    pub min_bars: usize,
    /// Bars requested from a [`BarSource`](crate::scan::BarSource) per ticker
    pub lookback_bars: usize,
    pub indicators: IndicatorConfig,
    pub scoring: ScoringConfig,
    pub reversal: ReversalConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            min_bars: DEFAULT_MIN_BARS,
            lookback_bars: 250,
            indicators: IndicatorConfig::default(),
            scoring: ScoringConfig::default(),
            reversal: ReversalConfig::default(),
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<()> {
        // scoring compares the latest bar with the one before it
        if self.min_bars < 2 {
            return Err(ScanError::OutOfRange {
                field: "min_bars",
                value: self.min_bars as f64,
                min: 2.0,
                max: f64::INFINITY,
            });
        }
        if self.lookback_bars < self.min_bars {
            return Err(ScanError::InvalidConfig(format!(
                "lookback_bars ({}) is below min_bars ({})",
                self.lookback_bars, self.min_bars
            )));
        }
        self.indicators.validate()?;
        self.scoring.validate()?;
        self.reversal.validate()
    }
}

fn positive(field: &'static str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ScanError::OutOfRange {
            field,
            value,
            min: f64::MIN_POSITIVE,
            max: f64::MAX,
        })
    }
}

fn ordered(name: &str, low: f64, high: f64) -> Result<()> {
    if low < high {
        Ok(())
    } else {
        Err(ScanError::InvalidConfig(format!(
            "{name}: oversold threshold ({low}) must be below overbought ({high})"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn test_macd_order_rejected() {
        let mut cfg = EngineConfig::default();
        cfg.indicators.macd_fast = Period::new_const(30);
        assert!(matches!(cfg.validate(), Err(ScanError::InvalidConfig(_))));
    }

    #[test]
    fn test_signal_thresholds_must_descend() {
        let mut cfg = EngineConfig::default();
        cfg.scoring.signals.buy = 12;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_min_bars_lower_bound() {
        let cfg = EngineConfig {
            min_bars: 1,
            ..EngineConfig::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(ScanError::OutOfRange { field: "min_bars", .. })
        ));
    }

    #[test]
    fn test_negative_multiplier_rejected() {
        let mut cfg = EngineConfig::default();
        cfg.reversal.atr_stop_multiple = -1.0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_ema_stack_order() {
        let mut cfg = EngineConfig::default();
        cfg.indicators.ema_short = Period::new_const(60);
        assert!(matches!(cfg.validate(), Err(ScanError::InvalidConfig(_))));
    }

    #[test]
    fn test_hammer_factor_checked_by_detector() {
        let mut cfg = EngineConfig::default();
        cfg.reversal.hammer_shadow_factor = 0.0;
        assert_eq!(
            cfg.validate(),
            Err(ScanError::InvalidValue("hammer shadow_factor must be > 0"))
        );
    }

    #[test]
    fn test_targets_must_widen() {
        let mut cfg = EngineConfig::default();
        cfg.reversal.target1_multiple = 3.0;
        assert!(matches!(cfg.validate(), Err(ScanError::InvalidConfig(_))));
    }

    #[test]
    fn test_partial_json_overrides() {
        let cfg: EngineConfig = serde_json::from_str(
            r#"{ "reversal": { "adx_threshold": 18.0 }, "scoring": { "signals": { "strong_buy": 12 } } }"#,
        )
        .unwrap();
        assert_eq!(cfg.reversal.adx_threshold, 18.0);
        assert_eq!(cfg.reversal.volume_multiple, 1.2);
        assert_eq!(cfg.scoring.signals.strong_buy, 12);
        assert_eq!(cfg.scoring.signals.buy, 5);
    }

    #[test]
    fn test_json_rejects_zero_period() {
        let parsed = serde_json::from_str::<EngineConfig>(r#"{ "indicators": { "rsi_window": 0 } }"#);
        assert!(parsed.is_err());
    }
}
