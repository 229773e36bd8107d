//! Parameter metadata for the engine tunables
//!
//! This module provides metadata about engine parameters, enabling:
//! - Grid search optimization
//! - Parameter documentation
//! - Configuration from flat name -> value maps
//!
//! # Example
//!
//! ```rust
//! use std::collections::HashMap;
//!
//! use swingscan::config::EngineConfig;
//! use swingscan::params::Parameterized;
//!
//! for param in EngineConfig::param_meta() {
//!   println!("{}: {:?} (default: {})", param.name, param.param_type, param.default);
//! }
//!
//! let cfg = EngineConfig::with_params(&HashMap::from([("rsi_window", 10.0)])).unwrap();
//! assert_eq!(cfg.indicators.rsi_window.get(), 10);
//! ```

use std::collections::HashMap;

use crate::config::EngineConfig;
use crate::{Period, Ratio, Result, ScanError};

// ============================================================
// PARAMETER TYPES
// ============================================================

/// Type of parameter value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
  /// Ratio value (0.0..=1.0)
  Ratio,
  /// Period value (positive integer)
  Period,
  /// Whole-number score threshold
  Integer,
  /// Unconstrained threshold or multiplier
  Value,
}

/// Metadata for a single engine parameter
#[derive(Debug, Clone)]
pub struct ParamMeta {
  /// Parameter name (e.g., "rsi_window")
  pub name: &'static str,
  pub param_type: ParamType,
  pub default: f64,
  /// Range for optimization: (min, max, step)
  pub range: (f64, f64, f64),
  pub description: &'static str,
}

impl ParamMeta {
  pub const fn ratio(
    name: &'static str,
    default: f64,
    range: (f64, f64, f64),
    description: &'static str,
  ) -> Self {
    Self { name, param_type: ParamType::Ratio, default, range, description }
  }

  pub const fn period(
    name: &'static str,
    default: f64,
    range: (f64, f64, f64),
    description: &'static str,
  ) -> Self {
    Self { name, param_type: ParamType::Period, default, range, description }
  }

  pub const fn integer(
    name: &'static str,
    default: f64,
    range: (f64, f64, f64),
    description: &'static str,
  ) -> Self {
    Self { name, param_type: ParamType::Integer, default, range, description }
  }

  pub const fn value(
    name: &'static str,
    default: f64,
    range: (f64, f64, f64),
    description: &'static str,
  ) -> Self {
    Self { name, param_type: ParamType::Value, default, range, description }
  }

  /// Generate all values for grid search
  pub fn generate_grid(&self) -> Vec<f64> {
    let (min, max, step) = self.range;
    let mut values = Vec::new();
    let mut i = 0u32;
    loop {
      // multiply rather than accumulate so steps don't drift
      let v = min + step * f64::from(i);
      if v > max + step * 1e-9 {
        break;
      }
      values.push(v);
      i += 1;
    }
    values
  }

  /// Validate a value for this parameter
  pub fn validate(&self, value: f64) -> Result<()> {
    let (min, max, _) = self.range;
    if value.is_nan() || value < min || value > max {
      return Err(ScanError::OutOfRange { field: self.name, value, min, max });
    }
    match self.param_type {
      ParamType::Ratio => Ratio::new(value).map(|_| ()),
      ParamType::Period => {
        if value < 1.0 || value.fract() != 0.0 {
          return Err(ScanError::InvalidValue("Period must be a positive integer"));
        }
        Ok(())
      },
      ParamType::Integer if value.fract() != 0.0 => {
        Err(ScanError::InvalidValue("Integer parameter must be a whole number"))
      },
      ParamType::Integer | ParamType::Value => Ok(()),
    }
  }
}

/// Every engine tunable, grouped by pipeline
///
/// Names are the config field names; signal and label thresholds carry a
/// `signal_` / `label_` prefix and reversal settings a `reversal_` prefix.
pub static ENGINE_PARAMS: &[ParamMeta] = &[
  ParamMeta::period("min_bars", 60.0, (30.0, 120.0, 10.0), "Minimum bars for a valid analysis"),
  ParamMeta::period("lookback_bars", 250.0, (100.0, 500.0, 50.0), "Bars fetched per ticker"),
  // Indicator windows
  ParamMeta::period("ema_fast", 9.0, (5.0, 15.0, 2.0), "Fast EMA of the bullish stack"),
  ParamMeta::period("ema_short", 20.0, (10.0, 30.0, 5.0), "Short EMA of the bullish stack"),
  ParamMeta::period("ema_mid", 50.0, (30.0, 100.0, 10.0), "Mid EMA of the bullish stack"),
  ParamMeta::period("ema_long", 200.0, (100.0, 300.0, 50.0), "Long EMA of the bullish stack"),
  ParamMeta::period("sma_short", 20.0, (10.0, 30.0, 5.0), "Short SMA"),
  ParamMeta::period("sma_mid", 50.0, (30.0, 100.0, 10.0), "Mid SMA"),
  ParamMeta::period("sma_long", 200.0, (100.0, 300.0, 50.0), "Long SMA"),
  ParamMeta::period("adx_window", 14.0, (7.0, 28.0, 7.0), "ADX / DI window"),
  ParamMeta::period("macd_fast", 12.0, (8.0, 16.0, 2.0), "MACD fast EMA"),
  ParamMeta::period("macd_slow", 26.0, (20.0, 34.0, 2.0), "MACD slow EMA"),
  ParamMeta::period("macd_signal", 9.0, (5.0, 13.0, 2.0), "MACD signal line EMA"),
  ParamMeta::period("rsi_window", 14.0, (7.0, 28.0, 7.0), "RSI window"),
  ParamMeta::period("stoch_window", 14.0, (7.0, 21.0, 7.0), "Stochastic %K window"),
  ParamMeta::period("stoch_smooth", 3.0, (2.0, 5.0, 1.0), "Stochastic %D smoothing"),
  ParamMeta::period("williams_window", 14.0, (7.0, 21.0, 7.0), "Williams %R window"),
  ParamMeta::period("cci_window", 20.0, (10.0, 30.0, 5.0), "CCI window"),
  ParamMeta::period("roc_window", 12.0, (6.0, 24.0, 6.0), "Rate of change lookback"),
  ParamMeta::period("bb_window", 20.0, (10.0, 30.0, 5.0), "Bollinger Band window"),
  ParamMeta::value("bb_std_dev", 2.0, (1.5, 3.0, 0.5), "Bollinger Band width in standard deviations"),
  ParamMeta::period("atr_window", 14.0, (7.0, 28.0, 7.0), "ATR window for trade levels and the reversal stop"),
  ParamMeta::period("keltner_window", 20.0, (10.0, 30.0, 5.0), "Keltner Channel EMA window"),
  ParamMeta::period("keltner_atr_window", 10.0, (5.0, 20.0, 5.0), "Keltner Channel ATR window"),
  ParamMeta::value("keltner_multiplier", 2.0, (1.0, 3.0, 0.5), "Keltner Channel ATR multiplier"),
  ParamMeta::period("obv_ema_window", 20.0, (10.0, 30.0, 5.0), "OBV trend EMA window"),
  ParamMeta::period("mfi_window", 14.0, (7.0, 21.0, 7.0), "Money Flow Index window"),
  ParamMeta::period("volume_sma_window", 20.0, (10.0, 30.0, 5.0), "Volume average window"),
  ParamMeta::period("supertrend_atr_window", 10.0, (7.0, 21.0, 7.0), "SuperTrend ATR window"),
  ParamMeta::value("supertrend_multiplier", 3.0, (2.0, 4.0, 0.5), "SuperTrend ATR multiplier"),
  ParamMeta::period("sr_window", 20.0, (10.0, 60.0, 10.0), "Rolling support/resistance window"),
  ParamMeta::period("slope_span", 2.0, (1.0, 5.0, 1.0), "Bars over which the short EMA slope is measured"),
  // Scoring
  ParamMeta::value("adx_trending", 25.0, (20.0, 35.0, 5.0), "ADX above which a trend scores"),
  ParamMeta::value("rsi_oversold", 30.0, (20.0, 35.0, 5.0), "RSI oversold threshold"),
  ParamMeta::value("rsi_overbought", 70.0, (65.0, 80.0, 5.0), "RSI overbought threshold"),
  ParamMeta::value("stoch_oversold", 20.0, (10.0, 30.0, 5.0), "Stochastic oversold threshold"),
  ParamMeta::value("stoch_overbought", 80.0, (70.0, 90.0, 5.0), "Stochastic overbought threshold"),
  ParamMeta::value("cci_oversold", -100.0, (-200.0, -50.0, 50.0), "CCI oversold threshold"),
  ParamMeta::value("cci_overbought", 100.0, (50.0, 200.0, 50.0), "CCI overbought threshold"),
  ParamMeta::value("williams_oversold", -80.0, (-90.0, -70.0, 5.0), "Williams %R oversold threshold"),
  ParamMeta::value("williams_overbought", -20.0, (-30.0, -10.0, 5.0), "Williams %R overbought threshold"),
  ParamMeta::value("mfi_oversold", 20.0, (10.0, 30.0, 5.0), "MFI oversold threshold"),
  ParamMeta::value("mfi_overbought", 80.0, (70.0, 90.0, 5.0), "MFI overbought threshold"),
  ParamMeta::value("volume_spike_multiple", 1.5, (1.2, 3.0, 0.1), "Volume spike as multiple of average"),
  ParamMeta::value("volume_dry_multiple", 0.5, (0.3, 0.8, 0.1), "Dried-up volume as multiple of average"),
  ParamMeta::ratio("sr_proximity", 0.02, (0.01, 0.05, 0.01), "Distance to support/resistance counted as near"),
  ParamMeta::value("squeeze_width_pct", 5.0, (2.0, 10.0, 1.0), "Bollinger width (percent) annotated as a squeeze"),
  ParamMeta::value("high_atr_pct", 3.0, (2.0, 6.0, 0.5), "ATR percent of price annotated as high volatility"),
  ParamMeta::value("target_atr_multiple", 2.0, (1.0, 4.0, 0.5), "Target distance in ATRs"),
  ParamMeta::value("stop_atr_multiple", 1.0, (0.5, 2.0, 0.5), "Stop distance below support in ATRs"),
  // Signal cut-offs
  ParamMeta::integer("signal_strong_buy", 10.0, (8.0, 14.0, 1.0), "Composite score for STRONG BUY"),
  ParamMeta::integer("signal_buy", 5.0, (3.0, 8.0, 1.0), "Composite score for BUY"),
  ParamMeta::integer("signal_hold", -4.0, (-6.0, -2.0, 1.0), "Composite score for HOLD"),
  ParamMeta::integer("signal_sell", -9.0, (-12.0, -7.0, 1.0), "Composite score for SELL"),
  // Report labels
  ParamMeta::integer("label_trend_strong", 4.0, (3.0, 6.0, 1.0), "Trend score for Strong Uptrend"),
  ParamMeta::integer("label_trend_weak", 1.0, (0.0, 2.0, 1.0), "Trend score for Uptrend"),
  ParamMeta::integer("label_trend_sideways", -3.0, (-5.0, -1.0, 1.0), "Trend score for Sideways"),
  ParamMeta::integer("label_momentum_bullish", 3.0, (2.0, 5.0, 1.0), "Momentum score for Bullish"),
  ParamMeta::integer("label_momentum_bearish", -3.0, (-5.0, -2.0, 1.0), "Momentum score for Bearish"),
  ParamMeta::integer("label_volume_strong", 2.0, (1.0, 4.0, 1.0), "Volume score for Strong"),
  ParamMeta::integer("label_volume_weak", -1.0, (-3.0, 0.0, 1.0), "Volume score for Weak"),
  // Reversal scan
  ParamMeta::value("reversal_adx_threshold", 20.0, (15.0, 25.0, 1.0), "ADX ceiling for a non-trending market"),
  ParamMeta::value("reversal_volume_multiple", 1.2, (1.0, 2.0, 0.1), "Volume confirmation multiple"),
  ParamMeta::value("reversal_atr_stop_multiple", 1.3, (1.0, 2.0, 0.1), "Stop distance below the two-bar low in ATRs"),
  ParamMeta::ratio("reversal_slope_ratio", 0.002, (0.001, 0.005, 0.001), "Maximum short EMA slope relative to price"),
  ParamMeta::value("reversal_target1_multiple", 1.5, (1.0, 2.5, 0.5), "First target in multiples of risk"),
  ParamMeta::value("reversal_target2_multiple", 3.0, (2.0, 5.0, 0.5), "Second target in multiples of risk"),
  ParamMeta::value("reversal_hammer_shadow_factor", 2.0, (1.5, 3.0, 0.5), "Hammer lower shadow in multiples of the body"),
];

// ============================================================
// PARAMETERIZED TRAIT
// ============================================================

/// Trait for configurations that support parameterization
pub trait Parameterized: Sized {
  /// Returns metadata for all configurable parameters
  fn param_meta() -> &'static [ParamMeta];

  /// Applies parameters from a HashMap over `self`
  ///
  /// Parameters not named keep their current value; unknown names are rejected.
  fn apply_params(self, params: &HashMap<&str, f64>) -> Result<Self>;

  /// Creates a configuration with parameters from a HashMap over the defaults
  fn with_params(params: &HashMap<&str, f64>) -> Result<Self>;
}

impl Parameterized for EngineConfig {
  fn param_meta() -> &'static [ParamMeta] {
    ENGINE_PARAMS
  }

  fn with_params(params: &HashMap<&str, f64>) -> Result<Self> {
    EngineConfig::default().apply_params(params)
  }

  fn apply_params(mut self, params: &HashMap<&str, f64>) -> Result<Self> {
    for (&key, &value) in params {
      let meta = ENGINE_PARAMS
        .iter()
        .find(|m| m.name == key)
        .ok_or_else(|| ScanError::InvalidConfig(format!("unknown parameter: {key}")))?;
      meta.validate(value)?;
    }

    self.min_bars = get_period(params, "min_bars", self.min_bars)?.get();
    self.lookback_bars = get_period(params, "lookback_bars", self.lookback_bars)?.get();

    let ind = &mut self.indicators;
    for (name, field) in [
      ("ema_fast", &mut ind.ema_fast),
      ("ema_short", &mut ind.ema_short),
      ("ema_mid", &mut ind.ema_mid),
      ("ema_long", &mut ind.ema_long),
      ("sma_short", &mut ind.sma_short),
      ("sma_mid", &mut ind.sma_mid),
      ("sma_long", &mut ind.sma_long),
      ("adx_window", &mut ind.adx_window),
      ("macd_fast", &mut ind.macd_fast),
      ("macd_slow", &mut ind.macd_slow),
      ("macd_signal", &mut ind.macd_signal),
      ("rsi_window", &mut ind.rsi_window),
      ("stoch_window", &mut ind.stoch_window),
      ("stoch_smooth", &mut ind.stoch_smooth),
      ("williams_window", &mut ind.williams_window),
      ("cci_window", &mut ind.cci_window),
      ("roc_window", &mut ind.roc_window),
      ("bb_window", &mut ind.bb_window),
      ("atr_window", &mut ind.atr_window),
      ("keltner_window", &mut ind.keltner_window),
      ("keltner_atr_window", &mut ind.keltner_atr_window),
      ("obv_ema_window", &mut ind.obv_ema_window),
      ("mfi_window", &mut ind.mfi_window),
      ("volume_sma_window", &mut ind.volume_sma_window),
      ("supertrend_atr_window", &mut ind.supertrend_atr_window),
      ("sr_window", &mut ind.sr_window),
      ("slope_span", &mut ind.slope_span),
    ] {
      *field = get_period(params, name, field.get())?;
    }
    for (name, field) in [
      ("bb_std_dev", &mut ind.bb_std_dev),
      ("keltner_multiplier", &mut ind.keltner_multiplier),
      ("supertrend_multiplier", &mut ind.supertrend_multiplier),
    ] {
      *field = get_value(params, name, *field);
    }

    let sc = &mut self.scoring;
    for (name, field) in [
      ("adx_trending", &mut sc.adx_trending),
      ("rsi_oversold", &mut sc.rsi_oversold),
      ("rsi_overbought", &mut sc.rsi_overbought),
      ("stoch_oversold", &mut sc.stoch_oversold),
      ("stoch_overbought", &mut sc.stoch_overbought),
      ("cci_oversold", &mut sc.cci_oversold),
      ("cci_overbought", &mut sc.cci_overbought),
      ("williams_oversold", &mut sc.williams_oversold),
      ("williams_overbought", &mut sc.williams_overbought),
      ("mfi_oversold", &mut sc.mfi_oversold),
      ("mfi_overbought", &mut sc.mfi_overbought),
      ("volume_spike_multiple", &mut sc.volume_spike_multiple),
      ("volume_dry_multiple", &mut sc.volume_dry_multiple),
      ("squeeze_width_pct", &mut sc.squeeze_width_pct),
      ("high_atr_pct", &mut sc.high_atr_pct),
      ("target_atr_multiple", &mut sc.target_atr_multiple),
      ("stop_atr_multiple", &mut sc.stop_atr_multiple),
    ] {
      *field = get_value(params, name, *field);
    }
    sc.sr_proximity = get_ratio(params, "sr_proximity", sc.sr_proximity.get())?;

    let (sig, lab) = (&mut sc.signals, &mut sc.labels);
    for (name, field) in [
      ("signal_strong_buy", &mut sig.strong_buy),
      ("signal_buy", &mut sig.buy),
      ("signal_hold", &mut sig.hold),
      ("signal_sell", &mut sig.sell),
      ("label_trend_strong", &mut lab.trend_strong),
      ("label_trend_weak", &mut lab.trend_weak),
      ("label_trend_sideways", &mut lab.trend_sideways),
      ("label_momentum_bullish", &mut lab.momentum_bullish),
      ("label_momentum_bearish", &mut lab.momentum_bearish),
      ("label_volume_strong", &mut lab.volume_strong),
      ("label_volume_weak", &mut lab.volume_weak),
    ] {
      *field = get_int(params, name, *field);
    }

    let rv = &mut self.reversal;
    for (name, field) in [
      ("reversal_adx_threshold", &mut rv.adx_threshold),
      ("reversal_volume_multiple", &mut rv.volume_multiple),
      ("reversal_atr_stop_multiple", &mut rv.atr_stop_multiple),
      ("reversal_target1_multiple", &mut rv.target1_multiple),
      ("reversal_target2_multiple", &mut rv.target2_multiple),
      ("reversal_hammer_shadow_factor", &mut rv.hammer_shadow_factor),
    ] {
      *field = get_value(params, name, *field);
    }
    rv.slope_ratio = get_ratio(params, "reversal_slope_ratio", rv.slope_ratio.get())?;

    self.validate()?;
    Ok(self)
  }
}

// ============================================================
// PARAMETER VALUE HELPERS
// ============================================================

/// Helper to get a Ratio from params with default fallback
pub fn get_ratio(params: &HashMap<&str, f64>, key: &str, default: f64) -> Result<Ratio> {
  let value = params.get(key).copied().unwrap_or(default);
  Ratio::new(value)
}

/// Helper to get a Period from params with default fallback
pub fn get_period(params: &HashMap<&str, f64>, key: &str, default: usize) -> Result<Period> {
  let value = params.get(key).copied().unwrap_or(default as f64);
  Period::new(value as usize)
}

/// Helper to get a whole-number threshold from params with default fallback
pub fn get_int(params: &HashMap<&str, f64>, key: &str, default: i32) -> i32 {
  params.get(key).map_or(default, |&v| v as i32)
}

/// Helper to get a plain value from params with default fallback
pub fn get_value(params: &HashMap<&str, f64>, key: &str, default: f64) -> f64 {
  params.get(key).copied().unwrap_or(default)
}

// ============================================================
// TESTS
// ============================================================
