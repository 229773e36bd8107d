//! Scoring engine
//!
//! Four category scorers read the latest [`FrameRow`] (and the row before it,
//! for crossovers) and sum signed points from a fixed rule table. Rules are
//! non-exclusive: every rule whose inputs are defined and whose condition
//! holds contributes. A rule reading an undefined value never fires.

use std::cmp::Reverse;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::{LabelThresholds, ScoringConfig, SignalThresholds};
use crate::derived::TrendState;
use crate::frame::FrameRow;

// ============================================================
// CATEGORY SCORES
// ============================================================

/// Signed sub-score per category
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryScores {
    pub trend: i32,
    pub momentum: i32,
    pub volume: i32,
    pub volatility: i32,
}

impl CategoryScores {
    #[inline]
    pub fn composite(&self) -> i32 {
        self.trend + self.momentum + self.volume + self.volatility
    }
}

/// Discrete trading signal derived from the composite score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Signal {
    #[serde(rename = "STRONG BUY")]
    StrongBuy,
    #[serde(rename = "BUY")]
    Buy,
    #[serde(rename = "HOLD")]
    Hold,
    #[serde(rename = "SELL")]
    Sell,
    #[serde(rename = "STRONG SELL")]
    StrongSell,
}

impl Signal {
    /// Inclusive thresholds, checked high to low.
    pub fn from_score(score: i32, t: &SignalThresholds) -> Self {
        if score >= t.strong_buy {
            Self::StrongBuy
        } else if score >= t.buy {
            Self::Buy
        } else if score >= t.hold {
            Self::Hold
        } else if score >= t.sell {
            Self::Sell
        } else {
            Self::StrongSell
        }
    }

    #[inline]
    pub fn is_buy(self) -> bool {
        matches!(self, Self::StrongBuy | Self::Buy)
    }

    #[inline]
    pub fn is_sell(self) -> bool {
        matches!(self, Self::StrongSell | Self::Sell)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::StrongBuy => "STRONG BUY",
            Self::Buy => "BUY",
            Self::Hold => "HOLD",
            Self::Sell => "SELL",
            Self::StrongSell => "STRONG SELL",
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================
// REPORT LABELS
// ============================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrendStrength {
    #[serde(rename = "Strong Uptrend")]
    StrongUptrend,
    #[serde(rename = "Weak Uptrend")]
    WeakUptrend,
    Sideways,
    Downtrend,
}

impl TrendStrength {
    pub fn from_score(score: i32, t: &LabelThresholds) -> Self {
        if score >= t.trend_strong {
            Self::StrongUptrend
        } else if score >= t.trend_weak {
            Self::WeakUptrend
        } else if score >= t.trend_sideways {
            Self::Sideways
        } else {
            Self::Downtrend
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::StrongUptrend => "Strong Uptrend",
            Self::WeakUptrend => "Weak Uptrend",
            Self::Sideways => "Sideways",
            Self::Downtrend => "Downtrend",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MomentumStatus {
    Bullish,
    Neutral,
    Bearish,
}

impl MomentumStatus {
    pub fn from_score(score: i32, t: &LabelThresholds) -> Self {
        if score >= t.momentum_bullish {
            Self::Bullish
        } else if score <= t.momentum_bearish {
            Self::Bearish
        } else {
            Self::Neutral
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Bullish => "Bullish",
            Self::Neutral => "Neutral",
            Self::Bearish => "Bearish",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VolumeStatus {
    Strong,
    Normal,
    Weak,
}

impl VolumeStatus {
    pub fn from_score(score: i32, t: &LabelThresholds) -> Self {
        if score >= t.volume_strong {
            Self::Strong
        } else if score <= t.volume_weak {
            Self::Weak
        } else {
            Self::Normal
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Strong => "Strong",
            Self::Normal => "Normal",
            Self::Weak => "Weak",
        }
    }
}

/// Direction of OBV relative to its EMA
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObvTrend {
    Rising,
    Falling,
}

impl ObvTrend {
    pub fn from_row(row: &FrameRow) -> Option<Self> {
        let (obv, ema) = (row.obv?, row.obv_ema?);
        Some(if obv > ema { Self::Rising } else { Self::Falling })
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Rising => "Rising",
            Self::Falling => "Falling",
        }
    }
}

macro_rules! impl_display_as_str {
  ($($ty:ty),* $(,)?) => {
    $(impl fmt::Display for $ty {
      fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
      }
    })*
  };
}

impl_display_as_str!(TrendStrength, MomentumStatus, VolumeStatus, ObvTrend);

// ============================================================
// KEY SIGNALS
// ============================================================

/// Human-readable rule annotation with the points it contributed
///
/// Annotation-only observations carry zero points.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeySignal {
    pub text: String,
    pub points: i32,
}

/// Collects points and annotations for one category
struct Tally<'a> {
    score: i32,
    signals: &'a mut Vec<KeySignal>,
}

impl<'a> Tally<'a> {
    fn new(signals: &'a mut Vec<KeySignal>) -> Self {
        Self { score: 0, signals }
    }

    fn add(&mut self, points: i32, text: impl Into<String>) {
        self.score += points;
        self.signals.push(KeySignal {
            text: text.into(),
            points,
        });
    }

    fn note(&mut self, text: impl Into<String>) {
        self.add(0, text);
    }
}

/// Output of a scoring pass
#[derive(Debug, Clone, PartialEq)]
pub struct Scorecard {
    pub scores: CategoryScores,
    /// Ordered by descending |points|; annotations last
    pub signals: Vec<KeySignal>,
}

impl Scorecard {
    pub fn composite(&self) -> i32 {
        self.scores.composite()
    }
}

/// Score the latest bar against the one before it.
pub fn score(latest: &FrameRow, prev: &FrameRow, cfg: &ScoringConfig) -> Scorecard {
    let mut signals = Vec::new();
    let scores = CategoryScores {
        trend: score_trend(latest, prev, cfg, &mut signals),
        momentum: score_momentum(latest, cfg, &mut signals),
        volume: score_volume(latest, cfg, &mut signals),
        volatility: score_volatility(latest, cfg, &mut signals),
    };
    // stable: equal weights keep rule order
    signals.sort_by_key(|s| Reverse(s.points.abs()));
    Scorecard { scores, signals }
}

// ============================================================
// CATEGORY SCORERS
// ============================================================

pub fn score_trend(
    row: &FrameRow,
    prev: &FrameRow,
    cfg: &ScoringConfig,
    signals: &mut Vec<KeySignal>,
) -> i32 {
    let mut t = Tally::new(signals);

    if let (Some(fast), Some(short), Some(mid)) = (row.ema_fast, row.ema_short, row.ema_mid) {
        let c = row.close;
        if c > fast && fast > short && short > mid {
            t.add(3, "Perfect bullish EMA alignment");
        } else if c < fast && fast < short && short < mid {
            t.add(-3, "Perfect bearish EMA alignment");
        }
    }

    if let (Some(adx), Some(plus), Some(minus)) = (row.adx, row.plus_di, row.minus_di) {
        if adx > cfg.adx_trending {
            if plus > minus {
                t.add(2, format!("Strong uptrend (ADX {adx:.1})"));
            } else if minus > plus {
                t.add(-2, format!("Strong downtrend (ADX {adx:.1})"));
            }
        }
    }

    // state is only meaningful once the bands exist
    if row.supertrend_lower.is_some() || row.supertrend_upper.is_some() {
        match row.supertrend {
            TrendState::Bullish => t.add(1, "SuperTrend bullish"),
            TrendState::Bearish => t.add(-1, "SuperTrend bearish"),
        }
    }

    if let (Some(line), Some(sig), Some(prev_line), Some(prev_sig)) =
        (row.macd, row.macd_signal, prev.macd, prev.macd_signal)
    {
        if prev_line <= prev_sig && line > sig {
            t.add(2, "MACD bullish crossover");
        } else if prev_line >= prev_sig && line < sig {
            t.add(-2, "MACD bearish crossover");
        }
    }

    t.score
}

pub fn score_momentum(row: &FrameRow, cfg: &ScoringConfig, signals: &mut Vec<KeySignal>) -> i32 {
    let mut t = Tally::new(signals);

    if let Some(rsi) = row.rsi {
        if rsi < cfg.rsi_oversold {
            t.add(2, format!("RSI oversold ({rsi:.1})"));
        } else if rsi > cfg.rsi_overbought {
            t.add(-2, format!("RSI overbought ({rsi:.1})"));
        }
    }

    if let (Some(k), Some(d)) = (row.stoch_k, row.stoch_d) {
        if k < cfg.stoch_oversold && k > d {
            t.add(2, "Stochastic oversold and turning up");
        } else if k > cfg.stoch_overbought && k < d {
            t.add(-2, "Stochastic overbought and turning down");
        }
    }

    if let Some(cci) = row.cci {
        if cci < cfg.cci_oversold {
            t.add(1, format!("CCI oversold ({cci:.0})"));
        } else if cci > cfg.cci_overbought {
            t.add(-1, format!("CCI overbought ({cci:.0})"));
        }
    }

    if let Some(wr) = row.williams_r {
        if wr < cfg.williams_oversold {
            t.add(1, "Williams %R oversold");
        } else if wr > cfg.williams_overbought {
            t.add(-1, "Williams %R overbought");
        }
    }

    t.score
}

pub fn score_volume(row: &FrameRow, cfg: &ScoringConfig, signals: &mut Vec<KeySignal>) -> i32 {
    let mut t = Tally::new(signals);

    if let Some(avg) = row.volume_sma.filter(|v| *v > 0.0) {
        let multiple = row.volume / avg;
        if multiple > cfg.volume_spike_multiple {
            t.add(2, format!("Volume spike ({multiple:.1}x average)"));
        } else if multiple < cfg.volume_dry_multiple {
            t.add(-1, format!("Low volume ({multiple:.1}x average)"));
        }
    }

    if let Some(obv) = ObvTrend::from_row(row) {
        match obv {
            ObvTrend::Rising => t.add(1, "OBV rising"),
            ObvTrend::Falling => t.add(-1, "OBV falling"),
        }
    }

    if let Some(mfi) = row.mfi {
        if mfi < cfg.mfi_oversold {
            t.add(1, format!("MFI oversold ({mfi:.1})"));
        } else if mfi > cfg.mfi_overbought {
            t.add(-1, format!("MFI overbought ({mfi:.1})"));
        }
    }

    t.score
}

pub fn score_volatility(row: &FrameRow, cfg: &ScoringConfig, signals: &mut Vec<KeySignal>) -> i32 {
    let mut t = Tally::new(signals);
    let close = row.close;

    if let (Some(low), Some(high)) = (row.bb_low, row.bb_high) {
        if close < low {
            t.add(2, "Price below lower Bollinger Band");
        } else if close > high {
            t.add(-2, "Price above upper Bollinger Band");
        }
    }

    if close > 0.0 {
        let near = cfg.sr_proximity.get();
        if let Some(support) = row.support {
            if (close - support) / close < near {
                t.add(1, format!("Near support ({support:.2})"));
            }
        }
        if let Some(resistance) = row.resistance {
            if (resistance - close) / close < near {
                t.add(-1, format!("Near resistance ({resistance:.2})"));
            }
        }
    }

    if let Some(width) = row.bb_width {
        if width < cfg.squeeze_width_pct {
            t.note(format!("Bollinger squeeze (width {width:.1}%)"));
        }
    }

    if let Some(atr) = row.atr.filter(|_| close > 0.0) {
        let atr_pct = atr / close * 100.0;
        if atr_pct > cfg.high_atr_pct {
            t.note(format!("High volatility (ATR {atr_pct:.1}%)"));
        }
    }

    t.score
}

// ============================================================
// TRADE LEVELS
// ============================================================

/// Entry range, target and stop for a buy signal
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TradeLevels {
    pub entry_low: f64,
    pub entry_high: f64,
    pub target: f64,
    pub stop_loss: f64,
    /// `None` when the stop is not below the close
    pub risk_reward: Option<f64>,
}

impl TradeLevels {
    /// Levels from rolling support and ATR; `None` while either is undefined.
    pub fn compute(row: &FrameRow, cfg: &ScoringConfig) -> Option<Self> {
        let support = row.support?;
        let atr = row.atr?;
        let close = row.close;

        let target = close + cfg.target_atr_multiple * atr;
        let stop_loss = support - cfg.stop_atr_multiple * atr;
        let risk = close - stop_loss;
        let risk_reward = (risk > 0.0).then(|| (target - close) / risk);

        Some(Self {
            entry_low: support,
            entry_high: close,
            target,
            stop_loss,
            risk_reward,
        })
    }

    pub fn entry_text(&self) -> String {
        format!("{:.2} - {:.2}", self.entry_low, self.entry_high)
    }

    pub fn risk_reward_text(&self) -> String {
        match self.risk_reward {
            Some(rr) => format!("1:{rr:.2}"),
            None => NOT_APPLICABLE.to_string(),
        }
    }
}

/// Placeholder for levels that do not apply
pub const NOT_APPLICABLE: &str = "N/A";

// ============================================================
// TESTS
// ============================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> ScoringConfig {
        ScoringConfig::default()
    }

    fn bullish_trend_rows() -> (FrameRow, FrameRow) {
        let prev = FrameRow {
            macd: Some(0.9),
            macd_signal: Some(1.0),
            ..FrameRow::default()
        };
        let latest = FrameRow {
            close: 110.0,
            ema_fast: Some(108.0),
            ema_short: Some(105.0),
            ema_mid: Some(100.0),
            adx: Some(30.0),
            plus_di: Some(28.0),
            minus_di: Some(12.0),
            supertrend: TrendState::Bullish,
            supertrend_lower: Some(104.0),
            macd: Some(1.2),
            macd_signal: Some(1.05),
            ..FrameRow::default()
        };
        (latest, prev)
    }

    #[test]
    fn test_trend_score_full_bullish() {
        let (latest, prev) = bullish_trend_rows();
        let mut signals = Vec::new();
        assert_eq!(score_trend(&latest, &prev, &cfg(), &mut signals), 8);
        assert_eq!(signals.len(), 4);
    }

    #[test]
    fn test_trend_score_full_bearish() {
        let prev = FrameRow {
            macd: Some(1.1),
            macd_signal: Some(1.0),
            ..FrameRow::default()
        };
        let latest = FrameRow {
            close: 90.0,
            ema_fast: Some(92.0),
            ema_short: Some(95.0),
            ema_mid: Some(100.0),
            adx: Some(35.0),
            plus_di: Some(10.0),
            minus_di: Some(30.0),
            supertrend: TrendState::Bearish,
            supertrend_upper: Some(96.0),
            macd: Some(0.8),
            macd_signal: Some(0.95),
            ..FrameRow::default()
        };
        assert_eq!(score_trend(&latest, &prev, &cfg(), &mut Vec::new()), -8);
    }

    #[test]
    fn test_undefined_inputs_never_fire() {
        let row = FrameRow {
            close: 100.0,
            volume: 1_000.0,
            ..FrameRow::default()
        };
        let card = score(&row, &row, &cfg());
        assert_eq!(card.scores, CategoryScores::default());
        assert!(card.signals.is_empty());
    }

    #[test]
    fn test_weak_adx_does_not_score() {
        let (mut latest, prev) = bullish_trend_rows();
        latest.adx = Some(25.0);
        assert_eq!(score_trend(&latest, &prev, &cfg(), &mut Vec::new()), 6);
    }

    #[test]
    fn test_rsi_leaving_oversold_never_increases_score() {
        let at = |rsi| {
            let row = FrameRow {
                rsi: Some(rsi),
                ..FrameRow::default()
            };
            score_momentum(&row, &cfg(), &mut Vec::new())
        };
        assert_eq!(at(25.0), 2);
        assert_eq!(at(35.0), 0);
        assert!(at(35.0) <= at(25.0));
    }

    #[test]
    fn test_stochastic_requires_k_above_d() {
        let mut row = FrameRow {
            stoch_k: Some(15.0),
            stoch_d: Some(12.0),
            ..FrameRow::default()
        };
        assert_eq!(score_momentum(&row, &cfg(), &mut Vec::new()), 2);
        row.stoch_d = Some(18.0);
        assert_eq!(score_momentum(&row, &cfg(), &mut Vec::new()), 0);
    }

    #[test]
    fn test_volume_rules() {
        let row = FrameRow {
            volume: 2_000.0,
            volume_sma: Some(1_000.0),
            obv: Some(50_000.0),
            obv_ema: Some(40_000.0),
            mfi: Some(15.0),
            ..FrameRow::default()
        };
        assert_eq!(score_volume(&row, &cfg(), &mut Vec::new()), 4);

        let dry = FrameRow {
            volume: 400.0,
            volume_sma: Some(1_000.0),
            obv: Some(30_000.0),
            obv_ema: Some(40_000.0),
            mfi: Some(85.0),
            ..FrameRow::default()
        };
        assert_eq!(score_volume(&dry, &cfg(), &mut Vec::new()), -3);
    }

    #[test]
    fn test_volatility_annotations_are_unscored() {
        let row = FrameRow {
            close: 100.0,
            bb_low: Some(97.0),
            bb_high: Some(101.0),
            bb_width: Some(4.0),
            atr: Some(4.0),
            ..FrameRow::default()
        };
        let mut signals = Vec::new();
        assert_eq!(score_volatility(&row, &cfg(), &mut signals), 0);
        assert_eq!(signals.len(), 2);
        assert!(signals.iter().all(|s| s.points == 0));
    }

    #[test]
    fn test_support_and_resistance_proximity() {
        let row = FrameRow {
            close: 100.0,
            support: Some(99.0),
            resistance: Some(101.5),
            bb_low: Some(98.0),
            bb_high: Some(102.0),
            ..FrameRow::default()
        };
        // +1 near support, -1 near resistance
        assert_eq!(score_volatility(&row, &cfg(), &mut Vec::new()), 0);

        let below = FrameRow {
            close: 95.0,
            support: Some(94.8),
            bb_low: Some(96.0),
            bb_high: Some(104.0),
            ..FrameRow::default()
        };
        assert_eq!(score_volatility(&below, &cfg(), &mut Vec::new()), 3);
    }

    #[test]
    fn test_key_signals_ordered_by_weight() {
        let (mut latest, prev) = bullish_trend_rows();
        latest.rsi = Some(75.0);
        latest.cci = Some(150.0);
        latest.bb_width = Some(3.0);
        let card = score(&latest, &prev, &cfg());
        let weights: Vec<i32> = card.signals.iter().map(|s| s.points.abs()).collect();
        let mut sorted = weights.clone();
        sorted.sort_by(|a, b| b.cmp(a));
        assert_eq!(weights, sorted);
        assert_eq!(card.signals.first().unwrap().text, "Perfect bullish EMA alignment");
        assert_eq!(card.signals.last().unwrap().points, 0);
    }

    #[test]
    fn test_signal_thresholds() {
        let t = SignalThresholds::default();
        assert_eq!(Signal::from_score(10, &t), Signal::StrongBuy);
        assert_eq!(Signal::from_score(9, &t), Signal::Buy);
        assert_eq!(Signal::from_score(5, &t), Signal::Buy);
        assert_eq!(Signal::from_score(4, &t), Signal::Hold);
        assert_eq!(Signal::from_score(-4, &t), Signal::Hold);
        assert_eq!(Signal::from_score(-5, &t), Signal::Sell);
        assert_eq!(Signal::from_score(-9, &t), Signal::Sell);
        assert_eq!(Signal::from_score(-10, &t), Signal::StrongSell);
        assert_eq!(Signal::StrongBuy.to_string(), "STRONG BUY");
    }

    #[test]
    fn test_labels() {
        let t = LabelThresholds::default();
        assert_eq!(TrendStrength::from_score(4, &t), TrendStrength::StrongUptrend);
        assert_eq!(TrendStrength::from_score(1, &t), TrendStrength::WeakUptrend);
        assert_eq!(TrendStrength::from_score(-3, &t), TrendStrength::Sideways);
        assert_eq!(TrendStrength::from_score(-4, &t), TrendStrength::Downtrend);
        assert_eq!(MomentumStatus::from_score(3, &t), MomentumStatus::Bullish);
        assert_eq!(MomentumStatus::from_score(-3, &t), MomentumStatus::Bearish);
        assert_eq!(MomentumStatus::from_score(0, &t), MomentumStatus::Neutral);
        assert_eq!(VolumeStatus::from_score(2, &t), VolumeStatus::Strong);
        assert_eq!(VolumeStatus::from_score(-1, &t), VolumeStatus::Weak);
        assert_eq!(VolumeStatus::from_score(1, &t).to_string(), "Normal");
    }

    #[test]
    fn test_risk_reward_text() {
        let row = FrameRow {
            close: 100.0,
            support: Some(95.0),
            atr: Some(2.0),
            ..FrameRow::default()
        };
        let levels = TradeLevels::compute(&row, &cfg()).unwrap();
        assert_eq!(levels.target, 104.0);
        assert_eq!(levels.stop_loss, 93.0);
        assert_eq!(levels.risk_reward_text(), "1:0.57");
        assert_eq!(levels.entry_text(), "95.00 - 100.00");
    }

    #[test]
    fn test_degenerate_risk_is_not_applicable() {
        let row = FrameRow {
            close: 90.0,
            support: Some(95.0),
            atr: Some(2.0),
            ..FrameRow::default()
        };
        // stop 93 sits above the close
        let levels = TradeLevels::compute(&row, &cfg()).unwrap();
        assert_eq!(levels.risk_reward, None);
        assert_eq!(levels.risk_reward_text(), "N/A");
    }

    #[test]
    fn test_levels_need_support_and_atr() {
        let row = FrameRow {
            close: 100.0,
            atr: Some(2.0),
            ..FrameRow::default()
        };
        assert!(TradeLevels::compute(&row, &cfg()).is_none());
    }
}
