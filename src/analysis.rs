//! Scan engine and result assembly
//!
//! [`ScanEngine`] is the single entry point for both pipelines: full scoring
//! ([`ScanEngine::analyze`]) and the reversal scan
//! ([`ScanEngine::detect_reversal`]). It holds only its configuration, so one
//! engine can be shared by reference across threads.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{EngineConfig, IndicatorConfig, ReversalConfig, ScoringConfig};
use crate::derived::TrendState;
use crate::frame::IndicatorFrame;
use crate::params::Parameterized;
use crate::reversal::{self, ReversalOutcome, ReversalSignal};
use crate::scan::ChartSink;
use crate::scoring::{
    self, CategoryScores, MomentumStatus, ObvTrend, Signal, TrendStrength, VolumeStatus,
    NOT_APPLICABLE,
};
use crate::{validate_bars, Bar, Result, ScanError, OHLCV};

pub use crate::scoring::{KeySignal, TradeLevels};

// ============================================================
// ANALYSIS RESULT
// ============================================================

/// Latest-bar oscillator readings shown alongside the scores
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Readouts {
    pub adx: Option<f64>,
    pub rsi: Option<f64>,
    pub stoch_k: Option<f64>,
    pub cci: Option<f64>,
    pub mfi: Option<f64>,
}

/// Scored analysis of one ticker at its latest bar
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub ticker: String,
    pub price: f64,
    /// Percent change from the previous close
    pub change_pct: f64,
    pub volume: f64,
    pub scores: CategoryScores,
    pub composite_score: i32,
    pub signal: Signal,
    /// `"support - close"` for buy signals, otherwise `"N/A"`
    pub entry_point: String,
    pub target_price: String,
    pub stop_loss: String,
    /// `"1:ratio"`, or `"N/A"`
    pub risk_reward: String,
    pub levels: Option<TradeLevels>,
    pub resistance: Option<f64>,
    pub support: Option<f64>,
    pub trend_strength: TrendStrength,
    pub momentum_status: MomentumStatus,
    pub volume_status: VolumeStatus,
    pub readouts: Readouts,
    pub supertrend: TrendState,
    pub obv_trend: Option<ObvTrend>,
    /// Ordered by descending weight; annotations last
    pub key_signals: Vec<KeySignal>,
    pub timestamp: Option<i64>,
}

impl AnalysisResult {
    /// Annotation texts in report order
    pub fn key_signal_texts(&self) -> impl Iterator<Item = &str> {
        self.key_signals.iter().map(|s| s.text.as_str())
    }
}

// ============================================================
// ENGINE
// ============================================================

/// Stateless indicator and scoring engine
#[derive(Debug, Clone)]
pub struct ScanEngine {
    config: EngineConfig,
}

impl ScanEngine {
    /// Create an engine from a validated configuration
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Compute the indicator frame for `bars` without scoring it.
    pub fn compute_frame<T: OHLCV>(&self, bars: &[T]) -> IndicatorFrame {
        IndicatorFrame::compute(bars, &self.config.indicators)
    }

    /// Analyze `bars`, reporting why a ticker had to be skipped.
    pub fn try_analyze<T: OHLCV>(&self, ticker: &str, bars: &[T]) -> Result<AnalysisResult> {
        self.check_history(bars)?;
        let frame = self.compute_frame(bars);
        self.analyze_frame(ticker, &frame)
    }

    /// Analyze `bars`; `None` when the ticker has to be skipped.
    pub fn analyze<T: OHLCV>(&self, ticker: &str, bars: &[T]) -> Option<AnalysisResult> {
        match self.try_analyze(ticker, bars) {
            Ok(result) => Some(result),
            Err(e) => {
                debug!(ticker = %ticker, bars = bars.len(), reason = %e, "skipping analysis");
                None
            }
        }
    }

    /// Score the latest row of an already computed frame.
    pub fn analyze_frame(&self, ticker: &str, frame: &IndicatorFrame) -> Result<AnalysisResult> {
        let need = self.config.min_bars;
        if frame.len() < need {
            return Err(ScanError::InsufficientHistory {
                need,
                got: frame.len(),
            });
        }
        let (latest, prev) = match (frame.latest(), frame.previous()) {
            (Some(latest), Some(prev)) => (latest, prev),
            _ => {
                return Err(ScanError::InsufficientHistory {
                    need: 2,
                    got: frame.len(),
                })
            }
        };

        let sc = &self.config.scoring;
        let card = scoring::score(&latest, &prev, sc);
        let composite_score = card.composite();
        let signal = Signal::from_score(composite_score, &sc.signals);

        let levels = if signal.is_buy() {
            TradeLevels::compute(&latest, sc)
        } else {
            None
        };
        let (entry_point, target_price, stop_loss, risk_reward) = match &levels {
            Some(l) => (
                l.entry_text(),
                format!("{:.2}", l.target),
                format!("{:.2}", l.stop_loss),
                l.risk_reward_text(),
            ),
            None => (
                NOT_APPLICABLE.to_string(),
                NOT_APPLICABLE.to_string(),
                NOT_APPLICABLE.to_string(),
                NOT_APPLICABLE.to_string(),
            ),
        };

        let change_pct = if prev.close != 0.0 {
            (latest.close - prev.close) / prev.close * 100.0
        } else {
            0.0
        };

        Ok(AnalysisResult {
            ticker: ticker.to_string(),
            price: latest.close,
            change_pct,
            volume: latest.volume,
            scores: card.scores,
            composite_score,
            signal,
            entry_point,
            target_price,
            stop_loss,
            risk_reward,
            levels,
            resistance: latest.resistance,
            support: latest.support,
            trend_strength: TrendStrength::from_score(card.scores.trend, &sc.labels),
            momentum_status: MomentumStatus::from_score(card.scores.momentum, &sc.labels),
            volume_status: VolumeStatus::from_score(card.scores.volume, &sc.labels),
            readouts: Readouts {
                adx: latest.adx,
                rsi: latest.rsi,
                stoch_k: latest.stoch_k,
                cci: latest.cci,
                mfi: latest.mfi,
            },
            supertrend: latest.supertrend,
            obv_trend: ObvTrend::from_row(&latest),
            key_signals: card.signals,
            timestamp: latest.timestamp,
        })
    }

    /// Run the reversal gates, reporting the rejecting gate.
    pub fn try_detect_reversal<T: OHLCV>(&self, ticker: &str, bars: &[T]) -> Result<ReversalOutcome> {
        self.check_history(bars)?;
        let frame = self.compute_frame(bars);
        reversal::evaluate(ticker, bars, &frame, &self.config.reversal)
    }

    /// Reversal setup on the latest bar, if every gate passes.
    pub fn detect_reversal<T: OHLCV>(&self, ticker: &str, bars: &[T]) -> Option<ReversalSignal> {
        match self.try_detect_reversal(ticker, bars) {
            Ok(ReversalOutcome::Signal(signal)) => Some(signal),
            Ok(ReversalOutcome::Rejected(gate)) => {
                debug!(ticker = %ticker, gate = %gate, "no reversal setup");
                None
            }
            Err(e) => {
                debug!(ticker = %ticker, bars = bars.len(), reason = %e, "skipping reversal scan");
                None
            }
        }
    }

    /// Hand the bars and their indicator frame to a chart renderer.
    pub fn render_chart(&self, ticker: &str, bars: &[Bar], sink: &dyn ChartSink) -> Result<()> {
        validate_bars(bars)?;
        let frame = self.compute_frame(bars);
        sink.render(ticker, bars, &frame)
    }

    fn check_history<T: OHLCV>(&self, bars: &[T]) -> Result<()> {
        let need = self.config.min_bars;
        if bars.len() < need {
            return Err(ScanError::InsufficientHistory {
                need,
                got: bars.len(),
            });
        }
        validate_bars(bars)
    }
}

// ============================================================
// ENGINE BUILDER
// ============================================================

/// Fluent builder producing a validated [`ScanEngine`]
#[derive(Debug, Clone, Default)]
pub struct EngineBuilder {
    config: EngineConfig,
}

impl EngineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole configuration
    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Minimum bars for a valid analysis
    pub fn min_bars(mut self, bars: usize) -> Self {
        self.config.min_bars = bars;
        self
    }

    /// Bars requested per ticker during universe scans
    pub fn lookback_bars(mut self, bars: usize) -> Self {
        self.config.lookback_bars = bars;
        self
    }

    pub fn indicators(mut self, indicators: IndicatorConfig) -> Self {
        self.config.indicators = indicators;
        self
    }

    pub fn scoring(mut self, scoring: ScoringConfig) -> Self {
        self.config.scoring = scoring;
        self
    }

    pub fn reversal(mut self, reversal: ReversalConfig) -> Self {
        self.config.reversal = reversal;
        self
    }

    /// ADX ceiling for the reversal scan
    pub fn adx_threshold(mut self, threshold: f64) -> Self {
        self.config.reversal.adx_threshold = threshold;
        self
    }

    /// Apply named parameters over the configuration built so far
    /// (see [`crate::params`])
    pub fn with_params(mut self, params: &HashMap<&str, f64>) -> Result<Self> {
        self.config = self.config.apply_params(params)?;
        Ok(self)
    }

    /// Build the engine
    pub fn build(self) -> Result<ScanEngine> {
        ScanEngine::new(self.config)
    }
}

// ============================================================
// TESTS
// ============================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn trending(n: usize, step: f64) -> Vec<Bar> {
        (0..n)
            .map(|i| {
                let c = 100.0 + step * i as f64 + (i as f64 * 0.7).sin() * 0.3;
                Bar::new(i as i64, c - step * 0.5, c + 0.6, c - 0.6, c, 10_000.0)
            })
            .collect()
    }

    #[test]
    fn test_builder_defaults() {
        let engine = EngineBuilder::new().build().unwrap();
        assert_eq!(engine.config(), &EngineConfig::default());
    }

    #[test]
    fn test_builder_rejects_invalid() {
        assert!(EngineBuilder::new().min_bars(1).build().is_err());
        assert!(EngineBuilder::new().adx_threshold(-5.0).build().is_err());
    }

    #[test]
    fn test_builder_with_params() {
        let engine = EngineBuilder::new()
            .with_params(&HashMap::from([("min_bars", 80.0)]))
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(engine.config().min_bars, 80);
    }

    #[test]
    fn test_builder_with_params_keeps_earlier_settings() {
        let engine = EngineBuilder::new()
            .min_bars(90)
            .adx_threshold(18.0)
            .with_params(&HashMap::from([("rsi_window", 10.0)]))
            .unwrap()
            .build()
            .unwrap();
        let cfg = engine.config();
        assert_eq!(cfg.min_bars, 90);
        assert_eq!(cfg.reversal.adx_threshold, 18.0);
        assert_eq!(cfg.indicators.rsi_window.get(), 10);
    }

    #[test]
    fn test_reversal_reads_configured_windows() {
        let mut indicators = IndicatorConfig::default();
        indicators.atr_window = crate::Period::new_const(10);
        let engine = EngineBuilder::new().indicators(indicators).build().unwrap();
        let bars = trending(80, 0.3);
        let frame = engine.compute_frame(&bars);
        let outcome = reversal::evaluate("X", &bars, &frame, &engine.config().reversal).unwrap();
        assert_eq!(engine.try_detect_reversal("X", &bars).unwrap(), outcome);
        assert_eq!(frame.latest().unwrap().atr, crate::indicators::atr(&bars, 10)[79]);
    }

    #[test]
    fn test_short_history_is_skipped() {
        let engine = EngineBuilder::new().build().unwrap();
        let bars = trending(59, 0.5);
        assert!(engine.analyze("SHORT", &bars).is_none());
        assert_eq!(
            engine.try_analyze("SHORT", &bars).unwrap_err(),
            ScanError::InsufficientHistory { need: 60, got: 59 }
        );
    }

    #[test]
    fn test_invalid_bar_is_skipped() {
        let engine = EngineBuilder::new().build().unwrap();
        let mut bars = trending(80, 0.5);
        bars[40].close = f64::NAN;
        assert!(matches!(
            engine.try_analyze("BAD", &bars),
            Err(ScanError::InvalidBar { index: 40, .. })
        ));
    }

    #[test]
    fn test_composite_and_signal_consistent() {
        let engine = EngineBuilder::new().build().unwrap();
        for step in [-0.8, -0.2, 0.0, 0.2, 0.8] {
            let result = engine.analyze("T", &trending(120, step)).unwrap();
            let s = result.scores;
            assert_eq!(result.composite_score, s.trend + s.momentum + s.volume + s.volatility);
            assert_eq!(
                result.signal,
                Signal::from_score(result.composite_score, &engine.config().scoring.signals)
            );
            assert_eq!(result.timestamp, Some(119));
        }
    }

    #[test]
    fn test_non_buy_levels_are_not_applicable() {
        let engine = EngineBuilder::new().build().unwrap();
        let result = engine.analyze("DOWN", &trending(120, -0.8)).unwrap();
        assert!(!result.signal.is_buy());
        assert!(result.levels.is_none());
        assert_eq!(result.entry_point, "N/A");
        assert_eq!(result.target_price, "N/A");
        assert_eq!(result.stop_loss, "N/A");
        assert_eq!(result.risk_reward, "N/A");
    }

    #[test]
    fn test_frame_matches_analysis() {
        let engine = EngineBuilder::new().build().unwrap();
        let bars = trending(100, 0.3);
        let frame = engine.compute_frame(&bars);
        let direct = engine.analyze_frame("X", &frame).unwrap();
        assert_eq!(Some(direct), engine.analyze("X", &bars));
    }
}
