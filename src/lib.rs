//! # swingscan - swing-trading setup scanner
//!
//! Scores exchange-listed equities for swing-trading setups. A price history is
//! turned into a frame of technical indicators, the latest bar is scored across
//! four categories (trend, momentum, volume, volatility) and the composite is
//! mapped to a discrete signal with entry, target and stop levels.
//!
//! A second, simpler pipeline looks only for bullish reversal setups
//! (hammer / bullish engulfing in a non-trending market).
//!
//! ## Quick Start
//!
//! ```rust
//! use swingscan::prelude::*;
//!
//! let bars: Vec<Bar> = (0..120)
//!     .map(|i| {
//!         let c = 100.0 + (i as f64 * 0.3).sin() * 5.0;
//!         Bar::new(i, c - 0.5, c + 1.0, c - 1.0, c, 10_000.0)
//!     })
//!     .collect();
//!
//! let engine = EngineBuilder::new().build().unwrap();
//!
//! if let Some(result) = engine.analyze("BBCA", &bars) {
//!     println!("{} {} ({})", result.ticker, result.signal, result.composite_score);
//! }
//! let reversal = engine.detect_reversal("BBCA", &bars);
//! assert!(reversal.is_none() || reversal.unwrap().confidence >= 30);
//! ```
//!
//! The engine is stateless: every call recomputes from the series it is given,
//! so one engine can be shared across threads (see [`scan::scan_universe`]).

pub mod analysis;
pub mod config;
pub mod derived;
pub mod detectors;
pub mod frame;
pub mod indicators;
pub mod params;
pub mod reversal;
pub mod scan;
pub mod scoring;

pub mod prelude {
    pub use crate::{
        // Engine
        analysis::{AnalysisResult, EngineBuilder, KeySignal, Readouts, ScanEngine, TradeLevels},
        // Configuration
        config::{EngineConfig, IndicatorConfig, ReversalConfig, ScoringConfig},
        derived::{SuperTrend, TrendState},
        // Detectors
        detectors::{
            BullishEngulfingDetector, HammerDetector, PatternDetector, PatternMatch,
            ReversalPattern,
        },
        frame::{FrameRow, IndicatorFrame},
        params::{ParamMeta, ParamType, Parameterized},
        reversal::{Rejection, ReversalOutcome, ReversalSignal},
        // Universe scanning
        scan::{
            analyze_parallel, scan_reversals, scan_universe, validate_watchlist, BarSource,
            ChartSink, ScanReport, TickerFailure, TickerValidator,
        },
        scoring::{
            CategoryScores, MomentumStatus, ObvTrend, Signal, TrendStrength, VolumeStatus,
        },
        // Types
        Bar,
        OHLCVExt,
        Period,
        Ratio,
        Result,
        ScanError,
        OHLCV,
    };
}

// ============================================================
// ERRORS
// ============================================================

pub type Result<T> = std::result::Result<T, ScanError>;

/// Errors that can occur while configuring the engine or scanning a ticker
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ScanError {
    #[error("Invalid value: {0}")]
    InvalidValue(&'static str),

    #[error("{field} = {value} out of range [{min}, {max}]")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Insufficient history: need {need} bars, got {got}")]
    InsufficientHistory { need: usize, got: usize },

    #[error("Invalid bar at index {index}: {reason}")]
    InvalidBar { index: usize, reason: &'static str },

    #[error("No data for {ticker}")]
    MissingData { ticker: String },

    #[error("Data source failed for {ticker}: {message}")]
    Source { ticker: String, message: String },
}

// ============================================================
// VALIDATED TYPES
// ============================================================

/// Normalized value in range 0.0..=1.0
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Ratio(f64);

impl Ratio {
    /// Create a new Ratio, validating the value is in [0.0, 1.0]
    pub fn new(value: f64) -> Result<Self> {
        if value.is_nan() || value.is_infinite() {
            return Err(ScanError::InvalidValue("Ratio cannot be NaN or infinite"));
        }
        if !(0.0..=1.0).contains(&value) {
            return Err(ScanError::OutOfRange {
                field: "Ratio",
                value,
                min: 0.0,
                max: 1.0,
            });
        }
        Ok(Self(value))
    }

    /// Create a Ratio from a compile-time constant (library internal use)
    #[doc(hidden)]
    pub const fn new_const(value: f64) -> Self {
        Self(value)
    }

    #[inline]
    pub fn get(self) -> f64 {
        self.0
    }
}

impl serde::Serialize for Ratio {
    fn serialize<S: serde::Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        self.0.serialize(s)
    }
}

impl<'de> serde::Deserialize<'de> for Ratio {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> std::result::Result<Self, D::Error> {
        let value = f64::deserialize(d)?;
        Ratio::new(value).map_err(serde::de::Error::custom)
    }
}

/// Window length in bars (must be > 0)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Period(usize);

impl Period {
    /// Create a new Period, validating value is > 0
    pub fn new(value: usize) -> Result<Self> {
        if value == 0 {
            return Err(ScanError::InvalidValue("Period must be > 0"));
        }
        Ok(Self(value))
    }

    #[doc(hidden)]
    pub const fn new_const(value: usize) -> Self {
        Self(value)
    }

    #[inline]
    pub fn get(self) -> usize {
        self.0
    }
}

impl serde::Serialize for Period {
    fn serialize<S: serde::Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        self.0.serialize(s)
    }
}

impl<'de> serde::Deserialize<'de> for Period {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> std::result::Result<Self, D::Error> {
        let value = usize::deserialize(d)?;
        Period::new(value).map_err(serde::de::Error::custom)
    }
}

// ============================================================
// OHLCV TRAITS
// ============================================================

/// Core OHLCV data trait
pub trait OHLCV {
    fn open(&self) -> f64;
    fn high(&self) -> f64;
    fn low(&self) -> f64;
    fn close(&self) -> f64;
    fn volume(&self) -> f64;

    fn timestamp(&self) -> Option<i64> {
        None
    }
}

/// Extension trait with computed properties for OHLCV data
pub trait OHLCVExt: OHLCV {
    #[inline]
    fn body(&self) -> f64 {
        (self.close() - self.open()).abs()
    }

    #[inline]
    fn range(&self) -> f64 {
        self.high() - self.low()
    }

    #[inline]
    fn upper_shadow(&self) -> f64 {
        self.high() - self.open().max(self.close())
    }

    #[inline]
    fn lower_shadow(&self) -> f64 {
        self.open().min(self.close()) - self.low()
    }

    #[inline]
    fn is_bullish(&self) -> bool {
        self.close() > self.open()
    }

    #[inline]
    fn is_bearish(&self) -> bool {
        self.close() < self.open()
    }

    /// (high + low + close) / 3
    #[inline]
    fn typical_price(&self) -> f64 {
        (self.high() + self.low() + self.close()) / 3.0
    }

    /// (high + low) / 2
    #[inline]
    fn mid_price(&self) -> f64 {
        (self.high() + self.low()) / 2.0
    }

    /// Validate OHLCV data consistency
    fn validate(&self) -> Result<()> {
        let values = [self.open(), self.high(), self.low(), self.close(), self.volume()];
        if values.iter().any(|v| v.is_nan()) {
            return Err(ScanError::InvalidBar {
                index: 0,
                reason: "NaN in OHLCV",
            });
        }
        if values.iter().any(|v| v.is_infinite()) {
            return Err(ScanError::InvalidBar {
                index: 0,
                reason: "Infinite value in OHLCV",
            });
        }
        if self.high() < self.low() {
            return Err(ScanError::InvalidBar {
                index: 0,
                reason: "high < low",
            });
        }
        if self.volume() < 0.0 {
            return Err(ScanError::InvalidBar {
                index: 0,
                reason: "negative volume",
            });
        }
        Ok(())
    }
}

impl<T: OHLCV> OHLCVExt for T {}

/// Validate every bar of a series, reporting the first offending index.
pub fn validate_bars<T: OHLCV>(bars: &[T]) -> Result<()> {
    for (i, bar) in bars.iter().enumerate() {
        bar.validate().map_err(|e| match e {
            ScanError::InvalidBar { reason, .. } => ScanError::InvalidBar { index: i, reason },
            other => other,
        })?;
    }
    Ok(())
}

// ============================================================
// BAR
// ============================================================

/// One OHLCV sample for one time interval of one instrument
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Bar {
    /// Interval start, Unix seconds
    pub timestamp: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Bar {
    pub fn new(timestamp: i64, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Self {
        Self {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        }
    }
}

impl OHLCV for Bar {
    fn open(&self) -> f64 {
        self.open
    }

    fn high(&self) -> f64 {
        self.high
    }

    fn low(&self) -> f64 {
        self.low
    }

    fn close(&self) -> f64 {
        self.close
    }

    fn volume(&self) -> f64 {
        self.volume
    }

    fn timestamp(&self) -> Option<i64> {
        Some(self.timestamp)
    }
}

// ============================================================
// TESTS
// ============================================================
