//! Universe scanning
//!
//! The engine never performs I/O. Bar retrieval, ticker validation and chart
//! rendering are collaborators behind the [`BarSource`], [`TickerValidator`]
//! and [`ChartSink`] traits; the functions here fan the per-ticker work out
//! with rayon. A failure on one ticker is recorded and never affects the
//! others.

use rayon::prelude::*;
use tracing::{info, warn};

use crate::analysis::{AnalysisResult, ScanEngine};
use crate::frame::IndicatorFrame;
use crate::reversal::ReversalSignal;
use crate::scoring::Signal;
use crate::{Bar, Result, ScanError, OHLCV};

// ============================================================
// COLLABORATORS
// ============================================================

/// Fetches bar series by ticker
pub trait BarSource: Send + Sync {
    /// Up to `lookback` most recent bars, oldest first.
    ///
    /// An empty series is treated as missing data.
    fn fetch(&self, ticker: &str, lookback: usize) -> Result<Vec<Bar>>;
}

/// Checks whether a ticker exists on the exchange
pub trait TickerValidator: Send + Sync {
    fn exists(&self, ticker: &str) -> bool;
}

/// Receives bars and their indicator frame for presentation
pub trait ChartSink: Send + Sync {
    fn render(&self, ticker: &str, bars: &[Bar], frame: &IndicatorFrame) -> Result<()>;
}

// ============================================================
// SCAN RESULTS
// ============================================================

/// A ticker that could not be analyzed
#[derive(Debug, Clone, PartialEq)]
pub struct TickerFailure {
    pub ticker: String,
    pub error: ScanError,
}

/// Outcome of a universe scan
#[derive(Debug, Clone, Default)]
pub struct ScanReport {
    /// Ranked by composite score descending, ties by ticker
    pub results: Vec<AnalysisResult>,
    pub failures: Vec<TickerFailure>,
}

impl ScanReport {
    fn new(mut results: Vec<AnalysisResult>, failures: Vec<TickerFailure>) -> Self {
        results.sort_by(|a, b| {
            b.composite_score
                .cmp(&a.composite_score)
                .then_with(|| a.ticker.cmp(&b.ticker))
        });
        Self { results, failures }
    }

    pub fn strong_buys(&self) -> impl Iterator<Item = &AnalysisResult> {
        self.results.iter().filter(|r| r.signal == Signal::StrongBuy)
    }

    pub fn strong_sells(&self) -> impl Iterator<Item = &AnalysisResult> {
        self.results.iter().filter(|r| r.signal == Signal::StrongSell)
    }

    /// Highest-ranked `n` results
    pub fn top(&self, n: usize) -> &[AnalysisResult] {
        &self.results[..n.min(self.results.len())]
    }
}

// ============================================================
// PARALLEL SCANNING
// ============================================================

fn fetch_series(source: &dyn BarSource, ticker: &str, lookback: usize) -> Result<Vec<Bar>> {
    let bars = source.fetch(ticker, lookback)?;
    if bars.is_empty() {
        return Err(ScanError::MissingData {
            ticker: ticker.to_string(),
        });
    }
    Ok(bars)
}

fn partition<T>(outcomes: Vec<std::result::Result<T, TickerFailure>>) -> (Vec<T>, Vec<TickerFailure>) {
    let mut successes = Vec::new();
    let mut failures = Vec::new();

    for outcome in outcomes {
        match outcome {
            Ok(r) => successes.push(r),
            Err(e) => failures.push(e),
        }
    }

    (successes, failures)
}

/// Fetch and analyze every ticker in parallel.
pub fn scan_universe<S: AsRef<str> + Sync>(
    engine: &ScanEngine,
    source: &dyn BarSource,
    tickers: &[S],
) -> ScanReport {
    let lookback = engine.config().lookback_bars;

    let outcomes: Vec<_> = tickers
        .par_iter()
        .map(|ticker| {
            let ticker = ticker.as_ref();
            fetch_series(source, ticker, lookback)
                .inspect_err(|e| warn!(ticker = %ticker, error = %e, "bar source failed"))
                .and_then(|bars| engine.try_analyze(ticker, &bars))
                .map_err(|error| TickerFailure {
                    ticker: ticker.to_string(),
                    error,
                })
        })
        .collect();

    let (results, failures) = partition(outcomes);
    info!(
        tickers = tickers.len(),
        analyzed = results.len(),
        failed = failures.len(),
        "universe scan complete"
    );
    ScanReport::new(results, failures)
}

/// Run the reversal scan over every ticker in parallel.
///
/// Signals are returned in input order; failures are collected separately.
pub fn scan_reversals<S: AsRef<str> + Sync>(
    engine: &ScanEngine,
    source: &dyn BarSource,
    tickers: &[S],
) -> (Vec<ReversalSignal>, Vec<TickerFailure>) {
    let lookback = engine.config().lookback_bars;

    let outcomes: Vec<_> = tickers
        .par_iter()
        .map(|ticker| {
            let ticker = ticker.as_ref();
            fetch_series(source, ticker, lookback)
                .inspect_err(|e| warn!(ticker = %ticker, error = %e, "bar source failed"))
                .and_then(|bars| engine.try_detect_reversal(ticker, &bars))
                .map(|outcome| outcome.signal())
                .map_err(|error| TickerFailure {
                    ticker: ticker.to_string(),
                    error,
                })
        })
        .collect();

    let (found, failures) = partition(outcomes);
    let signals: Vec<ReversalSignal> = found.into_iter().flatten().collect();
    info!(
        tickers = tickers.len(),
        signals = signals.len(),
        failed = failures.len(),
        "reversal scan complete"
    );
    (signals, failures)
}

/// Analyze already-fetched series in parallel
pub fn analyze_parallel<'a, T, I>(engine: &ScanEngine, instruments: I) -> ScanReport
where
    T: OHLCV + Sync + 'a,
    I: IntoParallelIterator<Item = (&'a str, &'a [T])>,
{
    let outcomes: Vec<_> = instruments
        .into_par_iter()
        .map(|(ticker, bars)| {
            engine
                .try_analyze(ticker, bars)
                .map_err(|error| TickerFailure {
                    ticker: ticker.to_string(),
                    error,
                })
        })
        .collect();

    let (results, failures) = partition(outcomes);
    ScanReport::new(results, failures)
}

/// Split a watchlist into known and unknown tickers.
///
/// Tickers are trimmed and upper-cased; blanks and duplicates are dropped.
pub fn validate_watchlist<S: AsRef<str>>(
    validator: &dyn TickerValidator,
    tickers: &[S],
) -> (Vec<String>, Vec<String>) {
    let mut seen = std::collections::HashSet::new();
    let normalized: Vec<String> = tickers
        .iter()
        .map(|t| t.as_ref().trim().to_uppercase())
        .filter(|t| !t.is_empty() && seen.insert(t.clone()))
        .collect();

    normalized
        .par_iter()
        .map(|t| (t.clone(), validator.exists(t)))
        .collect::<Vec<_>>()
        .into_iter()
        .fold((Vec::new(), Vec::new()), |(mut known, mut unknown), (t, ok)| {
            if ok {
                known.push(t);
            } else {
                unknown.push(t);
            }
            (known, unknown)
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::EngineBuilder;
    use crate::scoring::CategoryScores;

    fn result(ticker: &str, score: i32, signal: Signal) -> AnalysisResult {
        AnalysisResult {
            ticker: ticker.into(),
            price: 100.0,
            change_pct: 0.0,
            volume: 0.0,
            scores: CategoryScores {
                trend: score,
                ..CategoryScores::default()
            },
            composite_score: score,
            signal,
            entry_point: "N/A".into(),
            target_price: "N/A".into(),
            stop_loss: "N/A".into(),
            risk_reward: "N/A".into(),
            levels: None,
            resistance: None,
            support: None,
            trend_strength: crate::scoring::TrendStrength::Sideways,
            momentum_status: crate::scoring::MomentumStatus::Neutral,
            volume_status: crate::scoring::VolumeStatus::Normal,
            readouts: Default::default(),
            supertrend: Default::default(),
            obv_trend: None,
            key_signals: Vec::new(),
            timestamp: None,
        }
    }

    #[test]
    fn test_report_ranking() {
        let report = ScanReport::new(
            vec![
                result("BBRI", 3, Signal::Hold),
                result("TLKM", 12, Signal::StrongBuy),
                result("ASII", 12, Signal::StrongBuy),
                result("GOTO", -11, Signal::StrongSell),
            ],
            Vec::new(),
        );
        let order: Vec<&str> = report.results.iter().map(|r| r.ticker.as_str()).collect();
        assert_eq!(order, ["ASII", "TLKM", "BBRI", "GOTO"]);
        assert_eq!(report.strong_buys().count(), 2);
        assert_eq!(report.strong_sells().next().unwrap().ticker, "GOTO");
        assert_eq!(report.top(1).len(), 1);
        assert_eq!(report.top(10).len(), 4);
    }

    struct Known;

    impl TickerValidator for Known {
        fn exists(&self, ticker: &str) -> bool {
            matches!(ticker, "BBCA" | "TLKM")
        }
    }

    #[test]
    fn test_validate_watchlist() {
        let (known, unknown) = validate_watchlist(&Known, &[" bbca", "TLKM", "XXXX", "", "BBCA"]);
        assert_eq!(known, ["BBCA", "TLKM"]);
        assert_eq!(unknown, ["XXXX"]);
    }

    struct Empty;

    impl BarSource for Empty {
        fn fetch(&self, _ticker: &str, _lookback: usize) -> Result<Vec<Bar>> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn test_empty_fetch_is_missing_data() {
        let engine = EngineBuilder::new().build().unwrap();
        let report = scan_universe(&engine, &Empty, &["BBCA"]);
        assert!(report.results.is_empty());
        assert_eq!(
            report.failures,
            vec![TickerFailure {
                ticker: "BBCA".into(),
                error: ScanError::MissingData {
                    ticker: "BBCA".into()
                },
            }]
        );
    }
}
