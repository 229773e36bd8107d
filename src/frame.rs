//! Indicator frame
//!
//! [`IndicatorFrame`] holds every indicator series the scoring engine reads,
//! index-aligned with the bar series it was computed from. [`FrameRow`] is the
//! per-bar view the scorers work on; [`IndicatorFrame::columns`] is the matrix
//! handed to chart renderers.
//!
//! Columns are named by role rather than by window length (`ema_fast` rather
//! than `EMA_9`) so they stay accurate when the windows are reconfigured.

use crate::config::IndicatorConfig;
use crate::derived::{self, TrendState};
use crate::indicators::{self as ind, Values};
use crate::OHLCV;

/// Parallel indicator series for one ticker
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndicatorFrame {
    pub timestamp: Vec<Option<i64>>,
    pub open: Vec<f64>,
    pub high: Vec<f64>,
    pub low: Vec<f64>,
    pub close: Vec<f64>,
    pub volume: Vec<f64>,

    pub ema_fast: Values,
    pub ema_short: Values,
    pub ema_mid: Values,
    pub ema_long: Values,
    pub sma_short: Values,
    pub sma_mid: Values,
    pub sma_long: Values,

    pub adx: Values,
    pub plus_di: Values,
    pub minus_di: Values,
    pub macd: Values,
    pub macd_signal: Values,
    pub macd_hist: Values,

    pub rsi: Values,
    pub stoch_k: Values,
    pub stoch_d: Values,
    pub williams_r: Values,
    pub cci: Values,
    pub roc: Values,

    pub bb_high: Values,
    pub bb_low: Values,
    pub bb_mid: Values,
    pub bb_width: Values,
    pub atr: Values,
    pub keltner_high: Values,
    pub keltner_low: Values,
    pub keltner_mid: Values,

    pub obv: Values,
    pub obv_ema: Values,
    pub vwap: Values,
    pub volume_sma: Values,
    pub mfi: Values,

    pub supertrend: Vec<TrendState>,
    pub supertrend_upper: Values,
    pub supertrend_lower: Values,
    pub resistance: Values,
    pub support: Values,
    pub ema_short_slope: Values,
}

impl IndicatorFrame {
    /// Compute every indicator for `bars`.
    pub fn compute<T: OHLCV>(bars: &[T], cfg: &IndicatorConfig) -> Self {
        let close = ind::closes(bars);
        let volume = ind::volumes(bars);

        let ema_short = ind::ema(&close, cfg.ema_short.get());
        let adx = ind::adx(bars, cfg.adx_window.get());
        let macd = ind::macd(
            &close,
            cfg.macd_fast.get(),
            cfg.macd_slow.get(),
            cfg.macd_signal.get(),
        );
        let stoch = ind::stochastic(bars, cfg.stoch_window.get(), cfg.stoch_smooth.get());
        let bb = ind::bollinger(&close, cfg.bb_window.get(), cfg.bb_std_dev);
        let keltner = ind::keltner(
            bars,
            cfg.keltner_window.get(),
            cfg.keltner_atr_window.get(),
            cfg.keltner_multiplier,
        );
        let obv = ind::obv(bars);
        let st = derived::supertrend(bars, cfg.supertrend_atr_window.get(), cfg.supertrend_multiplier);
        let (support, resistance) = ind::support_resistance(bars, cfg.sr_window.get());

        Self {
            timestamp: bars.iter().map(|b| b.timestamp()).collect(),
            open: bars.iter().map(|b| b.open()).collect(),
            high: bars.iter().map(|b| b.high()).collect(),
            low: bars.iter().map(|b| b.low()).collect(),

            ema_fast: ind::ema(&close, cfg.ema_fast.get()),
            ema_short_slope: derived::slope(&ema_short, cfg.slope_span.get()),
            ema_short,
            ema_mid: ind::ema(&close, cfg.ema_mid.get()),
            ema_long: ind::ema(&close, cfg.ema_long.get()),
            sma_short: ind::sma(&close, cfg.sma_short.get()),
            sma_mid: ind::sma(&close, cfg.sma_mid.get()),
            sma_long: ind::sma(&close, cfg.sma_long.get()),

            adx: adx.adx,
            plus_di: adx.plus_di,
            minus_di: adx.minus_di,
            macd: macd.line,
            macd_signal: macd.signal,
            macd_hist: macd.histogram,

            rsi: ind::rsi(&close, cfg.rsi_window.get()),
            stoch_k: stoch.k,
            stoch_d: stoch.d,
            williams_r: ind::williams_r(bars, cfg.williams_window.get()),
            cci: ind::cci(bars, cfg.cci_window.get()),
            roc: ind::roc(&close, cfg.roc_window.get()),

            bb_high: bb.high,
            bb_low: bb.low,
            bb_mid: bb.mid,
            bb_width: bb.width,
            atr: ind::atr(bars, cfg.atr_window.get()),
            keltner_high: keltner.high,
            keltner_low: keltner.low,
            keltner_mid: keltner.mid,

            obv_ema: ind::ema_of(&obv, cfg.obv_ema_window.get()),
            obv,
            vwap: ind::vwap(bars),
            volume_sma: ind::sma(&volume, cfg.volume_sma_window.get()),
            mfi: ind::mfi(bars, cfg.mfi_window.get()),

            supertrend: st.states,
            supertrend_upper: st.upper,
            supertrend_lower: st.lower,
            resistance,
            support,

            close,
            volume,
        }
    }

    pub fn len(&self) -> usize {
        self.close.len()
    }

    pub fn is_empty(&self) -> bool {
        self.close.is_empty()
    }

    /// Indicator values at bar `index`
    pub fn row(&self, index: usize) -> Option<FrameRow> {
        let at = |v: &Values| v.get(index).copied().flatten();
        Some(FrameRow {
            index,
            timestamp: self.timestamp.get(index).copied().flatten(),
            open: *self.open.get(index)?,
            high: *self.high.get(index)?,
            low: *self.low.get(index)?,
            close: *self.close.get(index)?,
            volume: *self.volume.get(index)?,
            ema_fast: at(&self.ema_fast),
            ema_short: at(&self.ema_short),
            ema_mid: at(&self.ema_mid),
            ema_long: at(&self.ema_long),
            sma_short: at(&self.sma_short),
            sma_mid: at(&self.sma_mid),
            sma_long: at(&self.sma_long),
            adx: at(&self.adx),
            plus_di: at(&self.plus_di),
            minus_di: at(&self.minus_di),
            macd: at(&self.macd),
            macd_signal: at(&self.macd_signal),
            macd_hist: at(&self.macd_hist),
            rsi: at(&self.rsi),
            stoch_k: at(&self.stoch_k),
            stoch_d: at(&self.stoch_d),
            williams_r: at(&self.williams_r),
            cci: at(&self.cci),
            roc: at(&self.roc),
            bb_high: at(&self.bb_high),
            bb_low: at(&self.bb_low),
            bb_mid: at(&self.bb_mid),
            bb_width: at(&self.bb_width),
            atr: at(&self.atr),
            keltner_high: at(&self.keltner_high),
            keltner_low: at(&self.keltner_low),
            keltner_mid: at(&self.keltner_mid),
            obv: at(&self.obv),
            obv_ema: at(&self.obv_ema),
            vwap: at(&self.vwap),
            volume_sma: at(&self.volume_sma),
            mfi: at(&self.mfi),
            supertrend: self.supertrend.get(index).copied().unwrap_or_default(),
            supertrend_upper: at(&self.supertrend_upper),
            supertrend_lower: at(&self.supertrend_lower),
            resistance: at(&self.resistance),
            support: at(&self.support),
            ema_short_slope: at(&self.ema_short_slope),
        })
    }

    /// Values at the most recent bar
    pub fn latest(&self) -> Option<FrameRow> {
        self.row(self.len().checked_sub(1)?)
    }

    /// Values at the bar before the most recent one
    pub fn previous(&self) -> Option<FrameRow> {
        self.row(self.len().checked_sub(2)?)
    }

    /// Named numeric columns for chart rendering
    pub fn columns(&self) -> Vec<(&'static str, &[Option<f64>])> {
        vec![
            ("ema_fast", &self.ema_fast),
            ("ema_short", &self.ema_short),
            ("ema_mid", &self.ema_mid),
            ("ema_long", &self.ema_long),
            ("sma_short", &self.sma_short),
            ("sma_mid", &self.sma_mid),
            ("sma_long", &self.sma_long),
            ("adx", &self.adx),
            ("plus_di", &self.plus_di),
            ("minus_di", &self.minus_di),
            ("macd", &self.macd),
            ("macd_signal", &self.macd_signal),
            ("macd_hist", &self.macd_hist),
            ("rsi", &self.rsi),
            ("stoch_k", &self.stoch_k),
            ("stoch_d", &self.stoch_d),
            ("williams_r", &self.williams_r),
            ("cci", &self.cci),
            ("roc", &self.roc),
            ("bb_high", &self.bb_high),
            ("bb_low", &self.bb_low),
            ("bb_mid", &self.bb_mid),
            ("bb_width", &self.bb_width),
            ("atr", &self.atr),
            ("keltner_high", &self.keltner_high),
            ("keltner_low", &self.keltner_low),
            ("keltner_mid", &self.keltner_mid),
            ("obv", &self.obv),
            ("obv_ema", &self.obv_ema),
            ("vwap", &self.vwap),
            ("volume_sma", &self.volume_sma),
            ("mfi", &self.mfi),
            ("supertrend_upper", &self.supertrend_upper),
            ("supertrend_lower", &self.supertrend_lower),
            ("resistance", &self.resistance),
            ("support", &self.support),
            ("ema_short_slope", &self.ema_short_slope),
        ]
    }
}

/// Indicator values at a single bar
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameRow {
    pub index: usize,
    pub timestamp: Option<i64>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    pub ema_fast: Option<f64>,
    pub ema_short: Option<f64>,
    pub ema_mid: Option<f64>,
    pub ema_long: Option<f64>,
    pub sma_short: Option<f64>,
    pub sma_mid: Option<f64>,
    pub sma_long: Option<f64>,
    pub adx: Option<f64>,
    pub plus_di: Option<f64>,
    pub minus_di: Option<f64>,
    pub macd: Option<f64>,
    pub macd_signal: Option<f64>,
    pub macd_hist: Option<f64>,
    pub rsi: Option<f64>,
    pub stoch_k: Option<f64>,
    pub stoch_d: Option<f64>,
    pub williams_r: Option<f64>,
    pub cci: Option<f64>,
    pub roc: Option<f64>,
    pub bb_high: Option<f64>,
    pub bb_low: Option<f64>,
    pub bb_mid: Option<f64>,
    pub bb_width: Option<f64>,
    pub atr: Option<f64>,
    pub keltner_high: Option<f64>,
    pub keltner_low: Option<f64>,
    pub keltner_mid: Option<f64>,
    pub obv: Option<f64>,
    pub obv_ema: Option<f64>,
    pub vwap: Option<f64>,
    pub volume_sma: Option<f64>,
    pub mfi: Option<f64>,
    pub supertrend: TrendState,
    pub supertrend_upper: Option<f64>,
    pub supertrend_lower: Option<f64>,
    pub resistance: Option<f64>,
    pub support: Option<f64>,
    pub ema_short_slope: Option<f64>,
}
