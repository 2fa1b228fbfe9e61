//! Fair-value estimation from recorded history.
//!
//! - `rolling`: windowed mean / sample σ / correlation
//! - `ema`: span-based EMAs (streaming and full-series)
//! - `pair`: hedge-ratio regression and spread band for pair groups
//! - `momentum`: momentum-slope crossover classifier
//! - `macd`: MACD crossover classifier
//!
//! Interval estimation is pure over history: running it twice without a new
//! tick yields identical bounds. The pair path is the exception, since it
//! appends the tick's spread.

pub mod ema;
mod macd;
mod momentum;
mod pair;
pub mod rolling;

pub use macd::MacdCrossover;
pub use momentum::MomentumSlope;
pub use pair::{estimate_pair, hedge_ratio, PairEstimate};

use crate::errors::EstimateError;
use crate::trader::config::{BandModel, InstrumentConfig, TrendConfig};
use crate::trader::history::InstrumentHistory;
use crate::types::InstrumentId;

use rolling::{mean, tail, WindowStats};

/// Fair-value (or fair-spread) interval for one tick.
///
/// Bounds are always finite and ordered; construction fails otherwise.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FairInterval {
    pub lower: f64,
    pub upper: f64,
    /// Present for pair groups
    pub hedge_ratio: Option<f64>,
}

impl FairInterval {
    pub fn new(instrument: &InstrumentId, lower: f64, upper: f64) -> Result<Self, EstimateError> {
        if !lower.is_finite() || !upper.is_finite() {
            return Err(EstimateError::non_finite(instrument, "interval bound"));
        }
        Ok(Self {
            lower: lower.min(upper),
            upper: lower.max(upper),
            hedge_ratio: None,
        })
    }

    pub fn with_hedge(
        instrument: &InstrumentId,
        lower: f64,
        upper: f64,
        hedge_ratio: f64,
    ) -> Result<Self, EstimateError> {
        if !hedge_ratio.is_finite() {
            return Err(EstimateError::non_finite(instrument, "hedge ratio"));
        }
        let mut interval = Self::new(instrument, lower, upper)?;
        interval.hedge_ratio = Some(hedge_ratio);
        Ok(interval)
    }

    pub fn mid(&self) -> f64 {
        (self.lower + self.upper) / 2.0
    }
}

/// Rolling `μ ± k·σ` over the last `lookback` fair prices.
pub fn std_band(
    instrument: &InstrumentId,
    fair_prices: &[f64],
    lookback: usize,
    band_width: f64,
) -> Result<FairInterval, EstimateError> {
    let window = tail(fair_prices, lookback);
    let stats = WindowStats::compute(window)
        .ok_or_else(|| EstimateError::data_gap(instrument, 2, window.len()))?;
    let (lower, upper) = stats.band(band_width);
    FairInterval::new(instrument, lower, upper)
}

/// `EMA ± k·ATR`, ATR being the mean of the last `lookback` true ranges.
pub fn atr_band(
    instrument: &InstrumentId,
    history: &InstrumentHistory,
    lookback: usize,
    band_width: f64,
) -> Result<FairInterval, EstimateError> {
    let ema = history
        .emas()
        .last()
        .copied()
        .ok_or_else(|| EstimateError::data_gap(instrument, lookback, history.len()))?;
    let ranges = tail(history.true_ranges(), lookback);
    if ranges.len() < lookback {
        return Err(EstimateError::data_gap(instrument, lookback, ranges.len()));
    }
    let atr = mean(ranges).ok_or_else(|| EstimateError::data_gap(instrument, lookback, 0))?;
    FairInterval::new(instrument, ema - band_width * atr, ema + band_width * atr)
}

/// Fair-value interval for a single instrument, per its band model.
pub fn estimate(
    cfg: &InstrumentConfig,
    history: &InstrumentHistory,
) -> Result<FairInterval, EstimateError> {
    match cfg.band {
        BandModel::StdDev => std_band(&cfg.id, history.fair_prices(), cfg.lookback, cfg.band_width),
        BandModel::Atr => atr_band(&cfg.id, history, cfg.lookback, cfg.band_width),
    }
}

/// Directional decision of a trend classifier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TrendSignal {
    Buy,
    Sell,
    #[default]
    None,
}

impl TrendSignal {
    /// BUY for positive, SELL for negative, NONE for zero or NaN.
    pub fn from_sign(x: f64) -> Self {
        if x > 0.0 {
            TrendSignal::Buy
        } else if x < 0.0 {
            TrendSignal::Sell
        } else {
            TrendSignal::None
        }
    }
}

/// Classifies an instrument's fair-price history into a trade direction.
///
/// Implementations may keep state between calls (MACD keeps its last
/// crossover), so one instance serves exactly one instrument.
pub trait TrendClassifier: Send + Sync + std::fmt::Debug {
    fn classify(&mut self, prices: &[f64]) -> TrendSignal;

    /// History length below which `classify` always returns NONE.
    fn min_history(&self) -> usize;

    fn name(&self) -> &'static str;

    fn is_warm(&self, history_len: usize) -> bool {
        history_len >= self.min_history()
    }
}

/// Build the classifier described by `config`.
pub fn classifier_for(config: TrendConfig) -> Box<dyn TrendClassifier> {
    match config {
        TrendConfig::Momentum { rate, num_slopes } => Box::new(MomentumSlope::new(rate, num_slopes)),
        TrendConfig::Macd {
            span1,
            span2,
            signal_span,
        } => Box::new(MacdCrossover::new(span1, span2, signal_span)),
    }
}
