//! Append-only per-instrument history.
//!
//! Every tick each configured instrument gains exactly one fair-price and one
//! true-range observation (or none at all when its data is missing that
//! tick). Series are never truncated; estimators window them at read time.
//! Pair groups additionally own a spread series, appended by the pair
//! estimator once per tick.

use std::collections::HashMap;

use tracing::{debug, trace};

use super::config::{BandModel, InstrumentConfig, Regime, TraderConfig};
use super::estimator::ema::span_alpha;
use super::estimator::rolling::mean;
use crate::errors::EstimateError;
use crate::types::{InstrumentId, TradingState};

/// Time series recorded for one instrument.
#[derive(Debug, Clone, Default)]
pub struct InstrumentHistory {
    fair_prices: Vec<f64>,
    true_ranges: Vec<f64>,
    /// Only populated for ATR-banded instruments, starting once
    /// `lookback` fair prices exist
    emas: Vec<f64>,
}

impl InstrumentHistory {
    pub fn fair_prices(&self) -> &[f64] {
        &self.fair_prices
    }

    pub fn true_ranges(&self) -> &[f64] {
        &self.true_ranges
    }

    pub fn emas(&self) -> &[f64] {
        &self.emas
    }

    pub fn len(&self) -> usize {
        self.fair_prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fair_prices.is_empty()
    }

    pub fn last_fair(&self) -> Option<f64> {
        self.fair_prices.last().copied()
    }

    fn push(&mut self, fair: f64, true_range: f64) {
        self.fair_prices.push(fair);
        self.true_ranges.push(true_range);
    }

    /// Advance the EMA after a fresh fair price.
    ///
    /// Seeded with the mean of the first `lookback` fair prices, then
    /// smoothed with `k = 2 / (T + 1)` where `T` is the cross-instrument
    /// minimum series length at this tick.
    fn advance_ema(&mut self, lookback: usize, min_series_len: usize) {
        if self.fair_prices.len() < lookback {
            return;
        }
        let next = match self.emas.last() {
            None => match mean(&self.fair_prices[..lookback]) {
                Some(seed) => seed,
                None => return,
            },
            Some(prev) => {
                let k = span_alpha(min_series_len.max(1) as f64);
                let price = self.fair_prices[self.fair_prices.len() - 1];
                k * price + (1.0 - k) * prev
            }
        };
        self.emas.push(next);
    }
}

/// History for every configured instrument and pair group.
#[derive(Debug, Clone)]
pub struct HistoryStore {
    instruments: HashMap<InstrumentId, InstrumentHistory>,
    /// Spread series, indexed like `TraderConfig::pairs`
    spreads: Vec<Vec<f64>>,
    min_series_len: usize,
}

impl HistoryStore {
    /// Empty history for every instrument and pair group in `config`.
    pub fn new(config: &TraderConfig) -> Self {
        Self {
            instruments: config
                .instruments
                .iter()
                .map(|c| (c.id.clone(), InstrumentHistory::default()))
                .collect(),
            spreads: vec![Vec::new(); config.pairs.len()],
            min_series_len: 0,
        }
    }

    /// Record one tick for every configured instrument.
    ///
    /// Failures are per instrument: the instrument's series simply does not
    /// grow this tick. The failures are returned so the caller can skip the
    /// affected instruments. The cross-instrument minimum length is
    /// recomputed afterwards, and ATR-banded instruments advance their EMA
    /// using that fresh minimum.
    pub fn record_tick(
        &mut self,
        instruments: &[InstrumentConfig],
        state: &TradingState,
    ) -> Vec<EstimateError> {
        let mut gaps = Vec::new();
        let mut recorded = Vec::with_capacity(instruments.len());
        for cfg in instruments {
            match self.record(cfg, state) {
                Ok(()) => recorded.push(cfg),
                Err(e) => {
                    debug!(instrument = %cfg.id, error = %e, "history not updated");
                    gaps.push(e);
                }
            }
        }

        self.min_series_len = self
            .instruments
            .values()
            .map(InstrumentHistory::len)
            .min()
            .unwrap_or(0);

        for cfg in recorded {
            if cfg.band == BandModel::Atr && cfg.regime != Regime::ObservationOnly {
                if let Some(hist) = self.instruments.get_mut(&cfg.id) {
                    hist.advance_ema(cfg.lookback, self.min_series_len);
                }
            }
        }

        trace!(
            timestamp = state.timestamp,
            min_series_len = self.min_series_len,
            gaps = gaps.len(),
            "history recorded"
        );
        gaps
    }

    /// Append one observation for a single instrument.
    pub fn record(
        &mut self,
        cfg: &InstrumentConfig,
        state: &TradingState,
    ) -> Result<(), EstimateError> {
        let hist = self
            .instruments
            .entry(cfg.id.clone())
            .or_default();

        if cfg.regime == Regime::ObservationOnly {
            let value = state
                .observations
                .get(&cfg.id)
                .copied()
                .filter(|v| v.is_finite())
                .ok_or_else(|| EstimateError::data_gap(&cfg.id, 1, 0))?;
            hist.push(value, 0.0);
            return Ok(());
        }

        let depth = state
            .order_depths
            .get(&cfg.id)
            .ok_or_else(|| EstimateError::data_gap(&cfg.id, 1, 0))?;
        if depth.is_empty() {
            return Err(EstimateError::EmptyBook {
                instrument: cfg.id.clone(),
            });
        }
        let fair = depth
            .fair_price()
            .ok_or_else(|| EstimateError::data_gap(&cfg.id, 1, 0))?;
        let true_range = depth
            .true_range(hist.last_fair())
            .ok_or_else(|| EstimateError::data_gap(&cfg.id, 1, 0))?;
        hist.push(fair, true_range);
        Ok(())
    }

    pub fn instrument(&self, id: &InstrumentId) -> Option<&InstrumentHistory> {
        self.instruments.get(id)
    }

    /// Fair-price series (empty for unknown instruments).
    pub fn fair_prices(&self, id: &InstrumentId) -> &[f64] {
        self.instruments
            .get(id)
            .map(InstrumentHistory::fair_prices)
            .unwrap_or(&[])
    }

    pub fn last_fair(&self, id: &InstrumentId) -> Option<f64> {
        self.instruments.get(id).and_then(InstrumentHistory::last_fair)
    }

    /// Spread series of pair group `group`.
    pub fn spreads(&self, group: usize) -> &[f64] {
        self.spreads.get(group).map(Vec::as_slice).unwrap_or(&[])
    }

    pub(crate) fn push_spread(&mut self, group: usize, spread: f64) {
        if let Some(series) = self.spreads.get_mut(group) {
            series.push(spread);
        }
    }

    /// Shortest fair-price series across all instruments after the last tick.
    pub fn min_series_len(&self) -> usize {
        self.min_series_len
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::OrderDepth;

    fn config() -> TraderConfig {
        TraderConfig::new(
            vec![
                InstrumentConfig::new("PEARLS", 20, Regime::MeanReverting),
                InstrumentConfig::new("BANANAS", 20, Regime::MeanReverting)
                    .with_lookback(3)
                    .with_band(BandModel::Atr),
                InstrumentConfig::new("DOLPHIN_SIGHTINGS", 0, Regime::ObservationOnly),
            ],
            vec![],
        )
    }

    fn tick(ts: i64, pearls: i64, bananas: i64, dolphins: f64) -> TradingState {
        TradingState::new(ts)
            .with_book("PEARLS", OrderDepth::new(&[(pearls + 1, -2)], &[(pearls - 1, 2)]))
            .with_book("BANANAS", OrderDepth::new(&[(bananas + 1, -1)], &[(bananas - 1, 1)]))
            .with_observation("DOLPHIN_SIGHTINGS", dolphins)
    }

    #[test]
    fn test_record_tick_grows_every_series_by_one() {
        let cfg = config();
        let mut store = HistoryStore::new(&cfg);
        let state = tick(0, 10_000, 5_000, 3_000.0);

        let gaps = store.record_tick(&cfg.instruments, &state);
        assert!(gaps.is_empty());
        for c in &cfg.instruments {
            let hist = store.instrument(&c.id).unwrap();
            assert_eq!(hist.fair_prices().len(), 1);
            assert_eq!(hist.true_ranges().len(), 1);
        }
        assert_eq!(store.fair_prices(&InstrumentId::from("PEARLS")), &[10_000.0]);
        assert_eq!(
            store.fair_prices(&InstrumentId::from("DOLPHIN_SIGHTINGS")),
            &[3_000.0]
        );
        assert_eq!(store.min_series_len(), 1);
    }

    #[test]
    fn test_missing_book_is_data_gap_and_others_still_record() {
        let cfg = config();
        let mut store = HistoryStore::new(&cfg);
        let mut state = tick(0, 10_000, 5_000, 3_000.0);
        state.order_depths.remove("BANANAS");

        let gaps = store.record_tick(&cfg.instruments, &state);
        assert_eq!(gaps.len(), 1);
        assert!(matches!(gaps[0], EstimateError::DataGap { .. }));
        assert_eq!(store.instrument(&InstrumentId::from("PEARLS")).unwrap().len(), 1);
        assert_eq!(store.instrument(&InstrumentId::from("BANANAS")).unwrap().len(), 0);
        assert_eq!(store.min_series_len(), 0);
    }

    #[test]
    fn test_empty_book_skips_instrument() {
        let cfg = config();
        let mut store = HistoryStore::new(&cfg);
        let state = tick(0, 10_000, 5_000, 3_000.0)
            .with_book("PEARLS", OrderDepth::new(&[(10_001, 0)], &[]));
        let gaps = store.record_tick(&cfg.instruments, &state);
        assert_eq!(gaps.len(), 1);
        assert!(matches!(&gaps[0], EstimateError::EmptyBook { .. }));
        assert_eq!(gaps[0].instrument().as_str(), "PEARLS");
        assert!(store.fair_prices(&InstrumentId::from("PEARLS")).is_empty());
    }

    #[test]
    fn test_unrepresentable_book_is_data_gap() {
        let cfg = config();
        let mut store = HistoryStore::new(&cfg);
        let state = tick(0, 10_000, 5_000, 3_000.0)
            .with_book("PEARLS", OrderDepth::new(&[(10_001, i64::MIN)], &[(9_999, 5)]));
        let gaps = store.record_tick(&cfg.instruments, &state);
        assert_eq!(gaps.len(), 1);
        assert!(matches!(&gaps[0], EstimateError::DataGap { .. }));
        assert_eq!(gaps[0].instrument().as_str(), "PEARLS");
    }

    #[test]
    fn test_min_series_len_non_decreasing() {
        let cfg = config();
        let mut store = HistoryStore::new(&cfg);
        let mut last = 0;
        for ts in 0..10 {
            let mut state = tick(ts, 10_000, 5_000 + ts, 3_000.0);
            if ts % 3 == 0 {
                state.observations.clear();
            }
            store.record_tick(&cfg.instruments, &state);
            assert!(store.min_series_len() >= last);
            last = store.min_series_len();
        }
        // dolphins missed ticks 0, 3, 6, 9
        assert_eq!(store.min_series_len(), 6);
    }

    #[test]
    fn test_true_range_uses_previous_fair() {
        let cfg = config();
        let mut store = HistoryStore::new(&cfg);
        store.record_tick(&cfg.instruments, &tick(0, 10_000, 5_000, 1.0));
        store.record_tick(&cfg.instruments, &tick(1, 10_010, 5_000, 1.0));
        let hist = store.instrument(&InstrumentId::from("PEARLS")).unwrap();
        // book 10009..10011, previous fair 10000
        assert_eq!(hist.true_ranges(), &[2.0, 11.0]);
    }

    #[test]
    fn test_ema_seeded_then_smoothed() {
        let cfg = config();
        let mut store = HistoryStore::new(&cfg);
        let bananas = InstrumentId::from("BANANAS");

        for (ts, px) in [5_000, 5_003, 5_006].into_iter().enumerate() {
            store.record_tick(&cfg.instruments, &tick(ts as i64, 10_000, px, 1.0));
        }
        // seeded with the mean of the first three fair prices
        assert_eq!(store.instrument(&bananas).unwrap().emas(), &[5_003.0]);

        store.record_tick(&cfg.instruments, &tick(3, 10_000, 5_011, 1.0));
        // T = 4, k = 2/5
        let expected = 0.4 * 5_011.0 + 0.6 * 5_003.0;
        let emas = store.instrument(&bananas).unwrap().emas();
        assert_eq!(emas.len(), 2);
        assert!((emas[1] - expected).abs() < 1e-9);

        // non-ATR instruments never get an EMA
        assert!(store
            .instrument(&InstrumentId::from("PEARLS"))
            .unwrap()
            .emas()
            .is_empty());
    }
}
