//! Pair hedge-ratio regression and spread band.
//!
//! Convention: leg A is the price leg, leg B the hedge leg.
//! `hedge_ratio = corr(A, B) * σ_A / σ_B` (the OLS slope of A on B) and
//! `spread = A - hedge_ratio * B`.

use tracing::debug;

use super::rolling::{correlation, sample_std, tail, WindowStats};
use super::FairInterval;
use crate::errors::EstimateError;
use crate::trader::config::PairConfig;
use crate::trader::history::HistoryStore;

/// Result of one pair estimation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PairEstimate {
    /// Spread band; carries the hedge ratio
    pub interval: FairInterval,
    /// Spread value appended this tick
    pub spread: f64,
}

impl PairEstimate {
    pub fn hedge_ratio(&self) -> f64 {
        self.interval.hedge_ratio.unwrap_or(0.0)
    }
}

/// `corr(a, b) * std(a) / std(b)` over equal-length windows.
///
/// `None` below two points; NaN or infinite when either leg is flat.
pub fn hedge_ratio(a: &[f64], b: &[f64]) -> Option<f64> {
    let corr = correlation(a, b)?;
    Some(corr * sample_std(a)? / sample_std(b)?)
}

/// Estimate the spread band for pair group `group`.
///
/// Appends the current spread to the group's series when a finite hedge
/// ratio exists, so it must run exactly once per group per tick.
pub fn estimate_pair(
    group: usize,
    pair: &PairConfig,
    store: &mut HistoryStore,
) -> Result<PairEstimate, EstimateError> {
    let a_all = store.fair_prices(&pair.leg_a);
    let b_all = store.fair_prices(&pair.leg_b);
    let n = a_all.len().min(b_all.len()).min(pair.lookback);
    if n < 2 {
        return Err(EstimateError::data_gap(&pair.leg_a, 2, n));
    }
    let a = tail(a_all, n);
    let b = tail(b_all, n);

    let hedge = hedge_ratio(a, b)
        .filter(|h| h.is_finite())
        .ok_or_else(|| EstimateError::non_finite(&pair.leg_a, "hedge ratio"))?;
    let spread = a[n - 1] - hedge * b[n - 1];
    store.push_spread(group, spread);

    let spreads = tail(store.spreads(group), pair.lookback);
    let stats = WindowStats::compute(spreads)
        .ok_or_else(|| EstimateError::data_gap(&pair.leg_a, 2, spreads.len()))?;
    let (lower, upper) = stats.band(pair.band_width);
    let interval = FairInterval::with_hedge(&pair.leg_a, lower, upper, hedge)?;

    debug!(
        pair = %pair.label(),
        hedge_ratio = hedge,
        spread,
        lower,
        upper,
        "pair estimated"
    );
    Ok(PairEstimate { interval, spread })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trader::config::{InstrumentConfig, Regime, TraderConfig};
    use crate::types::{OrderDepth, TradingState};

    fn config() -> TraderConfig {
        TraderConfig::new(
            vec![
                InstrumentConfig::new("A", 100, Regime::PairLeg),
                InstrumentConfig::new("B", 100, Regime::PairLeg),
            ],
            vec![PairConfig::new("A", "B").with_lookback(10)],
        )
    }

    fn book_at(price: i64) -> OrderDepth {
        OrderDepth::new(&[(price, -1)], &[(price, 1)])
    }

    fn record(store: &mut HistoryStore, cfg: &TraderConfig, a: i64, b: i64) {
        let state = TradingState::new(0)
            .with_book("A", book_at(a))
            .with_book("B", book_at(b));
        store.record_tick(&cfg.instruments, &state);
    }

    #[test]
    fn test_hedge_ratio_perfect_correlation() {
        let b = [10.0, 12.0, 11.0, 15.0, 13.0];
        let a: Vec<f64> = b.iter().map(|x| 2.0 * x + 7.0).collect();
        assert!((hedge_ratio(&a, &b).unwrap() - 2.0).abs() < 1e-12);

        let inverse: Vec<f64> = b.iter().map(|x| -2.0 * x).collect();
        assert!((hedge_ratio(&inverse, &b).unwrap() + 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_hedge_ratio_flat_leg_is_non_finite() {
        let h = hedge_ratio(&[1.0, 2.0, 3.0], &[5.0, 5.0, 5.0]).unwrap();
        assert!(!h.is_finite());
    }

    #[test]
    fn test_needs_two_points() {
        let cfg = config();
        let mut store = HistoryStore::new(&cfg);
        record(&mut store, &cfg, 20, 10);
        let err = estimate_pair(0, &cfg.pairs[0], &mut store).unwrap_err();
        assert!(matches!(err, EstimateError::DataGap { needed: 2, available: 1, .. }));
        assert!(store.spreads(0).is_empty());
    }

    #[test]
    fn test_spread_appended_and_band_after_two_spreads() {
        let cfg = config();
        let mut store = HistoryStore::new(&cfg);
        record(&mut store, &cfg, 20, 10);
        record(&mut store, &cfg, 24, 12);

        // one spread only: hedge exists but the spread band needs two
        let err = estimate_pair(0, &cfg.pairs[0], &mut store).unwrap_err();
        assert!(matches!(err, EstimateError::DataGap { .. }));
        assert_eq!(store.spreads(0).len(), 1);
        assert!(store.spreads(0)[0].abs() < 1e-9);

        record(&mut store, &cfg, 23, 11);
        let est = estimate_pair(0, &cfg.pairs[0], &mut store).unwrap();
        assert_eq!(store.spreads(0).len(), 2);
        assert!((est.hedge_ratio() - 2.0).abs() < 1e-9);
        // A = 2B + 1 on the last tick
        assert!((est.spread - 1.0).abs() < 1e-9);
        assert!(est.interval.lower <= est.interval.upper);
    }

    #[test]
    fn test_flat_leg_skips_without_appending() {
        let cfg = config();
        let mut store = HistoryStore::new(&cfg);
        record(&mut store, &cfg, 20, 10);
        record(&mut store, &cfg, 24, 10);
        let err = estimate_pair(0, &cfg.pairs[0], &mut store).unwrap_err();
        assert!(matches!(err, EstimateError::NonFiniteEstimate { .. }));
        assert!(store.spreads(0).is_empty());
    }
}
