//! Trending regime: the classifier gates which side may take liquidity.
//!
//! While the classifier lacks history the instrument trades like a
//! mean-reverting one without resting quotes. Once warm, BUY takes asks below
//! the upper bound, SELL hits bids above the lower bound and NONE stays out.
//! Trending orders never post a residual.

use tracing::debug;

use super::TickContext;
use crate::errors::EstimateError;
use crate::trader::config::InstrumentConfig;
use crate::trader::estimator::{estimate, TrendClassifier, TrendSignal};
use crate::trader::execution::LiquidityTaker;
use crate::trader::history::InstrumentHistory;
use crate::types::Order;

pub fn trending_orders(
    cfg: &InstrumentConfig,
    history: &InstrumentHistory,
    classifier: &mut dyn TrendClassifier,
    ctx: &TickContext<'_>,
) -> Result<Vec<Order>, EstimateError> {
    // classify before estimating so stateful classifiers see every tick
    let prices = history.fair_prices();
    let warm = classifier.is_warm(prices.len());
    let signal = classifier.classify(prices);

    let interval = estimate(cfg, history)?;
    let book = ctx.book(&cfg.id);
    let taker = LiquidityTaker::from_ledger(&cfg.id, cfg.limit, &ctx.ledger);

    if !warm {
        let mut orders = taker.buy(book, interval.lower, None, false).orders;
        orders.extend(taker.sell(book, interval.upper, None, false).orders);
        return Ok(orders);
    }

    debug!(instrument = %cfg.id, classifier = classifier.name(), ?signal, "trend signal");
    let orders = match signal {
        TrendSignal::Buy => taker.buy(book, interval.upper, None, false).orders,
        TrendSignal::Sell => taker.sell(book, interval.lower, None, false).orders,
        TrendSignal::None => Vec::new(),
    };
    Ok(orders)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trader::config::{Regime, TraderConfig, TrendConfig};
    use crate::trader::estimator::{classifier_for, MomentumSlope};
    use crate::trader::history::HistoryStore;
    use crate::types::{InstrumentId, OrderDepth, TradingState};

    fn store_with(prices: &[i64], cfg: &TraderConfig) -> HistoryStore {
        let mut store = HistoryStore::new(cfg);
        for &px in prices {
            let state = TradingState::new(0)
                .with_book("BANANAS", OrderDepth::new(&[(px, -1)], &[(px, 1)]));
            store.record_tick(&cfg.instruments, &state);
        }
        store
    }

    fn config() -> TraderConfig {
        TraderConfig::new(
            vec![InstrumentConfig::new("BANANAS", 20, Regime::Trending)
                .with_lookback(10)
                .with_trend(TrendConfig::Momentum {
                    rate: 2,
                    num_slopes: 3,
                })],
            vec![],
        )
    }

    fn quantities(orders: &[Order]) -> Vec<(f64, i64)> {
        orders.iter().map(|o| (o.price, o.quantity)).collect()
    }

    #[test]
    fn test_warm_up_takes_without_posting() {
        let cfg = config();
        let store = store_with(&[10, 12, 11, 13], &cfg);
        let hist = store.instrument(&InstrumentId::from("BANANAS")).unwrap();
        let mut clf = classifier_for(cfg.instruments[0].trend_or_default());
        assert!(!clf.is_warm(hist.len()));

        // band = 11.5 +/- 2 * 1.29..; deep ask at 5 and rich bid at 20 cross
        let state = TradingState::new(4)
            .with_book("BANANAS", OrderDepth::new(&[(5, -2), (11, -3)], &[(20, 1), (12, 4)]));
        let ctx = TickContext::new(&state);
        let orders = trending_orders(&cfg.instruments[0], hist, clf.as_mut(), &ctx).unwrap();
        assert_eq!(quantities(&orders), vec![(5.0, 2), (20.0, -1)]);
    }

    #[test]
    fn test_sell_signal_only_sells() {
        let cfg = config();
        // displacements (latest first): +2, -2, -2 -> SELL
        let store = store_with(&[14, 13, 12, 11, 10, 13], &cfg);
        let hist = store.instrument(&InstrumentId::from("BANANAS")).unwrap();
        let mut clf = MomentumSlope::new(2, 3);

        let state = TradingState::new(6)
            .with_book("BANANAS", OrderDepth::new(&[(1, -5)], &[(30, 2), (29, 1)]));
        let ctx = TickContext::new(&state);
        let orders = trending_orders(&cfg.instruments[0], hist, &mut clf, &ctx).unwrap();
        assert_eq!(quantities(&orders), vec![(30.0, -2), (29.0, -1)]);
    }

    #[test]
    fn test_none_signal_stays_out() {
        let cfg = config();
        let store = store_with(&[10, 11, 12, 13, 14, 15], &cfg);
        let hist = store.instrument(&InstrumentId::from("BANANAS")).unwrap();
        let mut clf = MomentumSlope::new(2, 3);

        let state = TradingState::new(6)
            .with_book("BANANAS", OrderDepth::new(&[(1, -5)], &[(30, 2)]));
        let ctx = TickContext::new(&state);
        let orders = trending_orders(&cfg.instruments[0], hist, &mut clf, &ctx).unwrap();
        assert!(orders.is_empty());
    }
}
