//! Order book types.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One instrument's resting liquidity for a single tick.
///
/// Keys are integer price ticks. Sell sizes may arrive negative (host
/// convention) or positive; only the magnitude is used. Zero-size levels are
/// treated as absent.
#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq)]
pub struct OrderDepth {
    #[serde(default)]
    pub sell_orders: BTreeMap<i64, i64>,
    #[serde(default)]
    pub buy_orders: BTreeMap<i64, i64>,
}

/// A single resting price level as seen by the liquidity taker.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BookLevel {
    pub price: i64,
    /// Resting quantity (always positive)
    pub quantity: i64,
}

impl OrderDepth {
    /// Create a book from `(price, size)` pairs for each side.
    pub fn new(sells: &[(i64, i64)], buys: &[(i64, i64)]) -> Self {
        Self {
            sell_orders: sells.iter().copied().collect(),
            buy_orders: buys.iter().copied().collect(),
        }
    }

    /// True when neither side has any non-zero level.
    pub fn is_empty(&self) -> bool {
        self.levels().next().is_none()
    }

    /// Ask levels strictly below `bound`, cheapest first.
    pub fn asks_below(&self, bound: f64) -> Vec<BookLevel> {
        let mut asks: Vec<BookLevel> = self
            .sell_orders
            .iter()
            .filter(|(price, size)| (**price as f64) < bound && **size != 0)
            .map(|(price, size)| BookLevel {
                price: *price,
                quantity: size.saturating_abs(),
            })
            .collect();
        asks.sort_by_key(|level| level.price);
        asks
    }

    /// Bid levels strictly above `bound`, richest first.
    pub fn bids_above(&self, bound: f64) -> Vec<BookLevel> {
        let mut bids: Vec<BookLevel> = self
            .buy_orders
            .iter()
            .filter(|(price, size)| (**price as f64) > bound && **size != 0)
            .map(|(price, size)| BookLevel {
                price: *price,
                quantity: size.saturating_abs(),
            })
            .collect();
        bids.sort_by_key(|level| std::cmp::Reverse(level.price));
        bids
    }

    /// Volume-weighted median over every resting level on both sides.
    ///
    /// Equivalent to expanding each level into `|size|` copies of its price
    /// and taking the median of the result (mean of the two middle elements
    /// for an even count). Returns `None` for an empty book, or when a size
    /// or the total volume does not fit in an `i64`.
    pub fn fair_price(&self) -> Option<f64> {
        let mut levels = self
            .sizes()
            .map(|(price, size)| {
                size.checked_abs()
                    .map(|quantity| BookLevel { price, quantity })
            })
            .collect::<Option<Vec<BookLevel>>>()?;
        let total = levels
            .iter()
            .try_fold(0i64, |acc, level| acc.checked_add(level.quantity))?;
        if total == 0 {
            return None;
        }
        levels.sort_by_key(|level| level.price);

        let upper_idx = total / 2;
        if total % 2 == 1 {
            Some(nth_price(&levels, upper_idx) as f64)
        } else {
            let lo = nth_price(&levels, upper_idx - 1) as f64;
            let hi = nth_price(&levels, upper_idx) as f64;
            Some((lo + hi) / 2.0)
        }
    }

    /// `(high, low)` over every resting price on both sides.
    pub fn price_range(&self) -> Option<(i64, i64)> {
        let mut prices = self.levels().map(|l| l.price);
        let first = prices.next()?;
        Some(prices.fold((first, first), |(hi, lo), p| (hi.max(p), lo.min(p))))
    }

    /// True range against the previous fair price.
    ///
    /// `max(high - low, |high - prev|, |low - prev|)`; without a previous
    /// fair price it is simply `high - low`.
    pub fn true_range(&self, prev_fair: Option<f64>) -> Option<f64> {
        let (high, low) = self.price_range()?;
        let (high, low) = (high as f64, low as f64);
        let range = high - low;
        Some(match prev_fair {
            Some(prev) => range.max((high - prev).abs()).max((low - prev).abs()),
            None => range,
        })
    }

    fn sizes(&self) -> impl Iterator<Item = (i64, i64)> + '_ {
        self.sell_orders
            .iter()
            .chain(self.buy_orders.iter())
            .filter(|(_, size)| **size != 0)
            .map(|(price, size)| (*price, *size))
    }

    /// Non-zero levels with magnitudes clamped to `i64::MAX`.
    fn levels(&self) -> impl Iterator<Item = BookLevel> + '_ {
        self.sizes().map(|(price, size)| BookLevel {
            price,
            quantity: size.saturating_abs(),
        })
    }
}

/// Price of the `n`-th (0-based) element of the expanded multiset.
///
/// The caller guarantees the quantities sum without overflow.
fn nth_price(sorted: &[BookLevel], n: i64) -> i64 {
    let mut seen = 0i64;
    for level in sorted {
        seen += level.quantity;
        if n < seen {
            return level.price;
        }
    }
    // n < total is guaranteed by the caller
    sorted.last().map(|l| l.price).unwrap_or_default()
}
