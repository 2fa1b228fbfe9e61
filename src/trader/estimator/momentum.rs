//! Momentum-slope crossover classifier.
//!
//! Works on lag-`rate` price displacements `p[t] - p[t - rate]`. A signal
//! fires only on the tick where the two most recent displacements point in
//! opposite directions; its side is the sign of the mean of the last
//! `num_slopes` displacements.

use super::{TrendClassifier, TrendSignal};

#[derive(Debug, Clone)]
pub struct MomentumSlope {
    rate: usize,
    num_slopes: usize,
}

impl MomentumSlope {
    pub fn new(rate: usize, num_slopes: usize) -> Self {
        Self {
            rate: rate.max(1),
            num_slopes: num_slopes.max(1),
        }
    }

    /// Displacement ending `back` ticks before the latest one.
    fn displacement(&self, prices: &[f64], back: usize) -> f64 {
        let end = prices.len() - 1 - back;
        prices[end] - prices[end - self.rate]
    }
}

impl TrendClassifier for MomentumSlope {
    fn classify(&mut self, prices: &[f64]) -> TrendSignal {
        if prices.len() < self.min_history() {
            return TrendSignal::None;
        }

        let latest = self.displacement(prices, 0);
        let previous = self.displacement(prices, 1);
        let flipped = (latest + previous).abs() < latest.abs() + previous.abs();
        if !flipped {
            return TrendSignal::None;
        }

        let mean = (0..self.num_slopes)
            .map(|back| self.displacement(prices, back))
            .sum::<f64>()
            / self.num_slopes as f64;
        TrendSignal::from_sign(mean)
    }

    fn min_history(&self) -> usize {
        self.rate + self.num_slopes.max(3)
    }

    fn name(&self) -> &'static str {
        "momentum"
    }
}
