//! MACD crossover classifier.
//!
//! Every call rebuilds the fast, slow and signal EMA series from the full
//! price history (O(history) per call). When the latest tick is a crossover
//! of `fast - slow` through the signal line the stored direction flips; the
//! stored direction is what `classify` returns, so a BUY persists until the
//! next downward crossover.

use tracing::debug;

use super::ema::ema_series;
use super::{TrendClassifier, TrendSignal};

#[derive(Debug, Clone)]
pub struct MacdCrossover {
    span1: usize,
    span2: usize,
    signal_span: usize,
    /// Direction of the most recent crossover seen
    position: TrendSignal,
}

impl MacdCrossover {
    pub fn new(span1: usize, span2: usize, signal_span: usize) -> Self {
        Self {
            span1,
            span2,
            signal_span,
            position: TrendSignal::None,
        }
    }

    /// Last crossover direction without recomputing.
    pub fn position(&self) -> TrendSignal {
        self.position
    }

    /// `fast - slow - signal` for the last two ticks.
    fn histogram_tail(&self, prices: &[f64]) -> Option<(f64, f64)> {
        let fast = ema_series(prices, self.span1);
        let slow = ema_series(prices, self.span2);
        let macd: Vec<f64> = fast.iter().zip(&slow).map(|(f, s)| f - s).collect();
        let signal = ema_series(&macd, self.signal_span);

        let n = macd.len();
        if n < 2 {
            return None;
        }
        Some((macd[n - 2] - signal[n - 2], macd[n - 1] - signal[n - 1]))
    }
}

impl TrendClassifier for MacdCrossover {
    fn classify(&mut self, prices: &[f64]) -> TrendSignal {
        if prices.len() < self.min_history() {
            return TrendSignal::None;
        }
        let Some((prev, curr)) = self.histogram_tail(prices) else {
            return self.position;
        };

        let crossed = if prev <= 0.0 && curr > 0.0 {
            Some(TrendSignal::Buy)
        } else if prev >= 0.0 && curr < 0.0 {
            Some(TrendSignal::Sell)
        } else {
            None
        };
        if let Some(direction) = crossed {
            if direction != self.position {
                debug!(?direction, histogram = curr, "MACD crossover");
            }
            self.position = direction;
        }
        self.position
    }

    fn min_history(&self) -> usize {
        self.span2 + self.signal_span
    }

    fn name(&self) -> &'static str {
        "macd"
    }
}
