//! Span-based exponential moving averages.
//!
//! `Ema` is the streaming form (one update per tick); `ema_series` rebuilds
//! the whole smoothed series from scratch, which is what the MACD classifier
//! does on every call.

/// Smoothing constant for a span: `2 / (span + 1)`.
#[inline]
pub fn span_alpha(span: f64) -> f64 {
    2.0 / (span + 1.0)
}

/// Streaming EMA. The first observation seeds the value.
#[derive(Debug, Clone)]
pub struct Ema {
    value: f64,
    alpha: f64,
    count: usize,
}

impl Ema {
    /// Create an uninitialized EMA for the given span.
    pub fn new(span: usize) -> Self {
        Self::with_alpha(span_alpha(span as f64))
    }

    fn with_alpha(alpha: f64) -> Self {
        Self {
            value: 0.0,
            alpha,
            count: 0,
        }
    }

    /// Update with a new observation
    pub fn update(&mut self, observation: f64) -> f64 {
        if self.count == 0 {
            self.value = observation;
        } else {
            self.value = self.alpha * observation + (1.0 - self.alpha) * self.value;
        }
        self.count += 1;
        self.value
    }

    #[inline]
    pub fn value(&self) -> Option<f64> {
        (self.count > 0).then_some(self.value)
    }
}

/// Full EMA series over `values`, one output per input.
pub fn ema_series(values: &[f64], span: usize) -> Vec<f64> {
    let mut ema = Ema::new(span);
    values.iter().map(|v| ema.update(*v)).collect()
}
