//! Trend classifier configuration.

use serde::{Deserialize, Serialize};

/// Parameters of the trend classifier attached to a trending instrument.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TrendConfig {
    /// Momentum-slope crossover
    Momentum {
        /// Lag (in ticks) of each displacement
        #[serde(default = "default_rate")]
        rate: usize,
        /// Number of displacements averaged for the direction
        #[serde(default = "default_num_slopes")]
        num_slopes: usize,
    },
    /// Moving-average convergence/divergence crossover
    Macd {
        /// Fast EMA span
        #[serde(default = "default_span1")]
        span1: usize,
        /// Slow EMA span
        #[serde(default = "default_span2")]
        span2: usize,
        /// Signal line EMA span
        #[serde(default = "default_signal_span")]
        signal_span: usize,
    },
}

fn default_rate() -> usize {
    5
}

fn default_num_slopes() -> usize {
    3
}

fn default_span1() -> usize {
    12
}

fn default_span2() -> usize {
    26
}

fn default_signal_span() -> usize {
    9
}

impl TrendConfig {
    /// Momentum classifier with default lag and sample count.
    pub fn momentum() -> Self {
        TrendConfig::Momentum {
            rate: default_rate(),
            num_slopes: default_num_slopes(),
        }
    }

    /// MACD classifier with the classic 12/26/9 spans.
    pub fn macd() -> Self {
        TrendConfig::Macd {
            span1: default_span1(),
            span2: default_span2(),
            signal_span: default_signal_span(),
        }
    }

    pub(crate) fn validate(&self) -> Result<(), String> {
        match *self {
            TrendConfig::Momentum { rate, num_slopes } => {
                if rate == 0 {
                    return Err("momentum rate must be > 0".to_string());
                }
                if num_slopes == 0 {
                    return Err("momentum num_slopes must be > 0".to_string());
                }
            }
            TrendConfig::Macd {
                span1,
                span2,
                signal_span,
            } => {
                if span1 == 0 || span2 == 0 || signal_span == 0 {
                    return Err(format!(
                        "MACD spans must be > 0, got {span1}/{span2}/{signal_span}"
                    ));
                }
                if span1 >= span2 {
                    return Err(format!(
                        "MACD span1 must be shorter than span2, got {span1} >= {span2}"
                    ));
                }
            }
        }
        Ok(())
    }
}

impl Default for TrendConfig {
    fn default() -> Self {
        Self::macd()
    }
}
