//! Infrastructure shared by the trader components.

mod logging;

pub use logging::{init_logging, LogConfig, LogFormat};
