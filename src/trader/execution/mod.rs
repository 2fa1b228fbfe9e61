//! Order construction against a book snapshot.

mod liquidity;

pub use liquidity::*;
