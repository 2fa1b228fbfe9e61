//! Types shared with the host: instrument ids, order books, snapshots, orders.

mod book;
mod common;
mod orders;
mod state;

pub use book::*;
pub use common::*;
pub use orders::*;
pub use state::*;
