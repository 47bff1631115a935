//! Domain types for a screening run.

pub mod bar;
pub mod stock;

pub use bar::Bar;
pub use stock::{Benchmark, StockSnapshot, Surveillance, UNCLASSIFIED_SECTOR};
