//! Venue adapters
//!
//! Each adapter implements `OrderExecutor` and `BalanceSource` for one venue.

pub mod paper;
