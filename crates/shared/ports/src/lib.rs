//! TWAP Ports
//!
//! Port definitions (traits) for the TWAP execution service.
//! These define the boundary between the session scheduler and whatever
//! actually places orders and holds balances.

mod balance;
mod error;
mod executor;

pub use balance::BalanceSource;
pub use error::{ExecutorError, ExecutorResult};
pub use executor::{FillObserver, OrderExecutor, PartialFill, SliceFill, SliceOrder};
