//! TWAP Gateway
//!
//! Venue adapters behind the `twap-ports` traits. Provides:
//! - A paper venue that fills slices at configured mid prices against an
//!   in-memory balance book
//!
//! ## Architecture
//!
//! ```text
//!   TwapSession
//!        │ place_slice(SliceOrder)
//!   ┌────▼──────────┐
//!   │ OrderExecutor │  BalanceSource ◄── SessionRegistry (sizing)
//!   └────┬──────────┘
//!        │
//!   ┌────▼────┐
//!   │  Paper  │  prices: BTC-USDT → 65000, ...
//!   │  venue  │  balances: USDT → 10000, ...
//!   └─────────┘
//! ```
//!
//! Live venues plug in the same way: implement both ports and hand the
//! adapter to the registry.

pub mod adapters;

pub use adapters::paper::{PaperConfig, PaperExecutor};
