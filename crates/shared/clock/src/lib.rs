//! TWAP Slice Clock
//!
//! Produces the dispatch schedule of one TWAP session:
//!
//! ```text
//! start(interval = 5s, count = 4)
//!
//!   t=0s      t=5s      t=10s     t=15s
//!    │         │         │         │
//!  tick 1    tick 2    tick 3    tick 4    Exhausted
//!                  ▲
//!                  └── cancel(): waiter wakes with Cancelled, no tick 3
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! use twap_clock::{SliceClock, TickOutcome};
//! use std::time::Duration;
//!
//! let (mut clock, canceller) = SliceClock::start(Duration::from_secs(5), 4);
//!
//! // Hand the canceller to whoever may stop the schedule
//! tokio::spawn(async move { canceller.cancel() });
//!
//! while let TickOutcome::Fire(tick) = clock.tick().await {
//!     println!("slice {} at {}", tick.index, tick.at);
//! }
//! ```

mod slice;

pub use slice::{ClockCanceller, SliceClock, Tick, TickOutcome};
