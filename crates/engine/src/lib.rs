//! TWAP Engine
//!
//! Runs TWAP executions, one independent task per session:
//!
//! - **Session**: the `Pending → Running → {Completed, Cancelled, Error}` state
//!   machine that waits on the slice clock, calls the order executor and
//!   emits progress events
//! - **Registry**: owner-keyed table of live sessions, the single
//!   synchronization point guaranteeing at most one active session per owner
//!
//! ## Architecture
//!
//! ```text
//!  StartCommand ──► SessionRegistry::create ──spawn──► TwapSession::run
//!                        │                              │      │
//!  CancelCommand ──► SessionRegistry::cancel ──────►  SliceClock  OrderExecutor
//!                        ▲                              │
//!                        └──────── on_terminal ◄────────┘
//!                                                       │
//!                              ProgressEvent (mpsc) ◄───┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use twap_engine::{SessionConfig, SessionRegistry};
//!
//! let registry = SessionRegistry::new(executor, balances, SessionConfig::default());
//! let (tx, mut rx) = tokio::sync::mpsc::channel(64);
//!
//! registry.create(owner, &start_command, tx).await?;
//! while let Some(event) = rx.recv().await {
//!     println!("{}", event.to_json()?);
//! }
//! ```

pub mod error;
pub mod registry;
pub mod session;

pub use error::{RegistryError, RegistryResult};
pub use registry::SessionRegistry;
pub use session::{SessionConfig, SessionHandle, TwapSession};
