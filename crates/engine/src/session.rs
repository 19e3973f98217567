//! TWAP session: one timed, cancellable execution
//!
//! The session loop alternates between two suspension points, the slice
//! clock and the executor call, and never overlaps them. A cancel is seen
//! before the next tick and before the next dispatch; an executor call that
//! is already in flight runs to completion and its result is reported.
//! Partial fills the executor reports while a slice is in flight are relayed
//! as `partial_fill` events ahead of that slice's result.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use twap_clock::{ClockCanceller, SliceClock, TickOutcome};
use twap_core::{OwnerId, ProgressEvent, SessionId, SessionStatus, TwapParams};
use twap_ports::{FillObserver, OrderExecutor, PartialFill, SliceOrder};
use uuid::Uuid;

/// Session behaviour knobs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Emit a `slice_started` event before each executor call
    #[serde(default)]
    pub report_slice_start: bool,

    /// Decimal places kept in the per-slice size
    #[serde(default = "default_size_scale")]
    pub size_scale: u32,

    /// Upper bound on `slices` accepted from a StartCommand
    #[serde(default = "default_max_slices")]
    pub max_slices: u32,
}

fn default_size_scale() -> u32 {
    8
}

fn default_max_slices() -> u32 {
    1000
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            report_slice_start: false,
            size_scale: default_size_scale(),
            max_slices: default_max_slices(),
        }
    }
}

/// Observer and cancel switch for a running session
///
/// Cloning is cheap; every clone observes the same session.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    id: SessionId,
    params: Arc<TwapParams>,
    size_per_slice: Decimal,
    canceller: ClockCanceller,
    status_rx: watch::Receiver<SessionStatus>,
}

impl SessionHandle {
    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn params(&self) -> &TwapParams {
        &self.params
    }

    pub fn size_per_slice(&self) -> Decimal {
        self.size_per_slice
    }

    pub fn status(&self) -> SessionStatus {
        *self.status_rx.borrow()
    }

    /// Still occupying the owner's slot
    ///
    /// A session whose task has gone away without reaching a terminal
    /// status (e.g. it panicked) no longer counts as active.
    pub fn is_active(&self) -> bool {
        self.status().is_active() && self.status_rx.has_changed().is_ok()
    }

    /// Signal the session to stop
    ///
    /// Returns false when the session is already terminal and there is
    /// nothing to cancel.
    pub fn cancel(&self) -> bool {
        if !self.is_active() {
            return false;
        }
        self.canceller.cancel();
        true
    }

    /// Wait until the session reaches a terminal status
    pub async fn wait_terminal(&self) -> SessionStatus {
        let mut rx = self.status_rx.clone();
        let waited = rx
            .wait_for(|status| status.is_terminal())
            .await
            .map(|status| *status);
        match waited {
            Ok(status) => status,
            // Session task gone: whatever it last published is final
            Err(_) => *rx.borrow(),
        }
    }
}

/// Relays executor fill progress into the session loop
struct PartialForwarder(mpsc::UnboundedSender<PartialFill>);

impl FillObserver for PartialForwarder {
    fn on_partial_fill(&self, fill: PartialFill) {
        // Loop already moved on once the receiver is gone
        let _ = self.0.send(fill);
    }
}

/// One TWAP execution
///
/// Owns its mutable state exclusively: nothing outside [`TwapSession::run`]
/// changes `slice_index` or `status`. Outside parties observe through a
/// [`SessionHandle`].
pub struct TwapSession {
    id: SessionId,
    owner: OwnerId,
    params: Arc<TwapParams>,
    size_per_slice: Decimal,
    slice_index: u32,
    status_tx: watch::Sender<SessionStatus>,
    clock: SliceClock,
    executor: Arc<dyn OrderExecutor>,
    events: mpsc::Sender<ProgressEvent>,
    config: SessionConfig,
}

impl TwapSession {
    /// Create a pending session
    ///
    /// The slice clock is armed here, so this must be called from within a
    /// tokio runtime. A cancel delivered before [`run`](Self::run) starts is
    /// honoured as soon as the loop begins.
    pub fn new(
        owner: OwnerId,
        params: TwapParams,
        size_per_slice: Decimal,
        executor: Arc<dyn OrderExecutor>,
        events: mpsc::Sender<ProgressEvent>,
        config: SessionConfig,
    ) -> Self {
        let (clock, _) = SliceClock::start(params.interval, params.total_slices);
        let (status_tx, _) = watch::channel(SessionStatus::Pending);

        Self {
            id: Uuid::new_v4(),
            owner,
            params: Arc::new(params),
            size_per_slice,
            slice_index: 0,
            status_tx,
            clock,
            executor,
            events,
            config,
        }
    }

    pub fn handle(&self) -> SessionHandle {
        SessionHandle {
            id: self.id,
            params: Arc::clone(&self.params),
            size_per_slice: self.size_per_slice,
            canceller: self.clock.canceller(),
            status_rx: self.status_tx.subscribe(),
        }
    }

    /// Drive the session to a terminal status
    pub async fn run(mut self) -> SessionStatus {
        let total = self.params.total_slices;

        self.transition(SessionStatus::Running);
        log::info!(
            "[{}] TWAP started for {}: {} {}% in {} slices every {:?} over {:?}, {} per slice via {}",
            self.id,
            self.owner,
            self.params.instrument,
            self.params.percent,
            total,
            self.clock.period(),
            self.params.schedule_span(),
            self.size_per_slice,
            self.executor.name(),
        );
        self.emit(ProgressEvent::started()).await;

        let terminal = loop {
            let tick = match self.clock.tick().await {
                TickOutcome::Fire(tick) => tick,
                TickOutcome::Cancelled => break SessionStatus::Cancelled,
                // Every slice already succeeded
                TickOutcome::Exhausted => break SessionStatus::Completed,
            };
            let slice = tick.index;

            if self.config.report_slice_start {
                self.emit(ProgressEvent::slice_started(slice, total)).await;
                if self.clock.is_cancelled() {
                    break SessionStatus::Cancelled;
                }
            }

            let order = SliceOrder::new(
                self.id,
                self.params.instrument.as_str(),
                slice,
                total,
                self.size_per_slice,
            );
            log::debug!(
                "[{}] Dispatching slice {}/{} ({})",
                self.id,
                slice,
                total,
                order.client_order_id
            );
            let (partial_tx, mut partial_rx) = mpsc::unbounded_channel();
            let observer = PartialForwarder(partial_tx);
            let result = {
                let placement = self.executor.place_slice(&order, &observer);
                tokio::pin!(placement);
                loop {
                    tokio::select! {
                        biased;
                        Some(partial) = partial_rx.recv() => {
                            self.emit_partial(slice, partial).await;
                        }
                        result = &mut placement => break result,
                    }
                }
            };
            while let Ok(partial) = partial_rx.try_recv() {
                self.emit_partial(slice, partial).await;
            }
            self.slice_index = slice;

            match result {
                Ok(fill) => {
                    log::info!(
                        "[{}] Slice {}/{} filled: {} @ {} ({})",
                        self.id,
                        slice,
                        total,
                        fill.quantity,
                        fill.price,
                        fill.order_id
                    );
                    self.emit(ProgressEvent::slice_filled(
                        slice,
                        total,
                        fill.quantity,
                        fill.price,
                        fill.order_id,
                    ))
                    .await;

                    if slice == total {
                        break SessionStatus::Completed;
                    }
                }
                Err(e) => {
                    log::warn!("[{}] Slice {}/{} failed: {}", self.id, slice, total, e);
                    self.finish(SessionStatus::Error);
                    self.emit(ProgressEvent::slice_error(slice, total, e.to_string()))
                        .await;
                    return SessionStatus::Error;
                }
            }
        };

        // Status flips before the terminal event goes out, so an owner reacting
        // to that event already finds its slot free
        self.finish(terminal);
        match terminal {
            SessionStatus::Cancelled => {
                log::info!(
                    "[{}] TWAP cancelled after {}/{} slices, {} skipped",
                    self.id,
                    self.slice_index,
                    total,
                    self.clock.remaining()
                );
                self.emit(ProgressEvent::cancelled(self.slice_index, total))
                    .await;
            }
            _ => {
                log::info!("[{}] TWAP completed: {} slices", self.id, total);
                self.emit(ProgressEvent::completed()).await;
            }
        }

        terminal
    }

    fn finish(&mut self, status: SessionStatus) {
        self.clock.cancel();
        self.transition(status);
    }

    fn transition(&mut self, next: SessionStatus) {
        let current = *self.status_tx.borrow();
        debug_assert!(
            current.can_transition_to(next),
            "illegal transition {current} -> {next}"
        );
        self.status_tx.send_replace(next);
    }

    async fn emit_partial(&self, slice: u32, partial: PartialFill) {
        log::debug!(
            "[{}] Slice {}/{} partially filled: {} @ {}",
            self.id,
            slice,
            self.params.total_slices,
            partial.filled,
            partial.price
        );
        self.emit(ProgressEvent::partial_fill(
            slice,
            self.params.total_slices,
            partial.filled,
            partial.price,
        ))
        .await;
    }

    async fn emit(&self, event: ProgressEvent) {
        if self.events.send(event).await.is_err() {
            log::debug!("[{}] Progress receiver dropped", self.id);
        }
    }
}
