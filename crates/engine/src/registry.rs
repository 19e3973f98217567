//! Per-owner session registry

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use rust_decimal::Decimal;
use std::sync::Arc;
use tokio::sync::mpsc;
use twap_core::{
    OwnerId, ProgressEvent, SessionId, StartCommand, ValidationError, split_instrument,
};
use twap_ports::{BalanceSource, OrderExecutor};

use crate::error::{RegistryError, RegistryResult};
use crate::session::{SessionConfig, SessionHandle, TwapSession};

/// Owner-keyed table of live TWAP sessions
///
/// The map's per-key entry lock is the only synchronization point: create,
/// cancel and release for one owner never interleave, while different
/// owners proceed independently.
pub struct SessionRegistry {
    sessions: Arc<DashMap<OwnerId, SessionHandle>>,
    executor: Arc<dyn OrderExecutor>,
    balances: Arc<dyn BalanceSource>,
    config: SessionConfig,
}

impl SessionRegistry {
    pub fn new(
        executor: Arc<dyn OrderExecutor>,
        balances: Arc<dyn BalanceSource>,
        config: SessionConfig,
    ) -> Self {
        Self {
            sessions: Arc::new(DashMap::new()),
            executor,
            balances,
            config,
        }
    }

    /// Validate, size and launch a session for `owner`
    ///
    /// Progress events for the new session go to `events` in emission order.
    /// Nothing is sent on `events` when this returns an error; the caller
    /// reports it with [`RegistryError::to_event`].
    pub async fn create(
        &self,
        owner: OwnerId,
        command: &StartCommand,
        events: mpsc::Sender<ProgressEvent>,
    ) -> RegistryResult<SessionHandle> {
        let params = command.validate(self.config.max_slices)?;

        if self.active(owner).is_some() {
            return Err(RegistryError::SessionAlreadyActive);
        }

        let reference = self
            .balances
            .reference_size(&params.instrument)
            .await
            .map_err(RegistryError::ReferenceUnavailable)?;

        let quote = || {
            split_instrument(&params.instrument)
                .map(|(_, quote)| quote)
                .unwrap_or(params.instrument.as_str())
                .to_string()
        };
        if reference <= Decimal::ZERO {
            return Err(ValidationError::NoReferenceSize(quote()).into());
        }

        let size_per_slice = params.size_per_slice(reference, self.config.size_scale);
        if size_per_slice <= Decimal::ZERO {
            return Err(ValidationError::SliceSizeTooSmall {
                target: params.target_size(reference).to_string(),
                quote: quote(),
                slices: params.total_slices,
            }
            .into());
        }

        let session = TwapSession::new(
            owner,
            params,
            size_per_slice,
            Arc::clone(&self.executor),
            events.clone(),
            self.config.clone(),
        );
        let handle = session.handle();

        // Re-check under the entry lock: another start for this owner may
        // have landed while the reference size was being fetched
        match self.sessions.entry(owner) {
            Entry::Occupied(mut slot) => {
                if slot.get().is_active() {
                    return Err(RegistryError::SessionAlreadyActive);
                }
                slot.insert(handle.clone());
            }
            Entry::Vacant(slot) => {
                slot.insert(handle.clone());
            }
        }

        log::info!(
            "[{}] Session {} registered for {}",
            owner,
            handle.id(),
            handle.params().instrument
        );

        let registry = self.clone();
        let session_id = handle.id();
        tokio::spawn(async move {
            if let Err(e) = tokio::spawn(session.run()).await {
                log::error!("[{}] Session {} task failed: {}", owner, session_id, e);
                let _ = events
                    .send(ProgressEvent::error("internal error: TWAP session aborted"))
                    .await;
            }
            registry.on_terminal(owner, session_id);
        });

        Ok(handle)
    }

    /// Ask the owner's active session to stop
    ///
    /// The cancelled event itself is emitted by the session.
    pub fn cancel(&self, owner: OwnerId) -> RegistryResult<()> {
        let cancelled = self
            .sessions
            .get(&owner)
            .map(|handle| handle.cancel())
            .unwrap_or(false);

        if cancelled {
            log::info!("[{}] Cancel requested", owner);
            Ok(())
        } else {
            Err(RegistryError::NoActiveSession)
        }
    }

    /// Release the owner's slot if it still holds `session_id`
    ///
    /// Returns whether a mapping was removed.
    pub fn on_terminal(&self, owner: OwnerId, session_id: SessionId) -> bool {
        let removed = self
            .sessions
            .remove_if(&owner, |_, handle| handle.id() == session_id)
            .is_some();
        if removed {
            log::debug!("[{}] Session {} released", owner, session_id);
        }
        removed
    }

    /// The owner's session, if one is still running
    pub fn active(&self, owner: OwnerId) -> Option<SessionHandle> {
        self.sessions
            .get(&owner)
            .filter(|handle| handle.is_active())
            .map(|handle| handle.clone())
    }

    pub fn active_count(&self) -> usize {
        self.sessions
            .iter()
            .filter(|entry| entry.value().is_active())
            .count()
    }

    /// Mappings held, including sessions that finished but are not yet released
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

impl Clone for SessionRegistry {
    fn clone(&self) -> Self {
        Self {
            sessions: Arc::clone(&self.sessions),
            executor: Arc::clone(&self.executor),
            balances: Arc::clone(&self.balances),
            config: self.config.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use rust_decimal_macros::dec;
    use twap_core::SessionStatus;
    use twap_ports::{ExecutorError, ExecutorResult, FillObserver, SliceFill, SliceOrder};

    struct FillAtPar;

    #[async_trait]
    impl OrderExecutor for FillAtPar {
        async fn place_slice(
            &self,
            order: &SliceOrder,
            _fills: &dyn FillObserver,
        ) -> ExecutorResult<SliceFill> {
            Ok(SliceFill {
                order_id: order.client_order_id.clone(),
                quantity: order.notional,
                price: Decimal::ONE,
                notional: order.notional,
            })
        }
    }

    struct Balance(Option<Decimal>);

    #[async_trait]
    impl BalanceSource for Balance {
        async fn reference_size(&self, _instrument: &str) -> ExecutorResult<Decimal> {
            self.0
                .ok_or_else(|| ExecutorError::Unavailable("balance service down".to_string()))
        }
    }

    fn registry(balance: Option<Decimal>) -> SessionRegistry {
        SessionRegistry::new(
            Arc::new(FillAtPar),
            Arc::new(Balance(balance)),
            SessionConfig::default(),
        )
    }

    fn start(slices: i64) -> StartCommand {
        StartCommand::new("BTC-USDT", 10.0, slices, 5.0)
    }

    #[tokio::test(start_paused = true)]
    async fn test_create_sizes_slices() {
        let registry = registry(Some(dec!(10000)));
        let (tx, _rx) = mpsc::channel(64);

        let handle = registry.create(OwnerId::new(), &start(4), tx).await.unwrap();

        assert_eq!(handle.size_per_slice(), dec!(250));
        assert_eq!(handle.params().total_slices, 4);
        assert_eq!(registry.active_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalid_command_creates_nothing() {
        let registry = registry(Some(dec!(10000)));
        let (tx, mut rx) = mpsc::channel(64);

        let err = registry.create(OwnerId::new(), &start(0), tx).await.unwrap_err();

        assert_eq!(err, RegistryError::Validation(ValidationError::InvalidSlices(0)));
        assert!(registry.is_empty());
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_balance_is_rejected() {
        let registry = registry(Some(Decimal::ZERO));
        let (tx, _rx) = mpsc::channel(64);

        let err = registry.create(OwnerId::new(), &start(5), tx).await.unwrap_err();

        assert_eq!(
            err,
            RegistryError::Validation(ValidationError::NoReferenceSize("USDT".to_string()))
        );
        assert!(registry.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_dust_slice_size_is_not_a_balance_problem() {
        let registry = SessionRegistry::new(
            Arc::new(FillAtPar),
            Arc::new(Balance(Some(dec!(10000)))),
            SessionConfig {
                size_scale: 2,
                ..Default::default()
            },
        );
        let (tx, _rx) = mpsc::channel(64);

        // 0.001% of 10000 is 0.1, which truncates to 0.00 over 100 slices
        let command = StartCommand::new("BTC-USDT", 0.001, 100, 1.0);
        let err = registry.create(OwnerId::new(), &command, tx).await.unwrap_err();

        match &err {
            RegistryError::Validation(ValidationError::SliceSizeTooSmall {
                quote, slices, ..
            }) => {
                assert_eq!(quote, "USDT");
                assert_eq!(*slices, 100);
            }
            other => panic!("expected SliceSizeTooSmall, got {other:?}"),
        }
        let message = err.to_event().message.unwrap();
        assert!(message.ends_with("over 100 slices rounds to a zero slice size"));
        assert!(!message.contains("balance"));
        assert!(registry.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_balance_failure_maps_to_reference_unavailable() {
        let registry = registry(None);
        let (tx, _rx) = mpsc::channel(64);

        let err = registry.create(OwnerId::new(), &start(5), tx).await.unwrap_err();

        assert!(matches!(err, RegistryError::ReferenceUnavailable(_)));
        assert_eq!(
            err.to_event().message.as_deref(),
            Some("reference size unavailable: executor unavailable: balance service down")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_without_session() {
        let registry = registry(Some(dec!(10000)));
        assert_eq!(
            registry.cancel(OwnerId::new()),
            Err(RegistryError::NoActiveSession)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_slot_released_after_completion() {
        let registry = registry(Some(dec!(10000)));
        let owner = OwnerId::new();
        let (tx, _rx) = mpsc::channel(64);

        let handle = registry.create(owner, &start(2), tx).await.unwrap();
        assert_eq!(handle.wait_terminal().await, SessionStatus::Completed);

        // Let the supervisor task release the slot
        for _ in 0..10 {
            if registry.is_empty() {
                break;
            }
            tokio::task::yield_now().await;
        }
        assert!(registry.is_empty());
        assert!(registry.active(owner).is_none());
        assert_eq!(registry.cancel(owner), Err(RegistryError::NoActiveSession));
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_release_keeps_newer_session() {
        let registry = registry(Some(dec!(10000)));
        let owner = OwnerId::new();
        let (tx, _rx) = mpsc::channel(64);

        let first = registry.create(owner, &start(3), tx.clone()).await.unwrap();
        registry.cancel(owner).unwrap();
        assert_eq!(first.wait_terminal().await, SessionStatus::Cancelled);

        // Terminal before release: a new start is accepted straight away
        let second = registry.create(owner, &start(3), tx).await.unwrap();
        assert!(!registry.on_terminal(owner, first.id()));
        assert_eq!(registry.active(owner).map(|h| h.id()), Some(second.id()));
    }
}
