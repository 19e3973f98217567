use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use twap_core::{Price, Quantity, SessionId, Timestamp};

use crate::error::ExecutorResult;

/// One slice handed to the executor
#[derive(Debug, Clone, PartialEq)]
pub struct SliceOrder {
    pub session_id: SessionId,
    /// Deterministic per session and slice, usable for idempotent placement
    pub client_order_id: String,
    pub instrument: String,
    /// 1-based slice number
    pub slice: u32,
    pub total_slices: u32,
    /// Quote-currency amount to spend on this slice
    pub notional: Decimal,
    pub created_at: Timestamp,
}

impl SliceOrder {
    pub fn new(
        session_id: SessionId,
        instrument: impl Into<String>,
        slice: u32,
        total_slices: u32,
        notional: Decimal,
    ) -> Self {
        Self {
            session_id,
            client_order_id: format!("twap-{}-slice-{}", session_id.simple(), slice),
            instrument: instrument.into(),
            slice,
            total_slices,
            notional,
            created_at: Utc::now(),
        }
    }
}

/// Executor acknowledgement of a filled slice
#[derive(Debug, Clone, PartialEq)]
pub struct SliceFill {
    pub order_id: String,
    /// Base quantity bought
    pub quantity: Quantity,
    pub price: Price,
    /// Quote amount actually spent
    pub notional: Decimal,
}

/// Cumulative progress of a slice that is still filling
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PartialFill {
    /// Base quantity filled so far
    pub filled: Quantity,
    pub price: Price,
}

/// Sink for intra-slice fill progress
///
/// Called synchronously from inside [`OrderExecutor::place_slice`]; must not
/// block.
pub trait FillObserver: Send + Sync {
    fn on_partial_fill(&self, fill: PartialFill);
}

/// Port for placing slice orders
///
/// Implementations own their own timeouts and retry policy; the session
/// scheduler awaits each call to completion and treats any error as fatal
/// for the session.
#[async_trait]
pub trait OrderExecutor: Send + Sync {
    /// Place one slice and report its fill
    ///
    /// Executors that fill in steps report each intermediate step to
    /// `fills` before returning. The returned [`SliceFill`] is the complete
    /// fill and is never reported as partial.
    async fn place_slice(
        &self,
        order: &SliceOrder,
        fills: &dyn FillObserver,
    ) -> ExecutorResult<SliceFill>;

    /// Executor name for logging
    fn name(&self) -> &str {
        "OrderExecutor"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    // Ensure traits are object-safe
    fn _assert_executor_object_safe(_: &dyn OrderExecutor) {}
    fn _assert_balance_object_safe(_: &dyn crate::BalanceSource) {}
    fn _assert_observer_object_safe(_: &dyn FillObserver) {}

    #[test]
    fn test_client_order_id_is_stable_per_slice() {
        let session = Uuid::new_v4();
        let a = SliceOrder::new(session, "BTC-USDT", 3, 5, dec!(200));
        let b = SliceOrder::new(session, "BTC-USDT", 3, 5, dec!(200));
        let c = SliceOrder::new(session, "BTC-USDT", 4, 5, dec!(200));

        assert_eq!(a.client_order_id, b.client_order_id);
        assert_ne!(a.client_order_id, c.client_order_id);
        assert!(a.client_order_id.ends_with("-slice-3"));
    }
}
