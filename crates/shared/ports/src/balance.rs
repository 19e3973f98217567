use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::error::ExecutorResult;

/// Port for the reference size a TWAP percent applies to
///
/// For a spot pair the reference is the available balance of the quote
/// currency: a 10% TWAP on `BTC-USDT` spends 10% of the USDT balance.
#[async_trait]
pub trait BalanceSource: Send + Sync {
    /// Reference size for `instrument`, in quote-currency units
    async fn reference_size(&self, instrument: &str) -> ExecutorResult<Decimal>;
}
