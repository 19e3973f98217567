use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use std::time::Duration;

/// Validated, immutable parameters of one TWAP execution
///
/// Built from a [`StartCommand`](crate::StartCommand) by
/// [`StartCommand::validate`](crate::StartCommand::validate).
#[derive(Debug, Clone, PartialEq)]
pub struct TwapParams {
    /// Traded pair, `BASE-QUOTE`
    pub instrument: String,
    /// Fraction of the reference size, in (0, 100]
    pub percent: Decimal,
    /// Number of slices, at least 1
    pub total_slices: u32,
    /// Delay between two slice dispatches
    pub interval: Duration,
}

impl TwapParams {
    /// Total notional this TWAP targets for a given reference size
    pub fn target_size(&self, reference_size: Decimal) -> Decimal {
        reference_size * self.percent / dec!(100)
    }

    /// Size of each slice, truncated to `scale` decimal places
    ///
    /// Truncation keeps `size_per_slice * total_slices <= target_size`.
    pub fn size_per_slice(&self, reference_size: Decimal, scale: u32) -> Decimal {
        let raw = self.target_size(reference_size) / Decimal::from(self.total_slices);
        raw.round_dp_with_strategy(scale, RoundingStrategy::ToZero)
    }

    /// Wall-clock span between the first and the last slice
    pub fn schedule_span(&self) -> Duration {
        self.interval * self.total_slices.saturating_sub(1)
    }
}
