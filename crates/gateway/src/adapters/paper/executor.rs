//! In-memory paper venue
//!
//! Fills every slice at the configured mid price, as a market buy of the
//! base asset paid in the quote asset. Balances move on each fill so a
//! session can run out of funds half way through.
//!
//! Funds move up front; the fill itself is then reported in equal steps,
//! each step but the last as a cumulative partial fill.

use async_trait::async_trait;
use dashmap::DashMap;
use log::{debug, info, warn};
use rust_decimal::{Decimal, RoundingStrategy};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use twap_core::{Price, Quantity, split_instrument};
use twap_ports::{
    BalanceSource, ExecutorError, ExecutorResult, FillObserver, OrderExecutor, PartialFill,
    SliceFill, SliceOrder,
};

use super::config::PaperConfig;

pub struct PaperExecutor {
    balances: DashMap<String, Decimal>,
    prices: DashMap<String, Price>,
    price_scale: u32,
    quantity_scale: u32,
    fill_steps: u32,
    fill_step_delay: Duration,
    next_order: AtomicU64,
}

impl PaperExecutor {
    pub fn new(config: &PaperConfig) -> Self {
        Self {
            balances: config
                .balances
                .iter()
                .map(|(asset, amount)| (asset.clone(), *amount))
                .collect(),
            prices: config
                .prices
                .iter()
                .map(|(instrument, price)| (instrument.clone(), *price))
                .collect(),
            price_scale: config.price_scale,
            quantity_scale: config.quantity_scale,
            fill_steps: config.fill_steps.max(1),
            fill_step_delay: Duration::from_millis(config.fill_step_delay_ms),
            next_order: AtomicU64::new(1),
        }
    }

    /// Current balance of `asset`, zero if never funded
    pub fn balance(&self, asset: &str) -> Decimal {
        self.balances
            .get(asset)
            .map(|amount| *amount)
            .unwrap_or(Decimal::ZERO)
    }

    pub fn deposit(&self, asset: &str, amount: Decimal) {
        *self.balances.entry(asset.to_string()).or_insert(Decimal::ZERO) += amount;
    }

    pub fn set_price(&self, instrument: &str, price: Price) {
        self.prices.insert(instrument.to_string(), price);
    }

    pub fn price(&self, instrument: &str) -> Option<Price> {
        self.prices.get(instrument).map(|price| *price)
    }

    /// Debit `cost` of `asset`, failing without side effects if short
    fn debit(&self, asset: &str, cost: Decimal) -> ExecutorResult<()> {
        let Some(mut balance) = self.balances.get_mut(asset) else {
            return Err(ExecutorError::InsufficientBalance {
                asset: asset.to_string(),
                required: cost.to_string(),
                available: Decimal::ZERO.to_string(),
            });
        };
        if *balance < cost {
            return Err(ExecutorError::InsufficientBalance {
                asset: asset.to_string(),
                required: cost.to_string(),
                available: balance.to_string(),
            });
        }
        *balance -= cost;
        Ok(())
    }

    /// Play out a fill of `quantity` step by step
    async fn report_steps(&self, quantity: Quantity, price: Price, fills: &dyn FillObserver) {
        let steps = Decimal::from(self.fill_steps);
        for step in 1..=self.fill_steps {
            if !self.fill_step_delay.is_zero() {
                tokio::time::sleep(self.fill_step_delay).await;
            }
            if step == self.fill_steps {
                break;
            }
            let filled = (quantity * Decimal::from(step) / steps)
                .round_dp_with_strategy(self.quantity_scale, RoundingStrategy::ToZero);
            if !filled.is_zero() {
                fills.on_partial_fill(PartialFill { filled, price });
            }
        }
    }
}

#[async_trait]
impl OrderExecutor for PaperExecutor {
    async fn place_slice(
        &self,
        order: &SliceOrder,
        fills: &dyn FillObserver,
    ) -> ExecutorResult<SliceFill> {
        let (base, quote) = split_instrument(&order.instrument)
            .ok_or_else(|| ExecutorError::UnknownInstrument(order.instrument.clone()))?;
        let mid = self
            .price(&order.instrument)
            .ok_or_else(|| ExecutorError::UnknownInstrument(order.instrument.clone()))?;

        let price = mid.round_dp(self.price_scale);
        if price <= Decimal::ZERO {
            return Err(ExecutorError::Rejected(format!(
                "no valid price for {}",
                order.instrument
            )));
        }

        let quantity = (order.notional / price)
            .round_dp_with_strategy(self.quantity_scale, RoundingStrategy::ToZero);
        if quantity.is_zero() {
            return Err(ExecutorError::Rejected(format!(
                "notional {} {} buys less than the minimum {} size",
                order.notional, quote, base
            )));
        }

        let cost = quantity * price;
        if let Err(e) = self.debit(quote, cost) {
            warn!("[paper] {} rejected: {}", order.client_order_id, e);
            return Err(e);
        }
        self.deposit(base, quantity);
        self.report_steps(quantity, price, fills).await;

        let order_id = format!("paper-{}", self.next_order.fetch_add(1, Ordering::Relaxed));
        info!(
            "[paper] {} filled {} {} @ {} as {}",
            order.client_order_id, quantity, base, price, order_id
        );
        debug!("[paper] {} balance now {}", quote, self.balance(quote));

        Ok(SliceFill {
            order_id,
            quantity,
            price,
            notional: cost,
        })
    }

    fn name(&self) -> &str {
        "PaperExecutor"
    }
}

#[async_trait]
impl BalanceSource for PaperExecutor {
    /// Free balance of the instrument's quote asset
    async fn reference_size(&self, instrument: &str) -> ExecutorResult<Decimal> {
        let (_, quote) = split_instrument(instrument)
            .ok_or_else(|| ExecutorError::UnknownInstrument(instrument.to_string()))?;
        Ok(self.balance(quote))
    }
}
