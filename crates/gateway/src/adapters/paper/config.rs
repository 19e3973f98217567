use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Paper venue settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaperConfig {
    /// Opening balance per asset
    #[serde(default = "default_balances")]
    pub balances: HashMap<String, Decimal>,

    /// Mid price per instrument (`BASE-QUOTE`)
    #[serde(default = "default_prices")]
    pub prices: HashMap<String, Decimal>,

    /// Decimal places of the fill price
    #[serde(default = "default_price_scale")]
    pub price_scale: u32,

    /// Decimal places of the filled base quantity
    #[serde(default = "default_quantity_scale")]
    pub quantity_scale: u32,

    /// Steps a slice fills in; all but the last are reported as partial fills
    #[serde(default = "default_fill_steps")]
    pub fill_steps: u32,

    /// Pause before each fill step, in milliseconds
    #[serde(default)]
    pub fill_step_delay_ms: u64,
}

fn default_balances() -> HashMap<String, Decimal> {
    HashMap::from([("USDT".to_string(), dec!(10000))])
}

fn default_prices() -> HashMap<String, Decimal> {
    HashMap::from([
        ("BTC-USDT".to_string(), dec!(65000)),
        ("ETH-USDT".to_string(), dec!(3000)),
    ])
}

fn default_price_scale() -> u32 {
    2
}

fn default_quantity_scale() -> u32 {
    6
}

fn default_fill_steps() -> u32 {
    4
}

impl Default for PaperConfig {
    fn default() -> Self {
        Self {
            balances: default_balances(),
            prices: default_prices(),
            price_scale: default_price_scale(),
            quantity_scale: default_quantity_scale(),
            fill_steps: default_fill_steps(),
            fill_step_delay_ms: 0,
        }
    }
}
