use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Price value - uses Decimal for precision
pub type Price = Decimal;

/// Quantity value - uses Decimal for precision
pub type Quantity = Decimal;

/// Timestamp in UTC
pub type Timestamp = DateTime<Utc>;

/// Identifier of a single TWAP execution
pub type SessionId = Uuid;

/// Identity under which at most one TWAP session may be active
///
/// One owner per connection: the channel adapter mints a fresh id when a
/// peer connects and drops it when the peer goes away.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OwnerId(Uuid);

impl OwnerId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for OwnerId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Split an instrument id such as `BTC-USDT` into `(base, quote)`
///
/// Segments after the quote name the contract type (`BTC-USDT-SWAP`) and
/// are not part of the pair.
pub fn split_instrument(instrument: &str) -> Option<(&str, &str)> {
    let mut segments = instrument.split('-');
    let base = segments.next()?;
    let quote = segments.next()?;
    if base.is_empty() || quote.is_empty() || segments.any(str::is_empty) {
        return None;
    }
    Some((base, quote))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_instrument() {
        assert_eq!(split_instrument("BTC-USDT"), Some(("BTC", "USDT")));
        assert_eq!(split_instrument("BTCUSDT"), None);
        assert_eq!(split_instrument("-USDT"), None);
        assert_eq!(split_instrument("BTC-"), None);
        assert_eq!(split_instrument("BTC-USDT-SWAP"), Some(("BTC", "USDT")));
        assert_eq!(split_instrument("BTC-USD-250328"), Some(("BTC", "USD")));
        assert_eq!(split_instrument("BTC-USDT-"), None);
        assert_eq!(split_instrument("BTC--USDT"), None);
    }

    #[test]
    fn test_owner_ids_are_unique() {
        assert_ne!(OwnerId::new(), OwnerId::new());
    }
}
