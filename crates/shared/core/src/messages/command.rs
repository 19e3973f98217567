use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::entities::TwapParams;
use crate::error::ValidationError;
use crate::values::split_instrument;

fn default_percent() -> f64 {
    10.0
}

fn default_slices() -> i64 {
    5
}

fn default_interval() -> f64 {
    30.0
}

/// Request to start a TWAP execution
///
/// Numeric fields are kept in their loose wire types so that out-of-range
/// values reach [`StartCommand::validate`] and produce a precise reason
/// instead of a generic decoding error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StartCommand {
    /// Traded pair, e.g. `BTC-USDT`
    #[serde(rename = "instId")]
    pub inst_id: String,
    /// Percent of the quote balance to execute
    #[serde(default = "default_percent")]
    pub percent: f64,
    /// Number of slices
    #[serde(default = "default_slices")]
    pub slices: i64,
    /// Seconds between slices
    #[serde(default = "default_interval")]
    pub interval: f64,
}

impl StartCommand {
    pub fn new(inst_id: impl Into<String>, percent: f64, slices: i64, interval: f64) -> Self {
        Self {
            inst_id: inst_id.into(),
            percent,
            slices,
            interval,
        }
    }

    /// Check every field and build the immutable session parameters
    pub fn validate(&self, max_slices: u32) -> Result<TwapParams, ValidationError> {
        let instrument = self.inst_id.trim();
        if instrument.is_empty() {
            return Err(ValidationError::EmptyInstrument);
        }
        if split_instrument(instrument).is_none() {
            return Err(ValidationError::InvalidInstrument(instrument.to_string()));
        }

        if !self.percent.is_finite() || self.percent <= 0.0 || self.percent > 100.0 {
            return Err(ValidationError::PercentOutOfRange(self.percent));
        }
        let percent = Decimal::try_from(self.percent)
            .map_err(|_| ValidationError::PercentOutOfRange(self.percent))?;

        if self.slices < 1 {
            return Err(ValidationError::InvalidSlices(self.slices));
        }
        if self.slices > i64::from(max_slices) {
            return Err(ValidationError::TooManySlices {
                got: self.slices,
                max: max_slices,
            });
        }
        let total_slices = u32::try_from(self.slices).map_err(|_| ValidationError::TooManySlices {
            got: self.slices,
            max: max_slices,
        })?;

        if !self.interval.is_finite() || self.interval <= 0.0 {
            return Err(ValidationError::InvalidInterval(self.interval));
        }
        // Sub-nanosecond intervals truncate to zero, which no timer accepts
        let interval = Duration::try_from_secs_f64(self.interval)
            .ok()
            .filter(|d| !d.is_zero())
            .ok_or(ValidationError::InvalidInterval(self.interval))?;

        Ok(TwapParams {
            instrument: instrument.to_string(),
            percent,
            total_slices,
            interval,
        })
    }
}

/// Request to cancel the owner's active session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CancelCommand;

/// Decoded inbound message
#[derive(Debug, Clone, PartialEq)]
pub enum InboundMessage {
    Start(StartCommand),
    Cancel(CancelCommand),
    /// A start command whose fields could not be decoded
    Malformed(String),
    /// Anything else; ignored at the boundary
    Unrecognized,
}

impl InboundMessage {
    /// Classify a text frame
    ///
    /// - `{"action": "cancel"}` is a cancel, any other `action` is unrecognized
    /// - an object carrying `instId` is a start (missing fields take defaults)
    /// - everything else is unrecognized
    pub fn parse(text: &str) -> Self {
        let value: serde_json::Value = match serde_json::from_str(text) {
            Ok(value) => value,
            Err(_) => return InboundMessage::Unrecognized,
        };

        let Some(object) = value.as_object() else {
            return InboundMessage::Unrecognized;
        };

        if let Some(action) = object.get("action") {
            return match action.as_str() {
                Some("cancel") => InboundMessage::Cancel(CancelCommand),
                _ => InboundMessage::Unrecognized,
            };
        }

        if !object.contains_key("instId") {
            return InboundMessage::Unrecognized;
        }

        match serde_json::from_value::<StartCommand>(value) {
            Ok(command) => InboundMessage::Start(command),
            Err(e) => InboundMessage::Malformed(e.to_string()),
        }
    }
}
