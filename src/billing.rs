//! Billing side channel. Settlement happens elsewhere; this core only
//! reports the fixed price of each call.

use std::fmt;

use metrics::counter;
use serde::Serialize;

use crate::metrics::BILLED_UNITS_TOTAL;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CallOutcome {
    Success,
    ValidationFailed,
    UpstreamFailed,
}

impl CallOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            CallOutcome::Success => "success",
            CallOutcome::ValidationFailed => "validation_failed",
            CallOutcome::UpstreamFailed => "upstream_failed",
        }
    }
}

impl fmt::Display for CallOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `(key, price)` of one attempted call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Charge {
    pub key: &'static str,
    pub price: u64,
    pub outcome: CallOutcome,
}

pub trait BillingSink: Send + Sync {
    fn record(&self, charge: &Charge);
}

/// Default sink: structured log line plus a units counter.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogBilling;

impl BillingSink for LogBilling {
    fn record(&self, charge: &Charge) {
        counter!(BILLED_UNITS_TOTAL, "key" => charge.key).increment(charge.price);
        tracing::info!(
            target: "billing",
            key = charge.key,
            price = charge.price,
            outcome = %charge.outcome,
            "charge reported"
        );
    }
}
