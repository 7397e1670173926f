//! Dispatch runtime: lookup → validate → handle → envelope → billing report.

use std::sync::Arc;

use metrics::counter;
use serde::Serialize;
use serde_json::Value;

use crate::aggregate::Aggregator;
use crate::billing::{BillingSink, CallOutcome, Charge};
use crate::entrypoints::{CallContext, EntrypointDefinition, Registry};
use crate::error::{DispatchError, ValidationError};
use crate::metrics::CALLS_TOTAL;

/// Successful response: `{ "output": ... }`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Envelope {
    pub output: Value,
}

pub struct Dispatcher {
    registry: Registry,
    aggregator: Aggregator,
    billing: Arc<dyn BillingSink>,
}

impl Dispatcher {
    pub fn new(registry: Registry, aggregator: Aggregator, billing: Arc<dyn BillingSink>) -> Self {
        Self {
            registry,
            aggregator,
            billing,
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Invoke entrypoint `key` with `raw` caller input.
    ///
    /// Unknown keys fail before anything is billed. Every call that resolves
    /// to a definition reports that definition's fixed price, whatever the
    /// outcome or the size of the output.
    pub async fn dispatch(&self, key: &str, raw: Value) -> Result<Envelope, DispatchError> {
        let Some(def) = self.registry.get(key) else {
            counter!(CALLS_TOTAL, "key" => "unknown", "outcome" => "not_found").increment(1);
            tracing::info!(key, "unknown entrypoint");
            return Err(DispatchError::NotFound {
                key: key.to_string(),
            });
        };

        let result = self.run(def, &raw).await;
        let outcome = match &result {
            Ok(_) => CallOutcome::Success,
            Err(DispatchError::Validation(_)) => CallOutcome::ValidationFailed,
            Err(_) => CallOutcome::UpstreamFailed,
        };
        self.report(def, outcome);
        result
    }

    /// Fail a call to `def` whose input was rejected before dispatch, such
    /// as a body that is not JSON. Billed like any other validation failure.
    pub fn reject(&self, def: &EntrypointDefinition, err: ValidationError) -> DispatchError {
        self.report(def, CallOutcome::ValidationFailed);
        DispatchError::Validation(err)
    }

    fn report(&self, def: &EntrypointDefinition, outcome: CallOutcome) {
        counter!(CALLS_TOTAL, "key" => def.key, "outcome" => outcome.as_str()).increment(1);
        tracing::info!(key = def.key, price = def.price, %outcome, "entrypoint call");
        self.billing.record(&Charge {
            key: def.key,
            price: def.price,
            outcome,
        });
    }

    async fn run(&self, def: &EntrypointDefinition, raw: &Value) -> Result<Envelope, DispatchError> {
        let input = def.input_schema.validate(raw)?;
        let ctx = CallContext::new(def.key, input);
        let output = def.kind.handle(&ctx, &self.aggregator).await?;
        Ok(Envelope { output })
    }
}
