use std::sync::Arc;

use crate::store::{AggregateStore, StoreError};
use crate::types::{CustomerAggregate, EventEnvelope};

/// Folds decoded envelopes into the per-customer aggregate and hands the
/// updated value back for egress. Constructed with its store: the store is
/// the only shared mutable state, and only the aggregator touches it.
///
/// `process` runs sequentially within one worker, and the upstream
/// partitioning guarantees all events for a key reach one worker, so no two
/// folds for the same key ever race. If keys are ever split across
/// concurrent workers, the store contract has to grow compare-and-swap
/// semantics before this stays correct.
pub struct Aggregator<S> {
    store: Arc<S>,
}

impl<S: AggregateStore> Aggregator<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// One synchronous fold: get-or-create the aggregate for the envelope's
    /// routing key, apply the event, put it back, return it. The returned
    /// value is not retained past the caller's emit.
    pub fn process(&self, envelope: &EventEnvelope) -> Result<CustomerAggregate, StoreError> {
        let mut aggregate = self
            .store
            .get(&envelope.routing_key)?
            .unwrap_or_else(|| CustomerAggregate::new(envelope.routing_key.as_str()));

        aggregate.apply(&envelope.event);

        self.store.put(&envelope.routing_key, aggregate.clone())?;
        Ok(aggregate)
    }
}
