use dashmap::DashMap;

use crate::types::CustomerAggregate;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A lookup or put could not complete. Fatal to the enclosing fold; the
    /// aggregator never puts after a failed get-or-create, so a fold either
    /// applies fully or not at all.
    #[error("aggregate store unavailable: {0}")]
    Unavailable(String),
}

/// Keyed table of per-customer aggregates. An absent key is `None`, never a
/// default: constructing the fresh aggregate is the aggregator's job.
/// Mutation rights belong to the aggregator alone; nothing else reads or
/// writes the store directly.
pub trait AggregateStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<CustomerAggregate>, StoreError>;
    fn put(&self, key: &str, aggregate: CustomerAggregate) -> Result<(), StoreError>;
}

/// Process-lifetime store. Durable persistence, if needed, is layered behind
/// the trait (a changelog-backed table), not added here. Per-key ordering is
/// guaranteed upstream by partitioning, so plain last-write-wins puts are
/// safe without compare-and-swap.
#[derive(Default)]
pub struct InMemoryAggregateStore {
    aggregates: DashMap<String, CustomerAggregate>,
}

impl InMemoryAggregateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.aggregates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aggregates.is_empty()
    }
}

impl AggregateStore for InMemoryAggregateStore {
    fn get(&self, key: &str) -> Result<Option<CustomerAggregate>, StoreError> {
        Ok(self.aggregates.get(key).map(|entry| entry.value().clone()))
    }

    fn put(&self, key: &str, aggregate: CustomerAggregate) -> Result<(), StoreError> {
        self.aggregates.insert(key.to_string(), aggregate);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_key_is_none_not_default() {
        let store = InMemoryAggregateStore::new();
        assert!(store.get("nobody").unwrap().is_none());
    }

    #[test]
    fn put_then_get_round_trips() {
        let store = InMemoryAggregateStore::new();
        let mut agg = CustomerAggregate::new("c1");
        agg.page_view_urls.push("https://example.com".to_string());
        store.put("c1", agg.clone()).unwrap();
        assert_eq!(store.get("c1").unwrap(), Some(agg));
    }
}
