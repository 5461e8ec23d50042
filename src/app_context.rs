use std::sync::Arc;
use std::time::Duration;

use crate::codec::StaticSchemaResolver;
use crate::config::Config;
use crate::liveness::{HealthHandle, HealthRegistry};
use crate::store::InMemoryAggregateStore;

/// The aggregator loop reports every pass; recv waits are bounded well
/// below this, so only a genuinely stuck worker goes unhealthy.
pub const WORKER_LIVENESS_DEADLINE: Duration = Duration::from_secs(60);

pub struct AppContext {
    pub store: Arc<InMemoryAggregateStore>,
    pub resolver: Arc<StaticSchemaResolver>,
    pub liveness: HealthRegistry,
    pub worker_liveness: HealthHandle,
}

impl AppContext {
    pub fn new(config: &Config) -> Self {
        let liveness = HealthRegistry::new();
        let worker_liveness = liveness.register("aggregator", WORKER_LIVENESS_DEADLINE);

        Self {
            store: Arc::new(InMemoryAggregateStore::new()),
            resolver: Arc::new(config.schema_table.resolver()),
            liveness,
            worker_liveness,
        }
    }
}
