use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tracing::warn;

/// Deadline-based health reporting for the service's loops.
///
/// Each loop registers once and then reports through its handle more often
/// than its deadline. A component that was registered but never reported, or
/// whose last report has expired, makes the whole process unhealthy - the
/// process can only be trusted with customer events while every loop is
/// demonstrably running.
#[derive(Clone, Default)]
pub struct HealthRegistry {
    components: Arc<RwLock<HashMap<String, Option<Instant>>>>,
}

#[derive(Clone)]
pub struct HealthHandle {
    component: String,
    deadline: Duration,
    components: Arc<RwLock<HashMap<String, Option<Instant>>>>,
}

#[derive(Debug)]
pub struct HealthStatus {
    pub healthy: bool,
    /// Per-component health, for response body debugging.
    pub components: Vec<(String, bool)>,
}

impl IntoResponse for HealthStatus {
    fn into_response(self) -> Response {
        let body = format!("{self:?}");
        match self.healthy {
            true => (StatusCode::OK, body),
            false => (StatusCode::INTERNAL_SERVER_ERROR, body),
        }
        .into_response()
    }
}

impl HealthRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a component as starting (unhealthy until its first report)
    /// and returns the handle it reports through.
    pub fn register(&self, component: impl Into<String>, deadline: Duration) -> HealthHandle {
        let component = component.into();
        if let Ok(mut map) = self.components.write() {
            map.insert(component.clone(), None);
        } else {
            // Poisoned lock: the health checks will fail and the process restart
            warn!("poisoned HealthRegistry lock");
        }
        HealthHandle {
            component,
            deadline,
            components: self.components.clone(),
        }
    }

    /// The overall process status; usable as an axum handler response.
    pub fn status(&self) -> HealthStatus {
        let Ok(map) = self.components.read() else {
            warn!("poisoned HealthRegistry lock");
            return HealthStatus {
                healthy: false,
                components: Vec::new(),
            };
        };
        let components: Vec<(String, bool)> = map
            .iter()
            .map(|(name, until)| (name.clone(), until.map(|u| u > Instant::now()).unwrap_or(false)))
            .collect();
        HealthStatus {
            healthy: !components.is_empty() && components.iter().all(|(_, healthy)| *healthy),
            components,
        }
    }
}

impl HealthHandle {
    /// Must be called more frequently than the registered deadline.
    pub fn report_healthy(&self) {
        if let Ok(mut map) = self.components.write() {
            map.insert(self.component.clone(), Some(Instant::now() + self.deadline));
        } else {
            warn!("poisoned HealthRegistry lock");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unreported_component_is_unhealthy() {
        let registry = HealthRegistry::new();
        let _handle = registry.register("worker", Duration::from_secs(30));
        assert!(!registry.status().healthy);
    }

    #[test]
    fn reported_component_is_healthy_until_deadline() {
        let registry = HealthRegistry::new();
        let handle = registry.register("worker", Duration::from_secs(30));
        handle.report_healthy();
        assert!(registry.status().healthy);
    }

    #[test]
    fn stale_report_goes_unhealthy_and_recovers_on_the_next_report() {
        let registry = HealthRegistry::new();
        let handle = registry.register("worker", Duration::from_millis(50));

        handle.report_healthy();
        assert!(registry.status().healthy);

        // A worker that stops reporting past its deadline is stuck
        std::thread::sleep(Duration::from_millis(120));
        assert!(!registry.status().healthy);

        handle.report_healthy();
        assert!(registry.status().healthy);
    }
}
