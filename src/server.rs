use axum::{routing::get, Router};
use futures::future::ready;
use metrics_exporter_prometheus::PrometheusBuilder;
use tokio::task::JoinHandle;

use crate::config::Config;
use crate::liveness::HealthRegistry;

pub async fn index() -> &'static str {
    "multi-event aggregator"
}

/// Liveness and prometheus routes, served off the fold loop's runtime.
pub fn router(liveness: HealthRegistry) -> Router {
    const BUCKETS: &[f64] = &[
        0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 50.0, 100.0, 250.0,
    ];

    let recorder_handle = PrometheusBuilder::new()
        .set_buckets(BUCKETS)
        .expect("known-good buckets")
        .install_recorder()
        .expect("failed to install prometheus recorder");

    Router::new()
        .route("/", get(index))
        .route("/_readiness", get(index))
        .route("/_liveness", get(move || ready(liveness.status())))
        .route("/metrics", get(move || ready(recorder_handle.render())))
}

pub fn start_server(config: &Config, liveness: HealthRegistry) -> JoinHandle<()> {
    let bind = format!("{}:{}", config.host, config.port);
    let app = router(liveness);
    tokio::task::spawn(async move {
        let listener = tokio::net::TcpListener::bind(&bind)
            .await
            .expect("failed to bind liveness server");
        axum::serve(listener, app)
            .await
            .expect("failed to start serving metrics");
    })
}
