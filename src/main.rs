use std::sync::Arc;
use std::time::Duration;

use envconfig::Envconfig;
use multi_event_aggregator::{
    aggregation_loop,
    app_context::AppContext,
    config::Config,
    kafka::{consumer::MultiTopicConsumer, producer::create_kafka_producer},
    server::start_server,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

fn setup_tracing() {
    let log_layer: tracing_subscriber::filter::Filtered<
        tracing_subscriber::fmt::Layer<tracing_subscriber::Registry>,
        EnvFilter,
        tracing_subscriber::Registry,
    > = tracing_subscriber::fmt::layer().with_filter(EnvFilter::from_default_env());
    tracing_subscriber::registry().with(log_layer).init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    setup_tracing();
    info!("Starting up...");

    let config = Config::init_from_env()?;

    let context = Arc::new(AppContext::new(&config));

    let topics = config.topic_bindings.topics();
    let consumer = MultiTopicConsumer::new(&config.kafka, &topics)?;
    info!("Subscribed to topics: {:?}", topics);

    let producer_liveness = context
        .liveness
        .register("rdkafka_producer", Duration::from_secs(30));
    let producer = create_kafka_producer(&config.kafka, producer_liveness).await?;

    start_server(&config, context.liveness.clone());

    aggregation_loop(&config, context, consumer, producer).await;

    Ok(())
}
