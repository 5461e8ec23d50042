use rdkafka::error::KafkaError;
use rdkafka::producer::{FutureProducer, FutureRecord, Producer};
use rdkafka::{ClientConfig, ClientContext};
use tracing::{debug, error, info};

use crate::kafka::config::KafkaConfig;
use crate::liveness::HealthHandle;
use crate::metrics_consts::{AGGREGATES_EMITTED, EMIT_FAILURES};

pub struct KafkaContext {
    liveness: HealthHandle,
}

impl From<HealthHandle> for KafkaContext {
    fn from(value: HealthHandle) -> Self {
        KafkaContext { liveness: value }
    }
}

impl ClientContext for KafkaContext {
    fn stats(&self, _: rdkafka::Statistics) {
        // Signal liveness, as the main rdkafka loop is running and calling us
        self.liveness.report_healthy();
    }
}

pub async fn create_kafka_producer(
    config: &KafkaConfig,
    liveness: HealthHandle,
) -> Result<FutureProducer<KafkaContext>, KafkaError> {
    let mut client_config = ClientConfig::new();
    client_config
        .set("bootstrap.servers", &config.kafka_hosts)
        .set("statistics.interval.ms", "10000")
        .set("linger.ms", config.kafka_producer_linger_ms.to_string())
        .set(
            "message.timeout.ms",
            config.kafka_message_timeout_ms.to_string(),
        )
        .set(
            "compression.codec",
            config.kafka_compression_codec.to_owned(),
        )
        .set(
            "queue.buffering.max.kbytes",
            (config.kafka_producer_queue_mib * 1024).to_string(),
        );

    if config.kafka_tls {
        client_config
            .set("security.protocol", "ssl")
            .set("enable.ssl.certificate.verification", "false");
    };

    debug!("rdkafka configuration: {:?}", client_config);
    let producer: FutureProducer<KafkaContext> = client_config.create_with_context(liveness.into())?;

    // "Ping" the Kafka brokers by requesting metadata
    match producer
        .client()
        .fetch_metadata(None, std::time::Duration::from_secs(15))
    {
        Ok(metadata) => {
            info!(
                "Successfully connected to Kafka brokers. Found {} topics.",
                metadata.topics().len()
            );
        }
        Err(e) => {
            error!("Failed to fetch metadata from Kafka brokers: {:?}", e);
            return Err(e);
        }
    }

    Ok(producer)
}

/// Fire-and-forget keyed send. The delivery future is awaited on a spawned
/// task that surfaces and counts failures; a send that fails never blocks or
/// aborts the fold loop that issued it.
pub fn send_keyed<C: ClientContext + 'static>(
    producer: &FutureProducer<C>,
    topic: &str,
    key: &str,
    payload: Vec<u8>,
) {
    let record = FutureRecord {
        topic,
        key: Some(key),
        payload: Some(payload.as_slice()),
        timestamp: None,
        partition: None,
        headers: None,
    };

    let delivery = match producer.send_result(record) {
        Ok(delivery) => delivery,
        Err((e, _)) => {
            metrics::counter!(EMIT_FAILURES, &[("reason", "enqueue")]).increment(1);
            error!("failed to enqueue record for {} ({}): {}", topic, key, e);
            return;
        }
    };

    let topic = topic.to_string();
    let key = key.to_string();
    tokio::spawn(async move {
        match delivery.await {
            Ok(Ok(_)) => {
                metrics::counter!(AGGREGATES_EMITTED).increment(1);
            }
            Ok(Err((e, _))) => {
                metrics::counter!(EMIT_FAILURES, &[("reason", "delivery")]).increment(1);
                error!("failed to deliver record for {} ({}): {}", topic, key, e);
            }
            Err(_) => {
                metrics::counter!(EMIT_FAILURES, &[("reason", "canceled")]).increment(1);
                error!("delivery of record for {} ({}) was canceled", topic, key);
            }
        }
    });
}
