use std::sync::Arc;
use std::time::{Duration, Instant};

use rdkafka::producer::FutureProducer;
use rdkafka::ClientContext;
use tracing::{debug, error, info, warn};

use crate::app_context::AppContext;
use crate::config::Config;
use crate::kafka::consumer::{MultiTopicConsumer, RecvErr};
use crate::metrics_consts::{
    AGGREGATES_TRACKED, DECODE_FAILURES, EMPTY_PAYLOADS, EVENTS_RECEIVED, FOLD_TIME,
    NO_ACTION_RECORDS, OFFSET_STORE_FAILURES, STORE_FAILURES, UNBOUND_TOPIC_RECORDS,
};
use crate::processor::Aggregator;
use crate::types::CustomerEvent;

pub mod app_context;
pub mod codec;
pub mod config;
pub mod kafka;
pub mod liveness;
pub mod metrics_consts;
pub mod processor;
pub mod server;
pub mod store;
pub mod types;

/// How long one recv may park before the loop goes around again. Must stay
/// well short of the worker liveness deadline: an idle topic is a normal
/// empty result, and a quiet worker still has to keep reporting healthy.
pub const RECV_TIMEOUT: Duration = Duration::from_secs(10);

/// The consume/decode/fold/emit loop. One logical worker: folds run
/// sequentially here, which is what lets the store get by without
/// compare-and-swap - per-key ordering is already guaranteed by the
/// producer keying records by customer id.
///
/// Per-record failures (decode, store) are surfaced once with the offending
/// topic and key, counted, and skipped; the loop never retries them and
/// never stops for them. Kafka transport failure is fatal - if kafka's
/// down, we're down.
pub async fn aggregation_loop<C: ClientContext + 'static>(
    config: &Config,
    context: Arc<AppContext>,
    consumer: MultiTopicConsumer,
    producer: FutureProducer<C>,
) {
    let aggregator = Aggregator::new(context.store.clone());

    loop {
        context.worker_liveness.report_healthy();

        let received = match tokio::time::timeout(RECV_TIMEOUT, consumer.recv()).await {
            Ok(received) => received,
            // No records within the window; loop around and report healthy
            Err(_) => continue,
        };

        let (record, offset) = match received {
            Ok(r) => r,
            Err(RecvErr::Empty) => {
                warn!("Received empty event");
                metrics::counter!(EMPTY_PAYLOADS).increment(1);
                continue;
            }
            Err(RecvErr::Kafka(e)) => {
                panic!("Kafka error: {:?}", e);
            }
        };

        metrics::counter!(EVENTS_RECEIVED, &[("topic", record.topic.clone())]).increment(1);

        // Offsets are stored up front: a record that fails to decode is
        // surfaced and skipped, not replayed forever.
        if let Err(e) = offset.store() {
            metrics::counter!(OFFSET_STORE_FAILURES).increment(1);
            error!("failed to store offset for {}: {}", record.topic, e);
        }

        let Some(format) = config.topic_bindings.format_for(&record.topic) else {
            // The subscription is built from the bindings, so this is a bug
            metrics::counter!(UNBOUND_TOPIC_RECORDS).increment(1);
            error!("no wire format bound for topic {}", record.topic);
            continue;
        };

        let envelope = match codec::decode(format, context.resolver.as_ref(), &record.payload) {
            Ok(envelope) => envelope,
            Err(e) => {
                metrics::counter!(DECODE_FAILURES, &[("topic", record.topic.clone())])
                    .increment(1);
                error!(
                    "failed to decode {} record from {} (key {:?}): {}",
                    format, record.topic, record.key, e
                );
                continue;
            }
        };

        if matches!(envelope.event, CustomerEvent::NoAction) {
            metrics::counter!(NO_ACTION_RECORDS).increment(1);
            debug!("record for {} carried no action", envelope.routing_key);
        }

        let fold_start = Instant::now();
        let aggregate = match aggregator.process(&envelope) {
            Ok(aggregate) => aggregate,
            Err(e) => {
                metrics::counter!(STORE_FAILURES).increment(1);
                error!("fold failed for key {}: {}", envelope.routing_key, e);
                continue;
            }
        };
        metrics::histogram!(FOLD_TIME).record(fold_start.elapsed().as_millis() as f64);
        metrics::gauge!(AGGREGATES_TRACKED).set(context.store.len() as f64);

        info!(
            "customer {}: {} page views, {} purchases",
            aggregate.customer_id,
            aggregate.page_view_urls.len(),
            aggregate.purchased_items.len()
        );

        let payload = match serde_json::to_vec(&aggregate) {
            Ok(payload) => payload,
            Err(e) => {
                error!("failed to serialize aggregate for {}: {}", aggregate.customer_id, e);
                continue;
            }
        };
        kafka::producer::send_keyed(
            &producer,
            &config.output_topic,
            &envelope.routing_key,
            payload,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app_context::WORKER_LIVENESS_DEADLINE;

    #[test]
    fn recv_timeout_stays_short_of_the_worker_deadline() {
        // An idle topic must loop around and report healthy before the
        // liveness deadline lapses, with room for several misses.
        assert!(RECV_TIMEOUT * 2 < WORKER_LIVENESS_DEADLINE);
    }
}
