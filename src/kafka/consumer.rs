use std::sync::{Arc, Weak};

use rdkafka::{
    consumer::{Consumer, StreamConsumer},
    error::KafkaError,
    ClientConfig, Message,
};

use crate::kafka::config::KafkaConfig;

/// Consumer over the set of bound event topics. Values are handed out as
/// raw bytes - which wire format applies is decided per topic by the codec
/// layer, not here. Clone-cheap; clones share one underlying consumer.
#[derive(Clone)]
pub struct MultiTopicConsumer {
    inner: Arc<Inner>,
}

struct Inner {
    consumer: StreamConsumer,
}

/// One record as pulled off the log, before decoding.
#[derive(Clone, Debug)]
pub struct ConsumedRecord {
    pub topic: String,
    pub key: Option<String>,
    pub payload: Vec<u8>,
}

#[derive(Debug, thiserror::Error)]
pub enum RecvErr {
    #[error("Kafka error: {0}")]
    Kafka(#[from] KafkaError),
    #[error("Received empty payload")]
    Empty,
}

#[derive(Debug, thiserror::Error)]
pub enum OffsetErr {
    #[error("Kafka error: {0}")]
    Kafka(#[from] KafkaError),
    #[error("Consumer gone")]
    Gone,
}

impl MultiTopicConsumer {
    pub fn new(config: &KafkaConfig, topics: &[&str]) -> Result<Self, KafkaError> {
        let mut client_config = ClientConfig::new();
        client_config
            .set("bootstrap.servers", &config.kafka_hosts)
            .set("statistics.interval.ms", "10000")
            .set("group.id", &config.kafka_consumer_group)
            .set("auto.offset.reset", &config.kafka_consumer_offset_reset);

        client_config.set("enable.auto.offset.store", "false");

        if config.kafka_tls {
            client_config
                .set("security.protocol", "ssl")
                .set("enable.ssl.certificate.verification", "false");
        };

        let consumer: StreamConsumer = client_config.create()?;
        consumer.subscribe(topics)?;

        Ok(Self {
            inner: Arc::new(Inner { consumer }),
        })
    }

    /// Awaits the next record. A wait that ends with no records is not an
    /// error; rdkafka parks the future until one arrives.
    pub async fn recv(&self) -> Result<(ConsumedRecord, Offset), RecvErr> {
        let message = self.inner.consumer.recv().await?;

        let offset = Offset {
            handle: Arc::downgrade(&self.inner),
            topic: message.topic().to_string(),
            partition: message.partition(),
            offset: message.offset(),
        };

        let Some(payload) = message.payload() else {
            // We auto-store poison pills, panicking on failure
            offset.store().unwrap();
            return Err(RecvErr::Empty);
        };

        let record = ConsumedRecord {
            topic: message.topic().to_string(),
            key: message
                .key()
                .map(|k| String::from_utf8_lossy(k).to_string()),
            payload: payload.to_vec(),
        };

        Ok((record, offset))
    }
}

pub struct Offset {
    handle: Weak<Inner>,
    topic: String,
    partition: i32,
    offset: i64,
}

impl Offset {
    pub fn store(self) -> Result<(), OffsetErr> {
        let inner = self.handle.upgrade().ok_or(OffsetErr::Gone)?;
        inner
            .consumer
            .store_offset(&self.topic, self.partition, self.offset)?;
        Ok(())
    }
}
