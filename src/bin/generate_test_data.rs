use envconfig::Envconfig;
use multi_event_aggregator::{
    codec,
    config::Config,
    types::{CustomerEvent, EventEnvelope, PageView, Purchase},
};
use rdkafka::{
    producer::{FutureProducer, FutureRecord},
    ClientConfig,
};

fn sample_events() -> Vec<CustomerEvent> {
    vec![
        CustomerEvent::PageView(PageView {
            customer_id: "vandelay1234".to_string(),
            url: "https://acme.commerce/sale".to_string(),
            is_special: true,
        }),
        CustomerEvent::Purchase(Purchase {
            customer_id: "vandelay1234".to_string(),
            item: "flux-capacitor".to_string(),
            amount: 437.83,
        }),
    ]
}

// A simple producer that pushes the sample events into every bound topic,
// encoded under that topic's wire format
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::init_from_env()?;
    let resolver = config.schema_table.resolver();

    let mut client_config = ClientConfig::new();
    client_config.set("bootstrap.servers", &config.kafka.kafka_hosts);
    let producer: FutureProducer = client_config.create()?;

    let mut acks = Vec::new();
    for topic in config.topic_bindings.topics() {
        let format = config
            .topic_bindings
            .format_for(topic)
            .expect("topic comes from the bindings");
        println!("Producing {} records to {}", format, topic);

        for event in sample_events() {
            let envelope = EventEnvelope::from_event(event).expect("sample events carry an id");
            let payload = codec::encode(format, &resolver, &envelope)?;
            let record = FutureRecord {
                topic,
                key: Some(&envelope.routing_key),
                payload: Some(payload.as_slice()),
                partition: None,
                timestamp: None,
                headers: None,
            };
            let ack = producer.send_result(record).map_err(|(e, _)| e)?;
            acks.push(ack);
        }
    }

    for ack in acks {
        ack.await?.map_err(|(e, _)| e)?;
    }
    println!("Produced all sample events");
    Ok(())
}
