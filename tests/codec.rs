use multi_event_aggregator::codec::{
    self, CodecError, StaticSchemaResolver, WireFormat, PAGE_VIEW_SCHEMA, PURCHASE_SCHEMA,
};
use multi_event_aggregator::types::{CustomerEvent, EventEnvelope, PageView, Purchase};

fn resolver() -> StaticSchemaResolver {
    StaticSchemaResolver::new([
        (1, PAGE_VIEW_SCHEMA.to_string()),
        (2, PURCHASE_SCHEMA.to_string()),
    ])
}

fn page_view() -> CustomerEvent {
    CustomerEvent::PageView(PageView {
        customer_id: "vandelay1234".to_string(),
        url: "https://acme.commerce/sale".to_string(),
        is_special: true,
    })
}

fn purchase() -> CustomerEvent {
    CustomerEvent::Purchase(Purchase {
        customer_id: "vandelay1234".to_string(),
        item: "flux-capacitor".to_string(),
        amount: 437.83,
    })
}

#[test]
fn every_format_round_trips_every_supported_variant() {
    let resolver = resolver();
    for format in [
        WireFormat::Wrapper,
        WireFormat::Registry,
        WireFormat::Discriminator,
    ] {
        for event in [page_view(), purchase()] {
            let envelope = EventEnvelope::from_event(event).unwrap();
            let bytes = codec::encode(format, &resolver, &envelope).unwrap();
            let decoded = codec::decode(format, &resolver, &bytes).unwrap();
            assert_eq!(decoded, envelope, "round trip failed under {format}");
        }
    }
}

#[test]
fn decoded_envelopes_are_format_agnostic() {
    // The same logical event must decode identically under all three
    // formats, so the aggregator never learns which topic a record came from.
    let resolver = resolver();
    let envelope = EventEnvelope::from_event(purchase()).unwrap();

    let decoded: Vec<EventEnvelope> = [
        WireFormat::Wrapper,
        WireFormat::Registry,
        WireFormat::Discriminator,
    ]
    .into_iter()
    .map(|format| {
        let bytes = codec::encode(format, &resolver, &envelope).unwrap();
        codec::decode(format, &resolver, &bytes).unwrap()
    })
    .collect();

    assert_eq!(decoded[0], decoded[1]);
    assert_eq!(decoded[1], decoded[2]);
}

#[test]
fn empty_wrapper_container_decodes_to_no_action() {
    let resolver = resolver();
    let envelope = codec::decode(WireFormat::Wrapper, &resolver, br#"{"id":"vandelay1234"}"#)
        .expect("an empty container is well-formed, not an error");
    assert_eq!(envelope.routing_key, "vandelay1234");
    assert_eq!(envelope.event, CustomerEvent::NoAction);
}

#[test]
fn no_action_round_trips_through_the_wrapper_format() {
    let resolver = resolver();
    let envelope = EventEnvelope {
        routing_key: "vandelay1234".to_string(),
        event: CustomerEvent::NoAction,
    };
    let bytes = codec::encode(WireFormat::Wrapper, &resolver, &envelope).unwrap();
    let decoded = codec::decode(WireFormat::Wrapper, &resolver, &bytes).unwrap();
    assert_eq!(decoded, envelope);
}

#[test]
fn no_action_is_unsupported_outside_the_wrapper_format() {
    let resolver = resolver();
    let envelope = EventEnvelope {
        routing_key: "vandelay1234".to_string(),
        event: CustomerEvent::NoAction,
    };
    for format in [WireFormat::Registry, WireFormat::Discriminator] {
        assert!(matches!(
            codec::encode(format, &resolver, &envelope),
            Err(CodecError::UnsupportedVariant(_, _))
        ));
    }
}

#[test]
fn malformed_wrapper_container_is_rejected() {
    let resolver = resolver();
    assert!(matches!(
        codec::decode(WireFormat::Wrapper, &resolver, b"not json at all"),
        Err(CodecError::MalformedEnvelope(_))
    ));
}

#[test]
fn unresolvable_registry_schema_is_a_hard_failure() {
    // Schema id 9 is registered nowhere; routing the payload anyway could
    // fold it into the wrong customer's aggregate.
    let resolver = resolver();
    let mut bytes = vec![0u8, 0, 0, 0, 9];
    bytes.extend_from_slice(br#"{"customer_id":"vandelay1234","item":"x","amount":1.0}"#);
    assert!(matches!(
        codec::decode(WireFormat::Registry, &resolver, &bytes),
        Err(CodecError::UnknownSchema(_))
    ));
}

#[test]
fn unknown_discriminator_type_is_a_hard_failure() {
    let resolver = resolver();
    let raw = br#"{"type":"commerce.events.Refund","customer_id":"vandelay1234"}"#;
    assert!(matches!(
        codec::decode(WireFormat::Discriminator, &resolver, raw),
        Err(CodecError::UnknownSchema(_))
    ));
}

#[test]
fn registry_encode_fails_for_names_missing_from_the_table() {
    // A resolver missing the purchase schema cannot produce purchase
    // records; the failure is per-call and explicit.
    let partial = StaticSchemaResolver::new([(1, PAGE_VIEW_SCHEMA.to_string())]);
    let envelope = EventEnvelope::from_event(purchase()).unwrap();
    assert!(matches!(
        codec::encode(WireFormat::Registry, &partial, &envelope),
        Err(CodecError::UnknownSchema(_))
    ));
}

#[test]
fn routing_key_always_equals_the_embedded_customer_id() {
    let resolver = resolver();
    for format in [
        WireFormat::Wrapper,
        WireFormat::Registry,
        WireFormat::Discriminator,
    ] {
        let envelope = EventEnvelope::from_event(page_view()).unwrap();
        let bytes = codec::encode(format, &resolver, &envelope).unwrap();
        let decoded = codec::decode(format, &resolver, &bytes).unwrap();
        assert_eq!(
            Some(decoded.routing_key.as_str()),
            decoded.event.customer_id()
        );
    }
}
