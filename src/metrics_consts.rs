pub const EVENTS_RECEIVED: &str = "multi_event_events_received";
pub const EMPTY_PAYLOADS: &str = "multi_event_empty_payloads";
pub const DECODE_FAILURES: &str = "multi_event_decode_failures";
pub const UNBOUND_TOPIC_RECORDS: &str = "multi_event_unbound_topic_records";
pub const NO_ACTION_RECORDS: &str = "multi_event_no_action_records";
pub const STORE_FAILURES: &str = "multi_event_store_failures";
pub const FOLD_TIME: &str = "multi_event_fold_time_ms";
pub const AGGREGATES_EMITTED: &str = "multi_event_aggregates_emitted";
pub const EMIT_FAILURES: &str = "multi_event_emit_failures";
pub const AGGREGATES_TRACKED: &str = "multi_event_aggregates_tracked";
pub const OFFSET_STORE_FAILURES: &str = "multi_event_offset_store_failures";
