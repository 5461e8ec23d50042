pub mod discriminator;
pub mod registry;
pub mod wrapper;

pub use registry::{SchemaResolver, StaticSchemaResolver};

use std::fmt;
use std::str::FromStr;

use serde_json::Value;

use crate::types::{CustomerEvent, EventEnvelope};

/// Canonical writer-schema full names. The registry and discriminator decode
/// paths both dispatch through this fixed name table, so a type that one can
/// route, the other can too.
pub const PAGE_VIEW_SCHEMA: &str = "commerce.events.PageView";
pub const PURCHASE_SCHEMA: &str = "commerce.events.Purchase";

/// How event values are laid out on a topic. A topic carries exactly one
/// format for its lifetime; the binding is fixed startup configuration.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum WireFormat {
    /// One statically-typed container per record, with an `id` field and at
    /// most one populated action sub-field.
    Wrapper,
    /// Bare payloads under the registry framing (magic byte plus schema id);
    /// the writer schema resolved out of band decides the variant.
    Registry,
    /// Payloads carrying an explicit `type` field naming their schema.
    Discriminator,
}

impl fmt::Display for WireFormat {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            WireFormat::Wrapper => write!(f, "wrapper"),
            WireFormat::Registry => write!(f, "registry"),
            WireFormat::Discriminator => write!(f, "discriminator"),
        }
    }
}

impl FromStr for WireFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_ref() {
            "wrapper" => Ok(WireFormat::Wrapper),
            "registry" => Ok(WireFormat::Registry),
            "discriminator" => Ok(WireFormat::Discriminator),
            _ => Err(format!(
                "unknown wire format: {s}, must be wrapper, registry or discriminator"
            )),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// Encode was asked to represent a variant the chosen format has no
    /// shape for. Fatal to that encode call only.
    #[error("{0} events are not representable in the {1} format")]
    UnsupportedVariant(&'static str, WireFormat),
    /// The record's outer structure is inconsistent with a well-formed
    /// single-action or no-action record.
    #[error("malformed envelope: {0}")]
    MalformedEnvelope(String),
    /// The resolved schema or type name is not in the name table. Hard
    /// failure: silently misrouting a customer's events is worse than
    /// dropping the record on the floor with a visible error.
    #[error("unknown schema: {0}")]
    UnknownSchema(String),
    #[error("payload error: {0}")]
    Payload(#[from] serde_json::Error),
}

/// Encodes one envelope under the given format. The routing key is derived
/// from the payload by construction, so the produced record is keyed
/// consistently with its contents.
pub fn encode(
    format: WireFormat,
    resolver: &dyn SchemaResolver,
    envelope: &EventEnvelope,
) -> Result<Vec<u8>, CodecError> {
    match format {
        WireFormat::Wrapper => wrapper::encode(envelope),
        WireFormat::Registry => registry::encode(resolver, envelope),
        WireFormat::Discriminator => discriminator::encode(envelope),
    }
}

/// Decodes record bytes under the given format. All three paths converge on
/// the same envelope representation, so the aggregator downstream never
/// learns which format a record arrived under.
pub fn decode(
    format: WireFormat,
    resolver: &dyn SchemaResolver,
    payload: &[u8],
) -> Result<EventEnvelope, CodecError> {
    match format {
        WireFormat::Wrapper => wrapper::decode(payload),
        WireFormat::Registry => registry::decode(resolver, payload),
        WireFormat::Discriminator => discriminator::decode(payload),
    }
}

/// The full name under which an event's schema is registered, used by the
/// encode paths that carry type information out of band. The no-action
/// sentinel has no schema of its own.
pub(crate) fn schema_name(event: &CustomerEvent) -> Option<&'static str> {
    match event {
        CustomerEvent::PageView(_) => Some(PAGE_VIEW_SCHEMA),
        CustomerEvent::Purchase(_) => Some(PURCHASE_SCHEMA),
        CustomerEvent::NoAction => None,
    }
}

/// Maps a resolved full name to the matching variant constructor. Names
/// outside the table are a hard `UnknownSchema` failure.
pub(crate) fn event_for_schema(full_name: &str, payload: Value) -> Result<CustomerEvent, CodecError> {
    match full_name {
        PAGE_VIEW_SCHEMA => Ok(CustomerEvent::PageView(serde_json::from_value(payload)?)),
        PURCHASE_SCHEMA => Ok(CustomerEvent::Purchase(serde_json::from_value(payload)?)),
        other => Err(CodecError::UnknownSchema(other.to_string())),
    }
}

/// Shared by the registry and discriminator decode paths: both resolve a
/// name, construct the event, and derive the routing key from the embedded
/// customer id.
pub(crate) fn envelope_for_schema(
    full_name: &str,
    payload: Value,
) -> Result<EventEnvelope, CodecError> {
    let event = event_for_schema(full_name, payload)?;
    EventEnvelope::from_event(event)
        .ok_or_else(|| CodecError::MalformedEnvelope("payload carries no customer id".to_string()))
}
