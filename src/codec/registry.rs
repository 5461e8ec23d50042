use std::collections::HashMap;

use serde_json::Value;

use crate::codec::{envelope_for_schema, schema_name, CodecError, WireFormat};
use crate::types::{CustomerEvent, EventEnvelope};

/// Registry framing: one magic byte, then the 4-byte big-endian schema id,
/// then the bare payload with no in-band discriminant.
const MAGIC_BYTE: u8 = 0;
const HEADER_LEN: usize = 5;

/// Maps registry schema ids to writer-schema full names. Injected rather
/// than a concrete registry client, so tests (and single-node deployments)
/// can substitute a fixed table.
pub trait SchemaResolver: Send + Sync {
    fn full_name(&self, schema_id: u32) -> Option<String>;

    /// Reverse lookup, used on the encode path.
    fn schema_id(&self, full_name: &str) -> Option<u32>;
}

/// A fixed id/name table, built from configuration at startup.
#[derive(Clone, Debug, Default)]
pub struct StaticSchemaResolver {
    by_id: HashMap<u32, String>,
    by_name: HashMap<String, u32>,
}

impl StaticSchemaResolver {
    pub fn new(entries: impl IntoIterator<Item = (u32, String)>) -> Self {
        let mut by_id = HashMap::new();
        let mut by_name = HashMap::new();
        for (id, name) in entries {
            by_name.insert(name.clone(), id);
            by_id.insert(id, name);
        }
        Self { by_id, by_name }
    }
}

impl SchemaResolver for StaticSchemaResolver {
    fn full_name(&self, schema_id: u32) -> Option<String> {
        self.by_id.get(&schema_id).cloned()
    }

    fn schema_id(&self, full_name: &str) -> Option<u32> {
        self.by_name.get(full_name).copied()
    }
}

pub(crate) fn encode(
    resolver: &dyn SchemaResolver,
    envelope: &EventEnvelope,
) -> Result<Vec<u8>, CodecError> {
    let Some(name) = schema_name(&envelope.event) else {
        return Err(CodecError::UnsupportedVariant(
            envelope.event.kind(),
            WireFormat::Registry,
        ));
    };
    let schema_id = resolver
        .schema_id(name)
        .ok_or_else(|| CodecError::UnknownSchema(name.to_string()))?;

    let mut buf = Vec::with_capacity(HEADER_LEN + 64);
    buf.push(MAGIC_BYTE);
    buf.extend_from_slice(&schema_id.to_be_bytes());
    match &envelope.event {
        CustomerEvent::PageView(pv) => serde_json::to_writer(&mut buf, pv)?,
        CustomerEvent::Purchase(p) => serde_json::to_writer(&mut buf, p)?,
        // schema_name returned None above
        CustomerEvent::NoAction => {}
    }
    Ok(buf)
}

pub(crate) fn decode(
    resolver: &dyn SchemaResolver,
    payload: &[u8],
) -> Result<EventEnvelope, CodecError> {
    if payload.len() < HEADER_LEN || payload[0] != MAGIC_BYTE {
        return Err(CodecError::MalformedEnvelope(
            "missing registry framing".to_string(),
        ));
    }

    let mut id_bytes = [0u8; 4];
    id_bytes.copy_from_slice(&payload[1..HEADER_LEN]);
    let schema_id = u32::from_be_bytes(id_bytes);

    let full_name = resolver
        .full_name(schema_id)
        .ok_or_else(|| CodecError::UnknownSchema(format!("registry schema id {schema_id}")))?;

    let value: Value = serde_json::from_slice(&payload[HEADER_LEN..])?;
    envelope_for_schema(&full_name, value)
}
