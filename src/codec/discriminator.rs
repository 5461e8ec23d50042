use serde_json::Value;

use crate::codec::{envelope_for_schema, schema_name, CodecError, WireFormat};
use crate::types::{CustomerEvent, EventEnvelope};

/// The in-payload field naming the record's schema.
const TYPE_FIELD: &str = "type";

pub(crate) fn encode(envelope: &EventEnvelope) -> Result<Vec<u8>, CodecError> {
    let Some(name) = schema_name(&envelope.event) else {
        return Err(CodecError::UnsupportedVariant(
            envelope.event.kind(),
            WireFormat::Discriminator,
        ));
    };

    let value = match &envelope.event {
        CustomerEvent::PageView(pv) => serde_json::to_value(pv)?,
        CustomerEvent::Purchase(p) => serde_json::to_value(p)?,
        // schema_name returned None above
        CustomerEvent::NoAction => Value::Null,
    };

    let Value::Object(mut fields) = value else {
        return Err(CodecError::MalformedEnvelope(
            "event did not serialize to an object".to_string(),
        ));
    };
    fields.insert(TYPE_FIELD.to_string(), Value::String(name.to_string()));
    Ok(serde_json::to_vec(&Value::Object(fields))?)
}

pub(crate) fn decode(payload: &[u8]) -> Result<EventEnvelope, CodecError> {
    let value: Value = serde_json::from_slice(payload)?;
    let Value::Object(mut fields) = value else {
        return Err(CodecError::MalformedEnvelope(
            "payload is not an object".to_string(),
        ));
    };

    let Some(Value::String(full_name)) = fields.remove(TYPE_FIELD) else {
        return Err(CodecError::MalformedEnvelope(format!(
            "payload carries no {TYPE_FIELD} field"
        )));
    };

    envelope_for_schema(&full_name, Value::Object(fields))
}
