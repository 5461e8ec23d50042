use serde::{Deserialize, Serialize};

use crate::codec::CodecError;
use crate::types::{CustomerEvent, EventEnvelope, PageView, Purchase};

/// The wrapper format's statically-typed container. Which optional
/// sub-field is populated determines the active variant; a container with
/// none populated is a valid no-action record, not an error.
#[derive(Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct CustomerEventContainer {
    /// The customer id, doubling as the record's routing key.
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_view: Option<PageView>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purchase: Option<Purchase>,
}

pub(crate) fn encode(envelope: &EventEnvelope) -> Result<Vec<u8>, CodecError> {
    let mut container = CustomerEventContainer {
        id: envelope.routing_key.clone(),
        page_view: None,
        purchase: None,
    };
    match &envelope.event {
        CustomerEvent::PageView(pv) => container.page_view = Some(pv.clone()),
        CustomerEvent::Purchase(p) => container.purchase = Some(p.clone()),
        // An empty container round-trips back to the sentinel.
        CustomerEvent::NoAction => {}
    }
    Ok(serde_json::to_vec(&container)?)
}

pub(crate) fn decode(payload: &[u8]) -> Result<EventEnvelope, CodecError> {
    let container: CustomerEventContainer = serde_json::from_slice(payload)
        .map_err(|e| CodecError::MalformedEnvelope(e.to_string()))?;

    let event = match (container.page_view, container.purchase) {
        (Some(pv), None) => CustomerEvent::PageView(pv),
        (None, Some(p)) => CustomerEvent::Purchase(p),
        (None, None) => CustomerEvent::NoAction,
        (Some(_), Some(_)) => {
            return Err(CodecError::MalformedEnvelope(
                "more than one action sub-field populated".to_string(),
            ))
        }
    };

    Ok(EventEnvelope {
        routing_key: container.id,
        event,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_container_is_the_sentinel() {
        let envelope = decode(br#"{"id":"c9"}"#).unwrap();
        assert_eq!(envelope.routing_key, "c9");
        assert_eq!(envelope.event, CustomerEvent::NoAction);
    }

    #[test]
    fn two_populated_sub_fields_are_malformed() {
        let raw = br#"{"id":"c9",
            "page_view":{"customer_id":"c9","url":"u","is_special":false},
            "purchase":{"customer_id":"c9","item":"i","amount":1.0}}"#;
        assert!(matches!(
            decode(raw),
            Err(CodecError::MalformedEnvelope(_))
        ));
    }
}
