use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Plain JSON envelope used by the incident-reported and responder-updated
/// topics. Unknown fields are ignored; missing fields fall back to defaults
/// so the gate can inspect partially formed messages before rejecting them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Message<T> {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub message_type: String,
    #[serde(default)]
    pub invoking_service: String,
    /// Epoch millis
    #[serde(default)]
    pub timestamp: i64,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub header: HashMap<String, String>,
    pub body: T,
}

impl<T> Message<T> {
    pub fn header_value(&self, key: &str) -> Option<&str> {
        self.header.get(key).map(String::as_str)
    }
}

/// CloudEvents-shaped envelope used by the mission-event topic. Attributes
/// travel as broker headers (binary mode); `data` is the raw payload bytes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InboundEnvelope {
    pub id: String,
    pub event_type: String,
    pub source: String,
    pub data_content_type: Option<String>,
    pub time: Option<String>,
    pub extensions: HashMap<String, String>,
    pub data: Vec<u8>,
}

impl InboundEnvelope {
    pub fn is_json(&self) -> bool {
        self.data_content_type
            .as_deref()
            .is_some_and(|ct| ct.eq_ignore_ascii_case("application/json"))
    }

    pub fn extension(&self, name: &str) -> Option<&str> {
        self.extensions.get(name).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_deserializes_with_header() {
        let raw = r#"{
            "id": "msg-1",
            "messageType": "ResponderUpdatedEvent",
            "invokingService": "ResponderService",
            "timestamp": 1597697375000,
            "header": {"incidentId": "incident-1"},
            "body": {"status": "success"}
        }"#;

        let message: Message<serde_json::Value> = serde_json::from_str(raw).unwrap();
        assert_eq!(message.message_type, "ResponderUpdatedEvent");
        assert_eq!(message.header_value("incidentId"), Some("incident-1"));
        assert_eq!(message.header_value("missing"), None);
    }

    #[test]
    fn test_message_tolerates_missing_fields() {
        let raw = r#"{"body": {"status": "success"}, "extra": 42}"#;

        let message: Message<serde_json::Value> = serde_json::from_str(raw).unwrap();
        assert_eq!(message.message_type, "");
        assert!(message.header.is_empty());
    }

    #[test]
    fn test_inbound_envelope_content_type_is_case_insensitive() {
        let envelope = InboundEnvelope {
            data_content_type: Some("Application/JSON".to_string()),
            ..Default::default()
        };
        assert!(envelope.is_json());

        let envelope = InboundEnvelope {
            data_content_type: Some("text/plain".to_string()),
            ..Default::default()
        };
        assert!(!envelope.is_json());

        assert!(!InboundEnvelope::default().is_json());
    }
}
