use async_nats::HeaderMap;
use floodline_domain::InboundEnvelope;

const CE_PREFIX: &str = "ce-";

/// Rebuild a binary-mode CloudEvents envelope from broker headers.
///
/// Attribute headers are matched case-insensitively. Unrecognized `ce-`
/// headers become extensions with the prefix stripped and the name
/// lowercased. Multi-valued headers keep their first value.
pub fn envelope_from_headers(headers: &HeaderMap, payload: &[u8]) -> InboundEnvelope {
    let mut envelope = InboundEnvelope {
        data: payload.to_vec(),
        ..Default::default()
    };

    for (name, values) in headers.iter() {
        let Some(value) = values.first() else {
            continue;
        };
        let value = value.as_str().to_string();

        let name: &str = name.as_ref();
        match name.to_ascii_lowercase().as_str() {
            "ce-id" => envelope.id = value,
            "ce-type" => envelope.event_type = value,
            "ce-source" => envelope.source = value,
            "ce-specversion" => {}
            "ce-datacontenttype" => envelope.data_content_type = Some(value),
            "ce-time" => envelope.time = Some(value),
            other => {
                if let Some(extension) = other.strip_prefix(CE_PREFIX) {
                    envelope.extensions.insert(extension.to_string(), value);
                }
            }
        }
    }

    envelope
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_from_headers_maps_attributes() {
        let mut headers = HeaderMap::new();
        headers.insert("ce-id", "evt-1");
        headers.insert("Ce-Type", "MissionStartedEvent");
        headers.insert("ce-specversion", "1.0");
        headers.insert("ce-source", "floodline/mission-service");
        headers.insert("CE-DataContentType", "application/json");
        headers.insert("ce-time", "2020-08-17T20:09:35Z");
        headers.insert("ce-incidentid", "incident-1");

        let envelope = envelope_from_headers(&headers, br#"{"missionId":"mission-1"}"#);

        assert_eq!(envelope.id, "evt-1");
        assert_eq!(envelope.event_type, "MissionStartedEvent");
        assert_eq!(envelope.source, "floodline/mission-service");
        assert!(envelope.is_json());
        assert_eq!(envelope.time.as_deref(), Some("2020-08-17T20:09:35Z"));
        assert_eq!(envelope.extension("incidentid"), Some("incident-1"));
        assert_eq!(envelope.extension("specversion"), None);
        assert_eq!(envelope.data, br#"{"missionId":"mission-1"}"#.to_vec());
    }

    #[test]
    fn test_envelope_from_headers_ignores_non_ce_headers() {
        let mut headers = HeaderMap::new();
        headers.insert("ce-type", "MissionStartedEvent");
        headers.insert("Nats-Msg-Id", "abc-123");
        headers.insert("content-type", "application/json");

        let envelope = envelope_from_headers(&headers, b"{}");

        assert_eq!(envelope.event_type, "MissionStartedEvent");
        assert!(envelope.extensions.is_empty());
        // The transport content-type header is not a CloudEvents attribute
        assert!(!envelope.is_json());
    }

    #[test]
    fn test_envelope_from_headers_keeps_first_of_repeated_values() {
        let mut headers = HeaderMap::new();
        headers.append("ce-type", "MissionStartedEvent");
        headers.append("ce-type", "MissionCompletedEvent");

        let envelope = envelope_from_headers(&headers, b"{}");

        assert_eq!(envelope.event_type, "MissionStartedEvent");
    }

    #[test]
    fn test_envelope_from_headers_defaults_when_empty() {
        let envelope = envelope_from_headers(&HeaderMap::new(), b"payload");

        assert!(envelope.event_type.is_empty());
        assert!(envelope.data_content_type.is_none());
        assert!(!envelope.is_json());
        assert_eq!(envelope.data, b"payload".to_vec());
    }
}
