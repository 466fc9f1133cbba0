use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::signal::{SIGNAL_MISSION_STARTED, SIGNAL_VICTIM_DELIVERED, SIGNAL_VICTIM_PICKED_UP};

pub const INCIDENT_REPORTED_EVENT: &str = "IncidentReportedEvent";
pub const MISSION_STARTED_EVENT: &str = "MissionStartedEvent";
pub const MISSION_PICKED_UP_EVENT: &str = "MissionPickedUpEvent";
pub const MISSION_COMPLETED_EVENT: &str = "MissionCompletedEvent";
pub const RESPONDER_UPDATED_EVENT: &str = "ResponderUpdatedEvent";

/// Body of an incident-reported message. Coordinates are exact decimals;
/// `timestamp` is epoch millis.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct IncidentReportedEvent {
    pub id: String,
    pub lat: Decimal,
    pub lon: Decimal,
    pub number_of_people: i32,
    pub medical_needed: bool,
    pub timestamp: i64,
}

/// Shared body shape of the three mission lifecycle events. Only the ids
/// matter for correlation; every other field is ignored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MissionLifecycleEvent {
    #[serde(default)]
    pub mission_id: String,
    #[serde(default)]
    pub incident_id: Option<String>,
}

/// Body of a responder-updated message. Correlation travels in the envelope
/// header, not here.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ResponderUpdatedEvent {
    #[serde(default)]
    pub status: String,
}

impl ResponderUpdatedEvent {
    /// The update reports the responder as available only on success.
    pub fn is_available(&self) -> bool {
        self.status == "success"
    }
}

/// Maps a mission lifecycle event type to the workflow signal it triggers.
pub fn signal_for_mission_event(event_type: &str) -> Option<&'static str> {
    match event_type {
        MISSION_STARTED_EVENT => Some(SIGNAL_MISSION_STARTED),
        MISSION_PICKED_UP_EVENT => Some(SIGNAL_VICTIM_PICKED_UP),
        MISSION_COMPLETED_EVENT => Some(SIGNAL_VICTIM_DELIVERED),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mission_event_signal_mapping() {
        assert_eq!(
            signal_for_mission_event(MISSION_STARTED_EVENT),
            Some(SIGNAL_MISSION_STARTED)
        );
        assert_eq!(
            signal_for_mission_event(MISSION_PICKED_UP_EVENT),
            Some(SIGNAL_VICTIM_PICKED_UP)
        );
        assert_eq!(
            signal_for_mission_event(MISSION_COMPLETED_EVENT),
            Some(SIGNAL_VICTIM_DELIVERED)
        );
        assert_eq!(signal_for_mission_event("MissionCancelledEvent"), None);
    }

    #[test]
    fn test_responder_availability_from_status() {
        let updated = ResponderUpdatedEvent {
            status: "success".to_string(),
        };
        assert!(updated.is_available());

        let errored = ResponderUpdatedEvent {
            status: "error".to_string(),
        };
        assert!(!errored.is_available());
    }

    #[test]
    fn test_mission_lifecycle_event_ignores_unknown_fields() {
        let raw = r#"{
            "missionId": "mission-1",
            "incidentId": "incident-1",
            "responderId": "responder-1",
            "status": "CREATED"
        }"#;

        let event: MissionLifecycleEvent = serde_json::from_str(raw).unwrap();
        assert_eq!(event.mission_id, "mission-1");
        assert_eq!(event.incident_id.as_deref(), Some("incident-1"));
    }
}
