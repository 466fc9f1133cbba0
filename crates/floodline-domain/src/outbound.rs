use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::Value;

use crate::commands::{
    CreateMissionCommand, IncidentAssignmentEvent, SetResponderUnavailableCommand,
    UpdateResponderCommand,
};
use crate::error::{DomainError, DomainResult};
use crate::rules::{Incident, IncidentStatus, Mission, Responder};

pub const OUTBOUND_SPEC_VERSION: &str = "1.0";
pub const OUTBOUND_SOURCE: &str = "floodline/process-service";
pub const OUTBOUND_CONTENT_TYPE: &str = "application/json";

/// Canonical CloudEvents-style record handed to the outbox emitter.
/// `aggregate_type` is the logical destination; `aggregate_id` the routing
/// key. The incident extension is written as the empty string downstream
/// when `incident_id` is `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct OutboundEnvelope {
    pub event_type: String,
    pub payload: Value,
    pub aggregate_type: String,
    pub aggregate_id: String,
    pub incident_id: Option<String>,
    pub time: DateTime<Utc>,
}

/// Step parameters handed to a builder: the rules-model payload plus the
/// engine instance id of the delegating process.
#[derive(Debug, Clone)]
pub struct StepInput {
    pub payload: Value,
    pub process_instance_id: Option<i64>,
}

/// Closed set of outbound message types. Tags arrive as workflow step
/// parameters; anything outside this set is a wiring defect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutboundMessageType {
    CreateMission,
    UpdateIncident,
    IncidentAssignment,
    UpdateResponder,
    SetResponderUnavailable,
}

impl OutboundMessageType {
    pub fn parse(tag: &str) -> DomainResult<Self> {
        match tag {
            "CreateMission" => Ok(OutboundMessageType::CreateMission),
            "UpdateIncident" => Ok(OutboundMessageType::UpdateIncident),
            "IncidentAssignment" => Ok(OutboundMessageType::IncidentAssignment),
            "UpdateResponder" => Ok(OutboundMessageType::UpdateResponder),
            "SetResponderUnavailable" => Ok(OutboundMessageType::SetResponderUnavailable),
            other => Err(DomainError::UnknownMessageType(other.to_string())),
        }
    }

    pub fn event_type(&self) -> &'static str {
        match self {
            OutboundMessageType::CreateMission => "CreateMissionCommand",
            OutboundMessageType::UpdateIncident => "UpdateIncidentCommand",
            OutboundMessageType::IncidentAssignment => "IncidentAssignmentEvent",
            OutboundMessageType::UpdateResponder => "UpdateResponderCommand",
            OutboundMessageType::SetResponderUnavailable => "SetResponderUnavailableCommand",
        }
    }

    pub fn aggregate_type(&self) -> &'static str {
        match self {
            OutboundMessageType::CreateMission => "mission-command",
            OutboundMessageType::UpdateIncident => "incident-command",
            OutboundMessageType::IncidentAssignment => "incident-event",
            OutboundMessageType::UpdateResponder => "responder-command",
            OutboundMessageType::SetResponderUnavailable => "responder-command",
        }
    }

    /// Builds the outbound envelope for this message type. Builders are
    /// pure: step parameters in, envelope out. Missing or wrong-typed
    /// payload fields are invalid-step errors, never retried.
    pub fn build(&self, input: &StepInput) -> DomainResult<OutboundEnvelope> {
        match self {
            OutboundMessageType::CreateMission => build_create_mission(input),
            OutboundMessageType::UpdateIncident => build_update_incident(input),
            OutboundMessageType::IncidentAssignment => build_incident_assignment(input),
            OutboundMessageType::UpdateResponder => build_update_responder(input),
            OutboundMessageType::SetResponderUnavailable => build_set_responder_unavailable(input),
        }
    }
}

fn mission_payload(input: &StepInput) -> DomainResult<Mission> {
    serde_json::from_value(input.payload.clone())
        .map_err(|e| DomainError::InvalidWorkItem(format!("mission payload: {e}")))
}

fn incident_payload(input: &StepInput) -> DomainResult<Incident> {
    serde_json::from_value(input.payload.clone())
        .map_err(|e| DomainError::InvalidWorkItem(format!("incident payload: {e}")))
}

fn required_field(name: &str, value: &str) -> DomainResult<String> {
    if value.is_empty() {
        Err(DomainError::InvalidWorkItem(format!("missing {name}")))
    } else {
        Ok(value.to_string())
    }
}

fn required_coord(name: &str, value: Option<Decimal>) -> DomainResult<Decimal> {
    value.ok_or_else(|| DomainError::InvalidWorkItem(format!("missing {name}")))
}

fn envelope<T: Serialize>(
    message_type: OutboundMessageType,
    payload: &T,
    aggregate_id: String,
    incident_id: Option<String>,
) -> DomainResult<OutboundEnvelope> {
    Ok(OutboundEnvelope {
        event_type: message_type.event_type().to_string(),
        payload: serde_json::to_value(payload)?,
        aggregate_type: message_type.aggregate_type().to_string(),
        aggregate_id,
        incident_id,
        time: Utc::now(),
    })
}

fn build_create_mission(input: &StepInput) -> DomainResult<OutboundEnvelope> {
    let mission = mission_payload(input)?;
    let instance_id = input.process_instance_id.ok_or_else(|| {
        DomainError::InvalidWorkItem("CreateMission requires a process instance id".to_string())
    })?;
    let incident_id = required_field("incidentId", &mission.incident_id)?;
    let responder_id = required_field("responderId", &mission.responder_id)?;

    let command = CreateMissionCommand {
        incident_id: incident_id.clone(),
        responder_id,
        responder_start_lat: required_coord("responderStartLat", mission.responder_start_lat)?
            .to_string(),
        responder_start_long: required_coord("responderStartLong", mission.responder_start_long)?
            .to_string(),
        incident_lat: required_coord("incidentLat", mission.incident_lat)?.to_string(),
        incident_long: required_coord("incidentLong", mission.incident_long)?.to_string(),
        destination_lat: required_coord("destinationLat", mission.destination_lat)?.to_string(),
        destination_long: required_coord("destinationLong", mission.destination_long)?.to_string(),
        process_id: instance_id.to_string(),
    };

    envelope(
        OutboundMessageType::CreateMission,
        &command,
        incident_id.clone(),
        Some(incident_id),
    )
}

fn build_update_incident(input: &StepInput) -> DomainResult<OutboundEnvelope> {
    let incident = incident_payload(input)?;
    let id = required_field("id", &incident.id)?;
    let status = IncidentStatus::from_mission_status(incident.status.as_deref().unwrap_or_default())?;

    let updated = Incident {
        id: id.clone(),
        status: Some(status.as_str().to_string()),
        ..Default::default()
    };

    envelope(
        OutboundMessageType::UpdateIncident,
        &updated,
        id.clone(),
        Some(id),
    )
}

fn build_incident_assignment(input: &StepInput) -> DomainResult<OutboundEnvelope> {
    let mission = mission_payload(input)?;
    let incident_id = required_field("incidentId", &mission.incident_id)?;

    let event = IncidentAssignmentEvent {
        incident_id: incident_id.clone(),
        assignment: mission.is_assigned(),
        lat: required_coord("incidentLat", mission.incident_lat)?,
        lon: required_coord("incidentLong", mission.incident_long)?,
    };

    envelope(
        OutboundMessageType::IncidentAssignment,
        &event,
        incident_id.clone(),
        Some(incident_id),
    )
}

fn build_update_responder(input: &StepInput) -> DomainResult<OutboundEnvelope> {
    let mission = mission_payload(input)?;
    let incident_id = required_field("incidentId", &mission.incident_id)?;
    let responder_id = required_field("responderId", &mission.responder_id)?;

    // The responder comes back available at the mission's destination
    let responder = Responder {
        id: responder_id.clone(),
        available: Some(true),
        latitude: Some(required_coord("destinationLat", mission.destination_lat)?),
        longitude: Some(required_coord("destinationLong", mission.destination_long)?),
    };

    envelope(
        OutboundMessageType::UpdateResponder,
        &UpdateResponderCommand { responder },
        responder_id,
        Some(incident_id),
    )
}

fn build_set_responder_unavailable(input: &StepInput) -> DomainResult<OutboundEnvelope> {
    let mission = mission_payload(input)?;
    let incident_id = required_field("incidentId", &mission.incident_id)?;
    let responder_id = required_field("responderId", &mission.responder_id)?;

    let responder = Responder {
        id: responder_id.clone(),
        available: Some(false),
        latitude: None,
        longitude: None,
    };

    envelope(
        OutboundMessageType::SetResponderUnavailable,
        &SetResponderUnavailableCommand { responder },
        responder_id,
        Some(incident_id),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn mission_input(instance_id: Option<i64>) -> StepInput {
        StepInput {
            payload: json!({
                "incidentId": "incident-1",
                "responderId": "responder-64",
                "responderStartLat": "40.12345",
                "responderStartLong": "-80.98765",
                "incidentLat": "34.14338",
                "incidentLong": "-77.86569",
                "destinationLat": "34.17946",
                "destinationLong": "-77.94908",
                "status": "ASSIGNED"
            }),
            process_instance_id: instance_id,
        }
    }

    #[test]
    fn test_create_mission_stringifies_decimals_and_instance_id() {
        let result = OutboundMessageType::CreateMission
            .build(&mission_input(Some(314)))
            .unwrap();

        assert_eq!(result.event_type, "CreateMissionCommand");
        assert_eq!(result.aggregate_type, "mission-command");
        assert_eq!(result.aggregate_id, "incident-1");
        assert_eq!(result.incident_id.as_deref(), Some("incident-1"));
        assert_eq!(
            result.payload,
            json!({
                "incidentId": "incident-1",
                "responderId": "responder-64",
                "responderStartLat": "40.12345",
                "responderStartLong": "-80.98765",
                "incidentLat": "34.14338",
                "incidentLong": "-77.86569",
                "destinationLat": "34.17946",
                "destinationLong": "-77.94908",
                "processId": "314"
            })
        );
    }

    #[test]
    fn test_create_mission_requires_instance_id() {
        let err = OutboundMessageType::CreateMission
            .build(&mission_input(None))
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidWorkItem(_)));
    }

    #[test]
    fn test_create_mission_accepts_numeric_coordinates() {
        let input = StepInput {
            payload: json!({
                "incidentId": "incident-1",
                "responderId": "responder-64",
                "responderStartLat": 40.5,
                "responderStartLong": -80.25,
                "incidentLat": 34.5,
                "incidentLong": -77.75,
                "destinationLat": 34.25,
                "destinationLong": -77.5
            }),
            process_instance_id: Some(1),
        };

        let result = OutboundMessageType::CreateMission.build(&input).unwrap();
        assert_eq!(result.payload["incidentLat"], json!("34.5"));
        assert_eq!(result.payload["destinationLong"], json!("-77.5"));
    }

    #[test]
    fn test_update_incident_maps_status_to_canonical_form() {
        let input = StepInput {
            payload: json!({"id": "incident-1", "status": "delivered"}),
            process_instance_id: Some(1),
        };

        let result = OutboundMessageType::UpdateIncident.build(&input).unwrap();
        assert_eq!(result.event_type, "UpdateIncidentCommand");
        assert_eq!(result.aggregate_type, "incident-command");
        assert_eq!(result.aggregate_id, "incident-1");
        assert_eq!(
            result.payload,
            json!({"id": "incident-1", "status": "RESCUED"})
        );
    }

    #[test]
    fn test_update_incident_rejects_unmapped_status() {
        let input = StepInput {
            payload: json!({"id": "incident-1", "status": "lost"}),
            process_instance_id: None,
        };
        let err = OutboundMessageType::UpdateIncident.build(&input).unwrap_err();
        assert!(matches!(err, DomainError::UnrecognizedIncidentStatus(_)));

        let input = StepInput {
            payload: json!({"id": "incident-1"}),
            process_instance_id: None,
        };
        let err = OutboundMessageType::UpdateIncident.build(&input).unwrap_err();
        assert!(matches!(err, DomainError::UnrecognizedIncidentStatus(_)));
    }

    #[test]
    fn test_incident_assignment_reflects_mission_status() {
        let result = OutboundMessageType::IncidentAssignment
            .build(&mission_input(None))
            .unwrap();

        assert_eq!(result.event_type, "IncidentAssignmentEvent");
        assert_eq!(result.aggregate_type, "incident-event");
        assert_eq!(
            result.payload,
            json!({
                "incidentId": "incident-1",
                "assignment": true,
                "lat": "34.14338",
                "lon": "-77.86569"
            })
        );

        let mut unassigned = mission_input(None);
        unassigned.payload["status"] = json!("UPDATED");
        let result = OutboundMessageType::IncidentAssignment
            .build(&unassigned)
            .unwrap();
        assert_eq!(result.payload["assignment"], json!(false));
    }

    #[test]
    fn test_update_responder_places_responder_at_destination() {
        let result = OutboundMessageType::UpdateResponder
            .build(&mission_input(None))
            .unwrap();

        assert_eq!(result.event_type, "UpdateResponderCommand");
        assert_eq!(result.aggregate_type, "responder-command");
        assert_eq!(result.aggregate_id, "responder-64");
        assert_eq!(result.incident_id.as_deref(), Some("incident-1"));
        assert_eq!(
            result.payload,
            json!({
                "responder": {
                    "id": "responder-64",
                    "available": true,
                    "latitude": "34.17946",
                    "longitude": "-77.94908"
                }
            })
        );
    }

    #[test]
    fn test_set_responder_unavailable_carries_no_coordinates() {
        let result = OutboundMessageType::SetResponderUnavailable
            .build(&mission_input(None))
            .unwrap();

        assert_eq!(result.event_type, "SetResponderUnavailableCommand");
        assert_eq!(result.aggregate_type, "responder-command");
        assert_eq!(result.aggregate_id, "responder-64");
        assert_eq!(
            result.payload,
            json!({"responder": {"id": "responder-64", "available": false}})
        );
    }

    #[test]
    fn test_unknown_tag_is_rejected() {
        let err = OutboundMessageType::parse("KillIncident").unwrap_err();
        assert!(matches!(err, DomainError::UnknownMessageType(_)));
    }

    #[test]
    fn test_wrong_typed_payload_is_an_invalid_step() {
        let input = StepInput {
            payload: json!("not an object"),
            process_instance_id: Some(1),
        };
        let err = OutboundMessageType::CreateMission.build(&input).unwrap_err();
        assert!(matches!(err, DomainError::InvalidWorkItem(_)));
    }

    #[test]
    fn test_missing_mission_fields_are_invalid_steps() {
        let input = StepInput {
            payload: json!({"incidentId": "incident-1", "responderId": "responder-64"}),
            process_instance_id: Some(1),
        };
        let err = OutboundMessageType::CreateMission.build(&input).unwrap_err();
        assert!(matches!(err, DomainError::InvalidWorkItem(_)));
    }
}
