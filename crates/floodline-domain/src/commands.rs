use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::rules::Responder;

/// Mission creation command sent to the mission service. Every field is a
/// string on the wire, decimals included; `process_id` carries the engine
/// instance id so downstream events can be routed back.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CreateMissionCommand {
    pub incident_id: String,
    pub responder_id: String,
    pub responder_start_lat: String,
    pub responder_start_long: String,
    pub incident_lat: String,
    pub incident_long: String,
    pub destination_lat: String,
    pub destination_long: String,
    pub process_id: String,
}

/// Assignment outcome event for the incident's audit trail.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct IncidentAssignmentEvent {
    pub incident_id: String,
    pub assignment: bool,
    pub lat: Decimal,
    pub lon: Decimal,
}

/// Marks the responder available again, positioned at the mission's
/// destination.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UpdateResponderCommand {
    pub responder: Responder,
}

/// Marks the responder unavailable while on a mission.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SetResponderUnavailableCommand {
    pub responder: Responder,
}
