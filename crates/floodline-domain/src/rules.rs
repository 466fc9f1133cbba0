use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// Canonical incident status domain.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum IncidentStatus {
    Reported,
    Assigned,
    Pickedup,
    Cancelled,
    Rescued,
}

impl IncidentStatus {
    /// Maps a mission status reported by the workflow onto the canonical
    /// incident status. Input comparison is case-insensitive; anything
    /// outside the recognized set is an error.
    pub fn from_mission_status(status: &str) -> DomainResult<Self> {
        match status.to_ascii_lowercase().as_str() {
            "assigned" => Ok(IncidentStatus::Assigned),
            "pickedup" => Ok(IncidentStatus::Pickedup),
            "delivered" => Ok(IncidentStatus::Rescued),
            other => Err(DomainError::UnrecognizedIncidentStatus(other.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            IncidentStatus::Reported => "REPORTED",
            IncidentStatus::Assigned => "ASSIGNED",
            IncidentStatus::Pickedup => "PICKEDUP",
            IncidentStatus::Cancelled => "CANCELLED",
            IncidentStatus::Rescued => "RESCUED",
        }
    }
}

/// Incident projection passed to and from workflow steps. Absent fields are
/// omitted on serialization so partial projections (id plus status) stay
/// minimal on the wire.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Incident {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_people: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub medical_needed: Option<bool>,
    /// Epoch millis
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reported_time: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl Incident {
    /// An incident is active until the workflow moves it past REPORTED.
    pub fn is_active(&self) -> bool {
        match self.status.as_deref() {
            None => true,
            Some(status) => status.eq_ignore_ascii_case(IncidentStatus::Reported.as_str()),
        }
    }
}

/// Mission projection produced by the workflow's assignment step.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Mission {
    pub incident_id: String,
    pub responder_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub responder_start_lat: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub responder_start_long: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub incident_lat: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub incident_long: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination_lat: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination_long: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl Mission {
    pub fn is_assigned(&self) -> bool {
        self.status.as_deref() == Some("ASSIGNED")
    }
}

/// Responder projection carried by responder-directed commands.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Responder {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<Decimal>,
}
