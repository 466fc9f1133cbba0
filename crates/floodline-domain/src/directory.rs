use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::DomainResult;

/// Responder as returned by the responder directory.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AvailableResponder {
    pub id: i64,
    pub name: String,
    pub phone_number: String,
    pub latitude: Decimal,
    pub longitude: Decimal,
    pub boat_capacity: i32,
    pub medical_kit: bool,
}

/// Responder shape expected by the workflow's assignment rules.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ResponderProfile {
    pub id: String,
    pub fullname: String,
    pub phone_number: String,
    pub latitude: Decimal,
    pub longitude: Decimal,
    pub boat_capacity: i32,
    pub has_medical: bool,
}

impl From<AvailableResponder> for ResponderProfile {
    fn from(responder: AvailableResponder) -> Self {
        Self {
            id: responder.id.to_string(),
            fullname: responder.name,
            phone_number: responder.phone_number,
            latitude: responder.latitude,
            longitude: responder.longitude,
            boat_capacity: responder.boat_capacity,
            has_medical: responder.medical_kit,
        }
    }
}

/// Evacuation destination from the disaster-service shelter list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Shelter {
    pub name: String,
    pub lat: Decimal,
    pub lon: Decimal,
}

/// Priority query for one incident.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PriorityRequest {
    pub incident_id: String,
    pub lat: Option<Decimal>,
    pub lon: Option<Decimal>,
    pub active: bool,
}

/// Priority verdict for one incident. `Default` doubles as the degraded
/// zero-value result when the priority service is unreachable.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct IncidentPriority {
    pub incident_id: String,
    pub priority: i32,
    pub average: f64,
    pub incidents: i32,
}

#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait ResponderDirectory: Send + Sync {
    /// All responders currently marked available
    async fn available_responders(&self) -> DomainResult<Vec<AvailableResponder>>;
}

#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait ShelterDirectory: Send + Sync {
    /// All evacuation shelters
    async fn shelters(&self) -> DomainResult<Vec<Shelter>>;
}

#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait PriorityService: Send + Sync {
    /// Current priority standing for the incident
    async fn incident_priority(&self, request: PriorityRequest) -> DomainResult<IncidentPriority>;
}
