use std::sync::Arc;

use floodline_domain::{
    CorrelationKey, DomainResult, Incident, IncidentReportedEvent, Message, NewProcess,
    WorkflowEngine, INCIDENT_REPORTED_EVENT,
};
use serde_json::{json, Value};
use tracing::{debug, error, info, instrument, warn};

/// Domain service that turns incident reports into new rescue workflow
/// instances.
///
/// Flow:
/// 1. Decode the JSON message envelope and gate on the message type
/// 2. Project the report into the incident shape the workflow expects
/// 3. Start a process instance correlated by the incident id
///
/// Malformed or unrelated messages are logged and acknowledged; only engine
/// failures propagate so the broker redelivers.
pub struct IncidentEventService {
    engine: Arc<dyn WorkflowEngine>,
    process_id: String,
    assignment_delay: String,
}

impl IncidentEventService {
    pub fn new(engine: Arc<dyn WorkflowEngine>, process_id: String, assignment_delay: String) -> Self {
        Self {
            engine,
            process_id,
            assignment_delay,
        }
    }

    #[instrument(skip(self, payload))]
    pub async fn handle_message(&self, payload: &[u8]) -> DomainResult<()> {
        let message: Message<Value> = match serde_json::from_slice(payload) {
            Ok(message) => message,
            Err(e) => {
                error!(error = %e, "failed to decode incident message, skipping");
                return Ok(());
            }
        };

        if message.message_type.is_empty() {
            warn!(message_id = %message.id, "incident message missing a message type, skipping");
            return Ok(());
        }

        if !message.message_type.eq_ignore_ascii_case(INCIDENT_REPORTED_EVENT) {
            debug!(message_type = %message.message_type, "ignoring unhandled message type");
            return Ok(());
        }

        let event: IncidentReportedEvent = match serde_json::from_value(message.body) {
            Ok(event) => event,
            Err(e) => {
                error!(
                    error = %e,
                    message_id = %message.id,
                    "malformed incident report body, skipping"
                );
                return Ok(());
            }
        };

        let Some(key) = CorrelationKey::new(event.id.clone()) else {
            warn!(message_id = %message.id, "incident report without an incident id, skipping");
            return Ok(());
        };

        let incident = Incident {
            id: event.id.clone(),
            latitude: Some(event.lat),
            longitude: Some(event.lon),
            num_people: Some(event.number_of_people),
            medical_needed: Some(event.medical_needed),
            reported_time: Some(event.timestamp),
            status: None,
        };

        let instance = self
            .engine
            .start_process(NewProcess {
                process_id: self.process_id.clone(),
                correlation_key: key,
                parameters: json!({
                    "incident": incident,
                    "assignmentDelay": self.assignment_delay,
                }),
            })
            .await?;

        info!(
            incident_id = %event.id,
            process_instance_id = instance.0,
            "started rescue process for incident"
        );

        Ok(())
    }
}
