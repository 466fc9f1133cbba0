use std::sync::Arc;

use floodline_domain::{
    DomainError, DomainResult, Incident, IncidentPriority, OutboundEnvelope, OutboundMessageType,
    OutboxEmitter, PriorityRequest, PriorityService, ResponderDirectory, ResponderProfile,
    ShelterDirectory, StepInput, WorkItem, WorkflowEngine, HANDLER_DISASTER_SERVICE,
    HANDLER_INCIDENT_PRIORITY, HANDLER_RESPONDERS, HANDLER_SEND_MESSAGE, PARAM_MESSAGE_TYPE,
    PARAM_PAYLOAD,
};
use serde_json::{json, Value};
use tracing::{debug, error, info, instrument, warn};

/// Domain service that executes workflow work items.
///
/// `SendMessage` items build an outbound envelope and stage it through the
/// transactional outbox before completing. Directory items fan out to the
/// external directories and complete with whatever they return, degrading to
/// empty results when a directory is unreachable. Work items that are
/// malformed or name no handler are logged and acknowledged without
/// completion so a human can repair the workflow definition.
pub struct StepService {
    engine: Arc<dyn WorkflowEngine>,
    outbox: Arc<dyn OutboxEmitter>,
    responders: Arc<dyn ResponderDirectory>,
    shelters: Arc<dyn ShelterDirectory>,
    priorities: Arc<dyn PriorityService>,
}

impl StepService {
    pub fn new(
        engine: Arc<dyn WorkflowEngine>,
        outbox: Arc<dyn OutboxEmitter>,
        responders: Arc<dyn ResponderDirectory>,
        shelters: Arc<dyn ShelterDirectory>,
        priorities: Arc<dyn PriorityService>,
    ) -> Self {
        Self {
            engine,
            outbox,
            responders,
            shelters,
            priorities,
        }
    }

    #[instrument(skip(self, item), fields(work_item_id = %item.id, handler = %item.name))]
    pub async fn execute(&self, item: WorkItem) -> DomainResult<()> {
        match item.name.as_str() {
            HANDLER_SEND_MESSAGE => self.send_message(&item).await,
            HANDLER_RESPONDERS => self.list_responders(&item).await,
            HANDLER_DISASTER_SERVICE => self.list_destinations(&item).await,
            HANDLER_INCIDENT_PRIORITY => self.incident_priority(&item).await,
            other => {
                error!(handler = other, "work item names no known handler, skipping");
                Ok(())
            }
        }
    }

    async fn send_message(&self, item: &WorkItem) -> DomainResult<()> {
        let envelope = match self.build_outbound(item) {
            Ok(envelope) => envelope,
            Err(e) if e.is_wiring_defect() => {
                error!(error = %e, "invalid send-message step, skipping");
                return Ok(());
            }
            Err(e) => return Err(e),
        };

        self.outbox.emit(&envelope).await?;
        self.engine.complete_work_item(&item.id, json!({})).await?;

        info!(
            event_type = %envelope.event_type,
            aggregate_id = %envelope.aggregate_id,
            "outbound message staged"
        );
        Ok(())
    }

    fn build_outbound(&self, item: &WorkItem) -> DomainResult<OutboundEnvelope> {
        let tag = item
            .parameter(PARAM_MESSAGE_TYPE)
            .and_then(Value::as_str)
            .ok_or_else(|| {
                DomainError::InvalidWorkItem("missing MessageType parameter".to_string())
            })?;
        let message_type = OutboundMessageType::parse(tag)?;

        let payload = item.parameter(PARAM_PAYLOAD).cloned().ok_or_else(|| {
            DomainError::InvalidWorkItem("missing Payload parameter".to_string())
        })?;

        message_type.build(&StepInput {
            payload,
            process_instance_id: item.process_instance_id,
        })
    }

    async fn list_responders(&self, item: &WorkItem) -> DomainResult<()> {
        let responders = match self.responders.available_responders().await {
            Ok(responders) => responders,
            Err(e) => {
                warn!(error = %e, "responder directory unavailable, completing with no responders");
                Vec::new()
            }
        };

        let profiles: Vec<ResponderProfile> =
            responders.into_iter().map(ResponderProfile::from).collect();
        debug!(responder_count = profiles.len(), "resolved available responders");

        self.engine
            .complete_work_item(&item.id, json!({ "Responders": profiles }))
            .await
    }

    async fn list_destinations(&self, item: &WorkItem) -> DomainResult<()> {
        let shelters = match self.shelters.shelters().await {
            Ok(shelters) => shelters,
            Err(e) => {
                warn!(error = %e, "disaster service unavailable, completing with no destinations");
                Vec::new()
            }
        };

        debug!(destination_count = shelters.len(), "resolved evacuation destinations");

        self.engine
            .complete_work_item(&item.id, json!({ "destinations": shelters }))
            .await
    }

    async fn incident_priority(&self, item: &WorkItem) -> DomainResult<()> {
        let incident = match self.incident_parameter(item) {
            Ok(incident) => incident,
            Err(e) if e.is_wiring_defect() => {
                error!(error = %e, "invalid incident-priority step, skipping");
                return Ok(());
            }
            Err(e) => return Err(e),
        };

        let request = PriorityRequest {
            incident_id: incident.id.clone(),
            lat: incident.latitude,
            lon: incident.longitude,
            active: incident.is_active(),
        };

        let priority = match self.priorities.incident_priority(request).await {
            Ok(priority) => priority,
            Err(e) => {
                warn!(
                    error = %e,
                    incident_id = %incident.id,
                    "priority service unavailable, completing with zero priority"
                );
                IncidentPriority {
                    incident_id: incident.id.clone(),
                    ..Default::default()
                }
            }
        };

        self.engine
            .complete_work_item(&item.id, json!({ "IncidentPriority": priority }))
            .await
    }

    fn incident_parameter(&self, item: &WorkItem) -> DomainResult<Incident> {
        let payload = item.parameter(PARAM_PAYLOAD).cloned().ok_or_else(|| {
            DomainError::InvalidWorkItem("missing Payload parameter".to_string())
        })?;
        serde_json::from_value(payload)
            .map_err(|e| DomainError::InvalidWorkItem(format!("incident payload: {e}")))
    }
}
