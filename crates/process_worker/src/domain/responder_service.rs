use floodline_domain::{
    CorrelationKey, DispatchOutcome, DomainResult, Message, ResponderUpdatedEvent, Signal,
    SignalDispatcher, RESPONDER_UPDATED_EVENT, SIGNAL_RESPONDER_AVAILABLE,
};
use serde_json::Value;
use tracing::{debug, error, info, instrument, warn};

/// Envelope header that carries the correlating incident id.
const INCIDENT_ID_HEADER: &str = "incidentId";

/// Domain service that converts responder status updates into availability
/// signals. The correlation key travels in the message header rather than
/// the body; the signal value is the availability verdict.
pub struct ResponderEventService {
    dispatcher: SignalDispatcher,
}

impl ResponderEventService {
    pub fn new(dispatcher: SignalDispatcher) -> Self {
        Self { dispatcher }
    }

    #[instrument(skip(self, payload))]
    pub async fn handle_message(&self, payload: &[u8]) -> DomainResult<()> {
        let message: Message<Value> = match serde_json::from_slice(payload) {
            Ok(message) => message,
            Err(e) => {
                error!(error = %e, "failed to decode responder message, skipping");
                return Ok(());
            }
        };

        if message.message_type.is_empty() {
            warn!(message_id = %message.id, "responder message missing a message type, skipping");
            return Ok(());
        }

        if !message.message_type.eq_ignore_ascii_case(RESPONDER_UPDATED_EVENT) {
            debug!(message_type = %message.message_type, "ignoring unhandled message type");
            return Ok(());
        }

        let Some(key) = CorrelationKey::from_optional(message.header_value(INCIDENT_ID_HEADER))
        else {
            warn!(message_id = %message.id, "responder update without an incident id header, skipping");
            return Ok(());
        };

        let event: ResponderUpdatedEvent = match serde_json::from_value(message.body) {
            Ok(event) => event,
            Err(e) => {
                error!(
                    error = %e,
                    message_id = %message.id,
                    "malformed responder update body, skipping"
                );
                return Ok(());
            }
        };

        let signal = Signal::with_value(
            SIGNAL_RESPONDER_AVAILABLE,
            Value::Bool(event.is_available()),
        );

        match self.dispatcher.dispatch(&key, &signal).await? {
            DispatchOutcome::Delivered => {
                info!(available = event.is_available(), "responder signal delivered");
            }
            DispatchOutcome::NotFound { attempts } => {
                warn!(attempts, "no process instance for responder update, giving up");
            }
            DispatchOutcome::NotReady { attempts } => {
                warn!(
                    attempts,
                    "process instance never awaited responder signal, giving up"
                );
            }
        }

        Ok(())
    }
}
