use floodline_domain::{
    signal_for_mission_event, CorrelationKey, DispatchOutcome, DomainResult, InboundEnvelope,
    MissionLifecycleEvent, Signal, SignalDispatcher,
};
use tracing::{debug, error, info, instrument, warn};

/// Domain service that maps mission lifecycle events onto workflow signals.
///
/// Events arrive as binary-mode CloudEvents; the event type header selects
/// the signal and the JSON data carries the correlating incident id. Events
/// that cannot be correlated are logged and acknowledged.
pub struct MissionEventService {
    dispatcher: SignalDispatcher,
}

impl MissionEventService {
    pub fn new(dispatcher: SignalDispatcher) -> Self {
        Self { dispatcher }
    }

    #[instrument(skip(self, envelope), fields(event_id = %envelope.id, event_type = %envelope.event_type))]
    pub async fn handle_envelope(&self, envelope: &InboundEnvelope) -> DomainResult<()> {
        if envelope.event_type.is_empty() {
            warn!("mission event without a type attribute, skipping");
            return Ok(());
        }

        let Some(signal_name) = signal_for_mission_event(&envelope.event_type) else {
            debug!("ignoring unhandled mission event type");
            return Ok(());
        };

        if !envelope.is_json() {
            warn!(
                content_type = envelope.data_content_type.as_deref().unwrap_or(""),
                "mission event with unsupported content type, skipping"
            );
            return Ok(());
        }

        let event: MissionLifecycleEvent = match serde_json::from_slice(&envelope.data) {
            Ok(event) => event,
            Err(e) => {
                error!(error = %e, "malformed mission event data, skipping");
                return Ok(());
            }
        };

        let Some(key) = CorrelationKey::from_optional(event.incident_id.as_deref()) else {
            warn!(mission_id = %event.mission_id, "mission event without an incident id, skipping");
            return Ok(());
        };

        match self
            .dispatcher
            .dispatch(&key, &Signal::named(signal_name))
            .await?
        {
            DispatchOutcome::Delivered => {
                info!(signal = signal_name, "mission signal delivered");
            }
            DispatchOutcome::NotFound { attempts } => {
                warn!(
                    signal = signal_name,
                    attempts, "no process instance for mission event, giving up"
                );
            }
            DispatchOutcome::NotReady { attempts } => {
                warn!(
                    signal = signal_name,
                    attempts, "process instance never awaited mission signal, giving up"
                );
            }
        }

        Ok(())
    }
}
