use std::sync::Arc;

use async_nats::jetstream::Message;
use common::nats::{BatchProcessor, ProcessingResult};
use floodline_domain::InboundEnvelope;
use tracing::{debug, error};

use crate::domain::MissionEventService;
use crate::nats::envelope_from_headers;

/// Create a BatchProcessor that rebuilds CloudEvents envelopes from mission
/// event messages and hands them to the domain service.
///
/// A message without headers yields an envelope without attributes; the
/// service gate drops it. Batch discipline matches the other consumers:
/// in-order handling, first infrastructure failure rejects the remainder.
pub fn create_mission_event_processor(service: Arc<MissionEventService>) -> BatchProcessor {
    Box::new(move |messages: &[Message]| {
        let service = Arc::clone(&service);

        let message_data: Vec<(usize, InboundEnvelope, String)> = messages
            .iter()
            .enumerate()
            .map(|(idx, msg)| {
                let envelope = match &msg.headers {
                    Some(headers) => envelope_from_headers(headers, &msg.payload),
                    None => InboundEnvelope {
                        data: msg.payload.to_vec(),
                        ..Default::default()
                    },
                };
                (idx, envelope, msg.subject.to_string())
            })
            .collect();

        Box::pin(async move {
            let count = message_data.len();

            for (idx, envelope, subject) in message_data {
                if let Err(e) = service.handle_envelope(&envelope).await {
                    error!(
                        error = %e,
                        index = idx,
                        subject = %subject,
                        "failed to handle mission event, rejecting rest of batch"
                    );
                    return Ok(ProcessingResult::fail_from(idx, count, Some(e.to_string())));
                }
                debug!(index = idx, "mission event handled");
            }

            Ok(ProcessingResult::ack_all(count))
        })
    })
}
