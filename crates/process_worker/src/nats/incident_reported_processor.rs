use std::sync::Arc;

use async_nats::jetstream::Message;
use common::nats::{BatchProcessor, ProcessingResult};
use tracing::{debug, error};

use crate::domain::IncidentEventService;

/// Create a BatchProcessor that feeds incident-reported messages through the
/// domain service.
///
/// Messages are handled in order. The first infrastructure failure stops the
/// batch: everything before it is acknowledged, the failed message and the
/// rest are rejected so redelivery preserves their relative order.
pub fn create_incident_reported_processor(service: Arc<IncidentEventService>) -> BatchProcessor {
    Box::new(move |messages: &[Message]| {
        let service = Arc::clone(&service);

        // Message borrows from the slice; copy out what the async block needs
        let message_data: Vec<(usize, Vec<u8>, String)> = messages
            .iter()
            .enumerate()
            .map(|(idx, msg)| (idx, msg.payload.to_vec(), msg.subject.to_string()))
            .collect();

        Box::pin(async move {
            let count = message_data.len();

            for (idx, payload, subject) in message_data {
                if let Err(e) = service.handle_message(&payload).await {
                    error!(
                        error = %e,
                        index = idx,
                        subject = %subject,
                        "failed to handle incident message, rejecting rest of batch"
                    );
                    return Ok(ProcessingResult::fail_from(idx, count, Some(e.to_string())));
                }
                debug!(index = idx, "incident message handled");
            }

            Ok(ProcessingResult::ack_all(count))
        })
    })
}
