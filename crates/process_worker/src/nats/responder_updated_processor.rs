use std::sync::Arc;

use async_nats::jetstream::Message;
use common::nats::{BatchProcessor, ProcessingResult};
use tracing::{debug, error};

use crate::domain::ResponderEventService;

/// Create a BatchProcessor that feeds responder-updated messages through the
/// domain service, with the same in-order batch discipline as the incident
/// consumer.
pub fn create_responder_updated_processor(service: Arc<ResponderEventService>) -> BatchProcessor {
    Box::new(move |messages: &[Message]| {
        let service = Arc::clone(&service);

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
                        "failed to handle responder update, rejecting rest of batch"
                    );
                    return Ok(ProcessingResult::fail_from(idx, count, Some(e.to_string())));
                }
                debug!(index = idx, "responder update handled");
            }

            Ok(ProcessingResult::ack_all(count))
        })
    })
}
