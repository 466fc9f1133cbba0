use std::sync::Arc;

use async_nats::jetstream::Message;
use common::nats::{BatchProcessor, ProcessingResult};
use floodline_domain::WorkItem;
use tracing::{debug, error};

use crate::domain::StepService;

/// Create a BatchProcessor that decodes work items and executes them through
/// the step service.
///
/// A work item that fails to decode is acknowledged and skipped since
/// redelivery cannot repair the payload. Execution failures are
/// infrastructure errors and reject the rest of the batch.
pub fn create_work_item_processor(service: Arc<StepService>) -> BatchProcessor {
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
                let item: WorkItem = match serde_json::from_slice(&payload) {
                    Ok(item) => item,
                    Err(e) => {
                        error!(
                            error = %e,
                            index = idx,
                            subject = %subject,
                            "failed to decode work item, skipping"
                        );
                        continue;
                    }
                };

                let item_id = item.id.clone();
                if let Err(e) = service.execute(item).await {
                    error!(
                        error = %e,
                        index = idx,
                        work_item_id = %item_id,
                        "failed to execute work item, rejecting rest of batch"
                    );
                    return Ok(ProcessingResult::fail_from(idx, count, Some(e.to_string())));
                }
                debug!(index = idx, work_item_id = %item_id, "work item executed");
            }

            Ok(ProcessingResult::ack_all(count))
        })
    })
}

// Note: Unit tests for the processors are challenging because we cannot easily
// create actual NATS Message objects without a real NATS connection. The
// processors are exercised end to end against real infrastructure instead;
// the decode gates and batch discipline they rely on are covered by the
// domain service and ProcessingResult tests.
