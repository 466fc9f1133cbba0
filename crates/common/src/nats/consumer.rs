use anyhow::{Context, Result};
use async_nats::jetstream::{self, consumer::PullConsumer, Message};
use futures::{future::BoxFuture, StreamExt};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Outcome of processing one fetched batch.
///
/// Indices refer to positions in the batch slice handed to the processor.
/// Anything listed in `ack` is acknowledged, anything in `nak` is rejected
/// for redelivery with an optional error detail.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessingResult {
    pub ack: Vec<usize>,
    pub nak: Vec<(usize, Option<String>)>,
}

impl ProcessingResult {
    /// Acknowledge the whole batch.
    pub fn ack_all(count: usize) -> Self {
        Self {
            ack: (0..count).collect(),
            nak: Vec::new(),
        }
    }

    /// Reject the whole batch for redelivery.
    pub fn nak_all(count: usize, error: Option<String>) -> Self {
        Self {
            ack: Vec::new(),
            nak: (0..count).map(|i| (i, error.clone())).collect(),
        }
    }

    /// Acknowledge everything before `failed` and reject `failed` plus the
    /// rest of the batch. Rejected trailing messages keep their relative
    /// order on redelivery.
    pub fn fail_from(failed: usize, count: usize, error: Option<String>) -> Self {
        Self {
            ack: (0..failed).collect(),
            nak: (failed..count)
                .map(|i| (i, if i == failed { error.clone() } else { None }))
                .collect(),
        }
    }
}

/// Batch processor closure handed to a [`NatsConsumer`].
///
/// The processor owns deserialization and business logic; the consumer only
/// fetches messages and applies the returned ack/nak bookkeeping.
pub type BatchProcessor =
    Box<dyn Fn(&[Message]) -> BoxFuture<'static, Result<ProcessingResult>> + Send + Sync>;

/// Pull-based JetStream consumer loop with explicit acknowledgements.
pub struct NatsConsumer {
    consumer: PullConsumer,
    batch_size: usize,
    max_wait: Duration,
    processor: BatchProcessor,
}

impl NatsConsumer {
    pub async fn new(
        jetstream: &jetstream::Context,
        stream_name: &str,
        consumer_name: &str,
        subject_filter: &str,
        batch_size: usize,
        max_wait: Duration,
        processor: BatchProcessor,
    ) -> Result<Self> {
        debug!(
            stream = stream_name,
            consumer = consumer_name,
            subject = subject_filter,
            "Creating JetStream consumer"
        );

        // Durable consumer with explicit acks; redelivery is driven by naks.
        let consumer = jetstream
            .create_consumer_on_stream(
                jetstream::consumer::pull::Config {
                    name: Some(consumer_name.to_string()),
                    durable_name: Some(consumer_name.to_string()),
                    filter_subject: subject_filter.to_string(),
                    ack_policy: jetstream::consumer::AckPolicy::Explicit,
                    ..Default::default()
                },
                stream_name,
            )
            .await
            .context("Failed to create consumer")?;

        info!(
            stream = stream_name,
            consumer = consumer_name,
            "Consumer created successfully"
        );

        Ok(Self {
            consumer,
            batch_size,
            max_wait,
            processor,
        })
    }

    pub async fn run(&self, ctx: CancellationToken) -> Result<()> {
        info!("Starting consumer loop");

        loop {
            tokio::select! {
                _ = ctx.cancelled() => {
                    info!("Received shutdown signal, stopping consumer");
                    break;
                }
                result = self.fetch_and_process_batch() => {
                    if let Err(e) = result {
                        error!(error = %e, "Error processing batch");
                        tokio::time::sleep(Duration::from_secs(1)).await;
                    }
                }
            }
        }

        info!("Consumer stopped gracefully");
        Ok(())
    }

    async fn fetch_and_process_batch(&self) -> Result<()> {
        let mut messages = self
            .consumer
            .fetch()
            .max_messages(self.batch_size)
            .expires(self.max_wait)
            .messages()
            .await
            .context("Failed to fetch messages")?;

        let mut batch = Vec::new();
        while let Some(result) = messages.next().await {
            match result {
                Ok(msg) => batch.push(msg),
                Err(e) => {
                    warn!(error = %e, "Error receiving message from batch");
                }
            }
        }

        if batch.is_empty() {
            return Ok(());
        }

        debug!(message_count = batch.len(), "Received message batch");

        let processing_result = match (self.processor)(&batch).await {
            Ok(result) => result,
            Err(e) => {
                error!(error = %e, "Processor returned error, rejecting all messages");
                ProcessingResult::nak_all(batch.len(), Some(e.to_string()))
            }
        };

        self.apply_acks(&batch, processing_result).await;
        Ok(())
    }

    async fn apply_acks(&self, batch: &[Message], result: ProcessingResult) {
        let ack_count = result.ack.len();
        for idx in result.ack {
            match batch.get(idx) {
                Some(msg) => {
                    if let Err(e) = msg.ack().await {
                        error!(error = %e, message_index = idx, "Failed to acknowledge message");
                    }
                }
                None => warn!(
                    message_index = idx,
                    batch_size = batch.len(),
                    "Invalid ack index in ProcessingResult"
                ),
            }
        }
        if ack_count > 0 {
            debug!(ack_count, "Acknowledged messages");
        }

        let nak_count = result.nak.len();
        for (idx, error_msg) in result.nak {
            let Some(msg) = batch.get(idx) else {
                warn!(
                    message_index = idx,
                    batch_size = batch.len(),
                    "Invalid nak index in ProcessingResult"
                );
                continue;
            };

            if let Some(err) = error_msg {
                error!(
                    message_index = idx,
                    subject = %msg.subject,
                    error = %err,
                    "Rejecting message due to processing error"
                );
            } else {
                warn!(message_index = idx, subject = %msg.subject, "Rejecting message");
            }

            if let Err(e) = msg.ack_with(jetstream::AckKind::Nak(None)).await {
                error!(error = %e, message_index = idx, "Failed to reject message");
            }
        }
        if nak_count > 0 {
            debug!(nak_count, "Rejected messages for redelivery");
        }
    }
}
