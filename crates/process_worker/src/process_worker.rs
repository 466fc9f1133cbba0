use std::sync::Arc;
use std::time::Duration;

use common::{NatsClient, NatsConsumer};
use floodline_domain::{
    OutboxEmitter, PriorityService, ResponderDirectory, RetryPolicy, ShelterDirectory,
    SignalDispatcher, TokioSleeper, WorkflowEngine,
};
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::domain::{IncidentEventService, MissionEventService, ResponderEventService, StepService};
use crate::nats::{
    create_incident_reported_processor, create_mission_event_processor,
    create_responder_updated_processor, create_work_item_processor,
};

pub struct ProcessWorkerConfig {
    pub incident_stream: String,
    pub incident_subject: String,
    pub incident_consumer: String,
    pub mission_stream: String,
    pub mission_subject: String,
    pub mission_consumer: String,
    pub responder_stream: String,
    pub responder_subject: String,
    pub responder_consumer: String,
    pub work_item_stream: String,
    pub work_item_subject: String,
    pub work_item_consumer: String,
    pub nats_batch_size: usize,
    pub nats_batch_wait_secs: u64,
    pub incident_process_id: String,
    pub assignment_delay: String,
    pub signal_max_attempts: u32,
    pub signal_retry_delay_ms: u64,
}

/// Wires the four consumers of the process service to their domain services.
pub struct ProcessWorker {
    incident_consumer: NatsConsumer,
    mission_consumer: NatsConsumer,
    responder_consumer: NatsConsumer,
    work_item_consumer: NatsConsumer,
}

impl ProcessWorker {
    pub async fn new(
        engine: Arc<dyn WorkflowEngine>,
        outbox: Arc<dyn OutboxEmitter>,
        responders: Arc<dyn ResponderDirectory>,
        shelters: Arc<dyn ShelterDirectory>,
        priorities: Arc<dyn PriorityService>,
        nats_client: Arc<NatsClient>,
        config: ProcessWorkerConfig,
    ) -> anyhow::Result<Self> {
        info!("Initializing process worker module");

        let retry_policy = RetryPolicy::new(
            config.signal_max_attempts,
            Duration::from_millis(config.signal_retry_delay_ms),
        );
        let batch_wait = Duration::from_secs(config.nats_batch_wait_secs);

        let incident_service = Arc::new(IncidentEventService::new(
            Arc::clone(&engine),
            config.incident_process_id.clone(),
            config.assignment_delay.clone(),
        ));
        let incident_consumer = NatsConsumer::new(
            nats_client.jetstream(),
            &config.incident_stream,
            &config.incident_consumer,
            &config.incident_subject,
            config.nats_batch_size,
            batch_wait,
            create_incident_reported_processor(incident_service),
        )
        .await?;

        let mission_service = Arc::new(MissionEventService::new(SignalDispatcher::new(
            Arc::clone(&engine),
            retry_policy,
            Arc::new(TokioSleeper),
        )));
        let mission_consumer = NatsConsumer::new(
            nats_client.jetstream(),
            &config.mission_stream,
            &config.mission_consumer,
            &config.mission_subject,
            config.nats_batch_size,
            batch_wait,
            create_mission_event_processor(mission_service),
        )
        .await?;

        let responder_service = Arc::new(ResponderEventService::new(SignalDispatcher::new(
            Arc::clone(&engine),
            retry_policy,
            Arc::new(TokioSleeper),
        )));
        let responder_consumer = NatsConsumer::new(
            nats_client.jetstream(),
            &config.responder_stream,
            &config.responder_consumer,
            &config.responder_subject,
            config.nats_batch_size,
            batch_wait,
            create_responder_updated_processor(responder_service),
        )
        .await?;

        let step_service = Arc::new(StepService::new(
            Arc::clone(&engine),
            outbox,
            responders,
            shelters,
            priorities,
        ));
        let work_item_consumer = NatsConsumer::new(
            nats_client.jetstream(),
            &config.work_item_stream,
            &config.work_item_consumer,
            &config.work_item_subject,
            config.nats_batch_size,
            batch_wait,
            create_work_item_processor(step_service),
        )
        .await?;

        info!("Process worker initialized");

        Ok(Self {
            incident_consumer,
            mission_consumer,
            responder_consumer,
            work_item_consumer,
        })
    }

    pub fn into_runner_processes(
        self,
    ) -> Vec<(
        &'static str,
        Box<
            dyn FnOnce(
                    CancellationToken,
                ) -> std::pin::Pin<
                    Box<dyn std::future::Future<Output = anyhow::Result<()>> + Send>,
                > + Send,
        >,
    )> {
        vec![
            (
                "incident-reported-consumer",
                Box::new({
                    let consumer = self.incident_consumer;
                    move |ctx| Box::pin(async move { consumer.run(ctx).await })
                }),
            ),
            (
                "mission-event-consumer",
                Box::new({
                    let consumer = self.mission_consumer;
                    move |ctx| Box::pin(async move { consumer.run(ctx).await })
                }),
            ),
            (
                "responder-updated-consumer",
                Box::new({
                    let consumer = self.responder_consumer;
                    move |ctx| Box::pin(async move { consumer.run(ctx).await })
                }),
            ),
            (
                "work-item-consumer",
                Box::new({
                    let consumer = self.work_item_consumer;
                    move |ctx| Box::pin(async move { consumer.run(ctx).await })
                }),
            ),
        ]
    }
}
