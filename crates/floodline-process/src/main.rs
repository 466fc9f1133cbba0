mod config;

use common::nats::NatsClient;
use common::postgres::PostgresClient;
use common::telemetry::{TelemetryConfig, TelemetryProviders, init_telemetry, shutdown_telemetry};
use config::ServiceConfig;
use floodline_engine::{
    EngineClient, RestPriorityService, RestResponderDirectory, RestShelterDirectory,
    build_http_client,
};
use floodline_postgres::{PostgresOutboxEmitter, ensure_outbox_table};
use floodline_runner::Runner;
use process_worker::{ProcessWorker, ProcessWorkerConfig};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info};

#[tokio::main]
async fn main() {
    // Initialize configuration and tracing
    let config = match ServiceConfig::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    // Initialize telemetry (tracing + OpenTelemetry for traces and logs)
    let telemetry_providers: Option<TelemetryProviders> = match init_telemetry(&TelemetryConfig {
        service_name: config.otel_service_name.clone(),
        otel_endpoint: config.otel_endpoint.clone(),
        otel_enabled: config.otel_enabled,
        log_level: config.log_level.clone(),
    }) {
        Ok(provider) => provider,
        Err(e) => {
            eprintln!("Failed to initialize telemetry: {}", e);
            std::process::exit(1);
        }
    };

    info!(
        otel_enabled = config.otel_enabled,
        otel_endpoint = %config.otel_endpoint,
        "Starting floodline-process service"
    );
    debug!("Configuration: {:?}", config);

    // Initialize shared dependencies
    let (postgres_client, nats_client) = match initialize_shared_dependencies(&config).await {
        Ok(deps) => deps,
        Err(e) => {
            error!("Failed to initialize shared dependencies: {}", e);
            std::process::exit(1);
        }
    };

    // HTTP adapters for the workflow engine and the directory services
    let http_client = match build_http_client(Duration::from_secs(config.http_timeout_secs)) {
        Ok(client) => client,
        Err(e) => {
            error!("Failed to build HTTP client: {}", e);
            std::process::exit(1);
        }
    };
    let engine = Arc::new(EngineClient::new(http_client.clone(), &config.engine_url));
    let responders = Arc::new(RestResponderDirectory::new(
        http_client.clone(),
        &config.responder_service_url,
    ));
    let shelters = Arc::new(RestShelterDirectory::new(
        http_client.clone(),
        &config.disaster_service_url,
    ));
    let priorities = Arc::new(RestPriorityService::new(
        http_client,
        &config.priority_service_url,
    ));
    let outbox = Arc::new(PostgresOutboxEmitter::new(postgres_client));

    // Initialize application modules
    let process_worker = match ProcessWorker::new(
        engine,
        outbox,
        responders,
        shelters,
        priorities,
        nats_client.clone(),
        ProcessWorkerConfig {
            incident_stream: config.incident_stream.clone(),
            incident_subject: config.incident_subject.clone(),
            incident_consumer: config.incident_consumer.clone(),
            mission_stream: config.mission_stream.clone(),
            mission_subject: config.mission_subject.clone(),
            mission_consumer: config.mission_consumer.clone(),
            responder_stream: config.responder_stream.clone(),
            responder_subject: config.responder_subject.clone(),
            responder_consumer: config.responder_consumer.clone(),
            work_item_stream: config.work_item_stream.clone(),
            work_item_subject: config.work_item_subject.clone(),
            work_item_consumer: config.work_item_consumer.clone(),
            nats_batch_size: config.nats_batch_size,
            nats_batch_wait_secs: config.nats_batch_wait_secs,
            incident_process_id: config.incident_process_id.clone(),
            assignment_delay: config.assignment_delay.clone(),
            signal_max_attempts: config.signal_max_attempts,
            signal_retry_delay_ms: config.signal_retry_delay_ms,
        },
    )
    .await
    {
        Ok(worker) => worker,
        Err(e) => {
            error!("Failed to initialize process worker: {}", e);
            std::process::exit(1);
        }
    };

    // Build runner with all consumer processes
    let mut runner = Runner::new();
    for (name, process) in process_worker.into_runner_processes() {
        runner = runner.with_named_process(name, process);
    }

    // Add cleanup handlers
    runner = runner
        .with_closer({
            let nats_for_close = Arc::clone(&nats_client);
            move || {
                Box::pin(async move {
                    info!("Running cleanup tasks...");
                    if let Ok(client) = Arc::try_unwrap(nats_for_close) {
                        client.close().await;
                    }

                    // Shutdown telemetry and flush pending traces and logs
                    shutdown_telemetry(telemetry_providers);

                    info!("Cleanup complete");
                    Ok(())
                })
            }
        })
        .with_closer_timeout(Duration::from_secs(10));

    // Run the service
    runner.run().await;
}

async fn initialize_shared_dependencies(
    config: &ServiceConfig,
) -> anyhow::Result<(PostgresClient, Arc<NatsClient>)> {
    // PostgreSQL initialization
    info!("Initializing PostgreSQL...");
    let postgres_client = create_postgres_client(config)?;
    postgres_client.ping().await?;
    ensure_outbox_table(&postgres_client).await?;

    // NATS initialization
    info!("Initializing NATS...");
    let nats_client = Arc::new(
        NatsClient::connect(
            &config.nats_url,
            Duration::from_secs(config.startup_timeout_secs),
        )
        .await?,
    );
    ensure_nats_streams(&nats_client, config).await?;

    Ok((postgres_client, nats_client))
}

fn create_postgres_client(config: &ServiceConfig) -> anyhow::Result<PostgresClient> {
    PostgresClient::new(
        &config.postgres_host,
        config.postgres_port,
        &config.postgres_database,
        &config.postgres_username,
        &config.postgres_password,
        5, // max connections
    )
}

async fn ensure_nats_streams(client: &NatsClient, config: &ServiceConfig) -> anyhow::Result<()> {
    client.ensure_stream(&config.incident_stream).await?;
    client.ensure_stream(&config.mission_stream).await?;
    client.ensure_stream(&config.responder_stream).await?;
    client.ensure_stream(&config.work_item_stream).await?;
    Ok(())
}
