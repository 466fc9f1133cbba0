use config::{Config, ConfigError, Environment};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServiceConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    // NATS configuration
    /// NATS server URL
    #[serde(default = "default_nats_url")]
    pub nats_url: String,

    /// NATS JetStream stream name for incident reported events
    #[serde(default = "default_incident_stream")]
    pub incident_stream: String,

    /// NATS subject pattern for the incident consumer filter
    #[serde(default = "default_incident_subject")]
    pub incident_subject: String,

    /// Durable consumer name for incident reported events
    #[serde(default = "default_incident_consumer")]
    pub incident_consumer: String,

    /// NATS JetStream stream name for mission lifecycle events
    #[serde(default = "default_mission_stream")]
    pub mission_stream: String,

    /// NATS subject pattern for the mission consumer filter
    #[serde(default = "default_mission_subject")]
    pub mission_subject: String,

    /// Durable consumer name for mission lifecycle events
    #[serde(default = "default_mission_consumer")]
    pub mission_consumer: String,

    /// NATS JetStream stream name for responder updated events
    #[serde(default = "default_responder_stream")]
    pub responder_stream: String,

    /// NATS subject pattern for the responder consumer filter
    #[serde(default = "default_responder_subject")]
    pub responder_subject: String,

    /// Durable consumer name for responder updated events
    #[serde(default = "default_responder_consumer")]
    pub responder_consumer: String,

    /// NATS JetStream stream name for engine work items
    #[serde(default = "default_work_item_stream")]
    pub work_item_stream: String,

    /// NATS subject pattern for the work item consumer filter
    #[serde(default = "default_work_item_subject")]
    pub work_item_subject: String,

    /// Durable consumer name for engine work items
    #[serde(default = "default_work_item_consumer")]
    pub work_item_consumer: String,

    /// Batch size for consumers
    #[serde(default = "default_nats_batch_size")]
    pub nats_batch_size: usize,

    /// Max wait time for batches in seconds
    #[serde(default = "default_nats_batch_wait_secs")]
    pub nats_batch_wait_secs: u64,

    /// Startup timeout for initialization operations in seconds
    #[serde(default = "default_startup_timeout_secs")]
    pub startup_timeout_secs: u64,

    // PostgreSQL configuration
    /// PostgreSQL host
    #[serde(default = "default_postgres_host")]
    pub postgres_host: String,

    /// PostgreSQL port
    #[serde(default = "default_postgres_port")]
    pub postgres_port: u16,

    /// PostgreSQL database name
    #[serde(default = "default_postgres_database")]
    pub postgres_database: String,

    /// PostgreSQL username
    #[serde(default = "default_postgres_username")]
    pub postgres_username: String,

    /// PostgreSQL password
    #[serde(default = "default_postgres_password")]
    pub postgres_password: String,

    // Workflow engine configuration
    /// Workflow engine REST base URL
    #[serde(default = "default_engine_url")]
    pub engine_url: String,

    /// HTTP request timeout in seconds for engine and directory calls
    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,

    /// Process definition id started for each reported incident
    #[serde(default = "default_incident_process_id")]
    pub incident_process_id: String,

    /// ISO-8601 duration the process waits before escalating an unassigned incident
    #[serde(default = "default_assignment_delay")]
    pub assignment_delay: String,

    /// Attempts to deliver a signal to a process instance before giving up
    #[serde(default = "default_signal_max_attempts")]
    pub signal_max_attempts: u32,

    /// Delay between signal delivery attempts in milliseconds
    #[serde(default = "default_signal_retry_delay_ms")]
    pub signal_retry_delay_ms: u64,

    // Directory services configuration
    /// Responder service base URL
    #[serde(default = "default_responder_service_url")]
    pub responder_service_url: String,

    /// Disaster service base URL
    #[serde(default = "default_disaster_service_url")]
    pub disaster_service_url: String,

    /// Incident priority service base URL
    #[serde(default = "default_priority_service_url")]
    pub priority_service_url: String,

    // OpenTelemetry configuration
    /// OpenTelemetry OTLP endpoint (gRPC)
    #[serde(default = "default_otel_endpoint")]
    pub otel_endpoint: String,

    /// Enable OpenTelemetry export
    #[serde(default = "default_otel_enabled")]
    pub otel_enabled: bool,

    /// Service name for OpenTelemetry resource
    #[serde(default = "default_otel_service_name")]
    pub otel_service_name: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

// NATS defaults
fn default_nats_url() -> String {
    "nats://localhost:4222".to_string()
}

fn default_incident_stream() -> String {
    "incident-reported-event".to_string()
}

fn default_incident_subject() -> String {
    "incident-reported-event.>".to_string()
}

fn default_incident_consumer() -> String {
    "process-service-incident-consumer".to_string()
}

fn default_mission_stream() -> String {
    "mission-event".to_string()
}

fn default_mission_subject() -> String {
    "mission-event.>".to_string()
}

fn default_mission_consumer() -> String {
    "process-service-mission-consumer".to_string()
}

fn default_responder_stream() -> String {
    "responder-updated-event".to_string()
}

fn default_responder_subject() -> String {
    "responder-updated-event.>".to_string()
}

fn default_responder_consumer() -> String {
    "process-service-responder-consumer".to_string()
}

fn default_work_item_stream() -> String {
    "process-work-item".to_string()
}

fn default_work_item_subject() -> String {
    "process-work-item.>".to_string()
}

fn default_work_item_consumer() -> String {
    "process-service-work-item-consumer".to_string()
}

fn default_nats_batch_size() -> usize {
    30
}

fn default_nats_batch_wait_secs() -> u64 {
    5
}

fn default_startup_timeout_secs() -> u64 {
    30
}

// PostgreSQL defaults
fn default_postgres_host() -> String {
    "localhost".to_string()
}

fn default_postgres_port() -> u16 {
    5432
}

fn default_postgres_database() -> String {
    "floodline".to_string()
}

fn default_postgres_username() -> String {
    "floodline".to_string()
}

fn default_postgres_password() -> String {
    "floodline".to_string()
}

// Workflow engine defaults
fn default_engine_url() -> String {
    "http://localhost:8090".to_string()
}

fn default_http_timeout_secs() -> u64 {
    30
}

fn default_incident_process_id() -> String {
    "incident-process".to_string()
}

fn default_assignment_delay() -> String {
    "PT30S".to_string()
}

fn default_signal_max_attempts() -> u32 {
    5
}

fn default_signal_retry_delay_ms() -> u64 {
    300
}

// Directory service defaults
fn default_responder_service_url() -> String {
    "http://localhost:8091".to_string()
}

fn default_disaster_service_url() -> String {
    "http://localhost:8092".to_string()
}

fn default_priority_service_url() -> String {
    "http://localhost:8093".to_string()
}

// OpenTelemetry defaults
fn default_otel_endpoint() -> String {
    "http://localhost:4317".to_string()
}

fn default_otel_enabled() -> bool {
    true
}

fn default_otel_service_name() -> String {
    "floodline-process".to_string()
}

impl ServiceConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(Environment::with_prefix("FLOODLINE"))
            .build()?
            .try_deserialize()
    }
}
