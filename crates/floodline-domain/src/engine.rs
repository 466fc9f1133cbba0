use async_trait::async_trait;
use serde_json::Value;

use crate::correlation::CorrelationKey;
use crate::error::DomainResult;
use crate::signal::Signal;

/// Opaque engine-side process instance id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProcessInstanceHandle(pub i64);

/// Input for starting a new workflow instance.
#[derive(Debug, Clone, PartialEq)]
pub struct NewProcess {
    /// Workflow definition id
    pub process_id: String,
    pub correlation_key: CorrelationKey,
    pub parameters: Value,
}

/// Seam to the external workflow engine.
/// The production implementation is an HTTP adapter (floodline-engine).
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait WorkflowEngine: Send + Sync {
    /// Start a new process instance keyed by the correlation key
    async fn start_process(&self, input: NewProcess) -> DomainResult<ProcessInstanceHandle>;

    /// Look up the instance tied to a correlation key, if one exists
    async fn find_by_correlation_key(
        &self,
        key: &CorrelationKey,
    ) -> DomainResult<Option<ProcessInstanceHandle>>;

    /// Names of the signals the keyed instance is currently waiting on
    async fn pending_signals(&self, key: &CorrelationKey) -> DomainResult<Vec<String>>;

    /// Deliver a signal to a running instance
    async fn signal(&self, instance: ProcessInstanceHandle, signal: &Signal) -> DomainResult<()>;

    /// Complete a delegated work item with its results
    async fn complete_work_item(&self, work_item_id: &str, results: Value) -> DomainResult<()>;
}
