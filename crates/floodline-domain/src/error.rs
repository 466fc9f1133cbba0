use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Unknown message type: {0}")]
    UnknownMessageType(String),

    #[error("Invalid work item: {0}")]
    InvalidWorkItem(String),

    #[error("Unrecognized incident status: {0}")]
    UnrecognizedIncidentStatus(String),

    #[error("Engine error: {0}")]
    EngineError(#[from] anyhow::Error),

    #[error("Outbox error: {0}")]
    OutboxError(anyhow::Error),

    #[error("Directory error: {0}")]
    DirectoryError(anyhow::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl DomainError {
    /// Distinguishes wiring and payload defects from infrastructure failures.
    /// Wiring defects are logged and acknowledged; infrastructure failures
    /// propagate so the broker redelivers the message.
    pub fn is_wiring_defect(&self) -> bool {
        matches!(
            self,
            DomainError::UnknownMessageType(_)
                | DomainError::InvalidWorkItem(_)
                | DomainError::UnrecognizedIncidentStatus(_)
                | DomainError::SerializationError(_)
        )
    }
}

pub type DomainResult<T> = Result<T, DomainError>;
