use async_trait::async_trait;

use crate::error::DomainResult;
use crate::outbound::OutboundEnvelope;

/// Seam to the transactional outbox. The production implementation
/// (floodline-postgres) inserts and deletes the envelope row inside one
/// transaction; the durable effect is the WAL entry pair consumed by CDC.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait OutboxEmitter: Send + Sync {
    /// Emit one envelope through the outbox.
    /// Failures propagate so the delegating step is retried via redelivery.
    async fn emit(&self, envelope: &OutboundEnvelope) -> DomainResult<()>;
}
