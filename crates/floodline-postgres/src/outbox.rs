use anyhow::Context;
use async_trait::async_trait;
use tracing::{debug, info};
use uuid::Uuid;

use common::postgres::PostgresClient;
use floodline_domain::{
    DomainError, DomainResult, OUTBOUND_CONTENT_TYPE, OUTBOUND_SOURCE, OUTBOUND_SPEC_VERSION,
    OutboundEnvelope, OutboxEmitter,
};

const OUTBOX_TABLE_DDL: &str = "CREATE TABLE IF NOT EXISTS process_service_outbox (
    id UUID PRIMARY KEY,
    aggregatetype TEXT NOT NULL,
    aggregateid TEXT NOT NULL,
    type TEXT NOT NULL,
    payload TEXT NOT NULL,
    ce_specversion TEXT NOT NULL,
    ce_source TEXT NOT NULL,
    ce_time TEXT NOT NULL,
    ce_datacontenttype TEXT NOT NULL,
    ce_incidentid TEXT
)";

const OUTBOX_INSERT: &str = "INSERT INTO process_service_outbox
    (id, aggregatetype, aggregateid, type, payload,
     ce_specversion, ce_source, ce_time, ce_datacontenttype, ce_incidentid)
 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)";

const OUTBOX_DELETE: &str = "DELETE FROM process_service_outbox WHERE id = $1";

/// Creates the outbox table if it does not exist. Called once at startup.
pub async fn ensure_outbox_table(client: &PostgresClient) -> anyhow::Result<()> {
    let conn = client.get_connection().await?;
    conn.batch_execute(OUTBOX_TABLE_DDL)
        .await
        .context("Failed to ensure outbox table")?;
    info!("Outbox table ready");
    Ok(())
}

/// Row projection of an outbound envelope. Each emission gets a fresh UUID;
/// the absent incident extension is written as the empty string.
#[derive(Debug, Clone)]
struct OutboxRecord {
    id: Uuid,
    aggregate_type: String,
    aggregate_id: String,
    event_type: String,
    payload: String,
    time: String,
    incident_id: String,
}

impl OutboxRecord {
    fn from_envelope(envelope: &OutboundEnvelope) -> Self {
        Self {
            id: Uuid::new_v4(),
            aggregate_type: envelope.aggregate_type.clone(),
            aggregate_id: envelope.aggregate_id.clone(),
            event_type: envelope.event_type.clone(),
            payload: envelope.payload.to_string(),
            time: envelope.time.to_rfc3339(),
            incident_id: envelope.incident_id.clone().unwrap_or_default(),
        }
    }
}

/// PostgreSQL implementation of the OutboxEmitter trait.
///
/// The insert and delete run inside one transaction, so the table stays
/// empty while both operations land in the transaction log for CDC. The
/// pair must never be collapsed into a plain insert or split across
/// transactions.
#[derive(Clone)]
pub struct PostgresOutboxEmitter {
    client: PostgresClient,
}

impl PostgresOutboxEmitter {
    pub fn new(client: PostgresClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl OutboxEmitter for PostgresOutboxEmitter {
    async fn emit(&self, envelope: &OutboundEnvelope) -> DomainResult<()> {
        let record = OutboxRecord::from_envelope(envelope);

        let mut conn = self
            .client
            .get_connection()
            .await
            .map_err(DomainError::OutboxError)?;

        let tx = conn
            .transaction()
            .await
            .context("Failed to open outbox transaction")
            .map_err(DomainError::OutboxError)?;

        tx.execute(
            OUTBOX_INSERT,
            &[
                &record.id,
                &record.aggregate_type,
                &record.aggregate_id,
                &record.event_type,
                &record.payload,
                &OUTBOUND_SPEC_VERSION,
                &OUTBOUND_SOURCE,
                &record.time,
                &OUTBOUND_CONTENT_TYPE,
                &record.incident_id,
            ],
        )
        .await
        .context("Failed to insert outbox record")
        .map_err(DomainError::OutboxError)?;

        tx.execute(OUTBOX_DELETE, &[&record.id])
            .await
            .context("Failed to clear outbox record")
            .map_err(DomainError::OutboxError)?;

        tx.commit()
            .await
            .context("Failed to commit outbox transaction")
            .map_err(DomainError::OutboxError)?;

        debug!(
            outbox_id = %record.id,
            event_type = %record.event_type,
            aggregate_id = %record.aggregate_id,
            "Outbox record written and cleared"
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_envelope(incident_id: Option<&str>) -> OutboundEnvelope {
        OutboundEnvelope {
            event_type: "CreateMissionCommand".to_string(),
            payload: json!({"incidentId": "incident-1", "processId": "314"}),
            aggregate_type: "mission-command".to_string(),
            aggregate_id: "incident-1".to_string(),
            incident_id: incident_id.map(str::to_string),
            time: chrono::Utc::now(),
        }
    }

    #[test]
    fn test_record_projects_envelope_columns() {
        let envelope = sample_envelope(Some("incident-1"));
        let record = OutboxRecord::from_envelope(&envelope);

        assert_eq!(record.aggregate_type, "mission-command");
        assert_eq!(record.aggregate_id, "incident-1");
        assert_eq!(record.event_type, "CreateMissionCommand");
        assert_eq!(record.incident_id, "incident-1");
        assert_eq!(
            serde_json::from_str::<serde_json::Value>(&record.payload).unwrap(),
            envelope.payload
        );
        // RFC 3339 with offset
        assert!(chrono::DateTime::parse_from_rfc3339(&record.time).is_ok());
    }

    #[test]
    fn test_absent_incident_extension_becomes_empty_string() {
        let record = OutboxRecord::from_envelope(&sample_envelope(None));
        assert_eq!(record.incident_id, "");
    }

    #[test]
    fn test_each_emission_gets_a_fresh_id() {
        let envelope = sample_envelope(Some("incident-1"));
        let first = OutboxRecord::from_envelope(&envelope);
        let second = OutboxRecord::from_envelope(&envelope);
        assert_ne!(first.id, second.id);
    }
}
