use common::postgres::PostgresClient;
use floodline_domain::{OutboundEnvelope, OutboxEmitter};
use floodline_postgres::{PostgresOutboxEmitter, ensure_outbox_table};
use testcontainers::ContainerAsync;
use testcontainers::runners::AsyncRunner;
use testcontainers_modules::postgres::Postgres;

async fn setup_outbox() -> (ContainerAsync<Postgres>, PostgresClient) {
    let postgres = Postgres::default().start().await.unwrap();
    let host = postgres.get_host().await.unwrap();
    let port = postgres.get_host_port_ipv4(5432).await.unwrap();

    let client = PostgresClient::new(&host.to_string(), port, "postgres", "postgres", "postgres", 5)
        .expect("Failed to create client");

    ensure_outbox_table(&client).await.expect("DDL failed");

    (postgres, client)
}

fn sample_envelope() -> OutboundEnvelope {
    OutboundEnvelope {
        event_type: "UpdateIncidentCommand".to_string(),
        payload: serde_json::json!({"id": "incident-1", "status": "ASSIGNED"}),
        aggregate_type: "incident-command".to_string(),
        aggregate_id: "incident-1".to_string(),
        incident_id: Some("incident-1".to_string()),
        time: chrono::Utc::now(),
    }
}

#[tokio::test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
async fn test_emit_commits_and_leaves_table_empty() {
    let (_container, client) = setup_outbox().await;
    let emitter = PostgresOutboxEmitter::new(client.clone());

    emitter.emit(&sample_envelope()).await.unwrap();

    // The insert+delete pair commits; the table itself stays empty
    let conn = client.get_connection().await.unwrap();
    let row = conn
        .query_one("SELECT COUNT(*) FROM process_service_outbox", &[])
        .await
        .unwrap();
    let count: i64 = row.get(0);
    assert_eq!(count, 0);
}

#[tokio::test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
async fn test_ensure_outbox_table_is_idempotent() {
    let (_container, client) = setup_outbox().await;

    // Second run must be a no-op, not an error
    ensure_outbox_table(&client).await.unwrap();

    let emitter = PostgresOutboxEmitter::new(client);
    emitter.emit(&sample_envelope()).await.unwrap();
}

#[tokio::test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
async fn test_emit_handles_concurrent_envelopes() {
    let (_container, client) = setup_outbox().await;
    let emitter = PostgresOutboxEmitter::new(client.clone());

    let mut handles = Vec::new();
    for _ in 0..8 {
        let emitter = emitter.clone();
        handles.push(tokio::spawn(async move {
            emitter.emit(&sample_envelope()).await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let conn = client.get_connection().await.unwrap();
    let row = conn
        .query_one("SELECT COUNT(*) FROM process_service_outbox", &[])
        .await
        .unwrap();
    let count: i64 = row.get(0);
    assert_eq!(count, 0);
}
