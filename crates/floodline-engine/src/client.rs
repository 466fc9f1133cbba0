use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use floodline_domain::{
    CorrelationKey, DomainResult, NewProcess, ProcessInstanceHandle, Signal, WorkflowEngine,
};

use crate::http::ensure_success;

/// HTTP adapter to the workflow engine's REST API.
///
/// Instance lookups answer 404 for an unknown correlation key; that maps to
/// `None` rather than an error so the dispatcher can retry. Every other
/// non-success status is a transport failure surfaced to the caller.
#[derive(Clone)]
pub struct EngineClient {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StartProcessBody<'a> {
    correlation_key: &'a str,
    parameters: &'a Value,
}

#[derive(Debug, Deserialize)]
struct InstanceRef {
    id: i64,
}

impl EngineClient {
    pub fn new(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn post_start(&self, input: &NewProcess) -> Result<i64> {
        let url = format!(
            "{}/processes/{}/instances",
            self.base_url, input.process_id
        );
        let body = StartProcessBody {
            correlation_key: input.correlation_key.as_str(),
            parameters: &input.parameters,
        };

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .with_context(|| format!("POST {} failed", url))?;
        let response = ensure_success(response, &url).await?;

        let instance: InstanceRef = response
            .json()
            .await
            .with_context(|| format!("Failed to parse response from {}", url))?;

        debug!(instance_id = instance.id, "Process instance started");
        Ok(instance.id)
    }

    async fn get_instance(&self, key: &CorrelationKey) -> Result<Option<i64>> {
        let url = format!("{}/instances", self.base_url);

        let response = self
            .client
            .get(&url)
            .query(&[("correlationKey", key.as_str())])
            .send()
            .await
            .with_context(|| format!("GET {} failed", url))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let response = ensure_success(response, &url).await?;

        let instance: InstanceRef = response
            .json()
            .await
            .with_context(|| format!("Failed to parse response from {}", url))?;
        Ok(Some(instance.id))
    }

    async fn get_pending_signals(&self, key: &CorrelationKey) -> Result<Vec<String>> {
        let url = format!("{}/instances/signals", self.base_url);

        let response = self
            .client
            .get(&url)
            .query(&[("correlationKey", key.as_str())])
            .send()
            .await
            .with_context(|| format!("GET {} failed", url))?;

        // An instance that disappeared between lookup and query is a miss,
        // not a failure
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(Vec::new());
        }
        let response = ensure_success(response, &url).await?;

        response
            .json()
            .await
            .with_context(|| format!("Failed to parse response from {}", url))
    }

    async fn post_signal(&self, instance: ProcessInstanceHandle, signal: &Signal) -> Result<()> {
        let url = format!(
            "{}/instances/{}/signals/{}",
            self.base_url, instance.0, signal.name
        );
        let body = signal.value.as_ref().unwrap_or(&Value::Null);

        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .with_context(|| format!("POST {} failed", url))?;
        ensure_success(response, &url).await?;

        Ok(())
    }

    async fn put_complete(&self, work_item_id: &str, results: &Value) -> Result<()> {
        let url = format!("{}/work-items/{}/complete", self.base_url, work_item_id);

        let response = self
            .client
            .put(&url)
            .json(results)
            .send()
            .await
            .with_context(|| format!("PUT {} failed", url))?;
        ensure_success(response, &url).await?;

        debug!(work_item_id, "Work item completed");
        Ok(())
    }
}

#[async_trait]
impl WorkflowEngine for EngineClient {
    async fn start_process(&self, input: NewProcess) -> DomainResult<ProcessInstanceHandle> {
        let id = self.post_start(&input).await?;
        Ok(ProcessInstanceHandle(id))
    }

    async fn find_by_correlation_key(
        &self,
        key: &CorrelationKey,
    ) -> DomainResult<Option<ProcessInstanceHandle>> {
        let instance = self.get_instance(key).await?;
        Ok(instance.map(ProcessInstanceHandle))
    }

    async fn pending_signals(&self, key: &CorrelationKey) -> DomainResult<Vec<String>> {
        Ok(self.get_pending_signals(key).await?)
    }

    async fn signal(&self, instance: ProcessInstanceHandle, signal: &Signal) -> DomainResult<()> {
        Ok(self.post_signal(instance, signal).await?)
    }

    async fn complete_work_item(&self, work_item_id: &str, results: Value) -> DomainResult<()> {
        Ok(self.put_complete(work_item_id, &results).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_process_body_shape() {
        let parameters = serde_json::json!({"incident": {"id": "incident-1"}});
        let body = StartProcessBody {
            correlation_key: "incident-1",
            parameters: &parameters,
        };

        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "correlationKey": "incident-1",
                "parameters": {"incident": {"id": "incident-1"}}
            })
        );
    }

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let client = EngineClient::new(reqwest::Client::new(), "http://localhost:8090/");
        assert_eq!(client.base_url, "http://localhost:8090");
    }
}
