use anyhow::{Context, Result};
use async_trait::async_trait;

use floodline_domain::{
    AvailableResponder, DomainError, DomainResult, IncidentPriority, PriorityRequest,
    PriorityService, ResponderDirectory, Shelter, ShelterDirectory,
};

use crate::http::ensure_success;

/// REST adapter to the responder directory.
#[derive(Clone)]
pub struct RestResponderDirectory {
    client: reqwest::Client,
    base_url: String,
}

impl RestResponderDirectory {
    pub fn new(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn fetch_available(&self) -> Result<Vec<AvailableResponder>> {
        let url = format!("{}/responders/available", self.base_url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("GET {} failed", url))?;
        let response = ensure_success(response, &url).await?;

        response
            .json()
            .await
            .with_context(|| format!("Failed to parse response from {}", url))
    }
}

#[async_trait]
impl ResponderDirectory for RestResponderDirectory {
    async fn available_responders(&self) -> DomainResult<Vec<AvailableResponder>> {
        self.fetch_available()
            .await
            .map_err(DomainError::DirectoryError)
    }
}

/// REST adapter to the disaster service's shelter list.
#[derive(Clone)]
pub struct RestShelterDirectory {
    client: reqwest::Client,
    base_url: String,
}

impl RestShelterDirectory {
    pub fn new(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn fetch_shelters(&self) -> Result<Vec<Shelter>> {
        let url = format!("{}/shelters", self.base_url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("GET {} failed", url))?;
        let response = ensure_success(response, &url).await?;

        response
            .json()
            .await
            .with_context(|| format!("Failed to parse response from {}", url))
    }
}

#[async_trait]
impl ShelterDirectory for RestShelterDirectory {
    async fn shelters(&self) -> DomainResult<Vec<Shelter>> {
        self.fetch_shelters()
            .await
            .map_err(DomainError::DirectoryError)
    }
}

/// REST adapter to the incident priority service.
#[derive(Clone)]
pub struct RestPriorityService {
    client: reqwest::Client,
    base_url: String,
}

impl RestPriorityService {
    pub fn new(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn fetch_priority(&self, request: &PriorityRequest) -> Result<IncidentPriority> {
        let url = format!("{}/priority", self.base_url);

        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .with_context(|| format!("POST {} failed", url))?;
        let response = ensure_success(response, &url).await?;

        response
            .json()
            .await
            .with_context(|| format!("Failed to parse response from {}", url))
    }
}

#[async_trait]
impl PriorityService for RestPriorityService {
    async fn incident_priority(&self, request: PriorityRequest) -> DomainResult<IncidentPriority> {
        self.fetch_priority(&request)
            .await
            .map_err(DomainError::DirectoryError)
    }
}
