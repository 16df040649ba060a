//! HTTP client for a Fedora-style REST object repository.
//!
//! The repository contract is small: `POST` a Turtle statement to the base
//! container to create an object (the new location comes back in the
//! `Location` header, or as the response body), `PATCH` a SPARQL Update
//! statement to a location to mutate it, and `GET` a location to read the
//! object's property graph plus repository metadata as JSON.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, LOCATION};
use reqwest::StatusCode;
use tracing::{debug, error, info};
use url::Url;

use crate::errors::RepositoryError;
use crate::interfaces::ObjectRepository;
use bibgraph_shared::{Location, RepositoryObject, Statement};

/// Default per-request timeout. A timeout is treated identically to a
/// transport failure.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Object repository client over HTTP.
pub struct HttpRepository {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpRepository {
    /// Create a new repository client for the given base container URL.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, RepositoryError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| RepositoryError::invalid_location(format!("{}: {}", base_url, e)))?;

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RepositoryError::transport(e.to_string()))?;

        info!(base_url = %base_url, timeout_ms = timeout.as_millis() as u64, "Created repository client");

        Ok(Self { client, base_url })
    }

    /// Resolve the created object's location from the response. The
    /// `Location` header is authoritative; the response body is the
    /// fallback.
    fn created_location(header: Option<&str>, body: &str) -> Result<Location, RepositoryError> {
        if let Some(uri) = header {
            if !uri.trim().is_empty() {
                return Ok(Location::new(uri.trim()));
            }
        }
        let body = body.trim();
        if body.is_empty() {
            return Err(RepositoryError::parse(
                "create response carried no location",
            ));
        }
        Ok(Location::new(body))
    }
}

#[async_trait]
impl ObjectRepository for HttpRepository {
    async fn create(&self, statement: &Statement) -> Result<Location, RepositoryError> {
        let response = self
            .client
            .post(self.base_url.clone())
            .header(CONTENT_TYPE, statement.syntax.mime_type())
            .body(statement.text.clone())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %body, "Create request failed");
            return Err(RepositoryError::transport(format!(
                "create failed with status {}: {}",
                status, body
            )));
        }

        let header = response
            .headers()
            .get(LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response.text().await.unwrap_or_default();
        let location = Self::created_location(header.as_deref(), &body)?;

        debug!(location = %location, "Created repository object");
        Ok(location)
    }

    async fn patch(
        &self,
        location: &Location,
        statement: &Statement,
    ) -> Result<(), RepositoryError> {
        let response = self
            .client
            .patch(location.as_str())
            .header(CONTENT_TYPE, statement.syntax.mime_type())
            .body(statement.text.clone())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(location = %location, status = %status, body = %body, "Patch request failed");
            return Err(RepositoryError::transport(format!(
                "patch of {} failed with status {}: {}",
                location, status, body
            )));
        }

        debug!(location = %location, "Patched repository object");
        Ok(())
    }

    async fn fetch(&self, location: &Location) -> Result<RepositoryObject, RepositoryError> {
        let response = self
            .client
            .get(location.as_str())
            .header("Accept", "application/json")
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND || status == StatusCode::GONE {
            return Err(RepositoryError::not_found(location.as_str()));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(location = %location, status = %status, body = %body, "Fetch request failed");
            return Err(RepositoryError::transport(format!(
                "fetch of {} failed with status {}: {}",
                location, status, body
            )));
        }

        response
            .json::<RepositoryObject>()
            .await
            .map_err(|e| RepositoryError::parse(e.to_string()))
    }
}
