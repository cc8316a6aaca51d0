//! Breed catalog lookups.
//!
//! Cats may only be hired with a breed the catalog knows about. The default
//! catalog is TheCatAPI (`GET {base_url}/breeds`), fetched on every check.
//! Transport, status and decoding failures are reported as
//! [`BreedLookupError`], never as "unknown breed".

use std::collections::HashSet;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use thiserror::Error;

/// Public TheCatAPI endpoint.
pub const DEFAULT_BREED_API_URL: &str = "https://api.thecatapi.com/v1";

/// Timeout applied to a single catalog request.
pub const DEFAULT_BREED_API_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum BreedLookupError {
    #[error("breed catalog request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("breed catalog returned status {0}")]
    Status(StatusCode),
}

#[async_trait]
pub trait BreedValidator: Send + Sync {
    /// Whether `breed` names a breed in the catalog (exact match).
    async fn is_known_breed(&self, breed: &str) -> Result<bool, BreedLookupError>;
}

#[derive(Debug, Deserialize)]
struct BreedRecord {
    name: String,
}

/// HTTP client for TheCatAPI breed list.
#[derive(Debug, Clone)]
pub struct TheCatApi {
    base_url: String,
    client: Client,
}

impl TheCatApi {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, BreedLookupError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }
}

#[async_trait]
impl BreedValidator for TheCatApi {
    async fn is_known_breed(&self, breed: &str) -> Result<bool, BreedLookupError> {
        let url = format!("{}/breeds", self.base_url);
        tracing::debug!("Fetching breed catalog from {}", url);

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(BreedLookupError::Status(status));
        }

        let breeds: Vec<BreedRecord> = response.json().await?;
        Ok(breeds.iter().any(|b| b.name == breed))
    }
}

/// A fixed, in-process breed catalog.
#[derive(Debug, Clone, Default)]
pub struct FixedBreeds {
    names: HashSet<String>,
}

impl FixedBreeds {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }
}

#[async_trait]
impl BreedValidator for FixedBreeds {
    async fn is_known_breed(&self, breed: &str) -> Result<bool, BreedLookupError> {
        Ok(self.names.contains(breed))
    }
}
