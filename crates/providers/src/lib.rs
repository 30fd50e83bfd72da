//! External data providers for specimen resolution.
//!
//! Provides the provider traits and their HTTP implementations:
//! - `TaxonomyProvider` (GBIF): name matching, profiles, vernacular names,
//!   occurrence images, genus children, vernacular search
//! - `EncyclopediaProvider` (Wikipedia): page summaries
//! - `AutocompleteProvider` (iNaturalist): species autocomplete
//! - `IdentificationProvider` (Plant.id): photo identification
//!
//! The pipeline only depends on the traits, so it can run against
//! in-memory fakes in tests.

mod gbif;
mod inaturalist;
mod plant_id;
mod wikipedia;

pub use gbif::{
    GbifClient, Media, NameMatch, Occurrence, Page, TaxonRecord, TraitRecord, VernacularName,
};
pub use inaturalist::{AutocompleteTaxon, INaturalistClient};
pub use plant_id::{
    IdentifyResponse, PlantDetails, PlantIdClient, RawSuggestion, SimilarImage, StructuredName,
    WikiDescription,
};
pub use wikipedia::{ContentUrls, PageUrls, WikiPage, WikipediaClient, NOT_FOUND_TITLE};

use herbarium_model::UsageKey;
use herbarium_query::{QueryError, RequestSpec};
use serde::de::DeserializeOwned;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;

/// Errors from provider operations.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("{provider} returned HTTP {status}: {body}")]
    Status {
        provider: &'static str,
        status: u16,
        body: String,
    },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid lookup: {0}")]
    Query(#[from] QueryError),

    #[error("No API key configured for {0}")]
    MissingApiKey(&'static str),

    #[error("{0} not available")]
    Unavailable(&'static str),
}

/// Taxonomy backbone (GBIF species + occurrence APIs).
pub trait TaxonomyProvider {
    /// Classify a name against the backbone.
    fn match_name(
        &self,
        name: &str,
    ) -> impl Future<Output = Result<NameMatch, ProviderError>> + Send;

    /// Ecological trait records, in provider order.
    fn species_profiles(
        &self,
        key: UsageKey,
    ) -> impl Future<Output = Result<Vec<TraitRecord>, ProviderError>> + Send;

    /// Vernacular names in every language, in provider order.
    fn vernacular_names(
        &self,
        key: UsageKey,
    ) -> impl Future<Output = Result<Vec<VernacularName>, ProviderError>> + Send;

    /// Occurrence records that carry still images.
    fn occurrences(
        &self,
        key: UsageKey,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<Occurrence>, ProviderError>> + Send;

    /// Direct children of a taxon (the species of a genus).
    fn children(
        &self,
        key: UsageKey,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<TaxonRecord>, ProviderError>> + Send;

    /// Plant taxa with a vernacular name matching `term`.
    fn search_vernacular(
        &self,
        term: &str,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<TaxonRecord>, ProviderError>> + Send;

    /// Check if the provider is reachable.
    fn health_check(&self) -> impl Future<Output = Result<(), ProviderError>> + Send;

    /// Provider name for logging.
    fn name(&self) -> &'static str;
}

/// Encyclopedia summaries (Wikipedia).
pub trait EncyclopediaProvider {
    /// Summary page for a title. A missing article is a page titled
    /// `"Not found."`, not an error.
    fn page_summary(
        &self,
        title: &str,
    ) -> impl Future<Output = Result<WikiPage, ProviderError>> + Send;

    fn name(&self) -> &'static str;
}

/// Name autocomplete (iNaturalist).
pub trait AutocompleteProvider {
    fn autocomplete(
        &self,
        query: &str,
    ) -> impl Future<Output = Result<Vec<AutocompleteTaxon>, ProviderError>> + Send;

    fn name(&self) -> &'static str;
}

/// Photo identification (Plant.id).
pub trait IdentificationProvider {
    /// Identify a plant from base64-encoded images.
    fn identify(
        &self,
        images: &[String],
    ) -> impl Future<Output = Result<IdentifyResponse, ProviderError>> + Send;

    fn name(&self) -> &'static str;
}

/// Endpoints and HTTP settings for every provider.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// GBIF API root
    pub gbif_url: String,
    /// Wikipedia REST API root
    pub wikipedia_url: String,
    /// iNaturalist API root
    pub inaturalist_url: String,
    /// Plant.id API root
    pub plant_id_url: String,
    /// Plant.id API key (identification is disabled without one)
    pub plant_id_api_key: Option<String>,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            gbif_url: "https://api.gbif.org/v1".to_string(),
            wikipedia_url: "https://en.wikipedia.org/api/rest_v1".to_string(),
            inaturalist_url: "https://api.inaturalist.org/v1".to_string(),
            plant_id_url: "https://api.plant.id/v2".to_string(),
            plant_id_api_key: None,
            timeout_secs: 30,
            user_agent: concat!("herbarium/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl ProviderConfig {
    /// Build an HTTP client with this configuration's timeout and user agent.
    pub fn http_client(&self) -> Result<reqwest::Client, ProviderError> {
        reqwest::Client::builder()
            .user_agent(self.user_agent.as_str())
            .timeout(Duration::from_secs(self.timeout_secs))
            .build()
            .map_err(|e| ProviderError::Connection(e.to_string()))
    }
}

/// GET a JSON document described by `spec` under `base_url`.
async fn get_json<T: DeserializeOwned>(
    client: &reqwest::Client,
    provider: &'static str,
    base_url: &str,
    spec: &RequestSpec,
) -> Result<T, ProviderError> {
    let url = spec.url(base_url);

    tracing::debug!(provider, url = %url, params = ?spec.params, "Querying provider");

    let response = client
        .get(&url)
        .query(&spec.params)
        .send()
        .await
        .map_err(|e| ProviderError::Connection(e.to_string()))?;

    if !response.status().is_success() {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        return Err(ProviderError::Status {
            provider,
            status,
            body,
        });
    }

    response
        .json()
        .await
        .map_err(|e| ProviderError::Parse(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_points_at_public_apis() {
        let config = ProviderConfig::default();
        assert!(config.gbif_url.starts_with("https://api.gbif.org"));
        assert!(config.wikipedia_url.contains("rest_v1"));
        assert!(config.plant_id_api_key.is_none());
        assert!(config.user_agent.starts_with("herbarium/"));
    }

    #[test]
    fn test_http_client_creation() {
        assert!(ProviderConfig::default().http_client().is_ok());
    }

    #[test]
    fn test_error_messages() {
        let err = ProviderError::Status {
            provider: "gbif",
            status: 503,
            body: "busy".to_string(),
        };
        assert_eq!(err.to_string(), "gbif returned HTTP 503: busy");
        assert_eq!(
            ProviderError::MissingApiKey("plant.id").to_string(),
            "No API key configured for plant.id"
        );
    }
}
