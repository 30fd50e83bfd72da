//! Plant.id photo identification client.

use crate::{IdentificationProvider, ProviderConfig, ProviderError};
use serde::{Deserialize, Serialize};

const PROVIDER: &str = "plant.id";

/// Details requested with every identification.
const PLANT_DETAILS: [&str; 4] = ["common_names", "url", "wiki_description", "taxonomy"];

#[derive(Debug, Serialize)]
struct IdentifyRequest<'a> {
    images: &'a [String],
    plant_details: [&'static str; 4],
}

/// Response of `POST identify`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct IdentifyResponse {
    #[serde(default)]
    pub suggestions: Vec<RawSuggestion>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawSuggestion {
    #[serde(default)]
    pub probability: f64,
    pub plant_name: Option<String>,
    #[serde(default)]
    pub plant_details: PlantDetails,
    #[serde(default)]
    pub similar_images: Vec<SimilarImage>,
}

impl RawSuggestion {
    /// Scientific name from the details, falling back to the plant name.
    pub fn scientific_name(&self) -> &str {
        self.plant_details
            .scientific_name
            .as_deref()
            .or(self.plant_name.as_deref())
            .unwrap_or_default()
    }

    pub fn similar_image_urls(&self) -> Vec<String> {
        self.similar_images
            .iter()
            .filter_map(|image| image.url.clone())
            .collect()
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PlantDetails {
    pub scientific_name: Option<String>,
    #[serde(default)]
    pub structured_name: StructuredName,
    /// Plant.id sends `null` when no common names are known
    #[serde(default)]
    pub common_names: Option<Vec<String>>,
    pub url: Option<String>,
    pub wiki_description: Option<WikiDescription>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct StructuredName {
    pub genus: Option<String>,
    pub species: Option<String>,
}

impl StructuredName {
    pub fn has_species(&self) -> bool {
        self.species.as_deref().is_some_and(|s| !s.is_empty())
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct WikiDescription {
    pub value: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SimilarImage {
    pub url: Option<String>,
    pub similarity: Option<f64>,
}

/// Plant.id v2 client.
pub struct PlantIdClient {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl PlantIdClient {
    pub fn new(config: &ProviderConfig) -> Result<Self, ProviderError> {
        Ok(Self {
            client: config.http_client()?,
            base_url: config.plant_id_url.trim_end_matches('/').to_string(),
            api_key: config.plant_id_api_key.clone(),
        })
    }
}

impl IdentificationProvider for PlantIdClient {
    async fn identify(&self, images: &[String]) -> Result<IdentifyResponse, ProviderError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(ProviderError::MissingApiKey(PROVIDER))?;

        let url = format!("{}/identify", self.base_url);
        tracing::debug!(url = %url, images = images.len(), "Submitting identification");

        let response = self
            .client
            .post(&url)
            .header("Api-Key", api_key)
            .json(&IdentifyRequest {
                images,
                plant_details: PLANT_DETAILS,
            })
            .send()
            .await
            .map_err(|e| ProviderError::Connection(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Status {
                provider: PROVIDER,
                status,
                body,
            });
        }

        response
            .json()
            .await
            .map_err(|e| ProviderError::Parse(e.to_string()))
    }

    fn name(&self) -> &'static str {
        PROVIDER
    }
}
