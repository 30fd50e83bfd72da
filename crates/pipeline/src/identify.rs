//! Plant identification from photos.

use base64::{engine::general_purpose, Engine as _};
use herbarium_inventory::Inventory;
use herbarium_model::{PlantSuggestion, TaxonRank};
use herbarium_names::truncate_with_ellipsis;
use herbarium_providers::{IdentificationProvider, ProviderError, RawSuggestion};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IdentifyError {
    #[error("No images to identify")]
    NoImages,

    #[error("Identification timed out after {0:?}")]
    Timeout(Duration),

    #[error(transparent)]
    Provider(#[from] ProviderError),
}

#[derive(Debug, Clone)]
pub struct IdentifyConfig {
    /// Upper bound for the whole identification call
    pub timeout: Duration,
    /// Descriptions longer than this are cut with "..."
    pub description_chars: usize,
}

impl Default for IdentifyConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(15),
            description_chars: 375,
        }
    }
}

/// Identifies plants from photos and flags the ones with a 3D model.
pub struct Identifier<I> {
    provider: I,
    inventory: Inventory,
    config: IdentifyConfig,
}

impl<I: IdentificationProvider> Identifier<I> {
    pub fn new(provider: I, inventory: Inventory, config: IdentifyConfig) -> Self {
        Self {
            provider,
            inventory,
            config,
        }
    }

    /// Identify from raw image bytes.
    pub async fn identify<B: AsRef<[u8]>>(
        &self,
        images: &[B],
    ) -> Result<Vec<PlantSuggestion>, IdentifyError> {
        let encoded: Vec<String> = images
            .iter()
            .map(|bytes| general_purpose::STANDARD.encode(bytes.as_ref()))
            .collect();
        self.identify_encoded(&encoded).await
    }

    /// Identify from base64-encoded images.
    pub async fn identify_encoded(
        &self,
        images: &[String],
    ) -> Result<Vec<PlantSuggestion>, IdentifyError> {
        if images.is_empty() {
            return Err(IdentifyError::NoImages);
        }

        let response = tokio::time::timeout(self.config.timeout, self.provider.identify(images))
            .await
            .map_err(|_| {
                tracing::warn!(
                    provider = self.provider.name(),
                    timeout = ?self.config.timeout,
                    "Identification timed out"
                );
                IdentifyError::Timeout(self.config.timeout)
            })??;

        let suggestions: Vec<PlantSuggestion> = response
            .suggestions
            .iter()
            .map(|raw| self.to_suggestion(raw))
            .collect();

        tracing::info!(
            images = images.len(),
            suggestions = suggestions.len(),
            top = ?suggestions.first().map(|s| &s.scientific_name),
            "Identification finished"
        );

        Ok(suggestions)
    }

    fn to_suggestion(&self, raw: &RawSuggestion) -> PlantSuggestion {
        let details = &raw.plant_details;
        let scientific_name = raw.scientific_name().to_string();
        let common_names = details.common_names.clone().unwrap_or_default();

        let has_model = self.inventory.model_for_species(&scientific_name).is_some()
            || common_names
                .iter()
                .any(|name| self.inventory.in_model_list(name));

        PlantSuggestion {
            probability: raw.probability,
            rank: if details.structured_name.has_species() {
                TaxonRank::Species
            } else {
                TaxonRank::Genus
            },
            description: details
                .wiki_description
                .as_ref()
                .and_then(|d| d.value.as_deref())
                .map(|text| truncate_with_ellipsis(text, self.config.description_chars)),
            url: details.url.clone(),
            similar_images: raw.similar_image_urls(),
            scientific_name,
            common_names,
            has_model,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{inventory, FakeIdentification};
    use herbarium_providers::{
        IdentifyResponse, PlantDetails, SimilarImage, StructuredName, WikiDescription,
    };
    use pretty_assertions::assert_eq;

    fn suggestion(name: &str, species: Option<&str>, probability: f64) -> RawSuggestion {
        RawSuggestion {
            probability,
            plant_name: Some(name.to_string()),
            plant_details: PlantDetails {
                scientific_name: Some(name.to_string()),
                structured_name: StructuredName {
                    genus: name.split(' ').next().map(str::to_lowercase),
                    species: species.map(str::to_string),
                },
                common_names: None,
                url: None,
                wiki_description: None,
            },
            similar_images: Vec::new(),
        }
    }

    fn identifier(provider: FakeIdentification) -> Identifier<FakeIdentification> {
        Identifier::new(provider, inventory(), IdentifyConfig::default())
    }

    #[tokio::test]
    async fn test_suggestions_keep_order_and_flag_models() {
        let mut lotus = suggestion("Nymphaea lotus", Some("lotus"), 0.91);
        lotus.plant_details.common_names = Some(vec!["white lotus".to_string()]);
        lotus.plant_details.wiki_description = Some(WikiDescription {
            value: Some("x".repeat(400)),
        });
        lotus.plant_details.url = Some("https://en.wikipedia.org/wiki/Nymphaea_lotus".to_string());
        lotus.similar_images = vec![SimilarImage {
            url: Some("https://plant.id/media/1.jpg".to_string()),
            similarity: Some(0.8),
        }];

        let id = identifier(FakeIdentification {
            response: IdentifyResponse {
                suggestions: vec![lotus, suggestion("Nymphaea", None, 0.05)],
            },
            ..Default::default()
        });

        let suggestions = id.identify(&[b"jpeg bytes".to_vec()]).await.unwrap();
        assert_eq!(suggestions.len(), 2);

        let first = &suggestions[0];
        assert_eq!(first.scientific_name, "Nymphaea lotus");
        assert_eq!(first.rank, TaxonRank::Species);
        assert!(first.has_model);
        assert_eq!(first.common_names, vec!["white lotus"]);
        assert_eq!(first.similar_images, vec!["https://plant.id/media/1.jpg"]);
        let description = first.description.as_deref().unwrap();
        assert_eq!(description.chars().count(), 375);
        assert!(description.ends_with("..."));

        let second = &suggestions[1];
        assert_eq!(second.rank, TaxonRank::Genus);
        assert!(!second.has_model);
        assert_eq!(second.description, None);
    }

    #[tokio::test]
    async fn test_images_are_base64_encoded() {
        let id = identifier(FakeIdentification::default());
        id.identify(&[b"hello"]).await.unwrap();
        assert_eq!(*id.provider.received.lock().unwrap(), vec!["aGVsbG8="]);
    }

    #[tokio::test]
    async fn test_empty_input_is_rejected() {
        let id = identifier(FakeIdentification::default());
        let err = id.identify_encoded(&[]).await.unwrap_err();
        assert!(matches!(err, IdentifyError::NoImages));
    }

    #[tokio::test]
    async fn test_slow_provider_times_out() {
        let id = Identifier::new(
            FakeIdentification {
                delay: Some(Duration::from_millis(500)),
                ..Default::default()
            },
            inventory(),
            IdentifyConfig {
                timeout: Duration::from_millis(20),
                ..Default::default()
            },
        );

        let err = id.identify_encoded(&["aGVsbG8=".to_string()]).await.unwrap_err();
        assert!(matches!(err, IdentifyError::Timeout(t) if t == Duration::from_millis(20)));
    }

    #[tokio::test]
    async fn test_provider_failure_propagates() {
        let id = identifier(FakeIdentification {
            failing: true,
            ..Default::default()
        });
        let err = id.identify_encoded(&["aGVsbG8=".to_string()]).await.unwrap_err();
        assert!(matches!(err, IdentifyError::Provider(ProviderError::MissingApiKey(_))));
    }
}
