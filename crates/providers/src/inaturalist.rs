//! iNaturalist taxa autocomplete client.

use crate::{get_json, AutocompleteProvider, ProviderConfig, ProviderError};
use herbarium_query::{INaturalistDialect, Lookup, QueryDialect};
use serde::{Deserialize, Serialize};

const PROVIDER: &str = "inaturalist";

/// One taxon from `taxa/autocomplete`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AutocompleteTaxon {
    pub id: Option<u64>,
    /// Scientific name
    pub name: Option<String>,
    /// The name (scientific or common) that matched the query
    pub matched_term: Option<String>,
    pub iconic_taxon_id: Option<u64>,
    pub preferred_common_name: Option<String>,
}

impl AutocompleteTaxon {
    pub fn in_iconic_taxon(&self, iconic_taxon_id: u64) -> bool {
        self.iconic_taxon_id == Some(iconic_taxon_id)
    }
}

#[derive(Debug, Deserialize)]
struct AutocompleteResponse {
    #[serde(default)]
    results: Vec<AutocompleteTaxon>,
}

/// iNaturalist API client.
pub struct INaturalistClient {
    client: reqwest::Client,
    base_url: String,
    dialect: INaturalistDialect,
}

impl INaturalistClient {
    pub fn new(config: &ProviderConfig) -> Result<Self, ProviderError> {
        Ok(Self {
            client: config.http_client()?,
            base_url: config.inaturalist_url.clone(),
            dialect: INaturalistDialect,
        })
    }
}

impl AutocompleteProvider for INaturalistClient {
    async fn autocomplete(&self, query: &str) -> Result<Vec<AutocompleteTaxon>, ProviderError> {
        let spec = self.dialect.translate(&Lookup::Autocomplete {
            query: query.to_string(),
        })?;
        let response: AutocompleteResponse =
            get_json(&self.client, PROVIDER, &self.base_url, &spec).await?;
        Ok(response.results)
    }

    fn name(&self) -> &'static str {
        PROVIDER
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_autocomplete_response() {
        let response: AutocompleteResponse = serde_json::from_str(
            r#"{
                "total_results": 3,
                "page": 1,
                "results": [
                    {"id": 49998, "name": "Salvia apiana", "matched_term": "White Sage",
                     "iconic_taxon_id": 47126, "preferred_common_name": "white sage", "rank": "species"},
                    {"id": 12, "name": "Salvia", "matched_term": "Salvia", "iconic_taxon_id": 47158},
                    {"id": 13, "name": "Nameless"}
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(response.results.len(), 3);
        assert!(response.results[0].in_iconic_taxon(47126));
        assert!(!response.results[1].in_iconic_taxon(47126));
        assert_eq!(response.results[2].matched_term, None);
        assert!(!response.results[2].in_iconic_taxon(47126));
    }

    #[test]
    fn test_client_creation() {
        let client = INaturalistClient::new(&ProviderConfig::default()).unwrap();
        assert_eq!(client.name(), "inaturalist");
    }
}
