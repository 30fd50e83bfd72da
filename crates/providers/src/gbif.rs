//! GBIF species and occurrence API client.

use crate::{get_json, ProviderConfig, ProviderError, TaxonomyProvider};
use herbarium_model::{Ranks, TaxonRank, UsageKey};
use herbarium_query::{GbifDialect, Lookup, QueryDialect};
use serde::{Deserialize, Serialize};

const PROVIDER: &str = "gbif";

/// Response of `species/match`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NameMatch {
    pub usage_key: Option<u64>,
    /// Set when the matched name is a synonym
    pub accepted_usage_key: Option<u64>,
    pub scientific_name: Option<String>,
    pub canonical_name: Option<String>,
    pub rank: Option<String>,
    pub status: Option<String>,
    /// EXACT, FUZZY, HIGHERRANK or NONE
    pub match_type: Option<String>,
    pub kingdom: Option<String>,
    pub phylum: Option<String>,
    pub class: Option<String>,
    pub order: Option<String>,
    pub family: Option<String>,
    pub genus: Option<String>,
    pub species: Option<String>,
}

impl NameMatch {
    fn match_type_is(&self, expected: &str) -> bool {
        self.match_type
            .as_deref()
            .is_some_and(|t| t.eq_ignore_ascii_case(expected))
    }

    /// Whether the backbone matched anything at all.
    pub fn is_match(&self) -> bool {
        self.usage_key.is_some() && !self.match_type_is("NONE")
    }

    /// Only a higher rank than requested could be matched
    /// (e.g. the genus of an unknown binomial).
    pub fn is_higher_rank(&self) -> bool {
        self.match_type_is("HIGHERRANK")
    }

    /// Key for enrichment lookups; synonyms resolve to their accepted taxon.
    pub fn usage_key(&self) -> Option<UsageKey> {
        if !self.is_match() {
            return None;
        }
        self.accepted_usage_key
            .or(self.usage_key)
            .map(UsageKey)
    }

    pub fn taxon_rank(&self) -> TaxonRank {
        self.rank.as_deref().map(TaxonRank::from).unwrap_or_default()
    }

    pub fn canonical(&self) -> Option<&str> {
        self.canonical_name
            .as_deref()
            .or(self.scientific_name.as_deref())
    }

    pub fn ranks(&self) -> Ranks {
        Ranks {
            kingdom: self.kingdom.clone().unwrap_or_default(),
            phylum: self.phylum.clone().unwrap_or_default(),
            class: self.class.clone().unwrap_or_default(),
            order: self.order.clone().unwrap_or_default(),
            family: self.family.clone().unwrap_or_default(),
        }
    }
}

/// A paged GBIF result list.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    #[serde(default = "Vec::new")]
    pub results: Vec<T>,
    #[serde(default)]
    pub end_of_records: bool,
}

/// One `speciesProfiles` record; every flag is optional.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TraitRecord {
    pub extinct: Option<bool>,
    pub terrestrial: Option<bool>,
    pub marine: Option<bool>,
    pub freshwater: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VernacularName {
    pub vernacular_name: String,
    /// ISO 639-2 code, e.g. "eng"
    pub language: Option<String>,
}

impl VernacularName {
    pub fn is_english(&self) -> bool {
        self.language.as_deref() == Some("eng")
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Occurrence {
    #[serde(default)]
    pub media: Vec<Media>,
}

impl Occurrence {
    /// First media URL of this record, if it has any.
    pub fn first_image(&self) -> Option<&str> {
        self.media.iter().find_map(|m| m.identifier.as_deref())
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Media {
    #[serde(rename = "type")]
    pub media_type: Option<String>,
    pub identifier: Option<String>,
}

/// A taxon from `species/{key}/children` or `species/search`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxonRecord {
    pub key: Option<u64>,
    pub canonical_name: Option<String>,
    pub rank: Option<String>,
    pub taxonomic_status: Option<String>,
    #[serde(default)]
    pub vernacular_names: Vec<VernacularName>,
}

impl TaxonRecord {
    pub fn taxon_rank(&self) -> TaxonRank {
        self.rank.as_deref().map(TaxonRank::from).unwrap_or_default()
    }

    /// Accepted names only; records without a status count as accepted.
    pub fn is_accepted(&self) -> bool {
        self.taxonomic_status
            .as_deref()
            .map_or(true, |s| s.eq_ignore_ascii_case("ACCEPTED"))
    }
}

/// GBIF API client.
pub struct GbifClient {
    client: reqwest::Client,
    base_url: String,
    dialect: GbifDialect,
}

impl GbifClient {
    pub fn new(config: &ProviderConfig) -> Result<Self, ProviderError> {
        Ok(Self {
            client: config.http_client()?,
            base_url: config.gbif_url.clone(),
            dialect: GbifDialect,
        })
    }

    async fn fetch<T: serde::de::DeserializeOwned>(
        &self,
        lookup: Lookup,
    ) -> Result<T, ProviderError> {
        let spec = self.dialect.translate(&lookup)?;
        get_json(&self.client, PROVIDER, &self.base_url, &spec).await
    }
}

impl TaxonomyProvider for GbifClient {
    async fn match_name(&self, name: &str) -> Result<NameMatch, ProviderError> {
        let matched: NameMatch = self
            .fetch(Lookup::NameMatch {
                name: name.to_string(),
            })
            .await?;

        tracing::debug!(
            name = %name,
            usage_key = ?matched.usage_key,
            rank = ?matched.rank,
            match_type = ?matched.match_type,
            "GBIF name match"
        );

        Ok(matched)
    }

    async fn species_profiles(&self, key: UsageKey) -> Result<Vec<TraitRecord>, ProviderError> {
        let page: Page<TraitRecord> = self.fetch(Lookup::SpeciesProfiles { key }).await?;
        Ok(page.results)
    }

    async fn vernacular_names(&self, key: UsageKey) -> Result<Vec<VernacularName>, ProviderError> {
        let page: Page<VernacularName> = self.fetch(Lookup::VernacularNames { key }).await?;
        Ok(page.results)
    }

    async fn occurrences(&self, key: UsageKey, limit: usize) -> Result<Vec<Occurrence>, ProviderError> {
        let page: Page<Occurrence> = self.fetch(Lookup::Occurrences { key, limit }).await?;
        Ok(page.results)
    }

    async fn children(&self, key: UsageKey, limit: usize) -> Result<Vec<TaxonRecord>, ProviderError> {
        let page: Page<TaxonRecord> = self.fetch(Lookup::Children { key, limit }).await?;
        Ok(page.results)
    }

    async fn search_vernacular(
        &self,
        term: &str,
        limit: usize,
    ) -> Result<Vec<TaxonRecord>, ProviderError> {
        let page: Page<TaxonRecord> = self
            .fetch(Lookup::VernacularSearch {
                term: term.to_string(),
                limit,
            })
            .await?;
        Ok(page.results)
    }

    async fn health_check(&self) -> Result<(), ProviderError> {
        let matched = self.match_name("Plantae").await?;
        if matched.is_match() {
            Ok(())
        } else {
            Err(ProviderError::Unavailable(PROVIDER))
        }
    }

    fn name(&self) -> &'static str {
        PROVIDER
    }
}
