//! Specimen resolution pipeline.
//!
//! Turns a typed search term into a `SpecimenReport`:
//! 1. Resolve the term to a species, genus, common name or nothing
//! 2. Enrich a species with profile facts, images and a summary
//! 3. Normalize everything into one report
//!
//! Also hosts autocomplete and photo identification, which share the
//! provider traits and the local inventory but not the search flow.

mod autocomplete;
mod enrich;
mod generation;
mod identify;
mod normalize;
mod resolve;

#[cfg(test)]
mod testing;

pub use autocomplete::{Autocomplete, AutocompleteConfig, PLANTAE_ICONIC_TAXON};
pub use enrich::{collect_images, merge_profile, Enrichment};
pub use generation::{SearchGenerations, SearchTicket};
pub use identify::{IdentifyConfig, IdentifyError, Identifier};
pub use normalize::normalize;
pub use resolve::{accepted_species, common_name_candidates};

use herbarium_inventory::Inventory;
use herbarium_model::{Classification, SearchScope, SpecimenReport};
use herbarium_names::{normalize_whitespace, title_case};
use herbarium_providers::{EncyclopediaProvider, ProviderError, TaxonomyProvider};
use herbarium_query::SearchTerm;

/// Page sizes and caps for a search.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Images kept per species
    pub image_cap: usize,
    /// Occurrence records requested when looking for images
    pub occurrence_page: usize,
    /// Children requested when listing a genus
    pub children_page: usize,
    /// Records requested from the vernacular-name search
    pub vernacular_page: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            image_cap: 3,
            occurrence_page: 20,
            children_page: 100,
            vernacular_page: 20,
        }
    }
}

/// Resolves and enriches search terms against a taxonomy backbone and an
/// encyclopedia.
pub struct SpecimenPipeline<T, E> {
    taxonomy: T,
    encyclopedia: E,
    inventory: Inventory,
    config: PipelineConfig,
    generations: SearchGenerations,
}

impl<T: TaxonomyProvider, E: EncyclopediaProvider> SpecimenPipeline<T, E> {
    pub fn new(taxonomy: T, encyclopedia: E, inventory: Inventory, config: PipelineConfig) -> Self {
        Self {
            taxonomy,
            encyclopedia,
            inventory,
            config,
            generations: SearchGenerations::new(),
        }
    }

    pub fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Resolve, enrich and normalize one term. Never fails; problems are
    /// reported through `Classification::NoMatch` and empty sections.
    pub async fn search(&self, input: &str, scope: SearchScope) -> SpecimenReport {
        let term = match SearchTerm::parse(input) {
            Ok(term) => term,
            Err(e) => {
                let text = normalize_whitespace(input);
                return SpecimenReport::bare(
                    text.as_str(),
                    title_case(&text),
                    scope,
                    Classification::no_match(e.to_string()),
                );
            }
        };

        let classification = self.classify(&term, scope).await;

        tracing::info!(
            term = %term.as_str(),
            scope = scope.label(),
            kind = classification.kind_label(),
            usage_key = ?classification.usage_key(),
            "Resolved search term"
        );

        let enrichment = self.enrich(&classification).await;
        normalize(&term, scope, classification, enrichment, &self.inventory)
    }

    /// Like `search`, but returns `None` when a newer search was started
    /// before this one finished.
    pub async fn search_latest(&self, input: &str, scope: SearchScope) -> Option<SpecimenReport> {
        let ticket = self.generations.issue();
        let report = self.search(input, scope).await;

        if self.generations.is_current(ticket) {
            Some(report)
        } else {
            tracing::debug!(
                term = %input,
                generation = ticket.generation(),
                latest = self.generations.latest(),
                "Discarding stale search result"
            );
            None
        }
    }

    /// Search the species behind a 3D model display name.
    pub async fn search_model(&self, model: &str, scope: SearchScope) -> Option<SpecimenReport> {
        let species = self.inventory.species_for_model(model)?.to_string();
        Some(self.search(&species, scope).await)
    }

    pub async fn health_check(&self) -> Result<(), ProviderError> {
        self.taxonomy.health_check().await
    }

    pub fn taxonomy_name(&self) -> &'static str {
        self.taxonomy.name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::*;
    use herbarium_model::{TriState, UsageKey};
    use pretty_assertions::assert_eq;
    use std::time::Duration;

    fn pipeline(taxonomy: FakeTaxonomy) -> SpecimenPipeline<FakeTaxonomy, FakeEncyclopedia> {
        SpecimenPipeline::new(taxonomy, encyclopedia(), inventory(), PipelineConfig::default())
    }

    #[tokio::test]
    async fn test_lotus_global_report() {
        let p = pipeline(world());
        let report = p.search("nymphaea lotus", SearchScope::Global).await;

        let Classification::Species(species) = &report.classification else {
            panic!("expected species, got {:?}", report.classification);
        };
        assert_eq!(species.ranks.kingdom, "Plantae");
        assert_eq!(species.ranks.family, "Nymphaeaceae");
        assert_eq!(species.usage_key, UsageKey(LOTUS_KEY));

        assert_eq!(report.display_name, "Nymphaea Lotus");
        assert!(report.profile.common_names.contains("Egyptian lotus"));
        assert_eq!(report.profile.freshwater, TriState::Yes);
        assert!(report.images.len() <= 3);
        assert!(report.summary.wiki_link.contains("wikipedia.org/wiki/Nymphaea_lotus"));
        assert_eq!(report.model_name.as_deref(), Some("Egyptian Lotus"));
        assert!(!report.local_only());
    }

    #[tokio::test]
    async fn test_quercus_local_report() {
        let p = pipeline(world());
        let report = p.search("Quercus", SearchScope::Local).await;

        assert_eq!(
            report.classification,
            Classification::Genus(herbarium_model::GenusMatch {
                name: "Quercus".to_string(),
                species: vec!["Quercus agrifolia".to_string(), "Quercus lobata".to_string()],
            })
        );
        assert!(report.profile.is_empty());
        assert!(report.images.is_empty());
        assert!(report.local_only());
    }

    #[tokio::test]
    async fn test_unknown_term_report_is_empty() {
        let p = pipeline(world());
        let report = p.search("zzzznotaplant", SearchScope::Global).await;

        assert!(matches!(report.classification, Classification::NoMatch { ref message } if !message.is_empty()));
        assert!(report.profile.is_empty());
        assert!(report.images.is_empty());
        assert!(report.summary.is_empty());
        assert!(p.encyclopedia.titles().is_empty());
    }

    #[tokio::test]
    async fn test_report_term_is_whitespace_normalized() {
        let p = pipeline(world());
        let report = p.search("  nymphaea \t lotus ", SearchScope::Global).await;
        assert_eq!(report.term, "nymphaea lotus");
        assert_eq!(report.display_name, "Nymphaea Lotus");
    }

    #[tokio::test]
    async fn test_blank_input_is_no_match() {
        let p = pipeline(world());
        let report = p.search("   ", SearchScope::Local).await;
        assert!(matches!(report.classification, Classification::NoMatch { .. }));
        assert_eq!(report.term, "");
        assert!(p.taxonomy.calls().is_empty());
    }

    #[tokio::test]
    async fn test_stale_search_is_discarded() {
        let mut taxonomy = world();
        taxonomy
            .delays
            .insert("nymphaea lotus".to_string(), Duration::from_millis(50));
        let p = pipeline(taxonomy);

        let (slow, fast) = tokio::join!(
            p.search_latest("nymphaea lotus", SearchScope::Global),
            p.search_latest("Quercus", SearchScope::Local),
        );

        assert!(slow.is_none());
        assert_eq!(fast.map(|r| r.display_name), Some("Quercus".to_string()));
    }

    #[tokio::test]
    async fn test_latest_search_is_kept() {
        let p = pipeline(world());
        let report = p.search_latest("quercus", SearchScope::Global).await;
        assert!(report.is_some());
    }

    #[tokio::test]
    async fn test_search_by_model_name() {
        let p = pipeline(world());
        let report = p
            .search_model("coast live oak", SearchScope::Global)
            .await
            .unwrap();
        assert_eq!(report.classification.usage_key(), Some(UsageKey(AGRIFOLIA_KEY)));
        assert!(p.search_model("Giant Sequoia", SearchScope::Global).await.is_none());
    }

    #[tokio::test]
    async fn test_health_check_uses_taxonomy() {
        assert!(pipeline(world()).health_check().await.is_ok());
        assert!(pipeline(world().fail_on("match")).health_check().await.is_err());
    }
}
