//! Enrichment of a classification with profile facts, images and an
//! encyclopedia summary.

use crate::SpecimenPipeline;
use herbarium_model::{
    Classification, EncyclopediaSummary, ImageSet, SpeciesProfile, TriState, UsageKey,
};
use herbarium_names::{dedup_case_insensitive, join_names};
use herbarium_providers::{
    EncyclopediaProvider, Occurrence, TaxonomyProvider, TraitRecord, VernacularName,
};

/// Sections fetched for one classification. Failed fetches leave their
/// section at its empty default.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Enrichment {
    pub profile: SpeciesProfile,
    pub images: ImageSet,
    pub summary: EncyclopediaSummary,
}

impl<T: TaxonomyProvider, E: EncyclopediaProvider> SpecimenPipeline<T, E> {
    /// Fetch every section that applies to `classification`.
    ///
    /// Species matches get profile, images and summary concurrently; genus
    /// and common-name matches only a summary; `NoMatch` nothing.
    pub async fn enrich(&self, classification: &Classification) -> Enrichment {
        let title = classification.encyclopedia_title();

        match classification.usage_key() {
            Some(key) => {
                let (profile, images, summary) = tokio::join!(
                    self.fetch_profile(key),
                    self.fetch_images(key),
                    self.fetch_summary(title),
                );
                Enrichment {
                    profile,
                    images,
                    summary,
                }
            }
            None => Enrichment {
                summary: self.fetch_summary(title).await,
                ..Default::default()
            },
        }
    }

    async fn fetch_profile(&self, key: UsageKey) -> SpeciesProfile {
        let traits = self
            .taxonomy
            .species_profiles(key)
            .await
            .unwrap_or_else(|e| {
                tracing::warn!(usage_key = %key, error = %e, "Species profile fetch failed");
                Vec::new()
            });

        let names = self
            .taxonomy
            .vernacular_names(key)
            .await
            .unwrap_or_else(|e| {
                tracing::warn!(usage_key = %key, error = %e, "Vernacular name fetch failed");
                Vec::new()
            });

        merge_profile(&traits, &names)
    }

    async fn fetch_images(&self, key: UsageKey) -> ImageSet {
        match self
            .taxonomy
            .occurrences(key, self.config.occurrence_page)
            .await
        {
            Ok(records) => collect_images(&records, self.config.image_cap),
            Err(e) => {
                tracing::warn!(usage_key = %key, error = %e, "Occurrence image fetch failed");
                ImageSet::default()
            }
        }
    }

    async fn fetch_summary(&self, title: Option<&str>) -> EncyclopediaSummary {
        let Some(title) = title else {
            return EncyclopediaSummary::default();
        };

        match self.encyclopedia.page_summary(title).await {
            Ok(page) => page.into_summary(),
            Err(e) => {
                tracing::warn!(
                    title = %title,
                    provider = self.encyclopedia.name(),
                    error = %e,
                    "Encyclopedia fetch failed"
                );
                EncyclopediaSummary::default()
            }
        }
    }
}

/// Fold trait records and vernacular names into one profile.
///
/// Each flag takes the first record that defines it. Common names are the
/// English names, deduplicated case-insensitively, joined with ", ".
pub fn merge_profile(traits: &[TraitRecord], names: &[VernacularName]) -> SpeciesProfile {
    let first = |flag: fn(&TraitRecord) -> Option<bool>| {
        TriState::from(traits.iter().find_map(flag))
    };

    let english = dedup_case_insensitive(
        names
            .iter()
            .filter(|name| name.is_english())
            .map(|name| name.vernacular_name.as_str()),
    );

    SpeciesProfile {
        common_names: join_names(&english),
        extinct: first(|t| t.extinct),
        terrestrial: first(|t| t.terrestrial),
        marine: first(|t| t.marine),
        freshwater: first(|t| t.freshwater),
    }
}

/// First image of each record that has one, in record order, at most `cap`.
pub fn collect_images(records: &[Occurrence], cap: usize) -> ImageSet {
    records
        .iter()
        .filter_map(Occurrence::first_image)
        .take(cap)
        .map(str::to_string)
        .collect::<Vec<_>>()
        .into()
}
