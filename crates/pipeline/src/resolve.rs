//! Term-type resolution.
//!
//! Decides whether a term names a species, a genus or a common name, and
//! produces the matching `Classification`. Two-word terms try a direct
//! backbone match first; common names are looked up in the active dataset;
//! single words fall through to a genus check.

use crate::SpecimenPipeline;
use herbarium_model::{
    Classification, CommonNameCandidate, CommonNameMatch, GenusMatch, SearchScope, SpeciesMatch,
    TaxonRank,
};
use herbarium_names::{
    capitalize, dedup_case_insensitive, eq_ignore_case, is_genus_shaped, scientific_case,
};
use herbarium_providers::{EncyclopediaProvider, NameMatch, ProviderError, TaxonRecord, TaxonomyProvider};
use herbarium_query::{SearchTerm, TermShape};

impl<T: TaxonomyProvider, E: EncyclopediaProvider> SpecimenPipeline<T, E> {
    /// Classify a term within `scope`. Never fails: taxonomy errors are
    /// logged and reported as `NoMatch`.
    pub async fn classify(&self, term: &SearchTerm, scope: SearchScope) -> Classification {
        match self.try_classify(term, scope).await {
            Ok(classification) => classification,
            Err(e) => {
                tracing::warn!(
                    term = %term.as_str(),
                    provider = self.taxonomy.name(),
                    error = %e,
                    "Classification failed"
                );
                Classification::no_match(format!(
                    "Could not look up \"{}\": {}",
                    term.display_name(),
                    e
                ))
            }
        }
    }

    async fn try_classify(
        &self,
        term: &SearchTerm,
        scope: SearchScope,
    ) -> Result<Classification, ProviderError> {
        if term.shape() == TermShape::MultiWord {
            let matched = self.taxonomy.match_name(term.as_str()).await?;
            if let Some(species) = self.species_from_match(&matched, term.as_str()) {
                return Ok(Classification::Species(species));
            }
        }

        if let Some(classification) = self.resolve_common_name(term, scope).await? {
            return Ok(classification);
        }

        if term.shape() == TermShape::SingleWord {
            if let Some(genus) = self.resolve_genus(term, scope).await? {
                return Ok(Classification::Genus(genus));
            }
        }

        Ok(Classification::no_match(format!(
            "No match found for \"{}\"",
            term.display_name()
        )))
    }

    /// A species match from a backbone answer that resolved to a usage key
    /// at species level or below.
    fn species_from_match(&self, matched: &NameMatch, queried: &str) -> Option<SpeciesMatch> {
        let usage_key = matched.usage_key()?;
        if matched.is_higher_rank() || !matched.taxon_rank().is_species_level() {
            return None;
        }

        let name = matched
            .canonical()
            .map(str::to_string)
            .unwrap_or_else(|| scientific_case(queried));
        let wiki_name = self.inventory.wiki_name_for(&name).map(str::to_string);

        Some(SpeciesMatch {
            name,
            ranks: matched.ranks(),
            usage_key,
            wiki_name,
        })
    }

    async fn resolve_common_name(
        &self,
        term: &SearchTerm,
        scope: SearchScope,
    ) -> Result<Option<Classification>, ProviderError> {
        let candidates = match scope {
            SearchScope::Local => self.inventory.by_common_name(term.as_str()),
            SearchScope::Global => match self
                .taxonomy
                .search_vernacular(term.as_str(), self.config.vernacular_page)
                .await
            {
                Ok(records) => common_name_candidates(term.as_str(), &records),
                Err(e) => {
                    tracing::warn!(
                        term = %term.as_str(),
                        provider = self.taxonomy.name(),
                        error = %e,
                        "Common-name search failed"
                    );
                    Vec::new()
                }
            },
        };

        tracing::debug!(
            term = %term.as_str(),
            scope = scope.label(),
            candidates = candidates.len(),
            "Common-name candidates"
        );

        match candidates.len() {
            0 => Ok(None),
            1 => {
                let only = &candidates[0];
                let matched = self.taxonomy.match_name(&only.name).await?;
                if matched.taxon_rank() == TaxonRank::Genus {
                    if let Some(genus) = self.genus_from_match(&matched, &only.name, scope).await? {
                        tracing::debug!(
                            term = %term.as_str(),
                            genus = %genus.name,
                            "Common name names a genus"
                        );
                        return Ok(Some(Classification::Genus(genus)));
                    }
                } else if let Some(species) = self.species_from_match(&matched, &only.name) {
                    tracing::debug!(
                        term = %term.as_str(),
                        species = %species.name,
                        "Auto-resolved common name"
                    );
                    return Ok(Some(Classification::Species(species)));
                }
                Ok(Some(Classification::CommonName(CommonNameMatch {
                    name: term.display_name(),
                    candidates,
                })))
            }
            _ => Ok(Some(Classification::CommonName(CommonNameMatch {
                name: term.display_name(),
                candidates,
            }))),
        }
    }

    async fn resolve_genus(
        &self,
        term: &SearchTerm,
        scope: SearchScope,
    ) -> Result<Option<GenusMatch>, ProviderError> {
        let word = term.as_str();
        if !is_genus_shaped(word) {
            return Ok(None);
        }

        if scope.is_local() && self.inventory.has_genus(word) {
            let name = capitalize(word);
            return Ok(Some(GenusMatch {
                species: self.inventory.species_in_genus(&name),
                name,
            }));
        }

        let matched = self.taxonomy.match_name(word).await?;
        self.genus_from_match(&matched, word, scope).await
    }

    /// A genus and its species list from a backbone answer of rank GENUS.
    async fn genus_from_match(
        &self,
        matched: &NameMatch,
        queried: &str,
        scope: SearchScope,
    ) -> Result<Option<GenusMatch>, ProviderError> {
        let key = match matched.usage_key() {
            Some(key) if matched.taxon_rank() == TaxonRank::Genus => key,
            _ => return Ok(None),
        };
        let name = matched
            .canonical()
            .map(str::to_string)
            .unwrap_or_else(|| capitalize(queried));

        let species = match scope {
            // No global fallback: an empty local list is a valid answer.
            SearchScope::Local => self.inventory.species_in_genus(&name),
            SearchScope::Global => {
                let children = self.taxonomy.children(key, self.config.children_page).await?;
                accepted_species(&children)
            }
        };

        Ok(Some(GenusMatch { name, species }))
    }
}

/// Species and genera whose English vernacular name is exactly `term`,
/// one per canonical name, in provider order.
pub fn common_name_candidates(term: &str, records: &[TaxonRecord]) -> Vec<CommonNameCandidate> {
    let mut seen: Vec<String> = Vec::new();
    let mut candidates = Vec::new();

    for record in records {
        let rank = record.taxon_rank();
        if !(rank.is_species_level() || rank == TaxonRank::Genus) {
            continue;
        }
        let Some(name) = record.canonical_name.as_deref() else {
            continue;
        };
        let named = record
            .vernacular_names
            .iter()
            .any(|v| v.is_english() && eq_ignore_case(&v.vernacular_name, term));
        if !named {
            continue;
        }

        let lowered = name.to_lowercase();
        if !seen.contains(&lowered) {
            seen.push(lowered);
            candidates.push(CommonNameCandidate::new(name, rank));
        }
    }

    candidates
}

/// Accepted species among a genus's children.
pub fn accepted_species(children: &[TaxonRecord]) -> Vec<String> {
    dedup_case_insensitive(
        children
            .iter()
            .filter(|child| child.is_accepted() && child.taxon_rank() == TaxonRank::Species)
            .filter_map(|child| child.canonical_name.as_deref()),
    )
}
