//! Name suggestions while the user types.

use herbarium_inventory::Inventory;
use herbarium_model::SearchScope;
use herbarium_names::dedup_case_insensitive;
use herbarium_providers::{AutocompleteProvider, ProviderError};

/// iNaturalist iconic taxon id of Plantae.
pub const PLANTAE_ICONIC_TAXON: u64 = 47126;

#[derive(Debug, Clone)]
pub struct AutocompleteConfig {
    /// Maximum suggestions returned
    pub limit: usize,
    /// Only taxa under this iconic taxon are suggested
    pub iconic_taxon_id: u64,
}

impl Default for AutocompleteConfig {
    fn default() -> Self {
        Self {
            limit: 15,
            iconic_taxon_id: PLANTAE_ICONIC_TAXON,
        }
    }
}

/// Suggests names from the autocomplete service or the local inventory.
pub struct Autocomplete<A> {
    provider: A,
    inventory: Inventory,
    config: AutocompleteConfig,
}

impl<A: AutocompleteProvider> Autocomplete<A> {
    pub fn new(provider: A, inventory: Inventory, config: AutocompleteConfig) -> Self {
        Self {
            provider,
            inventory,
            config,
        }
    }

    /// Suggestions for a partial query. A blank query yields nothing
    /// without contacting the provider; provider errors propagate.
    pub async fn suggest(
        &self,
        query: &str,
        scope: SearchScope,
    ) -> Result<Vec<String>, ProviderError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }

        if scope.is_local() {
            return Ok(self.inventory.suggest(query, self.config.limit));
        }

        let taxa = self.provider.autocomplete(query).await?;
        let mut suggestions = dedup_case_insensitive(
            taxa.iter()
                .filter(|taxon| taxon.in_iconic_taxon(self.config.iconic_taxon_id))
                .filter_map(|taxon| taxon.matched_term.as_deref()),
        );
        suggestions.truncate(self.config.limit);

        tracing::debug!(
            query = %query,
            provider = self.provider.name(),
            received = taxa.len(),
            kept = suggestions.len(),
            "Autocomplete suggestions"
        );

        Ok(suggestions)
    }
}
