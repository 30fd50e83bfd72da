//! Assembly of the final `SpecimenReport`.

use crate::Enrichment;
use herbarium_inventory::Inventory;
use herbarium_model::{Classification, SearchScope, SpecimenReport};
use herbarium_query::SearchTerm;

/// Merge a classification and its enrichment into one report.
///
/// Profile, images and the 3D model link are kept only for a species
/// match; the summary is kept for every variant.
pub fn normalize(
    term: &SearchTerm,
    scope: SearchScope,
    classification: Classification,
    enrichment: Enrichment,
    inventory: &Inventory,
) -> SpecimenReport {
    let mut report = SpecimenReport::bare(term.as_str(), term.display_name(), scope, classification);
    report.summary = enrichment.summary;

    if let Classification::Species(species) = &report.classification {
        report.model_name = inventory.model_for_species(&species.name).map(str::to_string);
        report.profile = enrichment.profile;
        report.images = enrichment.images;
    }

    report
}
