//! Core domain model for the herbarium specimen pipeline.
//!
//! This crate defines the types shared by every other crate:
//! - `SearchScope`: local inventory vs. global reference search
//! - `Classification`: what a search term resolved to
//! - `SpeciesProfile`, `ImageSet`, `EncyclopediaSummary`: enrichment sections
//! - `SpecimenReport`: the normalized response handed to the presentation layer
//! - `PlantSuggestion`: one candidate from photo identification
//!
//! Serialized key names are a fixed contract with the presentation layer,
//! which decides what to render from the presence of `UsageKey`,
//! `speciesList`, `listOfCommonNameSpecies` or `message`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Whether lookups are restricted to the herbarium's own inventory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "bool", into = "bool")]
pub enum SearchScope {
    /// Curated local inventory only
    Local,
    /// Full public reference database
    #[default]
    Global,
}

impl SearchScope {
    pub fn is_local(self) -> bool {
        matches!(self, Self::Local)
    }

    /// Label used when presenting results.
    pub fn label(self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Global => "global",
        }
    }
}

impl From<bool> for SearchScope {
    fn from(local_only: bool) -> Self {
        if local_only {
            Self::Local
        } else {
            Self::Global
        }
    }
}

impl From<SearchScope> for bool {
    fn from(scope: SearchScope) -> Self {
        scope.is_local()
    }
}

/// Stable taxon identifier issued by the taxonomy service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UsageKey(pub u64);

impl fmt::Display for UsageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Taxonomic rank as reported by GBIF.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TaxonRank {
    Kingdom,
    Phylum,
    Class,
    Order,
    Family,
    Genus,
    Species,
    Subspecies,
    Variety,
    Form,
    #[default]
    Unknown,
}

impl TaxonRank {
    /// Species or any infraspecific rank.
    pub fn is_species_level(self) -> bool {
        matches!(
            self,
            Self::Species | Self::Subspecies | Self::Variety | Self::Form
        )
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Kingdom => "Kingdom",
            Self::Phylum => "Phylum",
            Self::Class => "Class",
            Self::Order => "Order",
            Self::Family => "Family",
            Self::Genus => "Genus",
            Self::Species => "Species",
            Self::Subspecies => "Subspecies",
            Self::Variety => "Variety",
            Self::Form => "Form",
            Self::Unknown => "Unknown",
        }
    }
}

impl From<&str> for TaxonRank {
    fn from(s: &str) -> Self {
        match s.to_uppercase().as_str() {
            "KINGDOM" => Self::Kingdom,
            "PHYLUM" => Self::Phylum,
            "CLASS" => Self::Class,
            "ORDER" => Self::Order,
            "FAMILY" => Self::Family,
            "GENUS" => Self::Genus,
            "SPECIES" => Self::Species,
            "SUBSPECIES" => Self::Subspecies,
            "VARIETY" => Self::Variety,
            "FORM" => Self::Form,
            _ => Self::Unknown,
        }
    }
}

/// Higher taxonomic ranks of a resolved species.
///
/// GBIF omits ranks it cannot place; those stay empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Ranks {
    #[serde(default)]
    pub kingdom: String,
    #[serde(default)]
    pub phylum: String,
    #[serde(default)]
    pub class: String,
    #[serde(default)]
    pub order: String,
    #[serde(default)]
    pub family: String,
}

impl Ranks {
    /// Rank labels paired with their values, in display order.
    pub fn entries(&self) -> [(&'static str, &str); 5] {
        [
            ("Kingdom", self.kingdom.as_str()),
            ("Phylum", self.phylum.as_str()),
            ("Class", self.class.as_str()),
            ("Order", self.order.as_str()),
            ("Family", self.family.as_str()),
        ]
    }
}

/// A term resolved to a single taxon with a usage key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeciesMatch {
    /// Canonical scientific name
    pub name: String,

    #[serde(flatten)]
    pub ranks: Ranks,

    #[serde(rename = "UsageKey")]
    pub usage_key: UsageKey,

    /// Encyclopedia title to use when it differs from the canonical name
    #[serde(rename = "wikiName", default, skip_serializing_if = "Option::is_none")]
    pub wiki_name: Option<String>,
}

/// A term resolved to a genus, with the species to choose from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenusMatch {
    /// Canonical genus name
    pub name: String,

    /// Candidate species, scoped by the search scope
    #[serde(rename = "speciesList", default)]
    pub species: Vec<String>,
}

/// One taxon sharing a searched common name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommonNameCandidate {
    pub name: String,
    pub rank: TaxonRank,
}

impl CommonNameCandidate {
    pub fn new(name: impl Into<String>, rank: TaxonRank) -> Self {
        Self {
            name: name.into(),
            rank,
        }
    }
}

/// A common name shared by several taxa, presented for disambiguation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommonNameMatch {
    /// The common name as searched (display form)
    pub name: String,

    #[serde(rename = "listOfCommonNameSpecies", default)]
    pub candidates: Vec<CommonNameCandidate>,
}

/// What a search term resolved to.
///
/// Exactly one variant is populated; only `Species` carries a usage key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Classification {
    Species(SpeciesMatch),
    Genus(GenusMatch),
    CommonName(CommonNameMatch),
    NoMatch { message: String },
}

impl Classification {
    pub fn no_match(message: impl Into<String>) -> Self {
        Self::NoMatch {
            message: message.into(),
        }
    }

    pub fn usage_key(&self) -> Option<UsageKey> {
        match self {
            Self::Species(species) => Some(species.usage_key),
            _ => None,
        }
    }

    /// Canonical name of the resolved entity, if any.
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Species(species) => Some(&species.name),
            Self::Genus(genus) => Some(&genus.name),
            Self::CommonName(common) => Some(&common.name),
            Self::NoMatch { .. } => None,
        }
    }

    /// Title to look up in the encyclopedia, honoring an override name.
    pub fn encyclopedia_title(&self) -> Option<&str> {
        match self {
            Self::Species(species) => Some(species.wiki_name.as_deref().unwrap_or(&species.name)),
            other => other.name(),
        }
    }

    pub fn is_species(&self) -> bool {
        matches!(self, Self::Species(_))
    }

    pub fn kind_label(&self) -> &'static str {
        match self {
            Self::Species(_) => "species",
            Self::Genus(_) => "genus",
            Self::CommonName(_) => "common name",
            Self::NoMatch { .. } => "no match",
        }
    }
}

/// Yes/No/unknown fact flag, serialized as `"Yes"`, `"No"` or `""`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TriState {
    #[serde(rename = "Yes")]
    Yes,
    #[serde(rename = "No")]
    No,
    #[default]
    #[serde(rename = "")]
    Unknown,
}

impl TriState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Yes => "Yes",
            Self::No => "No",
            Self::Unknown => "",
        }
    }

    pub fn is_known(self) -> bool {
        !matches!(self, Self::Unknown)
    }
}

impl From<Option<bool>> for TriState {
    fn from(value: Option<bool>) -> Self {
        match value {
            Some(true) => Self::Yes,
            Some(false) => Self::No,
            None => Self::Unknown,
        }
    }
}

/// Named facts about a species. Unknown facts are empty, never absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeciesProfile {
    #[serde(rename = "Common Names", default)]
    pub common_names: String,
    #[serde(rename = "Extinct", default)]
    pub extinct: TriState,
    #[serde(rename = "Terrestrial", default)]
    pub terrestrial: TriState,
    #[serde(rename = "Marine", default)]
    pub marine: TriState,
    #[serde(rename = "Freshwater", default)]
    pub freshwater: TriState,
}

impl SpeciesProfile {
    /// Fact labels paired with their display values, in display order.
    pub fn entries(&self) -> [(&'static str, &str); 5] {
        [
            ("Common Names", self.common_names.as_str()),
            ("Extinct", self.extinct.as_str()),
            ("Terrestrial", self.terrestrial.as_str()),
            ("Marine", self.marine.as_str()),
            ("Freshwater", self.freshwater.as_str()),
        ]
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// Representative image URLs, in provider order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageSet(pub Vec<String>);

impl ImageSet {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn urls(&self) -> &[String] {
        &self.0
    }
}

impl From<Vec<String>> for ImageSet {
    fn from(urls: Vec<String>) -> Self {
        Self(urls)
    }
}

/// Encyclopedia description and canonical article link.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncyclopediaSummary {
    #[serde(default)]
    pub summary_extract: String,
    #[serde(default)]
    pub wiki_link: String,
}

impl EncyclopediaSummary {
    pub fn new(summary_extract: impl Into<String>, wiki_link: impl Into<String>) -> Self {
        Self {
            summary_extract: summary_extract.into(),
            wiki_link: wiki_link.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.summary_extract.is_empty() && self.wiki_link.is_empty()
    }
}

/// The normalized response for one specimen search.
///
/// Every section is always present; species-only sections stay empty
/// unless the classification is a species match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpecimenReport {
    /// The term as searched: trimmed, inner whitespace collapsed to single spaces
    pub term: String,

    /// Title-cased form of the term
    pub display_name: String,

    /// Scope used for candidate lists
    #[serde(rename = "localOnly")]
    pub scope: SearchScope,

    pub classification: Classification,

    #[serde(default)]
    pub profile: SpeciesProfile,

    #[serde(default)]
    pub images: ImageSet,

    #[serde(default)]
    pub summary: EncyclopediaSummary,

    /// 3D model available in the local catalog for this species
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_name: Option<String>,
}

impl SpecimenReport {
    /// A report with every enrichment section empty.
    pub fn bare(
        term: impl Into<String>,
        display_name: impl Into<String>,
        scope: SearchScope,
        classification: Classification,
    ) -> Self {
        Self {
            term: term.into(),
            display_name: display_name.into(),
            scope,
            classification,
            profile: SpeciesProfile::default(),
            images: ImageSet::default(),
            summary: EncyclopediaSummary::default(),
            model_name: None,
        }
    }

    pub fn local_only(&self) -> bool {
        self.scope.is_local()
    }
}

/// One candidate returned by photo identification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlantSuggestion {
    /// Provider confidence (0.0 - 1.0)
    pub probability: f64,

    pub scientific_name: String,

    /// Species when the structured name carries a species part, else Genus
    pub rank: TaxonRank,

    #[serde(default)]
    pub common_names: Vec<String>,

    /// Encyclopedia description, truncated for display
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(default)]
    pub similar_images: Vec<String>,

    /// Whether the local catalog has a 3D model of this taxon
    #[serde(default)]
    pub has_model: bool,
}
