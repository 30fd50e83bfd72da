//! Search-term parsing and provider dialects.
//!
//! Converts user input into a validated `SearchTerm`, and abstract
//! `Lookup`s into provider-specific request paths and parameters:
//! - GBIF species API (match, profiles, vernacular names, occurrences)
//! - Wikipedia REST summaries
//! - iNaturalist taxa autocomplete

use herbarium_model::UsageKey;
use herbarium_names::{normalize_whitespace, title_case, wiki_title};
use std::str::FromStr;
use thiserror::Error;

/// GBIF backbone key of the Plantae kingdom.
pub const GBIF_PLANTAE_KEY: u64 = 6;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueryError {
    #[error("Empty search term")]
    EmptyTerm,
    #[error("{lookup} is not supported by the {dialect} dialect")]
    Unsupported {
        lookup: &'static str,
        dialect: &'static str,
    },
}

/// How many words a term has, which decides the first lookup strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TermShape {
    /// One word: a genus or a one-word common name
    SingleWord,
    /// Two or more words: "Genus species" or a common-name phrase
    MultiWord,
}

/// A trimmed, non-empty search term with collapsed whitespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTerm {
    text: String,
}

impl SearchTerm {
    pub fn parse(input: &str) -> Result<Self, QueryError> {
        let text = normalize_whitespace(input);
        if text.is_empty() {
            return Err(QueryError::EmptyTerm);
        }
        Ok(Self { text })
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Each word capitalized, for display.
    pub fn display_name(&self) -> String {
        title_case(&self.text)
    }

    pub fn word_count(&self) -> usize {
        self.text.split(' ').count()
    }

    pub fn shape(&self) -> TermShape {
        if self.word_count() > 1 {
            TermShape::MultiWord
        } else {
            TermShape::SingleWord
        }
    }
}

impl FromStr for SearchTerm {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// An abstract lookup against one of the external providers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    /// Classify a name against the taxonomy backbone
    NameMatch { name: String },
    /// Ecological trait records for a taxon
    SpeciesProfiles { key: UsageKey },
    /// Vernacular (common) names for a taxon
    VernacularNames { key: UsageKey },
    /// Occurrence records carrying still images
    Occurrences { key: UsageKey, limit: usize },
    /// Direct child taxa (species of a genus)
    Children { key: UsageKey, limit: usize },
    /// Plant taxa whose vernacular names match a term
    VernacularSearch { term: String, limit: usize },
    /// Encyclopedia summary for an article title
    PageSummary { title: String },
    /// Species-rank autocomplete for a partial query
    Autocomplete { query: String },
}

impl Lookup {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NameMatch { .. } => "name match",
            Self::SpeciesProfiles { .. } => "species profiles",
            Self::VernacularNames { .. } => "vernacular names",
            Self::Occurrences { .. } => "occurrence search",
            Self::Children { .. } => "child taxa",
            Self::VernacularSearch { .. } => "vernacular search",
            Self::PageSummary { .. } => "page summary",
            Self::Autocomplete { .. } => "autocomplete",
        }
    }
}

/// A provider request relative to the provider's base URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestSpec {
    pub path: String,
    pub params: Vec<(&'static str, String)>,
}

impl RequestSpec {
    fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            params: Vec::new(),
        }
    }

    fn param(mut self, name: &'static str, value: impl ToString) -> Self {
        self.params.push((name, value.to_string()));
        self
    }

    /// Absolute URL (without query string) under `base_url`.
    pub fn url(&self, base_url: &str) -> String {
        format!("{}/{}", base_url.trim_end_matches('/'), self.path)
    }
}

/// Trait for translating lookups to a provider's request syntax.
pub trait QueryDialect {
    /// Dialect name for errors and logging
    fn name(&self) -> &'static str;

    /// Translate a lookup to this dialect
    fn translate(&self, lookup: &Lookup) -> Result<RequestSpec, QueryError>;

    fn unsupported(&self, lookup: &Lookup) -> QueryError {
        QueryError::Unsupported {
            lookup: lookup.kind(),
            dialect: self.name(),
        }
    }
}

/// GBIF species and occurrence API.
#[derive(Debug, Default)]
pub struct GbifDialect;

impl QueryDialect for GbifDialect {
    fn name(&self) -> &'static str {
        "gbif"
    }

    fn translate(&self, lookup: &Lookup) -> Result<RequestSpec, QueryError> {
        let spec = match lookup {
            Lookup::NameMatch { name } => {
                let name = normalize_whitespace(name);
                if name.is_empty() {
                    return Err(QueryError::EmptyTerm);
                }
                RequestSpec::new("species/match").param("name", name)
            }
            Lookup::SpeciesProfiles { key } => {
                RequestSpec::new(format!("species/{}/speciesProfiles", key))
            }
            Lookup::VernacularNames { key } => {
                RequestSpec::new(format!("species/{}/vernacularNames", key))
            }
            Lookup::Occurrences { key, limit } => RequestSpec::new("occurrence/search")
                .param("speciesKey", key)
                .param("mediaType", "StillImage")
                .param("limit", limit),
            Lookup::Children { key, limit } => {
                RequestSpec::new(format!("species/{}/children", key)).param("limit", limit)
            }
            Lookup::VernacularSearch { term, limit } => {
                let term = normalize_whitespace(term);
                if term.is_empty() {
                    return Err(QueryError::EmptyTerm);
                }
                RequestSpec::new("species/search")
                    .param("q", term)
                    .param("qField", "VERNACULAR")
                    .param("highertaxonKey", GBIF_PLANTAE_KEY)
                    .param("limit", limit)
            }
            other => return Err(self.unsupported(other)),
        };
        Ok(spec)
    }
}

/// Wikipedia REST v1 summaries.
#[derive(Debug, Default)]
pub struct WikipediaDialect;

impl QueryDialect for WikipediaDialect {
    fn name(&self) -> &'static str {
        "wikipedia"
    }

    fn translate(&self, lookup: &Lookup) -> Result<RequestSpec, QueryError> {
        match lookup {
            Lookup::PageSummary { title } => {
                let title = wiki_title(title);
                if title.is_empty() {
                    return Err(QueryError::EmptyTerm);
                }
                Ok(RequestSpec::new(format!(
                    "page/summary/{}",
                    urlencoding::encode(&title)
                )))
            }
            other => Err(self.unsupported(other)),
        }
    }
}

/// iNaturalist v1 API.
#[derive(Debug, Default)]
pub struct INaturalistDialect;

impl QueryDialect for INaturalistDialect {
    fn name(&self) -> &'static str {
        "inaturalist"
    }

    fn translate(&self, lookup: &Lookup) -> Result<RequestSpec, QueryError> {
        match lookup {
            Lookup::Autocomplete { query } => {
                let query = normalize_whitespace(query);
                if query.is_empty() {
                    return Err(QueryError::EmptyTerm);
                }
                Ok(RequestSpec::new("taxa/autocomplete")
                    .param("rank", "species")
                    .param("q", query))
            }
            other => Err(self.unsupported(other)),
        }
    }
}
