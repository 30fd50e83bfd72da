//! In-memory providers for pipeline tests.

use herbarium_inventory::{Inventory, InventoryEntry};
use herbarium_model::UsageKey;
use herbarium_providers::{
    AutocompleteProvider, AutocompleteTaxon, ContentUrls, EncyclopediaProvider,
    IdentificationProvider, IdentifyResponse, Media, NameMatch, Occurrence, PageUrls,
    ProviderError, TaxonRecord, TaxonomyProvider, TraitRecord, VernacularName, WikiPage,
};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;

pub const LOTUS_KEY: u64 = 2882429;
pub const QUERCUS_KEY: u64 = 2877951;
pub const AGRIFOLIA_KEY: u64 = 2879098;
pub const NELUMBO_KEY: u64 = 5350425;

fn failure(op: &str) -> ProviderError {
    ProviderError::Connection(format!("{} refused", op))
}

#[derive(Default)]
pub struct FakeTaxonomy {
    pub matches: HashMap<String, NameMatch>,
    pub profiles: HashMap<u64, Vec<TraitRecord>>,
    pub vernacular: HashMap<u64, Vec<VernacularName>>,
    pub occurrences: HashMap<u64, Vec<Occurrence>>,
    pub children: HashMap<u64, Vec<TaxonRecord>>,
    pub vernacular_search: HashMap<String, Vec<TaxonRecord>>,
    /// Operations that fail: "match", "profiles", "vernacular", "occurrences",
    /// "children", "search"
    pub failing: HashSet<&'static str>,
    /// Artificial latency for `match_name`, by lowercased name
    pub delays: HashMap<String, Duration>,
    pub calls: Mutex<Vec<String>>,
}

impl FakeTaxonomy {
    fn record(&self, call: String) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn called(&self, prefix: &str) -> bool {
        self.calls().iter().any(|c| c.starts_with(prefix))
    }

    pub fn with_match(mut self, name: &str, matched: NameMatch) -> Self {
        self.matches.insert(name.to_lowercase(), matched);
        self
    }

    pub fn fail_on(mut self, op: &'static str) -> Self {
        self.failing.insert(op);
        self
    }

    fn check(&self, op: &'static str) -> Result<(), ProviderError> {
        if self.failing.contains(op) {
            Err(failure(op))
        } else {
            Ok(())
        }
    }
}

impl TaxonomyProvider for FakeTaxonomy {
    async fn match_name(&self, name: &str) -> Result<NameMatch, ProviderError> {
        self.record(format!("match:{}", name));
        if let Some(delay) = self.delays.get(&name.to_lowercase()) {
            tokio::time::sleep(*delay).await;
        }
        self.check("match")?;
        Ok(self
            .matches
            .get(&name.to_lowercase())
            .cloned()
            .unwrap_or_else(|| NameMatch {
                match_type: Some("NONE".to_string()),
                ..Default::default()
            }))
    }

    async fn species_profiles(&self, key: UsageKey) -> Result<Vec<TraitRecord>, ProviderError> {
        self.record(format!("profiles:{}", key));
        self.check("profiles")?;
        Ok(self.profiles.get(&key.0).cloned().unwrap_or_default())
    }

    async fn vernacular_names(&self, key: UsageKey) -> Result<Vec<VernacularName>, ProviderError> {
        self.record(format!("vernacular:{}", key));
        self.check("vernacular")?;
        Ok(self.vernacular.get(&key.0).cloned().unwrap_or_default())
    }

    async fn occurrences(&self, key: UsageKey, limit: usize) -> Result<Vec<Occurrence>, ProviderError> {
        self.record(format!("occurrences:{}", key));
        self.check("occurrences")?;
        Ok(self
            .occurrences
            .get(&key.0)
            .map(|records| records.iter().take(limit).cloned().collect())
            .unwrap_or_default())
    }

    async fn children(&self, key: UsageKey, limit: usize) -> Result<Vec<TaxonRecord>, ProviderError> {
        self.record(format!("children:{}", key));
        self.check("children")?;
        Ok(self
            .children
            .get(&key.0)
            .map(|records| records.iter().take(limit).cloned().collect())
            .unwrap_or_default())
    }

    async fn search_vernacular(&self, term: &str, limit: usize) -> Result<Vec<TaxonRecord>, ProviderError> {
        self.record(format!("search:{}", term));
        self.check("search")?;
        Ok(self
            .vernacular_search
            .get(&term.to_lowercase())
            .map(|records| records.iter().take(limit).cloned().collect())
            .unwrap_or_default())
    }

    async fn health_check(&self) -> Result<(), ProviderError> {
        self.check("match")
    }

    fn name(&self) -> &'static str {
        "fake-taxonomy"
    }
}

#[derive(Default)]
pub struct FakeEncyclopedia {
    pub pages: HashMap<String, WikiPage>,
    pub failing: bool,
    pub calls: Mutex<Vec<String>>,
}

impl FakeEncyclopedia {
    pub fn titles(&self) -> Vec<String> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

impl EncyclopediaProvider for FakeEncyclopedia {
    async fn page_summary(&self, title: &str) -> Result<WikiPage, ProviderError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(title.to_string());
        }
        if self.failing {
            return Err(failure("summary"));
        }
        Ok(self
            .pages
            .get(title)
            .cloned()
            .unwrap_or_else(WikiPage::not_found))
    }

    fn name(&self) -> &'static str {
        "fake-encyclopedia"
    }
}

#[derive(Default)]
pub struct FakeAutocomplete {
    pub results: Vec<AutocompleteTaxon>,
    pub failing: bool,
    pub calls: Mutex<usize>,
}

impl FakeAutocomplete {
    pub fn call_count(&self) -> usize {
        self.calls.lock().map(|c| *c).unwrap_or_default()
    }
}

impl AutocompleteProvider for FakeAutocomplete {
    async fn autocomplete(&self, _query: &str) -> Result<Vec<AutocompleteTaxon>, ProviderError> {
        if let Ok(mut calls) = self.calls.lock() {
            *calls += 1;
        }
        if self.failing {
            return Err(ProviderError::Status {
                provider: "fake-autocomplete",
                status: 500,
                body: "boom".to_string(),
            });
        }
        Ok(self.results.clone())
    }

    fn name(&self) -> &'static str {
        "fake-autocomplete"
    }
}

#[derive(Default)]
pub struct FakeIdentification {
    pub response: IdentifyResponse,
    pub delay: Option<Duration>,
    pub failing: bool,
    pub received: Mutex<Vec<String>>,
}

impl IdentificationProvider for FakeIdentification {
    async fn identify(&self, images: &[String]) -> Result<IdentifyResponse, ProviderError> {
        if let Ok(mut received) = self.received.lock() {
            received.extend(images.iter().cloned());
        }
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing {
            return Err(ProviderError::MissingApiKey("fake-identification"));
        }
        Ok(self.response.clone())
    }

    fn name(&self) -> &'static str {
        "fake-identification"
    }
}

pub fn species_match(key: u64, canonical: &str, rank: &str, family: &str) -> NameMatch {
    NameMatch {
        usage_key: Some(key),
        canonical_name: Some(canonical.to_string()),
        scientific_name: Some(canonical.to_string()),
        rank: Some(rank.to_string()),
        status: Some("ACCEPTED".to_string()),
        match_type: Some("EXACT".to_string()),
        kingdom: Some("Plantae".to_string()),
        phylum: Some("Tracheophyta".to_string()),
        class: Some("Magnoliopsida".to_string()),
        order: None,
        family: Some(family.to_string()),
        ..Default::default()
    }
}

pub fn taxon(key: u64, canonical: &str, rank: &str, english: &[&str]) -> TaxonRecord {
    TaxonRecord {
        key: Some(key),
        canonical_name: Some(canonical.to_string()),
        rank: Some(rank.to_string()),
        taxonomic_status: Some("ACCEPTED".to_string()),
        vernacular_names: english.iter().map(|n| eng(n)).collect(),
    }
}

pub fn eng(name: &str) -> VernacularName {
    VernacularName {
        vernacular_name: name.to_string(),
        language: Some("eng".to_string()),
    }
}

pub fn vernacular(name: &str, language: &str) -> VernacularName {
    VernacularName {
        vernacular_name: name.to_string(),
        language: Some(language.to_string()),
    }
}

pub fn occurrence(urls: &[&str]) -> Occurrence {
    Occurrence {
        media: urls
            .iter()
            .map(|url| Media {
                media_type: Some("StillImage".to_string()),
                identifier: Some(url.to_string()),
            })
            .collect(),
    }
}

pub fn wiki_page(title: &str, extract: &str) -> WikiPage {
    WikiPage {
        title: title.to_string(),
        extract: Some(extract.to_string()),
        content_urls: Some(ContentUrls {
            desktop: Some(PageUrls {
                page: Some(format!(
                    "https://en.wikipedia.org/wiki/{}",
                    title.replace(' ', "_")
                )),
            }),
        }),
    }
}

/// A GBIF-like world with the lotus, oaks and a couple of common names.
pub fn world() -> FakeTaxonomy {
    let mut lotus = species_match(LOTUS_KEY, "Nymphaea lotus", "SPECIES", "Nymphaeaceae");
    lotus.order = Some("Nymphaeales".to_string());

    let mut taxonomy = FakeTaxonomy::default()
        .with_match("nymphaea lotus", lotus)
        .with_match(
            "quercus",
            species_match(QUERCUS_KEY, "Quercus", "GENUS", "Fagaceae"),
        )
        .with_match(
            "quercus agrifolia",
            species_match(AGRIFOLIA_KEY, "Quercus agrifolia", "SPECIES", "Fagaceae"),
        )
        .with_match(
            "nelumbo nucifera",
            species_match(NELUMBO_KEY, "Nelumbo nucifera", "SPECIES", "Nelumbonaceae"),
        );

    taxonomy.profiles.insert(
        LOTUS_KEY,
        vec![
            TraitRecord::default(),
            TraitRecord {
                extinct: Some(false),
                terrestrial: Some(false),
                marine: None,
                freshwater: Some(true),
            },
            TraitRecord {
                marine: Some(false),
                freshwater: Some(false),
                ..Default::default()
            },
        ],
    );
    taxonomy.vernacular.insert(
        LOTUS_KEY,
        vec![
            eng("Egyptian lotus"),
            vernacular("Lotus tigré", "fra"),
            eng("Egyptian Lotus"),
            eng("White lotus"),
        ],
    );
    taxonomy.occurrences.insert(
        LOTUS_KEY,
        vec![
            occurrence(&["https://img.gbif.org/lotus/1.jpg", "https://img.gbif.org/lotus/1b.jpg"]),
            Occurrence::default(),
            occurrence(&["https://img.gbif.org/lotus/2.jpg"]),
            occurrence(&["https://img.gbif.org/lotus/3.jpg"]),
            occurrence(&["https://img.gbif.org/lotus/4.jpg"]),
        ],
    );
    taxonomy.children.insert(
        QUERCUS_KEY,
        vec![
            taxon(AGRIFOLIA_KEY, "Quercus agrifolia", "SPECIES", &[]),
            taxon(2878688, "Quercus robur", "SPECIES", &[]),
            TaxonRecord {
                taxonomic_status: Some("SYNONYM".to_string()),
                ..taxon(1, "Quercus pedunculata", "SPECIES", &[])
            },
            taxon(2, "Quercus sect. Lobatae", "SECTION", &[]),
        ],
    );
    taxonomy.vernacular_search.insert(
        "lotus".to_string(),
        vec![
            taxon(NELUMBO_KEY, "Nelumbo nucifera", "SPECIES", &["Lotus", "Sacred lotus"]),
            taxon(LOTUS_KEY, "Nymphaea lotus", "SPECIES", &["Lotus", "Egyptian lotus"]),
            taxon(NELUMBO_KEY, "Nelumbo nucifera", "SPECIES", &["lotus"]),
            taxon(3, "Lotus", "GENUS", &["Bird's-foot trefoil"]),
        ],
    );
    taxonomy.vernacular_search.insert(
        "coast live oak".to_string(),
        vec![
            taxon(AGRIFOLIA_KEY, "Quercus agrifolia", "SPECIES", &["Coast live oak"]),
            taxon(4, "Quercus wislizeni", "SPECIES", &["Interior live oak"]),
        ],
    );

    taxonomy
}

pub fn encyclopedia() -> FakeEncyclopedia {
    let mut pages = HashMap::new();
    for (title, extract) in [
        ("Nymphaea lotus", "Nymphaea lotus, the white Egyptian lotus, is a flowering plant."),
        ("Quercus", "An oak is a hardwood tree or shrub in the genus Quercus."),
        ("Quercus agrifolia", "Quercus agrifolia, the coast live oak, is an evergreen oak."),
        ("Lotus", "Lotus may refer to several plants."),
    ] {
        pages.insert(title.to_string(), wiki_page(title, extract));
    }
    FakeEncyclopedia {
        pages,
        ..Default::default()
    }
}

pub fn inventory() -> Inventory {
    Inventory::new(vec![
        InventoryEntry::new("Quercus agrifolia")
            .with_common_names(&["Coast live oak"])
            .with_model("Coast Live Oak"),
        InventoryEntry::new("Quercus lobata").with_common_names(&["Valley oak"]),
        InventoryEntry::new("Nymphaea lotus")
            .with_common_names(&["Egyptian lotus", "White lotus"])
            .with_model("Egyptian Lotus"),
        InventoryEntry::new("Nelumbo nucifera").with_common_names(&["Sacred lotus", "Indian lotus"]),
        InventoryEntry::new("Umbellularia californica")
            .with_common_names(&["California bay laurel"])
            .with_wiki_name("Umbellularia"),
    ])
    .unwrap()
}
