//! Human-readable rendering of search and identification results.
//!
//! Converts reports into short explanations with supporting evidence, and
//! into the plain-text blocks printed by the command line.

use herbarium_model::{Classification, PlantSuggestion, SpecimenReport};
use serde::{Deserialize, Serialize};
use std::fmt::Write;

/// A structured explanation of a search result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Explanation {
    /// Short summary (1 line)
    pub summary: String,

    /// What the caller can do next (1-2 sentences)
    pub detail: String,

    /// Facts backing the summary, in display order
    pub evidence: Vec<EvidenceItem>,
}

/// One fact behind an explanation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvidenceItem {
    /// Type of evidence
    pub kind: String,

    pub value: String,

    /// Optional label, e.g. the rank name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

impl EvidenceItem {
    fn new(kind: &str, value: impl Into<String>) -> Self {
        Self {
            kind: kind.to_string(),
            value: value.into(),
            context: None,
        }
    }

    fn labeled(kind: &str, label: &str, value: impl Into<String>) -> Self {
        Self {
            context: Some(label.to_string()),
            ..Self::new(kind, value)
        }
    }
}

/// One-line summary of what a term resolved to.
pub fn summarize_report(report: &SpecimenReport) -> String {
    match &report.classification {
        Classification::Species(species) => {
            format!("Species: {} (usage key {})", species.name, species.usage_key)
        }
        Classification::Genus(genus) => format!(
            "Genus: {} ({} {} species)",
            genus.name,
            genus.species.len(),
            report.scope.label()
        ),
        Classification::CommonName(common) => format!(
            "Common name: {} ({} {})",
            common.name,
            common.candidates.len(),
            if common.candidates.len() == 1 { "candidate" } else { "candidates" }
        ),
        Classification::NoMatch { message } => format!("No match: {}", message),
    }
}

/// Explain a report: what matched and which facts back it.
pub fn explain_report(report: &SpecimenReport) -> Explanation {
    let mut evidence = Vec::new();

    let detail = match &report.classification {
        Classification::Species(species) => {
            for (label, value) in species.ranks.entries() {
                if !value.is_empty() {
                    evidence.push(EvidenceItem::labeled("rank", label, value));
                }
            }
            for (label, value) in report.profile.entries() {
                if !value.is_empty() {
                    evidence.push(EvidenceItem::labeled("profile", label, value));
                }
            }
            evidence.extend(
                report
                    .images
                    .urls()
                    .iter()
                    .map(|url| EvidenceItem::new("image", url.as_str())),
            );
            match &report.model_name {
                Some(model) => format!(
                    "'{}' resolved to a single taxon. A 3D model is available as '{}'.",
                    report.display_name, model
                ),
                None => format!("'{}' resolved to a single taxon.", report.display_name),
            }
        }
        Classification::Genus(genus) => {
            evidence.extend(
                genus
                    .species
                    .iter()
                    .map(|name| EvidenceItem::new("species", name.as_str())),
            );
            if genus.species.is_empty() {
                format!(
                    "'{}' is a genus, but no {} species were found for it.",
                    genus.name,
                    report.scope.label()
                )
            } else {
                format!("'{}' is a genus. Pick a species to continue.", genus.name)
            }
        }
        Classification::CommonName(common) => {
            evidence.extend(common.candidates.iter().map(|candidate| {
                EvidenceItem::labeled("candidate", candidate.rank.label(), candidate.name.as_str())
            }));
            match common.candidates.len() {
                0 => format!("'{}' is a common name with no known taxa.", common.name),
                1 => format!(
                    "'{}' is a common name for {}, which could not be resolved further.",
                    common.name, common.candidates[0].name
                ),
                _ => format!(
                    "'{}' is a common name shared by several taxa. Pick one to continue.",
                    common.name
                ),
            }
        }
        Classification::NoMatch { message } => message.clone(),
    };

    if !report.summary.wiki_link.is_empty() {
        evidence.push(EvidenceItem::new("link", report.summary.wiki_link.as_str()));
    }

    Explanation {
        summary: summarize_report(report),
        detail,
        evidence,
    }
}

/// Plain-text block for a report.
pub fn render_report(report: &SpecimenReport) -> String {
    let explanation = explain_report(report);
    let mut out = String::new();

    let _ = writeln!(out, "{}", report.display_name);
    let _ = writeln!(out, "{}", explanation.summary);
    let _ = writeln!(out, "{}", explanation.detail);

    for item in &explanation.evidence {
        match &item.context {
            Some(label) => {
                let _ = writeln!(out, "   {:<14} {}", format!("{}:", label), item.value);
            }
            None => {
                let _ = writeln!(out, "   {:<14} {}", format!("{}:", item.kind), item.value);
            }
        }
    }

    if !report.summary.summary_extract.is_empty() {
        let _ = writeln!(out, "\n{}", report.summary.summary_extract);
    }

    out
}

/// Probability as a whole percentage (`0.914` -> `"91%"`).
pub fn format_probability(probability: f64) -> String {
    format!("{:.0}%", (probability * 100.0).clamp(0.0, 100.0))
}

/// Numbered plain-text list of identification suggestions.
pub fn render_suggestions(suggestions: &[PlantSuggestion]) -> String {
    if suggestions.is_empty() {
        return "No identification suggestions.\n".to_string();
    }

    let mut out = String::new();
    for (i, suggestion) in suggestions.iter().enumerate() {
        let _ = writeln!(
            out,
            "{}. {} ({}, {})",
            i + 1,
            suggestion.scientific_name,
            suggestion.rank.label(),
            format_probability(suggestion.probability)
        );
        if !suggestion.common_names.is_empty() {
            let _ = writeln!(out, "   Common names: {}", suggestion.common_names.join(", "));
        }
        if suggestion.has_model {
            let _ = writeln!(out, "   3D model available");
        }
        if let Some(description) = &suggestion.description {
            let _ = writeln!(out, "   {}", description);
        }
        if let Some(url) = &suggestion.url {
            let _ = writeln!(out, "   {}", url);
        }
    }
    out
}

/// One suggestion per line.
pub fn render_autocomplete(suggestions: &[String]) -> String {
    suggestions
        .iter()
        .map(|s| format!("{}\n", s))
        .collect()
}
