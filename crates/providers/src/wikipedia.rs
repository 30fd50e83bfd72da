//! Wikipedia REST summary client.

use crate::{get_json, EncyclopediaProvider, ProviderConfig, ProviderError};
use herbarium_model::EncyclopediaSummary;
use herbarium_query::{Lookup, QueryDialect, WikipediaDialect};
use serde::{Deserialize, Serialize};

const PROVIDER: &str = "wikipedia";

/// Title Wikipedia reports for a missing article.
pub const NOT_FOUND_TITLE: &str = "Not found.";

/// Response of `page/summary/{title}`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct WikiPage {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub extract: Option<String>,
    #[serde(default)]
    pub content_urls: Option<ContentUrls>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ContentUrls {
    pub desktop: Option<PageUrls>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PageUrls {
    pub page: Option<String>,
}

impl WikiPage {
    pub fn not_found() -> Self {
        Self {
            title: NOT_FOUND_TITLE.to_string(),
            ..Default::default()
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.title == NOT_FOUND_TITLE
    }

    /// Desktop article URL.
    pub fn link(&self) -> Option<&str> {
        self.content_urls
            .as_ref()
            .and_then(|urls| urls.desktop.as_ref())
            .and_then(|desktop| desktop.page.as_deref())
    }

    /// Extract and link; both empty for a missing article.
    pub fn into_summary(self) -> EncyclopediaSummary {
        if self.is_not_found() {
            return EncyclopediaSummary::default();
        }
        let link = self.link().unwrap_or_default().to_string();
        EncyclopediaSummary::new(self.extract.unwrap_or_default(), link)
    }
}

/// Wikipedia REST API client.
pub struct WikipediaClient {
    client: reqwest::Client,
    base_url: String,
    dialect: WikipediaDialect,
}

impl WikipediaClient {
    pub fn new(config: &ProviderConfig) -> Result<Self, ProviderError> {
        Ok(Self {
            client: config.http_client()?,
            base_url: config.wikipedia_url.clone(),
            dialect: WikipediaDialect,
        })
    }
}

impl EncyclopediaProvider for WikipediaClient {
    async fn page_summary(&self, title: &str) -> Result<WikiPage, ProviderError> {
        let spec = self.dialect.translate(&Lookup::PageSummary {
            title: title.to_string(),
        })?;

        match get_json::<WikiPage>(&self.client, PROVIDER, &self.base_url, &spec).await {
            Ok(page) => Ok(page),
            Err(ProviderError::Status { status: 404, .. }) => {
                tracing::debug!(title = %title, "No encyclopedia article");
                Ok(WikiPage::not_found())
            }
            Err(e) => Err(e),
        }
    }

    fn name(&self) -> &'static str {
        PROVIDER
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_summary() {
        let page: WikiPage = serde_json::from_str(
            r#"{
                "type": "standard",
                "title": "Nymphaea lotus",
                "extract": "Nymphaea lotus, the white Egyptian lotus, is a flowering plant.",
                "content_urls": {
                    "desktop": {"page": "https://en.wikipedia.org/wiki/Nymphaea_lotus"},
                    "mobile": {"page": "https://en.m.wikipedia.org/wiki/Nymphaea_lotus"}
                }
            }"#,
        )
        .unwrap();

        assert!(!page.is_not_found());
        let summary = page.into_summary();
        assert!(summary.summary_extract.starts_with("Nymphaea lotus"));
        assert_eq!(summary.wiki_link, "https://en.wikipedia.org/wiki/Nymphaea_lotus");
    }

    #[test]
    fn test_not_found_body_gives_empty_summary() {
        let page: WikiPage = serde_json::from_str(
            r#"{"type": "https://mediawiki.org/wiki/HyperSwitch/errors/not_found",
                "title": "Not found.", "method": "get", "detail": "Page or revision not found."}"#,
        )
        .unwrap();

        assert!(page.is_not_found());
        assert_eq!(page.into_summary(), EncyclopediaSummary::default());
        assert_eq!(WikiPage::not_found().into_summary(), EncyclopediaSummary::default());
    }

    #[test]
    fn test_missing_link_is_empty() {
        let page = WikiPage {
            title: "Quercus".to_string(),
            extract: Some("Oaks.".to_string()),
            content_urls: None,
        };
        assert_eq!(page.link(), None);
        assert_eq!(page.into_summary(), EncyclopediaSummary::new("Oaks.", ""));
    }
}
