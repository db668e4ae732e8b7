//! Turning one search result element into a [`SearchResult`].
//!
//! GitHub has shipped several layouts of the code search page. Each layout
//! gets an [`ExtractionStrategy`]; they are tried in [`CASCADE`] order and the
//! first one that yields fields wins.

use async_trait::async_trait;
use fantoccini::elements::Element;
use fantoccini::Locator;
use tracing::debug;

use crate::error::{Error, Result};
use crate::result::SearchResult;

/// The slice of a DOM element the strategies need.
#[async_trait]
pub trait ResultNode: Sized + Send + Sync {
    /// First descendant matching `css`; an error when there is none.
    async fn select_one(&self, css: &str) -> Result<Self>;
    async fn select_all(&self, css: &str) -> Result<Vec<Self>>;
    async fn inner_text(&self) -> Result<String>;
    /// Resolved `href`, if the element has one.
    async fn link(&self) -> Result<Option<String>>;
}

#[async_trait]
impl ResultNode for Element {
    async fn select_one(&self, css: &str) -> Result<Self> {
        Ok(self.find(Locator::Css(css)).await?)
    }

    async fn select_all(&self, css: &str) -> Result<Vec<Self>> {
        Ok(self.find_all(Locator::Css(css)).await?)
    }

    async fn inner_text(&self) -> Result<String> {
        Ok(self.text().await?)
    }

    async fn link(&self) -> Result<Option<String>> {
        Ok(self.prop("href").await?)
    }
}

/// Raw fields pulled out of a result element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScrapedItem {
    pub repository: String,
    pub path: String,
    pub file_url: String,
}

impl ScrapedItem {
    /// Only links following the `/blob/` convention point at a file.
    pub fn into_result(self) -> Result<SearchResult> {
        if !self.file_url.contains("/blob/") {
            return Err(Error::Scrape(format!("'{}' is not a file link", self.file_url)));
        }
        if self.path.is_empty() {
            return Err(Error::Scrape(format!("no file path for {}", self.file_url)));
        }
        Ok(SearchResult::new(self.repository, self.path, self.file_url))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionStrategy {
    /// Current UI: `data-testid` attributes on the repo and path links.
    TestIds,
    /// Older UI with `.f4` headings.
    LegacyClasses,
    /// Any anchor whose href looks like a file or a repository.
    AnchorScan,
}

pub const CASCADE: [ExtractionStrategy; 3] = [
    ExtractionStrategy::TestIds,
    ExtractionStrategy::LegacyClasses,
    ExtractionStrategy::AnchorScan,
];

impl ExtractionStrategy {
    pub async fn extract<N: ResultNode>(&self, node: &N) -> Result<ScrapedItem> {
        match self {
            ExtractionStrategy::TestIds => {
                paired_links(
                    node,
                    "a[data-testid='search-result-repo-name']",
                    "a[data-testid='search-result-path']",
                )
                .await
            }
            ExtractionStrategy::LegacyClasses => paired_links(node, ".f4.text-normal", ".f4 a").await,
            ExtractionStrategy::AnchorScan => scan_anchors(node).await,
        }
    }
}

async fn paired_links<N: ResultNode>(node: &N, repo_css: &str, file_css: &str) -> Result<ScrapedItem> {
    let repo = node.select_one(repo_css).await?;
    let repository = repo.inner_text().await?.trim().to_string();
    let file = node.select_one(file_css).await?;
    let path = file.inner_text().await?.trim().to_string();
    let file_url = file.link().await?.unwrap_or_default();
    Ok(ScrapedItem {
        repository,
        path,
        file_url,
    })
}

async fn scan_anchors<N: ResultNode>(node: &N) -> Result<ScrapedItem> {
    let mut item = ScrapedItem::default();
    for anchor in node.select_all("a").await? {
        let Some(href) = anchor.link().await? else {
            continue;
        };
        if href.contains("/blob/") {
            item.path = anchor.inner_text().await?.trim().to_string();
            item.file_url = href;
        } else if item.repository.is_empty() && href.contains("github.com/") {
            item.repository = anchor.inner_text().await?.trim().to_string();
        }
    }
    Ok(item)
}

/// Run the cascade over one element. `None` when no strategy produced a file link.
pub async fn extract_result<N: ResultNode>(node: &N) -> Option<SearchResult> {
    for strategy in CASCADE {
        match strategy.extract(node).await {
            Ok(item) => {
                return item
                    .into_result()
                    .map_err(|e| debug!("{:?} extraction: {}", strategy, e))
                    .ok()
            }
            Err(e) => debug!("{:?} extraction failed: {}", strategy, e),
        }
    }
    None
}
