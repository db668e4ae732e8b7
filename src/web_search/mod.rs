//! Code search by driving the github.com web UI.
//!
//! - `browser` - session setup cascade and teardown
//! - `extract` - per-item selector cascade

mod browser;
mod extract;

pub use browser::{chrome_capabilities, legacy_capabilities, BrowserSession, SetupStrategy, SETUP_CASCADE};
pub use extract::{extract_result, ExtractionStrategy, ResultNode, ScrapedItem, CASCADE};

use std::time::Duration;

use async_trait::async_trait;
use fantoccini::elements::Element;
use fantoccini::{Client, Locator};
use tracing::{debug, info, warn};

use crate::config::ScrapeConfig;
use crate::error::Result;
use crate::query::SearchQuery;
use crate::result::SearchResult;

/// Every known layout renders results matching one of these.
pub const RESULT_ITEMS: &str = ".code-list-item, .code-list .flex-auto";
pub const NEXT_PAGE: &str = ".pagination a[rel='next'], a.next_page";

/// One page of search results, able to move on to the next one.
#[async_trait]
pub trait ResultsPage: Send + Sync {
    type Node: ResultNode;

    /// Wait until the results list is on screen.
    async fn ready(&self) -> Result<()>;

    async fn items(&self) -> Result<Vec<Self::Node>>;

    /// Follow the "next page" link. `Ok(false)` when there is none.
    async fn advance(&self) -> Result<bool>;
}

/// [`ResultsPage`] backed by a live WebDriver session.
pub struct BrowserPage<'a> {
    client: &'a Client,
    wait_timeout: Duration,
    page_settle: Duration,
}

impl<'a> BrowserPage<'a> {
    pub fn new(client: &'a Client, config: &ScrapeConfig) -> Self {
        Self {
            client,
            wait_timeout: config.wait_timeout,
            page_settle: config.page_settle,
        }
    }

    async fn wait_for_results(&self) -> Result<()> {
        self.client
            .wait()
            .at_most(self.wait_timeout)
            .for_element(Locator::Css(RESULT_ITEMS))
            .await?;
        Ok(())
    }
}

#[async_trait]
impl ResultsPage for BrowserPage<'_> {
    type Node = Element;

    async fn ready(&self) -> Result<()> {
        self.wait_for_results().await
    }

    async fn items(&self) -> Result<Vec<Element>> {
        tokio::time::sleep(self.page_settle).await;
        Ok(self.client.find_all(Locator::Css(RESULT_ITEMS)).await?)
    }

    async fn advance(&self) -> Result<bool> {
        let next = self.client.find_all(Locator::Css(NEXT_PAGE)).await?;
        let Some(button) = next.first() else {
            return Ok(false);
        };
        button.click().await?;
        self.wait_for_results().await?;
        Ok(true)
    }
}

/// Wait for the first page, then collect from it. A results list that never
/// shows up counts as no results.
pub async fn scrape_pages<P: ResultsPage>(page: &P, max_results: Option<usize>) -> Vec<SearchResult> {
    if let Err(e) = page.ready().await {
        debug!(
            "No search results appeared ({}). GitHub might be rate limiting or nothing matched.",
            e
        );
        return Vec::new();
    }
    collect_results(page, max_results).await
}

/// Walk result pages until `max_results` is reached or there is no next page.
pub async fn collect_results<P: ResultsPage>(page: &P, max_results: Option<usize>) -> Vec<SearchResult> {
    let cap = max_results.unwrap_or(usize::MAX);
    let mut results = Vec::new();
    let mut page_num = 1;

    while results.len() < cap {
        debug!("Processing page {}...", page_num);

        let items = match page.items().await {
            Ok(items) => items,
            Err(e) => {
                warn!("Could not read results on page {}: {}", page_num, e);
                break;
            }
        };
        if items.is_empty() {
            debug!("No items found on this page. Page structure might have changed.");
            break;
        }

        for item in &items {
            if results.len() >= cap {
                break;
            }
            match extract_result(item).await {
                Some(result) => {
                    debug!("Found: {}/{}", result.repository, result.path);
                    results.push(result);
                }
                None => debug!("Skipping result item without a file link"),
            }
        }

        if results.len() >= cap {
            break;
        }

        match page.advance().await {
            Ok(true) => page_num += 1,
            Ok(false) => {
                debug!("No next page button found. Ending search.");
                break;
            }
            Err(e) => {
                debug!("Error navigating to next page: {}", e);
                break;
            }
        }
    }

    results.truncate(cap);
    results
}

/// Searches code through the web UI with a browser session per search.
pub struct WebSearcher {
    config: ScrapeConfig,
}

impl WebSearcher {
    pub fn new(config: ScrapeConfig) -> Self {
        Self { config }
    }

    pub fn search_url(&self, query: &SearchQuery) -> String {
        format!(
            "{}/search?type=code&q={}",
            self.config.search_base.trim_end_matches('/'),
            query.web_query()
        )
    }

    /// Run a search. Only a browser that cannot be started is an error;
    /// anything that goes wrong afterwards ends the search with what was
    /// collected so far.
    pub async fn search(&self, query: &SearchQuery) -> Result<Vec<SearchResult>> {
        if self.config.max_results == Some(0) {
            return Ok(Vec::new());
        }

        let session = BrowserSession::start(&self.config).await?;
        let results = self.scrape(&session.client, query).await;
        session.quit().await;

        info!("Found {} results for '{}'", results.len(), query.term());
        Ok(results)
    }

    async fn scrape(&self, client: &Client, query: &SearchQuery) -> Vec<SearchResult> {
        let url = self.search_url(query);
        debug!("Searching using URL: {}", url);

        if let Err(e) = client.goto(&url).await {
            warn!("Error during search: {}", e);
            return Vec::new();
        }

        let page = BrowserPage::new(client, &self.config);
        scrape_pages(&page, self.config.max_results).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::extract::fake::FakeNode;
    use super::*;
    use crate::error::Error;

    /// Serves pre-built pages in order.
    struct FakePages {
        pages: Vec<Vec<FakeNode>>,
        current: Mutex<usize>,
        fail_ready: bool,
        fail_advance: bool,
    }

    impl FakePages {
        fn new(pages: Vec<Vec<FakeNode>>) -> Self {
            Self {
                pages,
                current: Mutex::new(0),
                fail_ready: false,
                fail_advance: false,
            }
        }

        fn visited(&self) -> usize {
            *self.current.lock().unwrap() + 1
        }
    }

    #[async_trait]
    impl ResultsPage for FakePages {
        type Node = FakeNode;

        async fn ready(&self) -> Result<()> {
            if self.fail_ready {
                return Err(Error::Scrape("timed out waiting for results".to_string()));
            }
            Ok(())
        }

        async fn items(&self) -> Result<Vec<FakeNode>> {
            let current = *self.current.lock().unwrap();
            Ok(self.pages.get(current).cloned().unwrap_or_default())
        }

        async fn advance(&self) -> Result<bool> {
            if self.fail_advance {
                return Err(Error::Scrape("click intercepted".to_string()));
            }
            let mut current = self.current.lock().unwrap();
            if *current + 1 < self.pages.len() {
                *current += 1;
                Ok(true)
            } else {
                Ok(false)
            }
        }
    }

    fn file_item(n: usize) -> FakeNode {
        FakeNode::default()
            .with(
                "a[data-testid='search-result-repo-name']",
                FakeNode::anchor("o/r", "https://github.com/o/r"),
            )
            .with(
                "a[data-testid='search-result-path']",
                FakeNode::anchor(&format!("f{n}.py"), &format!("https://github.com/o/r/blob/main/f{n}.py")),
            )
    }

    fn page_of(range: std::ops::Range<usize>) -> Vec<FakeNode> {
        range.map(file_item).collect()
    }

    #[tokio::test]
    async fn walks_every_page_without_a_cap() {
        let pages = FakePages::new(vec![page_of(0..3), page_of(3..6), page_of(6..7)]);
        let results = collect_results(&pages, None).await;
        assert_eq!(results.len(), 7);
        assert_eq!(results[6].path, "f6.py");
        assert_eq!(pages.visited(), 3);
    }

    #[tokio::test]
    async fn cap_is_never_exceeded() {
        for cap in [1, 2, 3, 4, 5] {
            let pages = FakePages::new(vec![page_of(0..3), page_of(3..6)]);
            let results = collect_results(&pages, Some(cap)).await;
            assert_eq!(results.len(), cap);
        }
    }

    #[tokio::test]
    async fn cap_within_first_page_does_not_paginate() {
        let pages = FakePages::new(vec![page_of(0..3), page_of(3..6)]);
        let results = collect_results(&pages, Some(2)).await;
        assert_eq!(results.len(), 2);
        assert_eq!(pages.visited(), 1);
    }

    #[tokio::test]
    async fn empty_page_ends_the_search() {
        let pages = FakePages::new(vec![page_of(0..2), Vec::new(), page_of(2..4)]);
        let results = collect_results(&pages, None).await;
        assert_eq!(results.len(), 2);
    }

    #[tokio::test]
    async fn unrecognized_layout_is_an_empty_result() {
        let pages = FakePages::new(vec![vec![FakeNode::default(), FakeNode::default()]]);
        assert!(collect_results(&pages, None).await.is_empty());
    }

    #[tokio::test]
    async fn navigation_error_keeps_partial_results() {
        let mut pages = FakePages::new(vec![page_of(0..2), page_of(2..4)]);
        pages.fail_advance = true;
        let results = collect_results(&pages, None).await;
        assert_eq!(results.len(), 2);
    }

    #[tokio::test]
    async fn results_never_appearing_is_an_empty_result() {
        let mut pages = FakePages::new(vec![page_of(0..3)]);
        pages.fail_ready = true;
        assert!(scrape_pages(&pages, None).await.is_empty());
        assert_eq!(pages.visited(), 1);
    }

    #[tokio::test]
    async fn ready_page_is_collected() {
        let pages = FakePages::new(vec![page_of(0..3), page_of(3..4)]);
        assert_eq!(scrape_pages(&pages, Some(10)).await.len(), 4);
    }

    #[test]
    fn search_url_carries_web_query() {
        let searcher = WebSearcher::new(ScrapeConfig::default());
        let query = SearchQuery::new("hello world").unwrap().language(Some("python"));
        assert_eq!(
            searcher.search_url(&query),
            "https://github.com/search?type=code&q=hello+world+language:python"
        );
    }

    #[tokio::test]
    async fn zero_cap_skips_the_browser() {
        let config = ScrapeConfig {
            max_results: Some(0),
            ..ScrapeConfig::default()
        };
        let query = SearchQuery::new("foo").unwrap();
        let results = WebSearcher::new(config).search(&query).await.unwrap();
        assert!(results.is_empty());
    }
}
