use reqwest::{header, Client, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::config::ApiConfig;
use crate::error::{Error, Result};
use crate::query::SearchQuery;
use crate::result::SearchResult;

/// The code search API never returns more than this many items per page.
const MAX_PER_PAGE: usize = 100;

#[derive(Deserialize)]
struct CodeSearchResponse {
    #[serde(default)]
    total_count: u64,
    items: Vec<Value>,
}

#[derive(Deserialize)]
struct CodeItem {
    path: String,
    html_url: Option<String>,
    repository: Option<RepositoryRef>,
}

#[derive(Deserialize)]
struct RepositoryRef {
    full_name: String,
}

/// Searches code through the authenticated REST endpoint.
pub struct GitHubSearcher {
    client: Client,
    api_base: String,
    max_results: Option<usize>,
}

impl GitHubSearcher {
    /// Create a new GitHubSearcher instance
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            header::HeaderValue::from_str(&format!("Bearer {}", config.token))?,
        );
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(
            "X-GitHub-Api-Version",
            header::HeaderValue::from_static("2022-11-28"),
        );

        let client = Client::builder()
            .user_agent(concat!("ghcs/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .build()?;

        Ok(GitHubSearcher {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            max_results: config.max_results,
        })
    }

    /// Run a single search request.
    ///
    /// Remote failures are logged and reported as an empty list, so callers
    /// cannot tell them apart from a search without matches.
    pub async fn search(&self, query: &SearchQuery) -> Vec<SearchResult> {
        match self.search_page(query).await {
            Ok(results) => results,
            Err(e) => {
                error!("Search for '{}' failed: {}", query.term(), e);
                Vec::new()
            }
        }
    }

    async fn search_page(&self, query: &SearchQuery) -> Result<Vec<SearchResult>> {
        let url = format!("{}/search/code", self.api_base);
        let per_page = self
            .max_results
            .map_or(MAX_PER_PAGE, |max| max.clamp(1, MAX_PER_PAGE))
            .to_string();
        let q = query.api_query();

        debug!("Requesting {} with q={}", url, q);
        let response = self
            .client
            .get(&url)
            .query(&[("q", q.as_str()), ("per_page", per_page.as_str())])
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Api { status, body });
        }

        let page: CodeSearchResponse = response.json().await?;
        debug!(
            "API reports {} total matches, {} on this page",
            page.total_count,
            page.items.len()
        );

        let mut results: Vec<SearchResult> = page
            .items
            .into_iter()
            .filter_map(|item| match serde_json::from_value::<CodeItem>(item) {
                Ok(item) => normalize_item(item),
                Err(e) => {
                    warn!("Skipping malformed search item: {}", e);
                    None
                }
            })
            .collect();

        if let Some(max) = self.max_results {
            results.truncate(max);
        }

        info!("Found {} results for '{}'", results.len(), query.term());
        Ok(results)
    }
}

fn normalize_item(item: CodeItem) -> Option<SearchResult> {
    let Some(html_url) = item.html_url else {
        warn!("Skipping '{}': no html_url in search item", item.path);
        return None;
    };
    let repository = item.repository.map(|r| r.full_name).unwrap_or_default();
    Some(SearchResult::new(repository, item.path, html_url))
}
