//! # ghcs
//!
//! Search code on GitHub, download the matched files and optionally extract
//! snippets from them with a text generation service.
//!
//! ## Main Components
//!
//! - [`SearchQuery`]: free text plus `language`/`repo`/`user`/`path` qualifiers
//! - [`GitHubSearcher`]: one authenticated call to the REST code search API
//! - [`WebSearcher`]: drives the web search page and walks its pagination
//! - [`SearchResult`]: a matched file with its browsable and raw URLs
//! - [`Downloader`]: mirrors raw files under a local directory
//! - [`extractor`]: hands downloaded files to a text generation service
//!
//! ## Example
//!
//! ```no_run
//! use ghcs_lib::{ApiConfig, GitHubSearcher, SearchQuery};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let searcher = GitHubSearcher::new(&ApiConfig::new("ghp_..."))?;
//!     let query = SearchQuery::new("tokio::select")?.language(Some("rust"));
//!
//!     for result in searcher.search(&query).await {
//!         println!("{} {}", result.repository, result.raw_url);
//!     }
//!     Ok(())
//! }
//! ```

mod args;
mod config;
mod downloader;
mod error;
pub mod extractor;
mod github_searcher;
pub mod logging;
pub mod pipeline;
mod query;
mod result;
pub mod web_search;

pub use crate::args::{ApiArgs, Args};
pub use crate::config::{resolve_token, ApiConfig, DEFAULT_API_BASE, BodyMode, DownloadConfig, ExtractorConfig, ScrapeConfig};
pub use crate::downloader::{DownloadOutcome, Downloader};
pub use crate::error::{Error, Result};
pub use crate::github_searcher::GitHubSearcher;
pub use crate::query::SearchQuery;
pub use crate::result::{to_raw_url, SearchResult};
pub use crate::web_search::WebSearcher;
