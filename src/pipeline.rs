//! The flows behind both command line tools, from flag checks to extraction.

use std::path::Path;

use tracing::{debug, error, info};

use crate::args::{ApiArgs, Args};
use crate::config::{resolve_token, ApiConfig, BodyMode, DownloadConfig, ExtractorConfig, ScrapeConfig};
use crate::downloader::{DownloadOutcome, Downloader};
use crate::error::Result;
use crate::extractor::{extract_from_dir, parse_extensions, Extractor, GeminiExtractor};
use crate::github_searcher::GitHubSearcher;
use crate::query::SearchQuery;
use crate::result::SearchResult;
use crate::web_search::WebSearcher;

/// `None` after logging when the term is missing or blank.
fn query_or_report(term: Option<&str>) -> Option<SearchQuery> {
    match SearchQuery::new(term.unwrap_or_default()) {
        Ok(query) => Some(query),
        Err(e) => {
            error!("{}", e);
            None
        }
    }
}

/// Search through the REST API and download every match as text.
///
/// A missing token or query is reported and returns before any request.
pub async fn run_api(args: &ApiArgs, env_token: Option<String>, api_base: &str) -> Result<Vec<DownloadOutcome>> {
    let token = match resolve_token(args.token.as_deref(), env_token) {
        Ok(token) => token,
        Err(e) => {
            error!("{}", e);
            return Ok(Vec::new());
        }
    };
    let Some(query) = query_or_report(args.query.as_deref()) else {
        return Ok(Vec::new());
    };
    let query = query
        .language(args.language.clone())
        .repo(args.repo.clone())
        .user(args.user.clone());

    let config = ApiConfig {
        api_base: api_base.to_string(),
        max_results: args.max_results,
        ..ApiConfig::new(token.clone())
    };
    let results = GitHubSearcher::new(&config)?.search(&query).await;
    println!("Found {} matching files.", results.len());

    let downloader = Downloader::new(DownloadConfig {
        download_dir: args.download_dir.clone(),
        token: Some(token),
        body: BodyMode::Text,
    })?;
    let outcomes = downloader.download_all(&results).await;
    for outcome in &outcomes {
        match (&outcome.destination, outcome.success) {
            (Some(path), true) => println!("Downloaded: {}", path.display()),
            _ => println!("Failed to download {}", outcome.source_url),
        }
    }
    info!(
        "Downloaded {} of {} files",
        outcomes.iter().filter(|o| o.success).count(),
        outcomes.len()
    );
    Ok(outcomes)
}

/// Search through the web UI, then list, download and optionally extract.
///
/// `base` carries environment defaults; browser flags in `args` override it.
/// A missing query is reported and returns before a browser is started.
pub async fn run_scrape(args: &Args, base: ScrapeConfig) -> Result<()> {
    let Some(query) = query_or_report(args.query.as_deref()) else {
        return Ok(());
    };
    let query = query
        .language(args.language.clone())
        .repo(args.repo.clone())
        .user(args.user.clone())
        .path(args.path.clone());

    debug!("Searching GitHub for: {}", query.term());
    debug!("Qualifiers: {:?}", query.qualifiers());
    debug!("Max Results: {:?}", args.max_results);
    debug!("Download: {} into {}", args.download, args.download_dir.display());
    if let Some(remark) = &args.remark {
        debug!("Extraction remark: {}", remark);
    }

    let mut config = base;
    config.headless = args.headless;
    config.max_results = args.max_results;
    if let Some(url) = &args.webdriver_url {
        config.webdriver_url = url.clone();
    }
    if let Some(path) = &args.chromedriver {
        config.chromedriver = path.clone();
    }

    let results = WebSearcher::new(config).search(&query).await?;

    if !args.download {
        print!("{}", format_matches(&results, args.verbose));
        return Ok(());
    }

    println!("Found {} matching files.", results.len());
    let downloader = Downloader::new(DownloadConfig {
        download_dir: args.download_dir.clone(),
        token: None,
        body: BodyMode::Bytes,
    })?;
    let outcomes = downloader.download_all(&results).await;
    let downloaded = outcomes.iter().filter(|o| o.success).count();
    info!("Downloaded {} of {} files", downloaded, outcomes.len());

    let Some(remark) = &args.remark else {
        return Ok(());
    };
    if downloaded == 0 {
        info!("Nothing downloaded, skipping extraction");
        return Ok(());
    }

    let extensions = args.extensions.as_deref().map(parse_extensions);
    if let Some(extensions) = &extensions {
        debug!("Filtering files by extensions: {:?}", extensions);
    }

    let extractor = GeminiExtractor::new(ExtractorConfig::from_env()?)?;
    extract_and_emit(
        &extractor,
        downloader.download_dir(),
        remark,
        extensions.as_deref(),
        args.output_file.as_deref(),
    )
    .await
}

/// Render the listing printed when files are not downloaded.
pub fn format_matches(results: &[SearchResult], verbose: bool) -> String {
    let mut out = format!("Found {} matching files.\n", results.len());
    for result in results {
        if verbose {
            out.push_str(&format!("Matched file: {}\n(URL: {})\n", result.path, result.raw_url));
        } else {
            out.push_str(&format!("Matched file: {}\n", result.path));
        }
    }
    out
}

/// Run extraction over `download_dir` and either save or print the text.
pub async fn extract_and_emit(
    extractor: &dyn Extractor,
    download_dir: &Path,
    remark: &str,
    extensions: Option<&[String]>,
    output_file: Option<&Path>,
) -> Result<()> {
    info!("Extracting code based on remark: '{}'", remark);
    let extracted = extract_from_dir(extractor, download_dir, remark, extensions).await?;

    match output_file {
        Some(path) => {
            tokio::fs::write(path, extracted.as_bytes()).await?;
            println!("Extraction saved to: {}", path.display());
        }
        None => {
            let rule = "=".repeat(80);
            println!("\nExtracted Code:\n{}\n{}\n{}", rule, extracted, rule);
        }
    }
    Ok(())
}
