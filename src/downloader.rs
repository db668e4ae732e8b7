use std::path::{Component, Path, PathBuf};

use indicatif::{ProgressBar, ProgressStyle};
use reqwest::{header, Client, StatusCode};
use tracing::{debug, info, warn};

use crate::config::{BodyMode, DownloadConfig};
use crate::error::{Error, Result};
use crate::result::SearchResult;

/// What happened to one result. Lives only for the current run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadOutcome {
    pub source_url: String,
    /// Where the file lands. `None` when the result path would leave the
    /// download directory.
    pub destination: Option<PathBuf>,
    pub success: bool,
    pub error: Option<String>,
}

/// Fetches raw file contents and mirrors them under the download directory.
pub struct Downloader {
    client: Client,
    config: DownloadConfig,
}

impl Downloader {
    pub fn new(config: DownloadConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("ghcs/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client, config })
    }

    pub fn download_dir(&self) -> &Path {
        &self.config.download_dir
    }

    /// Download one result. Failures are logged and reported in the outcome.
    pub async fn download(&self, result: &SearchResult) -> DownloadOutcome {
        let outcome = |destination, error: Option<Error>| DownloadOutcome {
            source_url: result.raw_url.clone(),
            destination,
            success: error.is_none(),
            error: error.map(|e| e.to_string()),
        };

        let destination = match safe_relative_path(&result.path) {
            Ok(relative) => self.config.download_dir.join(relative),
            Err(e) => {
                warn!("Refusing to download {}: {}", result.raw_url, e);
                return outcome(None, Some(e));
            }
        };

        match self.fetch_to_disk(result, &destination).await {
            Ok(()) => {
                info!("Downloaded: {}", destination.display());
                outcome(Some(destination), None)
            }
            Err(e) => {
                warn!("Error downloading {}: {}", result.raw_url, e);
                outcome(Some(destination), Some(e))
            }
        }
    }

    /// Download every result in order. One failure never stops the batch.
    pub async fn download_all(&self, results: &[SearchResult]) -> Vec<DownloadOutcome> {
        let pb = ProgressBar::new(results.len() as u64);
        if let Ok(style) =
            ProgressStyle::default_bar().template("[{elapsed_precise}] {bar:40.cyan/blue} {pos:>7}/{len:7} {wide_msg}")
        {
            pb.set_style(style.progress_chars("=>-"));
        }

        let mut outcomes = Vec::with_capacity(results.len());
        for result in results {
            pb.set_message(result.path.clone());
            outcomes.push(self.download(result).await);
            pb.inc(1);
        }

        let ok = outcomes.iter().filter(|o| o.success).count();
        pb.finish_with_message(format!("Downloaded {}/{} files", ok, results.len()));
        outcomes
    }

    async fn fetch_to_disk(&self, result: &SearchResult, save_path: &Path) -> Result<()> {
        debug!("Fetching {}", result.raw_url);
        let mut request = self.client.get(&result.raw_url);
        if let Some(token) = &self.config.token {
            request = request.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let response = request.send().await?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(Error::DownloadStatus(status));
        }

        if let Some(parent) = save_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        match self.config.body {
            BodyMode::Bytes => {
                let body = response.bytes().await?;
                tokio::fs::write(save_path, &body).await?;
            }
            BodyMode::Text => {
                let body = response.text().await?;
                tokio::fs::write(save_path, body.as_bytes()).await?;
            }
        }

        Ok(())
    }
}

/// Accept only plain relative paths so results cannot escape the download directory.
fn safe_relative_path(path: &str) -> Result<PathBuf> {
    let candidate = Path::new(path);
    let mut clean = PathBuf::new();
    for component in candidate.components() {
        match component {
            Component::Normal(part) => clean.push(part),
            Component::CurDir => {}
            _ => return Err(Error::UnsafePath(path.to_string())),
        }
    }
    if clean.as_os_str().is_empty() {
        return Err(Error::UnsafePath(path.to_string()));
    }
    Ok(clean)
}
