use reqwest::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Search term is required")]
    EmptyQuery,

    #[error("GitHub token is required. Set via --token or GITHUB_TOKEN env var")]
    MissingToken,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("GitHub API error: {status} - {body}")]
    Api { status: StatusCode, body: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid header value: {0}")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Browser command failed: {0}")]
    Browser(#[from] fantoccini::error::CmdError),

    #[error("Could not initialize browser session: {0}")]
    BrowserSetup(String),

    #[error("Scrape error: {0}")]
    Scrape(String),

    #[error("Download failed with status {0}")]
    DownloadStatus(StatusCode),

    #[error("Refusing to write outside the download directory: {0}")]
    UnsafePath(String),

    #[error("Extraction error: {0}")]
    Extraction(String),
}

pub type Result<T> = std::result::Result<T, Error>;
