use std::path::PathBuf;

use clap::Parser;

/// Search GitHub code through the web interface and optionally download the
/// matched files and extract snippets from them.
#[derive(Parser, Debug)]
#[clap(
    name = "ghcs",
    author,
    version,
    about,
    long_about = "Search GitHub code by driving the github.com search page in Chrome, download matched files and optionally extract what you describe from them."
)]
pub struct Args {
    /// Search term.
    pub query: Option<String>,

    /// Programming language filter.
    #[clap(short, long)]
    pub language: Option<String>,

    /// Search in all repositories of a specific user.
    #[clap(short, long)]
    pub user: Option<String>,

    /// Search in a specific repository (e.g., username/repo).
    #[clap(long)]
    pub repo: Option<String>,

    /// Path specifier for filtering.
    #[clap(short, long)]
    pub path: Option<String>,

    /// Maximum number of results to return.
    #[clap(short, long, value_name = "NUM")]
    pub max_results: Option<usize>,

    /// Download matched files.
    #[clap(short, long)]
    pub download: bool,

    /// Directory to save downloaded files.
    #[clap(long, default_value = "codes")]
    pub download_dir: PathBuf,

    /// Verbose logging.
    #[clap(short, long)]
    pub verbose: bool,

    /// Description of what should be extracted from the downloaded files.
    #[clap(short, long)]
    pub remark: Option<String>,

    /// Output file for the extracted code (default: print to console).
    #[clap(short, long)]
    pub output_file: Option<PathBuf>,

    /// Comma-separated list of file extensions to consider for extraction (e.g., .py,.js).
    #[clap(short, long)]
    pub extensions: Option<String>,

    /// Run Chrome without a window.
    #[clap(long)]
    pub headless: bool,

    /// WebDriver endpoint to try before starting chromedriver.
    #[clap(long, value_name = "URL")]
    pub webdriver_url: Option<String>,

    /// chromedriver binary to start when no WebDriver is running.
    #[clap(long, value_name = "PATH")]
    pub chromedriver: Option<PathBuf>,
}

/// Search GitHub code through the REST API and download every match.
#[derive(Parser, Debug)]
#[clap(name = "ghs", author, version, about)]
pub struct ApiArgs {
    /// Search term.
    #[clap(long)]
    pub query: Option<String>,

    /// Programming language filter.
    #[clap(short, long)]
    pub language: Option<String>,

    /// Search in a specific repository (e.g., username/repo).
    #[clap(long)]
    pub repo: Option<String>,

    /// Search in all repositories of a specific user.
    #[clap(short, long)]
    pub user: Option<String>,

    /// GitHub Personal Access Token (or set GITHUB_TOKEN env var).
    #[clap(short, long)]
    pub token: Option<String>,

    /// Maximum number of results to return.
    #[clap(short, long, value_name = "NUM")]
    pub max_results: Option<usize>,

    /// Directory the matched files are mirrored into.
    #[clap(long, default_value = ".")]
    pub download_dir: PathBuf,

    /// Verbose logging.
    #[clap(short, long)]
    pub verbose: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scrape_flags_parse() {
        let args = Args::try_parse_from([
            "ghcs", "foo", "-l", "python", "--repo", "o/r", "-m", "5", "-d", "-e", ".py,.js",
        ])
        .unwrap();
        assert_eq!(args.query.as_deref(), Some("foo"));
        assert_eq!(args.language.as_deref(), Some("python"));
        assert_eq!(args.max_results, Some(5));
        assert!(args.download);
        assert_eq!(args.download_dir, PathBuf::from("codes"));
        assert_eq!(args.extensions.as_deref(), Some(".py,.js"));
    }

    #[test]
    fn query_is_optional_at_parse_time() {
        let args = Args::try_parse_from(["ghcs"]).unwrap();
        assert!(args.query.is_none());
        let api = ApiArgs::try_parse_from(["ghs"]).unwrap();
        assert!(api.query.is_none());
    }

    #[test]
    fn api_flags_parse() {
        let args = ApiArgs::try_parse_from(["ghs", "--query", "foo", "-t", "tok", "--repo", "o/r"]).unwrap();
        assert_eq!(args.token.as_deref(), Some("tok"));
        assert_eq!(args.repo.as_deref(), Some("o/r"));
        assert_eq!(args.download_dir, PathBuf::from("."));
    }
}
