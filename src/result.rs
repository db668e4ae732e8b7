use serde::{Deserialize, Serialize};

const WEB_HOST: &str = "github.com";
const RAW_HOST: &str = "raw.githubusercontent.com";

/// A single matched file, normalized the same way for both search modes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub repository: String,
    pub path: String,
    pub html_url: String,
    pub raw_url: String,
}

impl SearchResult {
    /// Build a result from its browsable URL. The raw URL is derived, never fetched.
    pub fn new(repository: impl Into<String>, path: impl Into<String>, html_url: impl Into<String>) -> Self {
        let html_url = html_url.into();
        Self {
            repository: repository.into(),
            path: path.into(),
            raw_url: to_raw_url(&html_url),
            html_url,
        }
    }
}

/// Rewrite a `github.com/<owner>/<repo>/blob/<ref>/<path>` URL into its
/// `raw.githubusercontent.com` counterpart.
pub fn to_raw_url(html_url: &str) -> String {
    let rewritten = html_url.replacen(WEB_HOST, RAW_HOST, 1);
    match blob_segment(&rewritten) {
        Some(start) => format!("{}{}", &rewritten[..start], &rewritten[start + "/blob".len()..]),
        None => rewritten.replacen("/blob/", "/", 1),
    }
}

// Offset of the `/blob/` that follows `<host>/<owner>/<repo>`, so repositories
// literally named "blob" are not mangled.
fn blob_segment(url: &str) -> Option<usize> {
    let host_start = url.find(RAW_HOST)?;
    let after_host = host_start + RAW_HOST.len();
    let rest = &url[after_host..];
    let mut offset = 0;
    for _ in 0..2 {
        let segment = rest[offset..].strip_prefix('/')?;
        offset += 1 + segment.find('/')?;
    }
    rest[offset..]
        .starts_with("/blob/")
        .then_some(after_host + offset)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blob_url_becomes_raw_url() {
        assert_eq!(
            to_raw_url("https://github.com/o/r/blob/main/a.py"),
            "https://raw.githubusercontent.com/o/r/main/a.py"
        );
    }

    #[test]
    fn nested_paths_keep_their_shape() {
        let raw = to_raw_url("https://github.com/rust-lang/rust/blob/abc123/library/core/src/lib.rs");
        assert_eq!(
            raw,
            "https://raw.githubusercontent.com/rust-lang/rust/abc123/library/core/src/lib.rs"
        );
    }

    #[test]
    fn raw_urls_never_contain_blob_segment() {
        let urls = [
            "https://github.com/a/b/blob/main/x",
            "https://github.com/a/b/blob/v1.0/dir/y.rs",
            "http://github.com/owner/name/blob/feature/z.md",
        ];
        for url in urls {
            let raw = to_raw_url(url);
            assert!(raw.contains(RAW_HOST), "{raw}");
            assert!(!raw.contains("/blob/"), "{raw}");
        }
    }

    #[test]
    fn repository_named_blob_is_preserved() {
        assert_eq!(
            to_raw_url("https://github.com/o/blob/blob/main/a.py"),
            "https://raw.githubusercontent.com/o/blob/main/a.py"
        );
    }

    #[test]
    fn directory_named_blob_is_preserved() {
        assert_eq!(
            to_raw_url("https://github.com/o/r/blob/main/blob/x.py"),
            "https://raw.githubusercontent.com/o/r/main/blob/x.py"
        );
    }

    #[test]
    fn new_derives_raw_url() {
        let result = SearchResult::new("o/r", "a.py", "https://github.com/o/r/blob/main/a.py");
        assert_eq!(result.raw_url, "https://raw.githubusercontent.com/o/r/main/a.py");
        assert_eq!(result.path, "a.py");
    }
}
