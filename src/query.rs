//! Search query assembly for both the REST API and the web search UI.

use url::form_urlencoded;

use crate::error::{Error, Result};

/// A free-text search term narrowed by optional `key:value` qualifiers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchQuery {
    term: String,
    language: Option<String>,
    repo: Option<String>,
    user: Option<String>,
    path: Option<String>,
}

impl SearchQuery {
    /// Create a query for `term`. Blank terms are rejected.
    pub fn new(term: impl Into<String>) -> Result<Self> {
        let term = term.into();
        if term.trim().is_empty() {
            return Err(Error::EmptyQuery);
        }
        Ok(Self {
            term,
            ..Self::default()
        })
    }

    pub fn language(mut self, language: Option<impl Into<String>>) -> Self {
        self.language = non_blank(language);
        self
    }

    /// Restrict to a single repository, given as `owner/name`.
    pub fn repo(mut self, repo: Option<impl Into<String>>) -> Self {
        self.repo = non_blank(repo);
        self
    }

    pub fn user(mut self, user: Option<impl Into<String>>) -> Self {
        self.user = non_blank(user);
        self
    }

    pub fn path(mut self, path: Option<impl Into<String>>) -> Self {
        self.path = non_blank(path);
        self
    }

    pub fn term(&self) -> &str {
        &self.term
    }

    /// Present qualifiers, in the order they are emitted.
    pub fn qualifiers(&self) -> Vec<(&'static str, &str)> {
        [
            ("language", &self.language),
            ("repo", &self.repo),
            ("user", &self.user),
            ("path", &self.path),
        ]
        .into_iter()
        .filter_map(|(key, value)| value.as_deref().map(|v| (key, v)))
        .collect()
    }

    /// Space separated form used as the `q` parameter of the REST API.
    ///
    /// Qualifier values are passed through verbatim; GitHub decides whether
    /// they are acceptable.
    pub fn api_query(&self) -> String {
        let mut query = self.term.clone();
        for (key, value) in self.qualifiers() {
            query.push_str(&format!(" {}:{}", key, value));
        }
        query
    }

    /// `+` joined form appended to the web search URL. Only the free-text
    /// term is form encoded.
    pub fn web_query(&self) -> String {
        let mut parts = vec![form_urlencoded::byte_serialize(self.term.as_bytes()).collect::<String>()];
        parts.extend(
            self.qualifiers()
                .into_iter()
                .map(|(key, value)| format!("{}:{}", key, value)),
        );
        parts.join("+")
    }
}

fn non_blank(value: Option<impl Into<String>>) -> Option<String> {
    let value: Option<String> = value.map(Into::into);
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_term_is_rejected() {
        assert!(matches!(SearchQuery::new(""), Err(Error::EmptyQuery)));
        assert!(matches!(SearchQuery::new("   "), Err(Error::EmptyQuery)));
    }

    #[test]
    fn api_query_appends_language() {
        let query = SearchQuery::new("foo").unwrap().language(Some("python"));
        assert_eq!(query.api_query(), "foo language:python");
    }

    #[test]
    fn api_query_with_every_qualifier() {
        let query = SearchQuery::new("fn main")
            .unwrap()
            .language(Some("rust"))
            .repo(Some("rust-lang/rust"))
            .user(Some("octocat"))
            .path(Some("src/"));
        assert_eq!(
            query.api_query(),
            "fn main language:rust repo:rust-lang/rust user:octocat path:src/"
        );
    }

    #[test]
    fn blank_qualifiers_are_dropped() {
        let query = SearchQuery::new("foo")
            .unwrap()
            .language(Some(" "))
            .repo(None::<String>);
        assert!(query.qualifiers().is_empty());
        assert_eq!(query.api_query(), "foo");
    }

    #[test]
    fn web_query_encodes_term_only() {
        let query = SearchQuery::new("hello world")
            .unwrap()
            .repo(Some("o/r"))
            .language(Some("python"));
        assert_eq!(query.web_query(), "hello+world+language:python+repo:o/r");
    }

    #[test]
    fn web_query_escapes_reserved_characters() {
        let query = SearchQuery::new("a&b=c").unwrap();
        assert_eq!(query.web_query(), "a%26b%3Dc");
    }
}
