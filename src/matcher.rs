//! Domain relevance matching
//!
//! Decides which stored secrets are offered as suggestions for the page the
//! user is currently on. The matching strategy sits behind [`DomainMatcher`]
//! so a stricter comparison can replace the loose default without touching
//! the cipher or the store.

use serde::Serialize;
use url::Url;

use crate::record::SecretRecord;

/// Strategy deciding whether a stored URL is relevant to a hostname
pub trait DomainMatcher: Send + Sync {
    /// Whether a secret stored with `url` belongs to `hostname`.
    /// Both arguments are non-empty when called from [`DomainMatcher::partition`].
    fn is_relevant(&self, hostname: &str, url: &str) -> bool;

    /// Split `secrets` into suggested and other, preserving input order in both.
    ///
    /// An empty hostname suggests nothing. Secrets without a URL are never
    /// suggested. Every input secret lands in exactly one of the two lists.
    fn partition<'a>(&self, hostname: &str, secrets: &'a [SecretRecord]) -> MatchResult<'a> {
        let mut result = MatchResult::default();

        if hostname.is_empty() {
            result.other.extend(secrets.iter());
            return result;
        }

        for secret in secrets {
            match secret.url() {
                Some(url) if self.is_relevant(hostname, url) => result.suggested.push(secret),
                _ => result.other.push(secret),
            }
        }

        result
    }
}

/// Symmetric substring containment between hostname and stored URL.
///
/// Loose on purpose: `example.com` matches `app.example.com`, but so does
/// `notexample.com.evil.org` matching `example.com`. A URL saved with a scheme
/// or path (`https://example.com/login`) does not match a bare hostname.
/// Comparison is case-sensitive.
#[derive(Debug, Clone, Copy, Default)]
pub struct SubstringMatcher;

impl DomainMatcher for SubstringMatcher {
    fn is_relevant(&self, hostname: &str, url: &str) -> bool {
        hostname.contains(url) || url.contains(hostname)
    }
}

/// Host comparison on label boundaries.
///
/// Both the stored URL and the page hostname are parsed as URLs (a missing
/// scheme is assumed to be `https`), so case and internationalized names are
/// normalized the same way on both sides before comparison. The two match
/// when equal or when one is a subdomain of the other. Not public-suffix
/// aware: `example.co.uk` and `other.co.uk` do not match, but `co.uk` would
/// match both.
#[derive(Debug, Clone, Copy, Default)]
pub struct HostSuffixMatcher;

impl HostSuffixMatcher {
    fn host_of(url: &str) -> Option<String> {
        let url = url.trim();
        let parsed = Url::parse(url)
            .ok()
            .filter(|parsed| parsed.host_str().is_some())
            .or_else(|| Url::parse(&format!("https://{}", url)).ok())?;

        parsed
            .host_str()
            .map(|host| host.trim_end_matches('.').to_ascii_lowercase())
            .filter(|host| !host.is_empty())
    }

    fn is_subdomain(child: &str, parent: &str) -> bool {
        child.len() > parent.len()
            && child.ends_with(parent)
            && child.as_bytes()[child.len() - parent.len() - 1] == b'.'
    }
}

impl DomainMatcher for HostSuffixMatcher {
    fn is_relevant(&self, hostname: &str, url: &str) -> bool {
        let Some(target) = Self::host_of(hostname) else {
            return false;
        };

        match Self::host_of(url) {
            Some(stored) => {
                stored == target
                    || Self::is_subdomain(&target, &stored)
                    || Self::is_subdomain(&stored, &target)
            }
            None => false,
        }
    }
}

/// Secrets split by relevance to one hostname
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MatchResult<'a> {
    /// Domain-relevant secrets, in input order
    pub suggested: Vec<&'a SecretRecord>,
    /// Everything else, in input order
    pub other: Vec<&'a SecretRecord>,
}

impl<'a> MatchResult<'a> {
    /// Suggested secrets first, then the rest
    pub fn ranked(&self) -> impl Iterator<Item = &'a SecretRecord> + '_ {
        self.suggested.iter().chain(self.other.iter()).copied()
    }

    pub fn len(&self) -> usize {
        self.suggested.len() + self.other.len()
    }

    pub fn is_empty(&self) -> bool {
        self.suggested.is_empty() && self.other.is_empty()
    }

    pub fn into_owned(self) -> Listing {
        Listing {
            suggested: self.suggested.into_iter().cloned().collect(),
            other: self.other.into_iter().cloned().collect(),
        }
    }
}

/// Owned form of a [`MatchResult`], as returned by the vault service
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Listing {
    pub suggested: Vec<SecretRecord>,
    pub other: Vec<SecretRecord>,
}

/// Hostname of a page URL, lowercased. `None` for unparsable or host-less URLs.
pub fn hostname_from_url(page_url: &str) -> Option<String> {
    let parsed = Url::parse(page_url.trim()).ok()?;
    parsed
        .host_str()
        .filter(|host| !host.is_empty())
        .map(str::to_ascii_lowercase)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::fixtures::record;

    fn titles(records: &[&SecretRecord]) -> Vec<String> {
        records.iter().map(|r| r.title.clone()).collect()
    }

    #[test]
    fn test_substring_example() {
        let secrets = vec![
            record("example", Some("example.com")),
            record("other", Some("https://other.org")),
        ];

        let result = SubstringMatcher.partition("app.example.com", &secrets);
        assert_eq!(titles(&result.suggested), vec!["example"]);
        assert_eq!(titles(&result.other), vec!["other"]);
    }

    #[test]
    fn test_substring_url_containing_hostname() {
        let secrets = vec![record("login", Some("https://app.example.com/login"))];
        let result = SubstringMatcher.partition("app.example.com", &secrets);
        assert_eq!(result.suggested.len(), 1);
    }

    #[test]
    fn test_substring_scheme_and_path_not_normalized() {
        let secrets = vec![record("login", Some("https://example.com/login"))];
        let result = SubstringMatcher.partition("app.example.com", &secrets);
        assert!(result.suggested.is_empty());
        assert_eq!(result.other.len(), 1);
    }

    #[test]
    fn test_substring_is_loose() {
        let secrets = vec![record("lookalike", Some("notexample.com.evil.org"))];
        let result = SubstringMatcher.partition("example.com", &secrets);
        assert_eq!(result.suggested.len(), 1);
    }

    #[test]
    fn test_substring_is_case_sensitive() {
        assert!(!SubstringMatcher.is_relevant("example.com", "EXAMPLE.COM"));
    }

    #[test]
    fn test_empty_hostname_suggests_nothing() {
        let secrets = vec![
            record("a", Some("a.com")),
            record("b", None),
            record("c", Some("c.com")),
        ];

        for matcher in [&SubstringMatcher as &dyn DomainMatcher, &HostSuffixMatcher] {
            let result = matcher.partition("", &secrets);
            assert!(result.suggested.is_empty());
            assert_eq!(titles(&result.other), vec!["a", "b", "c"]);
        }
    }

    #[test]
    fn test_missing_or_empty_url_never_suggested() {
        let secrets = vec![record("none", None), record("blank", Some(""))];
        let result = SubstringMatcher.partition("example.com", &secrets);
        assert!(result.suggested.is_empty());
        assert_eq!(titles(&result.other), vec!["none", "blank"]);
    }

    #[test]
    fn test_order_preserved_and_ranked() {
        let secrets = vec![
            record("o1", Some("other.org")),
            record("s1", Some("example.com")),
            record("o2", None),
            record("s2", Some("mail.example.com")),
        ];

        let result = SubstringMatcher.partition("mail.example.com", &secrets);
        assert_eq!(titles(&result.suggested), vec!["s1", "s2"]);
        assert_eq!(titles(&result.other), vec!["o1", "o2"]);

        let ranked: Vec<&str> = result.ranked().map(|r| r.title.as_str()).collect();
        assert_eq!(ranked, vec!["s1", "s2", "o1", "o2"]);
        assert_eq!(result.len(), 4);

        let owned = result.into_owned();
        assert_eq!(owned.suggested[0].title, "s1");
        assert_eq!(owned.other[1].title, "o2");
    }

    #[test]
    fn test_host_suffix_matches_scheme_path_and_subdomain() {
        let matcher = HostSuffixMatcher;
        assert!(matcher.is_relevant("app.example.com", "https://example.com/login"));
        assert!(matcher.is_relevant("example.com", "https://app.example.com"));
        assert!(matcher.is_relevant("Example.COM", "example.com"));
        assert!(matcher.is_relevant("localhost", "localhost:8080/admin"));
        assert!(matcher.is_relevant("example.com.", "example.com"));
    }

    #[test]
    fn test_host_suffix_rejects_lookalikes() {
        let matcher = HostSuffixMatcher;
        assert!(!matcher.is_relevant("example.com", "notexample.com.evil.org"));
        assert!(!matcher.is_relevant("example.com", "notexample.com"));
        assert!(!matcher.is_relevant("example.com", "https://other.org"));
        assert!(!matcher.is_relevant("example.com", "   "));
    }

    #[test]
    fn test_host_suffix_internationalized_names() {
        let matcher = HostSuffixMatcher;
        assert!(matcher.is_relevant("bücher.de", "https://bücher.de/login"));
        assert!(matcher.is_relevant("shop.bücher.de", "bücher.de"));
        assert!(matcher.is_relevant("xn--bcher-kva.de", "https://BÜCHER.de"));

        let page = hostname_from_url("https://bücher.de/login").unwrap();
        assert!(matcher.is_relevant(&page, "bücher.de"));
        assert!(!matcher.is_relevant("bucher.de", "bücher.de"));
    }

    #[test]
    fn test_hostname_from_url() {
        assert_eq!(
            hostname_from_url("https://App.Example.com:8443/login?next=/"),
            Some("app.example.com".to_string())
        );
        assert_eq!(hostname_from_url("http://10.0.0.1/"), Some("10.0.0.1".to_string()));
        assert_eq!(hostname_from_url("about:blank"), None);
        assert_eq!(hostname_from_url("not a url"), None);
        assert_eq!(hostname_from_url(""), None);
    }
}
