//! Free-text search over secret metadata

use crate::matcher::{DomainMatcher, MatchResult};
use crate::record::SecretRecord;

/// Case-insensitive substring match on title, username, URL, client and project.
///
/// A blank query matches every record.
pub fn matches_query(record: &SecretRecord, query: &str) -> bool {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return true;
    }

    let fields = [
        Some(record.title.as_str()),
        record.username.as_deref(),
        record.url.as_deref(),
        record.client_name.as_deref(),
        record.project_name.as_deref(),
    ];

    fields
        .into_iter()
        .flatten()
        .any(|field| field.to_lowercase().contains(&query))
}

/// Records matching `query`, in input order
pub fn filter<'a>(query: &str, records: &'a [SecretRecord]) -> Vec<&'a SecretRecord> {
    records.iter().filter(|record| matches_query(record, query)).collect()
}

/// Build the vault listing for the current page.
///
/// An active search query replaces domain suggestions: the filtered records
/// all go to `other`. Without a query the records are partitioned by domain.
pub fn listing<'a>(
    matcher: &dyn DomainMatcher,
    hostname: &str,
    query: Option<&str>,
    records: &'a [SecretRecord],
) -> MatchResult<'a> {
    match query.filter(|q| !q.trim().is_empty()) {
        Some(query) => MatchResult {
            suggested: Vec::new(),
            other: filter(query, records),
        },
        None => matcher.partition(hostname, records),
    }
}
