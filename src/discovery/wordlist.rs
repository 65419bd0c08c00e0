//! Wordlist-based candidate generation.

use crate::domain::Domain;

/// Combines each label with the domain.
///
/// Malformed labels are skipped and reported; they never abort generation.
pub fn wordlist_candidates(domain: &Domain, labels: &[String]) -> (Vec<String>, Vec<String>) {
    let mut hosts = Vec::with_capacity(labels.len());
    let mut errors = Vec::new();

    for label in labels {
        match domain.with_label(label) {
            Some(host) => hosts.push(host),
            None => errors.push(format!("Skipped invalid wordlist label '{label}'")),
        }
    }

    (hosts, errors)
}
