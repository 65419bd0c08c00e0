//! Parsing of enumerator output.

use crate::domain::Domain;

/// Extracts hostnames from raw tool output.
///
/// Only the first whitespace-separated token of each line is considered, and
/// it is kept only if it is the domain or one of its subdomains. Returns the
/// accepted hostnames (in order, possibly with duplicates) and the number of
/// non-empty lines that were discarded.
pub fn parse_enumerator_output(output: &str, domain: &Domain) -> (Vec<String>, usize) {
    let mut hosts = Vec::new();
    let mut rejected = 0;

    for line in output.lines() {
        let Some(token) = line.split_whitespace().next() else {
            continue;
        };
        match domain.match_host(token) {
            Some(host) => hosts.push(host),
            None => rejected += 1,
        }
    }

    (hosts, rejected)
}
