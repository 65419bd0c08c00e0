//! Domain validation and subdomain matching.
//!
//! This module provides the [`Domain`] newtype for the reconnaissance target and
//! the suffix check used to filter discovered hostnames.
//!
//! Key functions:
//! - `Domain::parse()` - Normalizes and validates a target domain against the Public Suffix List
//! - `Domain::match_host()` - Accepts a hostname only if it is the domain or one of its subdomains
//! - `normalize_host()` - Lowercases and strips trailing dots / wildcard prefixes

use std::fmt;

use serde::{Serialize, Serializer};

use crate::error_handling::ConfigError;

/// Maximum length of a full DNS name (without trailing dot)
const MAX_NAME_LEN: usize = 253;
/// Maximum length of a single DNS label
const MAX_LABEL_LEN: usize = 63;

/// A validated reconnaissance target.
///
/// Always lowercase, no trailing dot, at least two labels, and ending in a suffix
/// known to the Public Suffix List.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Domain(String);

impl Domain {
    /// Normalizes and validates a target domain.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidDomain` if the name is empty, too long, has a
    /// malformed label, or does not end in a known public suffix.
    pub fn parse(input: &str) -> Result<Self, ConfigError> {
        let invalid = |reason: &str| ConfigError::InvalidDomain {
            domain: input.to_string(),
            reason: reason.to_string(),
        };

        if input.contains('*') {
            return Err(invalid("wildcards are not allowed"));
        }
        let name = normalize_host(input);
        if name.is_empty() {
            return Err(invalid("empty domain"));
        }
        if name.len() > MAX_NAME_LEN {
            return Err(invalid("name longer than 253 characters"));
        }

        let labels: Vec<&str> = name.split('.').collect();
        if labels.len() < 2 {
            return Err(invalid("expected at least two labels"));
        }
        if let Some(label) = labels.iter().find(|l| !is_valid_label(l, false)) {
            return Err(invalid(&format!("malformed label '{label}'")));
        }

        match psl::suffix(name.as_bytes()) {
            Some(suffix) if suffix.is_known() => {
                if suffix.as_bytes() == name.as_bytes() {
                    return Err(invalid("domain is a bare public suffix"));
                }
            }
            _ => return Err(invalid("unknown public suffix")),
        }

        Ok(Domain(name))
    }

    /// The normalized domain name.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the normalized host if it is this domain or a subdomain of it.
    ///
    /// Tool output is untrusted: anything that is not a well-formed hostname
    /// ending in `.{domain}` is rejected.
    pub fn match_host(&self, host: &str) -> Option<String> {
        let host = normalize_host(host);
        if host.is_empty() || host.len() > MAX_NAME_LEN {
            return None;
        }
        let is_match = host == self.0
            || (host.len() > self.0.len() + 1
                && host.ends_with(&self.0)
                && host.as_bytes()[host.len() - self.0.len() - 1] == b'.');
        if !is_match {
            return None;
        }
        if host.split('.').all(|l| is_valid_label(l, true)) {
            Some(host)
        } else {
            None
        }
    }

    /// Builds `{label}.{domain}`, or `None` if the label is malformed.
    pub fn with_label(&self, label: &str) -> Option<String> {
        self.match_host(&format!("{}.{}", label, self.0))
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for Domain {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

/// Lowercases, trims whitespace and trailing dots, and strips a leading `*.`.
pub fn normalize_host(host: &str) -> String {
    let host = host.trim().trim_end_matches('.');
    let host = host.strip_prefix("*.").unwrap_or(host);
    host.to_ascii_lowercase()
}

/// Checks one DNS label. Underscores are accepted in discovered hostnames
/// (service labels such as `_dmarc`) but not in the target domain.
fn is_valid_label(label: &str, allow_underscore: bool) -> bool {
    if label.is_empty() || label.len() > MAX_LABEL_LEN {
        return false;
    }
    if label.starts_with('-') || label.ends_with('-') {
        return false;
    }
    label
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || (allow_underscore && c == '_'))
}
