//! JSON rendering.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

use super::Report;
use crate::discovery::Candidate;
use crate::probe::ProbeResult;

/// Wire shape of the JSON report. Borrows everything from the [`Report`].
#[derive(Serialize)]
struct ReportDocument<'a> {
    domain: &'a str,
    timestamp: String,
    total_subdomains: usize,
    active_subdomains: usize,
    subdomains: &'a [Candidate],
    active_hosts: Vec<&'a ProbeResult>,
    errors: &'a [String],
}

fn iso8601(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Secs, true)
}

pub(super) fn render_json(report: &Report) -> serde_json::Result<Vec<u8>> {
    let active_hosts = report.active_hosts();
    let document = ReportDocument {
        domain: report.domain.as_str(),
        timestamp: iso8601(&report.timestamp),
        total_subdomains: report.total_subdomains(),
        active_subdomains: active_hosts.len(),
        subdomains: &report.candidates,
        active_hosts,
        errors: &report.errors,
    };
    let mut bytes = serde_json::to_vec_pretty(&document)?;
    bytes.push(b'\n');
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::tests::sample;
    use chrono::TimeZone;

    #[test]
    fn test_schema_fields() {
        let report = sample();
        let value: serde_json::Value =
            serde_json::from_slice(&render_json(&report).unwrap()).unwrap();

        assert_eq!(value["domain"], "example.com");
        assert_eq!(value["total_subdomains"], 4);
        assert_eq!(value["active_subdomains"], 2);
        assert_eq!(value["subdomains"].as_array().unwrap().len(), 4);
        assert_eq!(value["subdomains"][1]["name"], "www.example.com");
        assert_eq!(value["subdomains"][1]["source"], "wordlist");
        assert_eq!(value["active_hosts"][1]["hostname"], "www.example.com");
        assert_eq!(value["active_hosts"][1]["classification"], "active");
        assert_eq!(value["active_hosts"][1]["http"]["status_code"], 200);
        assert_eq!(value["active_hosts"][1]["dns"]["addresses"][0], "192.0.2.7");
        assert!(value["errors"][0]
            .as_str()
            .unwrap()
            .starts_with("Fallback enumeration triggered"));
    }

    #[test]
    fn test_timestamp_is_iso8601_utc() {
        let mut report = sample();
        report.timestamp = Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 0).unwrap();
        let value: serde_json::Value =
            serde_json::from_slice(&render_json(&report).unwrap()).unwrap();
        assert_eq!(value["timestamp"], "2024-03-09T14:05:00Z");
    }
}
