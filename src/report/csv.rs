//! CSV rendering.
//!
//! One row per candidate, flattened. Candidates the deadline left unprobed get
//! classification `unprobed` and empty probe columns.

use anyhow::{Context, Result};
use csv::Writer;

use super::Report;
use crate::probe::{DnsOutcome, HttpOutcome, ProbeResult};

const HEADER: [&str; 10] = [
    "hostname",
    "source",
    "classification",
    "ip_addresses",
    "scheme",
    "http_status",
    "final_url",
    "server",
    "dns_detail",
    "http_detail",
];

pub(super) fn render_csv(report: &Report) -> Result<Vec<u8>> {
    let mut writer = Writer::from_writer(Vec::new());
    writer
        .write_record(HEADER)
        .context("Failed to write CSV header")?;

    for (candidate, result) in report.rows() {
        let mut record = vec![
            candidate.name.clone(),
            candidate.source.as_str().to_string(),
        ];
        match result {
            Some(result) => record.extend(probe_columns(result)),
            None => {
                record.push("unprobed".to_string());
                record.extend(std::iter::repeat(String::new()).take(HEADER.len() - 3));
            }
        }
        writer
            .write_record(&record)
            .with_context(|| format!("Failed to write CSV row for {}", candidate.name))?;
    }

    writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("Failed to flush CSV: {}", e.error()))
}

fn probe_columns(result: &ProbeResult) -> [String; 8] {
    let addresses = match &result.dns {
        DnsOutcome::Resolved { addresses } => addresses
            .iter()
            .map(|ip| ip.to_string())
            .collect::<Vec<_>>()
            .join(";"),
        _ => String::new(),
    };
    let dns_detail = match &result.dns {
        DnsOutcome::Resolved { .. } => String::new(),
        DnsOutcome::NoSuchName => "no such name".to_string(),
        DnsOutcome::Failed { reason } => reason.clone(),
    };

    let (scheme, status, final_url, server, http_detail) = match &result.http {
        HttpOutcome::Responded {
            scheme,
            status_code,
            final_url,
            server,
            ..
        } => (
            scheme.to_string(),
            status_code.to_string(),
            final_url.clone(),
            server.clone().unwrap_or_default(),
            String::new(),
        ),
        HttpOutcome::ProtocolError { scheme, reason } => (
            scheme.to_string(),
            String::new(),
            String::new(),
            String::new(),
            reason.clone(),
        ),
        HttpOutcome::Unreachable { reason } => (
            String::new(),
            String::new(),
            String::new(),
            String::new(),
            reason.clone(),
        ),
        HttpOutcome::Skipped => (
            String::new(),
            String::new(),
            String::new(),
            String::new(),
            "skipped".to_string(),
        ),
    };

    [
        result.classification.as_str().to_string(),
        addresses,
        scheme,
        status,
        final_url,
        server,
        dns_detail,
        http_detail,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::tests::{active, candidate, sample};
    use crate::report::build;
    use crate::domain::Domain;

    fn parse(bytes: &[u8]) -> Vec<csv::StringRecord> {
        csv::Reader::from_reader(bytes)
            .records()
            .collect::<Result<_, _>>()
            .unwrap()
    }

    #[test]
    fn test_header_and_one_row_per_candidate() {
        let bytes = render_csv(&sample()).unwrap();
        let text = String::from_utf8(bytes.clone()).unwrap();
        assert!(text.starts_with("hostname,source,classification,ip_addresses,scheme,http_status"));

        let rows = parse(&bytes);
        assert_eq!(rows.len(), 4);
        assert_eq!(&rows[1][0], "www.example.com");
        assert_eq!(&rows[1][2], "active");
        assert_eq!(&rows[1][3], "192.0.2.7");
        assert_eq!(&rows[1][5], "200");
        assert_eq!(&rows[1][7], "nginx");
        assert_eq!(&rows[2][2], "inactive");
        assert_eq!(&rows[2][8], "no such name");
        assert_eq!(&rows[3][2], "unprobed");
        assert_eq!(rows[3].len(), HEADER.len());
    }

    #[test]
    fn test_delimiter_sensitive_values_are_quoted() {
        let name = "odd,name.example.com";
        let mut result = active(name);
        result.http = HttpOutcome::Unreachable {
            reason: "https: refused, \"twice\"".to_string(),
        };
        let report = build(
            Domain::parse("example.com").unwrap(),
            vec![candidate(name)],
            vec![result],
            Vec::new(),
            chrono::Utc::now(),
        );

        let bytes = render_csv(&report).unwrap();
        let text = String::from_utf8(bytes.clone()).unwrap();
        assert!(text.contains("\"odd,name.example.com\""));

        let rows = parse(&bytes);
        assert_eq!(&rows[0][0], name);
        assert_eq!(&rows[0][9], "https: refused, \"twice\"");
    }
}
