//! Aggregate (RUA) report XML as described in RFC 7489 appendix C.

use std::net::IpAddr;

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::server::{
    error::ingest::IngestError,
    model::report::{ParsedAggregateReport, ParsedRecord},
};

#[derive(Deserialize)]
struct Feedback {
    report_metadata: ReportMetadata,
    policy_published: PolicyPublished,
    #[serde(rename = "record", default)]
    records: Vec<XmlRecord>,
}

#[derive(Deserialize)]
struct ReportMetadata {
    org_name: String,
    email: Option<String>,
    report_id: String,
    date_range: DateRange,
}

#[derive(Deserialize)]
struct DateRange {
    begin: i64,
    end: i64,
}

#[derive(Deserialize)]
struct PolicyPublished {
    domain: String,
    p: Option<String>,
    sp: Option<String>,
    pct: Option<String>,
    adkim: Option<String>,
    aspf: Option<String>,
}

#[derive(Deserialize)]
struct XmlRecord {
    row: Row,
    #[serde(default)]
    identifiers: Identifiers,
    #[serde(default)]
    auth_results: AuthResults,
}

#[derive(Deserialize)]
struct Row {
    source_ip: String,
    count: i64,
    policy_evaluated: PolicyEvaluated,
}

#[derive(Deserialize)]
struct PolicyEvaluated {
    disposition: Option<String>,
    dkim: Option<String>,
    spf: Option<String>,
}

#[derive(Deserialize, Default)]
struct Identifiers {
    header_from: Option<String>,
    envelope_from: Option<String>,
}

#[derive(Deserialize, Default)]
struct AuthResults {
    #[serde(default)]
    dkim: Vec<AuthResult>,
    #[serde(default)]
    spf: Vec<AuthResult>,
}

#[derive(Deserialize)]
struct AuthResult {
    domain: Option<String>,
    result: Option<String>,
}

/// Parses an aggregate report document.
///
/// Missing policy-evaluated results default to `fail`, a missing disposition
/// to `none` and a missing header-from to the published policy domain.
///
/// # Returns
/// - `Ok(ParsedAggregateReport)` - Report metadata, policy and records
/// - `Err(IngestError::InvalidXml)` - Not UTF-8, malformed, or missing
///   required elements
pub fn parse_aggregate(bytes: &[u8]) -> Result<ParsedAggregateReport, IngestError> {
    let text = std::str::from_utf8(bytes).map_err(|e| IngestError::InvalidXml(e.to_string()))?;
    let text = text.trim_start_matches('\u{feff}');

    let feedback: Feedback =
        quick_xml::de::from_str(text).map_err(|e| IngestError::InvalidXml(e.to_string()))?;

    let meta = feedback.report_metadata;
    let policy = feedback.policy_published;

    let policy_domain = policy.domain.trim().trim_end_matches('.').to_ascii_lowercase();
    if policy_domain.is_empty() {
        return Err(IngestError::InvalidXml(
            "policy_published has no domain".to_string(),
        ));
    }

    let records = feedback
        .records
        .into_iter()
        .map(|r| {
            let dkim = r.auth_results.dkim.into_iter().next();
            let spf = r.auth_results.spf.into_iter().next();
            Ok(ParsedRecord {
                source_ip: source_ip(&r.row.source_ip)?,
                count: r.row.count,
                disposition: non_empty(r.row.policy_evaluated.disposition)
                    .map(|d| d.to_ascii_lowercase())
                    .unwrap_or_else(|| "none".to_string()),
                dkim: result_or_fail(r.row.policy_evaluated.dkim),
                spf: result_or_fail(r.row.policy_evaluated.spf),
                header_from: non_empty(r.identifiers.header_from)
                    .map(|h| h.to_ascii_lowercase())
                    .unwrap_or_else(|| policy_domain.clone()),
                envelope_from: non_empty(r.identifiers.envelope_from),
                dkim_domain: dkim.as_ref().and_then(|d| non_empty(d.domain.clone())),
                dkim_result: dkim.and_then(|d| non_empty(d.result)),
                spf_domain: spf.as_ref().and_then(|s| non_empty(s.domain.clone())),
                spf_result: spf.and_then(|s| non_empty(s.result)),
            })
        })
        .collect::<Result<Vec<_>, IngestError>>()?;

    Ok(ParsedAggregateReport {
        org_name: required(meta.org_name, "org_name")?,
        reporter_email: non_empty(meta.email),
        report_id: required(meta.report_id, "report_id")?,
        date_begin: timestamp(meta.date_range.begin)?,
        date_end: timestamp(meta.date_range.end)?,
        policy_p: non_empty(policy.p)
            .map(|p| p.to_ascii_lowercase())
            .unwrap_or_else(|| "none".to_string()),
        policy_sp: non_empty(policy.sp).map(|p| p.to_ascii_lowercase()),
        policy_pct: non_empty(policy.pct).and_then(|p| p.parse().ok()),
        policy_adkim: non_empty(policy.adkim),
        policy_aspf: non_empty(policy.aspf),
        policy_domain,
        records,
    })
}

/// Canonical text form of a record's source address.
fn source_ip(value: &str) -> Result<String, IngestError> {
    let value = value.trim();
    value
        .parse::<IpAddr>()
        .map(|ip| ip.to_string())
        .map_err(|_| IngestError::InvalidXml(format!("invalid source_ip {:?}", value)))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn required(value: String, element: &str) -> Result<String, IngestError> {
    non_empty(Some(value))
        .ok_or_else(|| IngestError::InvalidXml(format!("report_metadata has no {}", element)))
}

fn result_or_fail(value: Option<String>) -> String {
    non_empty(value)
        .map(|v| v.to_ascii_lowercase())
        .unwrap_or_else(|| "fail".to_string())
}

fn timestamp(secs: i64) -> Result<DateTime<Utc>, IngestError> {
    DateTime::from_timestamp(secs, 0)
        .ok_or_else(|| IngestError::InvalidXml(format!("invalid timestamp {}", secs)))
}

#[cfg(test)]
mod tests {
    use super::*;

    const REPORT: &str = r#"<?xml version="1.0" encoding="UTF-8" ?>
<feedback>
  <version>1.0</version>
  <report_metadata>
    <org_name>google.com</org_name>
    <email>noreply-dmarc-support@google.com</email>
    <report_id>1234567890</report_id>
    <date_range>
      <begin>1700000000</begin>
      <end>1700086399</end>
    </date_range>
  </report_metadata>
  <policy_published>
    <domain>Example.com</domain>
    <adkim>r</adkim>
    <aspf>r</aspf>
    <p>quarantine</p>
    <sp>none</sp>
    <pct>100</pct>
  </policy_published>
  <record>
    <row>
      <source_ip>209.85.220.41</source_ip>
      <count>12</count>
      <policy_evaluated>
        <disposition>none</disposition>
        <dkim>pass</dkim>
        <spf>fail</spf>
      </policy_evaluated>
    </row>
    <identifiers>
      <header_from>example.com</header_from>
    </identifiers>
    <auth_results>
      <dkim>
        <domain>example.com</domain>
        <result>pass</result>
        <selector>google</selector>
      </dkim>
      <dkim>
        <domain>other.net</domain>
        <result>fail</result>
      </dkim>
      <spf>
        <domain>bounce.example.com</domain>
        <result>softfail</result>
      </spf>
    </auth_results>
  </record>
  <record>
    <row>
      <source_ip>203.0.113.9</source_ip>
      <count>3</count>
      <policy_evaluated>
        <disposition>quarantine</disposition>
        <dkim>fail</dkim>
        <spf>fail</spf>
      </policy_evaluated>
    </row>
    <identifiers>
      <header_from>example.com</header_from>
      <envelope_from>spoof.example</envelope_from>
    </identifiers>
    <auth_results>
      <spf>
        <domain>spoof.example</domain>
        <result>fail</result>
      </spf>
    </auth_results>
  </record>
</feedback>"#;

    /// Expected: metadata, policy and both records with first auth results
    #[test]
    fn parses_aggregate_report() {
        let report = parse_aggregate(REPORT.as_bytes()).unwrap();

        assert_eq!(report.org_name, "google.com");
        assert_eq!(report.report_id, "1234567890");
        assert_eq!(report.date_begin.timestamp(), 1_700_000_000);
        assert_eq!(report.policy_domain, "example.com");
        assert_eq!(report.policy_p, "quarantine");
        assert_eq!(report.policy_pct, Some(100));
        assert_eq!(report.records.len(), 2);

        let first = &report.records[0];
        assert_eq!(first.source_ip, "209.85.220.41");
        assert_eq!(first.count, 12);
        assert_eq!(first.dkim_domain.as_deref(), Some("example.com"));
        assert_eq!(first.dkim_result.as_deref(), Some("pass"));
        assert_eq!(first.spf_result.as_deref(), Some("softfail"));

        let second = &report.records[1];
        assert_eq!(second.disposition, "quarantine");
        assert_eq!(second.envelope_from.as_deref(), Some("spoof.example"));
        assert_eq!(second.dkim_domain, None);

        assert_eq!(report.totals(), (15, 12));
    }

    /// Expected: a report without records is valid and totals zero
    #[test]
    fn accepts_report_without_records() {
        let xml = r#"<feedback>
  <report_metadata>
    <org_name>Yahoo</org_name>
    <report_id>abc</report_id>
    <date_range><begin>1700000000</begin><end>1700086400</end></date_range>
  </report_metadata>
  <policy_published><domain>example.org</domain><p>none</p></policy_published>
</feedback>"#;

        let report = parse_aggregate(xml.as_bytes()).unwrap();
        assert!(report.records.is_empty());
        assert_eq!(report.totals(), (0, 0));
        assert_eq!(report.reporter_email, None);
    }

    #[test]
    fn rejects_malformed_xml() {
        assert!(matches!(
            parse_aggregate(b"<feedback><report_metadata>"),
            Err(IngestError::InvalidXml(_))
        ));
        assert!(matches!(
            parse_aggregate(b"not xml at all"),
            Err(IngestError::InvalidXml(_))
        ));
    }

    /// Expected: a record whose source is not an IP address rejects the report
    #[test]
    fn rejects_non_ip_source() {
        let xml = REPORT.replace("203.0.113.9", "../../admin?x=1");

        assert!(matches!(
            parse_aggregate(xml.as_bytes()),
            Err(IngestError::InvalidXml(msg)) if msg.contains("source_ip")
        ));
    }

    /// Expected: IPv6 sources are stored in canonical compressed form
    #[test]
    fn canonicalizes_ipv6_source() {
        let xml = REPORT.replace("203.0.113.9", " 2001:DB8:0:0:0:0:0:1 ");

        let report = parse_aggregate(xml.as_bytes()).unwrap();
        assert_eq!(report.records[1].source_ip, "2001:db8::1");
    }
}
