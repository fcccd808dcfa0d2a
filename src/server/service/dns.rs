//! DNS-over-HTTPS lookups for DMARC, SPF, DKIM and reverse DNS.
//!
//! Every lookup degrades to an empty result on failure; callers never see
//! resolver errors.

use std::net::IpAddr;

use futures_util::future::join_all;
use serde::Deserialize;

use crate::server::model::dns::{DkimSelector, DmarcRecord, DnsCheck};

const DOH_URL: &str = "https://dns.google/resolve";

const TYPE_TXT: u16 = 16;
const TYPE_PTR: u16 = 12;

/// Selectors used by common providers, probed when checking DKIM.
pub const DKIM_SELECTORS: &[&str] = &[
    "default",
    "google",
    "selector1",
    "selector2",
    "k1",
    "k2",
    "s1",
    "s2",
    "mail",
    "dkim",
    "smtp",
    "mandrill",
    "mxvault",
    "zoho",
    "everlytickey1",
];

#[derive(Deserialize)]
struct DohResponse {
    #[serde(rename = "Status")]
    status: u32,
    #[serde(rename = "Answer", default)]
    answer: Vec<DohAnswer>,
}

#[derive(Deserialize)]
struct DohAnswer {
    #[serde(rename = "type")]
    record_type: u16,
    data: String,
}

pub struct DnsService<'a> {
    http_client: &'a reqwest::Client,
}

impl<'a> DnsService<'a> {
    pub fn new(http_client: &'a reqwest::Client) -> Self {
        Self { http_client }
    }

    /// Looks up DMARC, SPF and DKIM records of `domain`.
    ///
    /// DKIM selectors are probed concurrently with the DMARC and SPF queries.
    pub async fn check(&self, domain: &str) -> DnsCheck {
        let dkim_lookups = join_all(DKIM_SELECTORS.iter().map(|s| self.dkim(domain, s)));
        let (dmarc, spf, dkim) =
            tokio::join!(self.dmarc(domain), self.spf(domain), dkim_lookups);

        DnsCheck {
            domain: domain.to_string(),
            dmarc,
            spf,
            dkim: dkim.into_iter().flatten().collect(),
        }
    }

    /// Published DMARC record of `domain`, if any.
    pub async fn dmarc(&self, domain: &str) -> Option<DmarcRecord> {
        self.txt(&format!("_dmarc.{}", domain))
            .await
            .into_iter()
            .find(|r| starts_with_ignore_case(r, "v=DMARC1"))
            .map(|r| DmarcRecord::parse(&r))
    }

    /// Every `v=spf1` record of `domain`; more than one is a misconfiguration.
    pub async fn spf(&self, domain: &str) -> Vec<String> {
        self.txt(domain)
            .await
            .into_iter()
            .filter(|r| starts_with_ignore_case(r, "v=spf1"))
            .collect()
    }

    async fn dkim(&self, domain: &str, selector: &str) -> Option<DkimSelector> {
        self.txt(&format!("{}._domainkey.{}", selector, domain))
            .await
            .into_iter()
            .find(|r| r.contains("v=DKIM1") || r.contains("p="))
            .map(|record| DkimSelector {
                selector: selector.to_string(),
                record,
            })
    }

    /// Reverse DNS name of an IPv4 or IPv6 address, without the trailing dot.
    pub async fn ptr(&self, ip: &str) -> Option<String> {
        let name = reverse_name(ip)?;
        self.query(&name, TYPE_PTR)
            .await
            .into_iter()
            .next()
            .map(|host| host.trim_end_matches('.').to_ascii_lowercase())
            .filter(|host| !host.is_empty())
    }

    async fn txt(&self, name: &str) -> Vec<String> {
        self.query(name, TYPE_TXT)
            .await
            .iter()
            .map(|data| unquote_txt(data))
            .collect()
    }

    async fn query(&self, name: &str, record_type: u16) -> Vec<String> {
        let response = self
            .http_client
            .get(DOH_URL)
            .query(&[("name", name), ("type", &record_type.to_string())])
            .header("Accept", "application/dns-json")
            .send()
            .await;

        let response = match response.and_then(|r| r.error_for_status()) {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!("DNS lookup of {} (type {}) failed: {}", name, record_type, e);
                return Vec::new();
            }
        };

        match response.json::<DohResponse>().await {
            // NXDOMAIN and friends carry a non-zero status and no answers
            Ok(body) if body.status == 0 => body
                .answer
                .into_iter()
                .filter(|a| a.record_type == record_type)
                .map(|a| a.data)
                .collect(),
            Ok(_) => Vec::new(),
            Err(e) => {
                tracing::warn!("Invalid DNS response for {}: {}", name, e);
                Vec::new()
            }
        }
    }
}

fn starts_with_ignore_case(value: &str, prefix: &str) -> bool {
    value
        .get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}

/// Joins the character-strings of a TXT answer.
///
/// `"v=spf1 include:a" " include:b ~all"` becomes `v=spf1 include:a include:b ~all`.
/// Answers without quotes are returned as-is.
pub fn unquote_txt(data: &str) -> String {
    if !data.contains('"') {
        return data.trim().to_string();
    }

    let mut out = String::with_capacity(data.len());
    let mut in_quotes = false;
    let mut chars = data.chars();
    while let Some(c) = chars.next() {
        match c {
            '"' => in_quotes = !in_quotes,
            '\\' if in_quotes => {
                if let Some(next) = chars.next() {
                    out.push(next);
                }
            }
            c if in_quotes => out.push(c),
            _ => {}
        }
    }
    out
}

/// Builds the `in-addr.arpa` / `ip6.arpa` name for an address.
pub fn reverse_name(ip: &str) -> Option<String> {
    match ip.trim().parse::<IpAddr>().ok()? {
        IpAddr::V4(v4) => {
            let [a, b, c, d] = v4.octets();
            Some(format!("{}.{}.{}.{}.in-addr.arpa", d, c, b, a))
        }
        IpAddr::V6(v6) => {
            let nibbles: Vec<String> = v6
                .octets()
                .iter()
                .rev()
                .flat_map(|byte| [byte & 0x0f, byte >> 4])
                .map(|n| format!("{:x}", n))
                .collect();
            Some(format!("{}.ip6.arpa", nibbles.join(".")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Expected: quoted segments concatenated, escapes resolved
    #[test]
    fn unquotes_txt_segments() {
        assert_eq!(
            unquote_txt("\"v=spf1 include:_spf.google.com\" \" ~all\""),
            "v=spf1 include:_spf.google.com ~all"
        );
        assert_eq!(unquote_txt("\"v=DMARC1; p=none\""), "v=DMARC1; p=none");
        assert_eq!(unquote_txt("\"say \\\"hi\\\"\""), "say \"hi\"");
        assert_eq!(unquote_txt("v=spf1 -all"), "v=spf1 -all");
    }

    #[test]
    fn builds_reverse_names() {
        assert_eq!(
            reverse_name("192.0.2.10").as_deref(),
            Some("10.2.0.192.in-addr.arpa")
        );
        let v6 = reverse_name("2001:db8::1").unwrap();
        assert!(v6.starts_with("1.0.0.0.0.0.0.0"));
        assert!(v6.ends_with("8.b.d.0.1.0.0.2.ip6.arpa"));
        assert_eq!(reverse_name("not-an-ip"), None);
    }

    #[test]
    fn matches_prefix_case_insensitively() {
        assert!(starts_with_ignore_case("V=dmarc1; p=none", "v=DMARC1"));
        assert!(!starts_with_ignore_case("v=DM", "v=DMARC1"));
    }
}
