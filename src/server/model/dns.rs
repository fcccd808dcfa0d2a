use crate::model::dns::{DkimSelectorDto, DmarcRecordDto, DnsCheckDto};

/// Tags of a published `v=DMARC1` record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DmarcRecord {
    pub raw: String,
    pub policy: Option<String>,
    pub subdomain_policy: Option<String>,
    pub pct: Option<u8>,
    pub rua: Vec<String>,
    pub ruf: Vec<String>,
    pub adkim: Option<String>,
    pub aspf: Option<String>,
    pub fo: Option<String>,
}

impl DmarcRecord {
    /// Parses the `tag=value` pairs of a DMARC TXT record.
    ///
    /// Unknown tags are ignored; report URIs are split on commas.
    pub fn parse(raw: &str) -> Self {
        let mut record = Self {
            raw: raw.to_string(),
            ..Default::default()
        };

        for part in raw.split(';') {
            let Some((tag, value)) = part.split_once('=') else {
                continue;
            };
            let value = value.trim();
            let list = || {
                value
                    .split(',')
                    .map(|v| v.trim().to_string())
                    .filter(|v| !v.is_empty())
                    .collect::<Vec<_>>()
            };
            match tag.trim().to_ascii_lowercase().as_str() {
                "p" => record.policy = Some(value.to_ascii_lowercase()),
                "sp" => record.subdomain_policy = Some(value.to_ascii_lowercase()),
                "pct" => record.pct = value.parse().ok(),
                "rua" => record.rua = list(),
                "ruf" => record.ruf = list(),
                "adkim" => record.adkim = Some(value.to_string()),
                "aspf" => record.aspf = Some(value.to_string()),
                "fo" => record.fo = Some(value.to_string()),
                _ => {}
            }
        }

        record
    }

    pub fn into_dto(self) -> DmarcRecordDto {
        DmarcRecordDto {
            raw: self.raw,
            policy: self.policy,
            subdomain_policy: self.subdomain_policy,
            pct: self.pct,
            rua: self.rua,
            ruf: self.ruf,
            adkim: self.adkim,
            aspf: self.aspf,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DkimSelector {
    pub selector: String,
    pub record: String,
}

/// Result of checking a domain's published authentication records.
#[derive(Debug, Clone, PartialEq)]
pub struct DnsCheck {
    pub domain: String,
    pub dmarc: Option<DmarcRecord>,
    pub spf: Vec<String>,
    pub dkim: Vec<DkimSelector>,
}

impl DnsCheck {
    pub fn warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        match &self.dmarc {
            None => warnings.push("No DMARC record published".to_string()),
            Some(dmarc) => {
                if dmarc.rua.is_empty() {
                    warnings.push("DMARC record has no rua address; no aggregate reports will be received".to_string());
                }
                if dmarc.policy.is_none() {
                    warnings.push("DMARC record is missing the required p= tag".to_string());
                }
            }
        }
        match self.spf.len() {
            0 => warnings.push("No SPF record published".to_string()),
            1 => {}
            n => warnings.push(format!(
                "{} SPF records published; receivers treat multiple records as a permanent error",
                n
            )),
        }
        if self.dkim.is_empty() {
            warnings.push("No DKIM key found on common selectors".to_string());
        }
        warnings
    }

    pub fn into_dto(self) -> DnsCheckDto {
        let warnings = self.warnings();
        DnsCheckDto {
            domain: self.domain,
            dmarc: self.dmarc.map(DmarcRecord::into_dto),
            spf: self.spf.into_iter().next(),
            dkim: self
                .dkim
                .into_iter()
                .map(|d| DkimSelectorDto {
                    selector: d.selector,
                    record: d.record,
                })
                .collect(),
            warnings,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Expected: all supported tags parsed, report URIs split
    #[test]
    fn parses_dmarc_tags() {
        let record = DmarcRecord::parse(
            "v=DMARC1; p=Quarantine; sp=none; pct=50; rua=mailto:a@example.com, mailto:b@example.com; adkim=s; aspf=r; fo=1",
        );
        assert_eq!(record.policy.as_deref(), Some("quarantine"));
        assert_eq!(record.subdomain_policy.as_deref(), Some("none"));
        assert_eq!(record.pct, Some(50));
        assert_eq!(record.rua, vec!["mailto:a@example.com", "mailto:b@example.com"]);
        assert!(record.ruf.is_empty());
        assert_eq!(record.adkim.as_deref(), Some("s"));
        assert_eq!(record.aspf.as_deref(), Some("r"));
        assert_eq!(record.fo.as_deref(), Some("1"));
    }

    /// Expected: a warning for multiple SPF records and one for a missing rua
    #[test]
    fn warns_about_misconfiguration() {
        let check = DnsCheck {
            domain: "example.com".into(),
            dmarc: Some(DmarcRecord::parse("v=DMARC1; p=none")),
            spf: vec!["v=spf1 -all".into(), "v=spf1 ~all".into()],
            dkim: vec![DkimSelector {
                selector: "google".into(),
                record: "v=DKIM1; p=abc".into(),
            }],
        };
        let warnings = check.warnings();
        assert_eq!(warnings.len(), 2);
        assert!(warnings.iter().any(|w| w.contains("rua")));
        assert!(warnings.iter().any(|w| w.contains("2 SPF records")));
    }
}
