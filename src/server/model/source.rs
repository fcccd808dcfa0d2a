use chrono::{DateTime, Utc};

use crate::{
    model::source::{KnownSenderDto, SourceDto},
    server::util::parse::pass_rate,
};

#[derive(Debug, Clone, PartialEq)]
pub struct Source {
    pub id: i32,
    pub domain_id: i32,
    pub ip: String,
    pub hostname: Option<String>,
    pub country: Option<String>,
    pub city: Option<String>,
    pub isp: Option<String>,
    pub known_sender_id: Option<i32>,
    pub total_count: i64,
    pub pass_count: i64,
    pub first_seen: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
    pub geo_checked_at: Option<DateTime<Utc>>,
}

impl Source {
    pub fn from_entity(entity: entity::source::Model) -> Self {
        Self {
            id: entity.id,
            domain_id: entity.domain_id,
            ip: entity.ip,
            hostname: entity.hostname,
            country: entity.country,
            city: entity.city,
            isp: entity.isp,
            known_sender_id: entity.known_sender_id,
            total_count: entity.total_count,
            pass_count: entity.pass_count,
            first_seen: entity.first_seen,
            last_seen: entity.last_seen,
            geo_checked_at: entity.geo_checked_at,
        }
    }
}

/// Source together with the name of the known sender it was classified as.
#[derive(Debug, Clone)]
pub struct SourceWithSender {
    pub source: Source,
    pub known_sender: Option<String>,
}

impl SourceWithSender {
    pub fn into_dto(self) -> SourceDto {
        let s = self.source;
        SourceDto {
            id: s.id,
            domain_id: s.domain_id,
            pass_rate: pass_rate(s.pass_count, s.total_count),
            ip: s.ip,
            hostname: s.hostname,
            country: s.country,
            city: s.city,
            isp: s.isp,
            known_sender: self.known_sender,
            total_count: s.total_count,
            pass_count: s.pass_count,
            first_seen: s.first_seen,
            last_seen: s.last_seen,
        }
    }
}

/// Location data returned by the geolocation lookup.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeoLocation {
    pub country: Option<String>,
    pub city: Option<String>,
    pub isp: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct KnownSender {
    pub id: i32,
    pub organization_id: Option<i32>,
    pub name: String,
    pub hostname_suffix: String,
    pub description: Option<String>,
}

impl KnownSender {
    pub fn from_entity(entity: entity::known_sender::Model) -> Self {
        Self {
            id: entity.id,
            organization_id: entity.organization_id,
            name: entity.name,
            hostname_suffix: entity.hostname_suffix,
            description: entity.description,
        }
    }

    /// Whether `hostname` belongs to this sender.
    ///
    /// Matches when the lowercased hostname equals the suffix or ends with
    /// `.` followed by the suffix.
    pub fn matches(&self, hostname: &str) -> bool {
        let host = hostname.trim_end_matches('.').to_ascii_lowercase();
        let suffix = self.hostname_suffix.to_ascii_lowercase();
        host == suffix || host.ends_with(&format!(".{}", suffix))
    }

    pub fn into_dto(self) -> KnownSenderDto {
        KnownSenderDto {
            id: self.id,
            organization_id: self.organization_id,
            name: self.name,
            hostname_suffix: self.hostname_suffix,
            description: self.description,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CreateKnownSenderParams {
    pub organization_id: Option<i32>,
    pub name: String,
    pub hostname_suffix: String,
    pub description: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sender(suffix: &str) -> KnownSender {
        KnownSender {
            id: 1,
            organization_id: None,
            name: "Test".into(),
            hostname_suffix: suffix.into(),
            description: None,
        }
    }

    /// Expected: exact and dotted-suffix matches only
    #[test]
    fn matches_hostname_suffix() {
        let google = sender("google.com");
        assert!(google.matches("mail-wr1-f41.google.com"));
        assert!(google.matches("Google.COM."));
        assert!(!google.matches("notgoogle.com"));
        assert!(!google.matches("google.com.evil.net"));
    }
}
