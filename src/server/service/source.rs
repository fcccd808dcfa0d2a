use std::{collections::HashMap, time::Duration};

use sea_orm::DatabaseConnection;
use serde::Deserialize;

use crate::server::{
    data::{
        domain::DomainRepository, known_sender::KnownSenderRepository, source::SourceRepository,
    },
    error::AppError,
    model::{
        pagination::Paginated,
        source::{GeoLocation, KnownSender, Source, SourceWithSender},
    },
    service::{dns::DnsService, known_sender::classify},
};

const GEO_LOOKUP_URL: &str = "http://ip-api.com/json";
/// Sources looked up per enrichment run.
pub const GEO_BATCH_SIZE: u64 = 40;
/// Pause between geolocation calls, keeps under ip-api's 45 requests per minute.
const GEO_LOOKUP_DELAY: Duration = Duration::from_millis(1500);

#[derive(Deserialize)]
struct IpApiResponse {
    status: String,
    country: Option<String>,
    city: Option<String>,
    isp: Option<String>,
}

impl IpApiResponse {
    fn into_location(self) -> GeoLocation {
        if self.status != "success" {
            return GeoLocation::default();
        }
        GeoLocation {
            country: self.country.filter(|s| !s.is_empty()),
            city: self.city.filter(|s| !s.is_empty()),
            isp: self.isp.filter(|s| !s.is_empty()),
        }
    }
}

pub struct SourceService<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> SourceService<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Gets a page of a domain's sources ordered by descending volume.
    pub async fn list(
        &self,
        domain_id: i32,
        page: u64,
        per_page: u64,
    ) -> Result<Paginated<SourceWithSender>, AppError> {
        let (sources, total) = SourceRepository::new(self.db)
            .get_by_domain_paginated(domain_id, page, per_page)
            .await?;

        Ok(Paginated::new(sources, total, page, per_page))
    }

    /// Geolocates sources that were never checked.
    ///
    /// Lookups run one at a time with a fixed delay between calls. Sources
    /// without a hostname also get a PTR lookup and are re-classified against
    /// the known senders of their organization. A failed lookup still marks
    /// the source as checked.
    ///
    /// # Returns
    /// - `Ok(count)` - Number of sources processed
    pub async fn enrich_pending(&self, http_client: &reqwest::Client) -> Result<usize, AppError> {
        let source_repo = SourceRepository::new(self.db);
        let dns = DnsService::new(http_client);

        let pending = source_repo.get_pending_geo(GEO_BATCH_SIZE).await?;
        if pending.is_empty() {
            return Ok(0);
        }

        let mut senders_by_domain: HashMap<i32, Vec<KnownSender>> = HashMap::new();

        for (i, source) in pending.iter().enumerate() {
            if i > 0 {
                tokio::time::sleep(GEO_LOOKUP_DELAY).await;
            }

            let location = lookup_location(http_client, &source.ip).await;
            source_repo.set_geo(source.id, location).await?;

            if source.hostname.is_none() {
                if let Some(hostname) = dns.ptr(&source.ip).await {
                    if !senders_by_domain.contains_key(&source.domain_id) {
                        let senders = self.senders_for_domain(source).await?;
                        senders_by_domain.insert(source.domain_id, senders);
                    }
                    let sender_id = senders_by_domain
                        .get(&source.domain_id)
                        .and_then(|senders| classify(senders, &hostname))
                        .map(|s| s.id);
                    source_repo
                        .set_hostname(source.id, Some(hostname), sender_id)
                        .await?;
                }
            }
        }

        tracing::info!("Enriched {} sources with geolocation", pending.len());

        Ok(pending.len())
    }

    async fn senders_for_domain(&self, source: &Source) -> Result<Vec<KnownSender>, AppError> {
        let Some(domain) = DomainRepository::new(self.db)
            .find_by_id(source.domain_id)
            .await?
        else {
            return Ok(Vec::new());
        };

        Ok(KnownSenderRepository::new(self.db)
            .list_for_organization(domain.organization_id)
            .await?)
    }
}

/// Looks up the location of an IP, empty when the service fails.
async fn lookup_location(http_client: &reqwest::Client, ip: &str) -> GeoLocation {
    let result = async {
        http_client
            .get(format!("{}/{}", GEO_LOOKUP_URL, ip))
            .query(&[("fields", "status,country,city,isp")])
            .send()
            .await?
            .error_for_status()?
            .json::<IpApiResponse>()
            .await
    }
    .await;

    match result {
        Ok(response) => response.into_location(),
        Err(e) => {
            tracing::warn!("Geolocation lookup for {} failed: {}", ip, e);
            GeoLocation::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_successful_lookup() {
        let response: IpApiResponse = serde_json::from_str(
            r#"{"status":"success","country":"United States","city":"Mountain View","isp":"Google LLC"}"#,
        )
        .unwrap();

        let location = response.into_location();
        assert_eq!(location.country.as_deref(), Some("United States"));
        assert_eq!(location.isp.as_deref(), Some("Google LLC"));
    }

    /// Expected: private or reserved ranges yield an empty location
    #[test]
    fn failed_lookup_is_empty() {
        let response: IpApiResponse =
            serde_json::from_str(r#"{"status":"fail","message":"private range"}"#).unwrap();

        assert_eq!(response.into_location(), GeoLocation::default());
    }
}
