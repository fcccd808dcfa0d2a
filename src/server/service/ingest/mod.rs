//! Report ingestion shared by uploads, the machine API and the Gmail sync job.
//!
//! Incoming bytes are decompressed ([`decode`]), parsed as an aggregate XML
//! report ([`aggregate`]) or an ARF failure report ([`forensic`]), matched to a
//! domain of the organization and stored. Aggregate reports also update the
//! per-domain sources and trigger alert evaluation.

pub mod aggregate;
pub mod decode;
pub mod forensic;

use chrono::Utc;
use sea_orm::DatabaseConnection;
use serenity::http::Http;

use crate::{
    model::report::ReportKind,
    server::{
        data::{
            domain::DomainRepository, forensic_report::ForensicReportRepository,
            known_sender::KnownSenderRepository, report::ReportRepository,
            source::SourceRepository,
        },
        error::{ingest::IngestError, AppError},
        model::{domain::Domain, report::IngestResult, source::Source},
        service::{
            alert::AlertService,
            dns::DnsService,
            known_sender::classify,
            notify::WebhookNotifier,
        },
    },
};

pub struct IngestService<'a> {
    db: &'a DatabaseConnection,
    http_client: &'a reqwest::Client,
    discord_http: &'a Http,
    app_url: &'a str,
}

impl<'a> IngestService<'a> {
    pub fn new(
        db: &'a DatabaseConnection,
        http_client: &'a reqwest::Client,
        discord_http: &'a Http,
        app_url: &'a str,
    ) -> Self {
        Self {
            db,
            http_client,
            discord_http,
            app_url,
        }
    }

    /// Ingests one report for an organization.
    ///
    /// # Arguments
    /// - `organization_id` - Organization the report is submitted to
    /// - `target` - Domain the report was uploaded to, `None` to resolve the
    ///   domain from the report content
    /// - `kind` - Aggregate XML or forensic ARF
    /// - `bytes` - Raw, gzip or zip content
    ///
    /// # Returns
    /// - `Ok(IngestResult)` - Stored, or skipped as duplicate
    /// - `Err(AppError::IngestErr)` - Undecodable report or unknown domain
    pub async fn ingest(
        &self,
        organization_id: i32,
        target: Option<&Domain>,
        kind: ReportKind,
        bytes: &[u8],
    ) -> Result<IngestResult, AppError> {
        let content = decode::decode(bytes)?;

        match kind {
            ReportKind::Aggregate => {
                self.ingest_aggregate(organization_id, target, &content)
                    .await
            }
            ReportKind::Forensic => {
                self.ingest_forensic(organization_id, target, &content)
                    .await
            }
        }
    }

    async fn ingest_aggregate(
        &self,
        organization_id: i32,
        target: Option<&Domain>,
        content: &[u8],
    ) -> Result<IngestResult, AppError> {
        let report_repo = ReportRepository::new(self.db);

        let parsed = aggregate::parse_aggregate(content)?;
        let domain = self
            .resolve_domain(organization_id, target, &parsed.policy_domain)
            .await?;

        if report_repo
            .exists(domain.id, &parsed.org_name, &parsed.report_id)
            .await?
        {
            tracing::debug!(
                "Skipping duplicate report {} from {} for domain {}",
                parsed.report_id,
                parsed.org_name,
                domain.id
            );
            return Ok(IngestResult {
                kind: ReportKind::Aggregate,
                domain_id: domain.id,
                report_id: None,
                duplicate: true,
                records: parsed.records.len() as u64,
                new_sources: 0,
            });
        }

        let record_count = parsed.records.len() as u64;

        let (report, created) = report_repo
            .create(domain.id, parsed, Utc::now())
            .await?;
        let new_sources = self.resolve_new_sources(&domain, created).await?;
        let new_unknown: Vec<Source> = new_sources
            .iter()
            .filter(|s| s.known_sender_id.is_none())
            .cloned()
            .collect();

        tracing::info!(
            "Stored report {} from {} for domain {} ({} records, {} new sources)",
            report.report_id,
            report.org_name,
            domain.name,
            record_count,
            new_sources.len()
        );

        let notifier = WebhookNotifier::new(self.http_client, self.discord_http);
        if let Err(e) = AlertService::new(self.db)
            .evaluate_after_ingest(&domain, &report, &new_unknown, &notifier, self.app_url)
            .await
        {
            tracing::error!("Alert evaluation failed for domain {}: {}", domain.id, e);
        }

        Ok(IngestResult {
            kind: ReportKind::Aggregate,
            domain_id: domain.id,
            report_id: Some(report.id),
            duplicate: false,
            records: record_count,
            new_sources: new_sources.len() as u64,
        })
    }

    async fn ingest_forensic(
        &self,
        organization_id: i32,
        target: Option<&Domain>,
        content: &[u8],
    ) -> Result<IngestResult, AppError> {
        let parsed = forensic::parse_forensic(content)?;
        let domain = self
            .resolve_domain(organization_id, target, &parsed.reported_domain)
            .await?;

        let report = ForensicReportRepository::new(self.db)
            .create(domain.id, parsed)
            .await?;

        tracing::info!(
            "Stored forensic report {} for domain {}",
            report.id,
            domain.name
        );

        Ok(IngestResult {
            kind: ReportKind::Forensic,
            domain_id: domain.id,
            report_id: Some(report.id),
            duplicate: false,
            records: 1,
            new_sources: 0,
        })
    }

    /// Finds the domain a report belongs to.
    ///
    /// With an explicit target the reported domain must equal it or be one of
    /// its subdomains. Otherwise the organization's domain with the longest
    /// matching name wins.
    async fn resolve_domain(
        &self,
        organization_id: i32,
        target: Option<&Domain>,
        reported: &str,
    ) -> Result<Domain, AppError> {
        if let Some(domain) = target {
            if !covers(&domain.name, reported) {
                return Err(IngestError::DomainMismatch {
                    reported: reported.to_string(),
                    domain: domain.name.clone(),
                }
                .into());
            }
            return Ok(domain.clone());
        }

        let domains = DomainRepository::new(self.db)
            .list_by_organization(organization_id)
            .await?;

        domains
            .into_iter()
            .filter(|d| covers(&d.name, reported))
            .max_by_key(|d| d.name.len())
            .ok_or_else(|| IngestError::UnknownDomain(reported.to_string()).into())
    }

    /// Reverse resolves sources seen for the first time and classifies them
    /// against the known senders.
    ///
    /// Runs after the report transaction has committed; a failed lookup
    /// leaves the hostname for the geolocation job.
    async fn resolve_new_sources(
        &self,
        domain: &Domain,
        created: Vec<Source>,
    ) -> Result<Vec<Source>, AppError> {
        let source_repo = SourceRepository::new(self.db);
        let dns = DnsService::new(self.http_client);

        let mut senders = None;
        let mut resolved = Vec::with_capacity(created.len());

        for mut source in created {
            if let Some(hostname) = dns.ptr(&source.ip).await {
                let senders = match &senders {
                    Some(senders) => senders,
                    None => senders.insert(
                        KnownSenderRepository::new(self.db)
                            .list_for_organization(domain.organization_id)
                            .await?,
                    ),
                };
                let sender_id = classify(senders, &hostname).map(|s| s.id);
                source_repo
                    .set_hostname(source.id, Some(hostname.clone()), sender_id)
                    .await?;
                source.hostname = Some(hostname);
                source.known_sender_id = sender_id;
            }

            resolved.push(source);
        }

        Ok(resolved)
    }
}

/// Whether `reported` is `domain` or one of its subdomains.
fn covers(domain: &str, reported: &str) -> bool {
    let reported = reported.trim_end_matches('.');
    reported.eq_ignore_ascii_case(domain)
        || reported
            .to_ascii_lowercase()
            .ends_with(&format!(".{}", domain.to_ascii_lowercase()))
}

#[cfg(test)]
mod tests {
    use sea_orm::{EntityTrait, PaginatorTrait};
    use test_utils::{builder::TestBuilder, factory};

    use super::*;

    /// Aggregate report without records, so ingestion performs no DNS lookups.
    fn aggregate_xml(policy_domain: &str, report_id: &str) -> String {
        format!(
            r#"<feedback>
  <report_metadata>
    <org_name>google.com</org_name>
    <report_id>{report_id}</report_id>
    <date_range><begin>1772323200</begin><end>1772409599</end></date_range>
  </report_metadata>
  <policy_published><domain>{policy_domain}</domain><p>none</p></policy_published>
</feedback>"#
        )
    }

    async fn ingest_xml(
        db: &DatabaseConnection,
        organization_id: i32,
        target: Option<&Domain>,
        xml: &str,
    ) -> Result<IngestResult, AppError> {
        let http_client = reqwest::Client::new();
        let discord_http = Http::new("");

        IngestService::new(db, &http_client, &discord_http, "http://localhost:8080")
            .ingest(
                organization_id,
                target,
                ReportKind::Aggregate,
                xml.as_bytes(),
            )
            .await
    }

    #[test]
    fn matches_domain_and_subdomains() {
        assert!(covers("example.com", "example.com"));
        assert!(covers("example.com", "Mail.Example.com."));
        assert!(!covers("example.com", "badexample.com"));
        assert!(!covers("mail.example.com", "example.com"));
    }

    /// Tests the same report ingested twice is stored once.
    ///
    /// Expected: second result is a duplicate without report id, one row stored
    #[tokio::test]
    async fn skips_duplicate_report() -> Result<(), AppError> {
        let test = TestBuilder::new().with_all_tables().build().await.unwrap();
        let db = test.db.as_ref().unwrap();

        let (_, organization, _) = factory::helpers::create_owner_with_organization(db).await?;
        let domain = factory::domain::DomainFactory::new(db, organization.id)
            .name("example.com")
            .build()
            .await?;

        let xml = aggregate_xml("example.com", "r-1");
        let first = ingest_xml(db, organization.id, None, &xml).await?;
        let second = ingest_xml(db, organization.id, None, &xml).await?;

        assert!(!first.duplicate);
        assert!(first.report_id.is_some());
        assert_eq!(first.domain_id, domain.id);
        assert!(second.duplicate);
        assert_eq!(second.report_id, None);
        assert_eq!(entity::prelude::Report::find().count(db).await?, 1);

        let stored = entity::prelude::Domain::find_by_id(domain.id)
            .one(db)
            .await?
            .unwrap();
        assert!(stored.last_report_at.is_some());

        Ok(())
    }

    /// Tests a report resolves to the organization's most specific domain.
    ///
    /// Expected: `mail.example.com` lands on that domain, `www.example.com`
    /// on `example.com`
    #[tokio::test]
    async fn resolves_longest_matching_domain() -> Result<(), AppError> {
        let test = TestBuilder::new().with_all_tables().build().await.unwrap();
        let db = test.db.as_ref().unwrap();

        let (_, organization, _) = factory::helpers::create_owner_with_organization(db).await?;
        let parent = factory::domain::DomainFactory::new(db, organization.id)
            .name("example.com")
            .build()
            .await?;
        let mail = factory::domain::DomainFactory::new(db, organization.id)
            .name("mail.example.com")
            .build()
            .await?;

        let result = ingest_xml(
            db,
            organization.id,
            None,
            &aggregate_xml("mail.example.com", "r-1"),
        )
        .await?;
        assert_eq!(result.domain_id, mail.id);

        let result = ingest_xml(
            db,
            organization.id,
            None,
            &aggregate_xml("www.example.com", "r-2"),
        )
        .await?;
        assert_eq!(result.domain_id, parent.id);

        Ok(())
    }

    /// Tests a report for a domain the organization does not monitor.
    ///
    /// Domains of other organizations are not considered.
    ///
    /// Expected: Err(IngestError::UnknownDomain) and nothing stored
    #[tokio::test]
    async fn rejects_unknown_domain() -> Result<(), AppError> {
        let test = TestBuilder::new().with_all_tables().build().await.unwrap();
        let db = test.db.as_ref().unwrap();

        let (_, organization, _) = factory::helpers::create_owner_with_organization(db).await?;
        factory::domain::DomainFactory::new(db, organization.id)
            .name("example.com")
            .build()
            .await?;
        let other = factory::organization::create_organization(db).await?;
        factory::domain::DomainFactory::new(db, other.id)
            .name("other.org")
            .build()
            .await?;

        let xml = aggregate_xml("other.org", "r-1");
        let result = ingest_xml(db, organization.id, None, &xml).await;

        assert!(matches!(
            result,
            Err(AppError::IngestErr(IngestError::UnknownDomain(ref reported)))
                if reported == "other.org"
        ));
        assert_eq!(entity::prelude::Report::find().count(db).await?, 0);

        Ok(())
    }

    /// Tests an upload to a domain the report does not describe.
    ///
    /// Expected: Err(IngestError::DomainMismatch) for a foreign domain, Ok for
    /// a subdomain of the target
    #[tokio::test]
    async fn rejects_report_for_other_domain_on_upload() -> Result<(), AppError> {
        let test = TestBuilder::new().with_all_tables().build().await.unwrap();
        let db = test.db.as_ref().unwrap();

        let (_, organization, _) = factory::helpers::create_owner_with_organization(db).await?;
        let target = Domain::from_entity(
            factory::domain::DomainFactory::new(db, organization.id)
                .name("example.com")
                .build()
                .await?,
        );
        factory::domain::DomainFactory::new(db, organization.id)
            .name("example.net")
            .build()
            .await?;

        let mismatch = ingest_xml(
            db,
            organization.id,
            Some(&target),
            &aggregate_xml("example.net", "r-1"),
        )
        .await;
        assert!(matches!(
            mismatch,
            Err(AppError::IngestErr(IngestError::DomainMismatch { .. }))
        ));
        assert_eq!(entity::prelude::Report::find().count(db).await?, 0);

        let subdomain = ingest_xml(
            db,
            organization.id,
            Some(&target),
            &aggregate_xml("mail.example.com", "r-2"),
        )
        .await?;
        assert_eq!(subdomain.domain_id, target.id);

        Ok(())
    }
}
