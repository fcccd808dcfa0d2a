//! Monitored domains and their plan limits.

use chrono::{Duration, Utc};
use sea_orm::DatabaseConnection;

use crate::server::{
    data::{
        domain::DomainRepository, organization::OrganizationRepository, report::ReportRepository,
    },
    error::AppError,
    model::domain::{Domain, DomainSummary},
    util::parse::{normalize_domain, pass_rate},
};

/// Window used for the per-domain summary in domain lists.
const SUMMARY_DAYS: i64 = 30;

pub struct DomainService<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> DomainService<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Lists the organization's domains with message totals and pass rate
    /// over the last 30 days.
    pub async fn list(&self, organization_id: i32) -> Result<Vec<DomainSummary>, AppError> {
        let domain_repo = DomainRepository::new(self.db);
        let report_repo = ReportRepository::new(self.db);

        let since = Utc::now() - Duration::days(SUMMARY_DAYS);
        let domains = domain_repo.list_by_organization(organization_id).await?;

        let mut summaries = Vec::with_capacity(domains.len());
        for domain in domains {
            let reports = report_repo.get_since(domain.id, since).await?;
            let (total, passed) = reports
                .iter()
                .fold((0, 0), |(t, p), r| (t + r.total_count, p + r.pass_count));

            summaries.push(DomainSummary {
                domain,
                total_messages: total,
                pass_rate: pass_rate(passed, total),
            });
        }

        Ok(summaries)
    }

    /// Adds a domain to the organization.
    ///
    /// # Returns
    /// - `Ok(Domain)` - Created domain, name lowercased
    /// - `Err(AppError::BadRequest)` - Invalid hostname, duplicate within the
    ///   organization, or plan domain limit reached
    pub async fn create(&self, organization_id: i32, name: &str) -> Result<Domain, AppError> {
        let domain_repo = DomainRepository::new(self.db);

        let Some(name) = normalize_domain(name) else {
            return Err(AppError::BadRequest(format!("'{}' is not a valid domain name", name.trim())));
        };

        let organization = OrganizationRepository::new(self.db)
            .find_by_id(organization_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Organization not found".to_string()))?;

        let count = domain_repo.count_by_organization(organization_id).await?;
        let limit = organization.domain_limit();
        if count >= limit {
            return Err(AppError::BadRequest(format!(
                "The {} plan allows {} domain(s); upgrade to add more",
                organization.effective_plan().as_str(),
                limit
            )));
        }

        if domain_repo
            .find_by_name(organization_id, &name)
            .await?
            .is_some()
        {
            return Err(AppError::BadRequest(format!("Domain '{}' already exists", name)));
        }

        let domain = domain_repo.create(organization_id, name).await?;

        tracing::info!(
            "Added domain {} ({}) to organization {}",
            domain.name,
            domain.id,
            organization_id
        );

        Ok(domain)
    }

    pub async fn delete(&self, domain: &Domain) -> Result<(), AppError> {
        DomainRepository::new(self.db).delete(domain.id).await?;

        tracing::info!(
            "Deleted domain {} ({}) from organization {}",
            domain.name,
            domain.id,
            domain.organization_id
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use test_utils::{builder::TestBuilder, factory};

    use super::*;

    #[tokio::test]
    async fn normalizes_and_rejects_duplicates() -> Result<(), AppError> {
        let test = TestBuilder::new()
            .with_domain_tables()
            .build()
            .await
            .unwrap();
        let db = test.db.as_ref().unwrap();

        let organization = factory::organization::OrganizationFactory::new(db)
            .plan("pro")
            .subscription_status("active")
            .build()
            .await?;

        let service = DomainService::new(db);
        let domain = service.create(organization.id, " Example.COM. ").await?;
        assert_eq!(domain.name, "example.com");

        let duplicate = service.create(organization.id, "example.com").await;
        assert!(matches!(duplicate, Err(AppError::BadRequest(_))));

        let invalid = service.create(organization.id, "not a domain").await;
        assert!(matches!(invalid, Err(AppError::BadRequest(_))));

        Ok(())
    }

    #[tokio::test]
    async fn enforces_plan_domain_limit() -> Result<(), AppError> {
        let test = TestBuilder::new()
            .with_domain_tables()
            .build()
            .await
            .unwrap();
        let db = test.db.as_ref().unwrap();

        let free = factory::organization::create_organization(db).await?;
        let canceled = factory::organization::OrganizationFactory::new(db)
            .plan("pro")
            .subscription_status("canceled")
            .build()
            .await?;

        let service = DomainService::new(db);
        for organization_id in [free.id, canceled.id] {
            service.create(organization_id, "first.example").await?;
            let second = service.create(organization_id, "second.example").await;
            assert!(matches!(second, Err(AppError::BadRequest(_))));
        }

        Ok(())
    }

    #[tokio::test]
    async fn lists_domains_with_recent_pass_rate() -> Result<(), AppError> {
        let test = TestBuilder::new()
            .with_domain_tables()
            .build()
            .await
            .unwrap();
        let db = test.db.as_ref().unwrap();

        let (_, organization, domain) = factory::helpers::create_domain_with_owner(db).await?;
        factory::report::ReportFactory::new(db, domain.id)
            .counts(200, 150)
            .build()
            .await?;

        let summaries = DomainService::new(db).list(organization.id).await?;

        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].total_messages, 200);
        assert_eq!(summaries[0].pass_rate, 75.0);

        Ok(())
    }
}
