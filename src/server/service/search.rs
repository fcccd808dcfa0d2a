use sea_orm::DatabaseConnection;

use crate::server::{
    data::{
        domain::DomainRepository, org_member::OrgMemberRepository, report::ReportRepository,
        source::SourceRepository,
    },
    error::AppError,
    model::search::{SearchHit, SearchResults},
};

const MIN_QUERY_LENGTH: usize = 2;
const RESULTS_PER_KIND: u64 = 10;

pub struct SearchService<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> SearchService<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Searches domains, sources and reports across the user's organizations.
    ///
    /// # Arguments
    /// - `user_id` - Searching user; only their organizations are searched
    /// - `query` - Substring to look for, at least two characters after trimming
    ///
    /// # Returns
    /// - `Ok(SearchResults)` - Up to ten hits per kind
    /// - `Err(AppError::BadRequest)` - Query too short
    pub async fn search(&self, user_id: i32, query: &str) -> Result<SearchResults, AppError> {
        let query = query.trim();
        if query.chars().count() < MIN_QUERY_LENGTH {
            return Err(AppError::BadRequest(format!(
                "Search query must be at least {} characters",
                MIN_QUERY_LENGTH
            )));
        }

        let organization_ids = OrgMemberRepository::new(self.db)
            .organization_ids_for_user(user_id)
            .await?;
        if organization_ids.is_empty() {
            return Ok(SearchResults::default());
        }

        let domains = DomainRepository::new(self.db)
            .search(&organization_ids, query, RESULTS_PER_KIND)
            .await?
            .into_iter()
            .map(|d| SearchHit {
                id: d.id,
                organization_id: d.organization_id,
                domain_id: Some(d.id),
                title: d.name,
                subtitle: None,
            })
            .collect();
        let sources = SourceRepository::new(self.db)
            .search(&organization_ids, query, RESULTS_PER_KIND)
            .await?;
        let reports = ReportRepository::new(self.db)
            .search(&organization_ids, query, RESULTS_PER_KIND)
            .await?;

        Ok(SearchResults {
            domains,
            sources,
            reports,
        })
    }
}
