use entity::prelude::*;
use sea_orm::{sea_query::TableCreateStatement, EntityTrait, Schema};

use crate::{context::TestContext, error::TestError};

/// Builder for test contexts backed by an in-memory SQLite database.
///
/// Add the tables a test touches, then call `build()`. Tables are created in
/// the order they were added, so referenced tables go first.
///
/// # Example
///
/// ```rust,ignore
/// let test = TestBuilder::new()
///     .with_table(User)
///     .with_table(Organization)
///     .build()
///     .await?;
/// ```
pub struct TestBuilder {
    tables: Vec<TableCreateStatement>,
}

impl Default for TestBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TestBuilder {
    pub fn new() -> Self {
        Self { tables: Vec::new() }
    }

    /// Adds the table of `entity` to the schema.
    ///
    /// # Arguments
    /// - `entity` - SeaORM entity to generate a CREATE TABLE statement for
    ///
    /// # Returns
    /// - `Self` - Builder instance for method chaining
    pub fn with_table<E: EntityTrait>(mut self, entity: E) -> Self {
        let schema = Schema::new(sea_orm::DbBackend::Sqlite);
        self.tables.push(schema.create_table_from_entity(entity));
        self
    }

    /// Adds users, organizations, memberships and invitations.
    pub fn with_organization_tables(self) -> Self {
        self.with_table(User)
            .with_table(Organization)
            .with_table(OrgMember)
            .with_table(Invitation)
    }

    /// Adds the organization tables plus domains and everything stored per domain.
    ///
    /// Covers report ingestion, statistics, sources and known senders.
    pub fn with_domain_tables(self) -> Self {
        self.with_organization_tables()
            .with_table(KnownSender)
            .with_table(Domain)
            .with_table(Report)
            .with_table(Record)
            .with_table(ForensicReport)
            .with_table(Source)
    }

    /// Adds every table of the application.
    pub fn with_all_tables(self) -> Self {
        self.with_domain_tables()
            .with_table(AlertRule)
            .with_table(Alert)
            .with_table(ApiKey)
            .with_table(ScheduledReport)
            .with_table(GmailAccount)
            .with_table(AiIntegration)
            .with_table(AiRecommendationCache)
    }

    /// Connects to a fresh in-memory database and creates the configured tables.
    ///
    /// # Returns
    /// - `Ok(TestContext)` - Context with the database ready
    /// - `Err(TestError::Database)` - Connection or table creation failed
    pub async fn build(self) -> Result<TestContext, TestError> {
        let mut context = TestContext::new();

        context.with_tables(self.tables).await?;

        Ok(context)
    }
}
