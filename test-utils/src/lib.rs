//! DMARC Analyser Test Utils
//!
//! Shared helpers for repository, service and guard tests. Tests run against
//! an in-memory SQLite database whose tables are created straight from the
//! entity definitions, so no migrations are involved.
//!
//! # Overview
//!
//! - **TestBuilder**: Fluent builder choosing which tables to create
//! - **TestContext**: Lazily created database connection and session
//! - **TestError**: Errors raised while setting up a test
//! - **factory**: Row builders with sensible defaults
//!
//! # Usage
//!
//! ```rust,ignore
//! use test_utils::{builder::TestBuilder, factory};
//!
//! #[tokio::test]
//! async fn lists_domains() -> Result<(), TestError> {
//!     let test = TestBuilder::new().with_domain_tables().build().await?;
//!     let db = test.db.as_ref().unwrap();
//!
//!     let (_, organization, _) = factory::helpers::create_owner_with_organization(db).await?;
//!     let domain = factory::domain::create_domain(db, organization.id).await?;
//!
//!     Ok(())
//! }
//! ```

pub mod builder;
pub mod context;
pub mod error;
pub mod factory;
