//! Row builders for test data.
//!
//! Each module has a `*Factory` with defaults that can be overridden and a
//! `create_*` shorthand. Factories insert straight through SeaORM and return
//! entity models.
//!
//! ```rust,ignore
//! let user = factory::user::create_user(&db).await?;
//! let organization = factory::organization::OrganizationFactory::new(&db)
//!     .plan("pro")
//!     .build()
//!     .await?;
//! factory::org_member::create_member(&db, organization.id, user.id, "owner").await?;
//! ```

pub mod alert_rule;
pub mod api_key;
pub mod domain;
pub mod gmail_account;
pub mod helpers;
pub mod org_member;
pub mod organization;
pub mod report;
pub mod source;
pub mod user;

pub use domain::create_domain;
pub use org_member::create_member;
pub use organization::create_organization;
pub use report::{create_record, create_report};
pub use source::create_source;
pub use user::create_user;
