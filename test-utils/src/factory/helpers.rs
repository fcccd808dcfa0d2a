//! Shared helpers for factories.

use sea_orm::{DatabaseConnection, DbErr};

use crate::factory;

static COUNTER: std::sync::atomic::AtomicU64 = std::sync::atomic::AtomicU64::new(1);

/// Next value of a process-wide counter, used to keep unique columns unique.
pub fn next_id() -> u64 {
    COUNTER.fetch_add(1, std::sync::atomic::Ordering::SeqCst)
}

/// Creates a user who owns a new organization.
///
/// # Returns
/// - `Ok((user, organization, membership))` - Created rows
pub async fn create_owner_with_organization(
    db: &DatabaseConnection,
) -> Result<
    (
        entity::user::Model,
        entity::organization::Model,
        entity::org_member::Model,
    ),
    DbErr,
> {
    let user = factory::user::create_user(db).await?;
    let organization = factory::organization::create_organization(db).await?;
    let membership = factory::org_member::create_member(db, organization.id, user.id, "owner").await?;

    Ok((user, organization, membership))
}

/// Creates an organization, its owner and one domain.
///
/// # Returns
/// - `Ok((user, organization, domain))` - Created rows
pub async fn create_domain_with_owner(
    db: &DatabaseConnection,
) -> Result<
    (
        entity::user::Model,
        entity::organization::Model,
        entity::domain::Model,
    ),
    DbErr,
> {
    let (user, organization, _) = create_owner_with_organization(db).await?;
    let domain = factory::domain::create_domain(db, organization.id).await?;

    Ok((user, organization, domain))
}
