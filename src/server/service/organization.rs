//! Organization lifecycle: creation with a unique slug, renaming and deletion.

use sea_orm::DatabaseConnection;

use crate::{
    model::organization::OrgRole,
    server::{
        data::{domain::DomainRepository, organization::OrganizationRepository},
        error::AppError,
        model::organization::{Organization, OrganizationWithRole},
        util::parse::slugify,
    },
};

pub struct OrganizationService<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> OrganizationService<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Lists the organizations the user belongs to.
    pub async fn list_for_user(&self, user_id: i32) -> Result<Vec<OrganizationWithRole>, AppError> {
        let repo = OrganizationRepository::new(self.db);

        Ok(repo.list_for_user(user_id).await?)
    }

    /// Creates an organization and makes `user_id` its owner.
    ///
    /// The slug is derived from the name; `-2`, `-3`, ... is appended until
    /// it is unused.
    ///
    /// # Returns
    /// - `Ok(OrganizationWithRole)` - New organization with the owner role
    /// - `Err(AppError::BadRequest)` - Name is blank
    pub async fn create(&self, user_id: i32, name: String) -> Result<OrganizationWithRole, AppError> {
        let name = name.trim().to_string();
        if name.is_empty() {
            return Err(AppError::BadRequest("Organization name is required".to_string()));
        }

        let base = slugify(&name);
        let mut slug = base.clone();
        let mut suffix = 2;
        while OrganizationRepository::new(self.db).slug_exists(&slug).await? {
            slug = format!("{}-{}", base, suffix);
            suffix += 1;
        }

        let organization = OrganizationRepository::new(self.db)
            .create(name, slug, user_id)
            .await?;

        tracing::info!(
            "User {} created organization {} ({})",
            user_id,
            organization.id,
            organization.slug
        );

        Ok(OrganizationWithRole {
            organization,
            role: OrgRole::Owner,
            domain_count: 0,
        })
    }

    /// Gets an organization with the caller's role and its domain count.
    pub async fn get(
        &self,
        organization_id: i32,
        role: OrgRole,
    ) -> Result<OrganizationWithRole, AppError> {
        let organization = self.find(organization_id).await?;
        let domain_count = DomainRepository::new(self.db)
            .count_by_organization(organization_id)
            .await?;

        Ok(OrganizationWithRole {
            organization,
            role,
            domain_count,
        })
    }

    pub async fn rename(
        &self,
        organization_id: i32,
        role: OrgRole,
        name: String,
    ) -> Result<OrganizationWithRole, AppError> {
        let name = name.trim().to_string();
        if name.is_empty() {
            return Err(AppError::BadRequest("Organization name is required".to_string()));
        }

        OrganizationRepository::new(self.db)
            .rename(organization_id, name)
            .await?;

        self.get(organization_id, role).await
    }

    /// Deletes an organization; domains, reports and memberships cascade.
    pub async fn delete(&self, organization_id: i32) -> Result<(), AppError> {
        OrganizationRepository::new(self.db)
            .delete(organization_id)
            .await?;

        tracing::info!("Deleted organization {}", organization_id);

        Ok(())
    }

    pub async fn find(&self, organization_id: i32) -> Result<Organization, AppError> {
        OrganizationRepository::new(self.db)
            .find_by_id(organization_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Organization not found".to_string()))
    }
}
