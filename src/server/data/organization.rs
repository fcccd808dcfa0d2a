use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, TransactionTrait,
};

use crate::{
    model::organization::{OrgRole, Plan, SubscriptionStatus},
    server::{
        model::organization::{Organization, OrganizationWithRole, UpdateBillingParams},
        util::parse::parse_column,
    },
};

pub struct OrganizationRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> OrganizationRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates an organization on the free plan and makes `owner_id` its owner.
    ///
    /// Both rows are written in one transaction.
    pub async fn create(
        &self,
        name: String,
        slug: String,
        owner_id: i32,
    ) -> Result<Organization, DbErr> {
        let now = Utc::now();
        let txn = self.db.begin().await?;

        let organization = entity::organization::ActiveModel {
            name: ActiveValue::Set(name),
            slug: ActiveValue::Set(slug),
            plan: ActiveValue::Set(Plan::Free.as_str().to_string()),
            subscription_status: ActiveValue::Set(SubscriptionStatus::None.as_str().to_string()),
            created_at: ActiveValue::Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        entity::org_member::ActiveModel {
            organization_id: ActiveValue::Set(organization.id),
            user_id: ActiveValue::Set(owner_id),
            role: ActiveValue::Set(OrgRole::Owner.as_str().to_string()),
            created_at: ActiveValue::Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;

        to_domain(organization)
    }

    pub async fn find_by_id(&self, id: i32) -> Result<Option<Organization>, DbErr> {
        entity::prelude::Organization::find_by_id(id)
            .one(self.db)
            .await?
            .map(to_domain)
            .transpose()
    }

    pub async fn slug_exists(&self, slug: &str) -> Result<bool, DbErr> {
        let count = entity::prelude::Organization::find()
            .filter(entity::organization::Column::Slug.eq(slug))
            .count(self.db)
            .await?;

        Ok(count > 0)
    }

    pub async fn find_by_stripe_customer(
        &self,
        customer_id: &str,
    ) -> Result<Option<Organization>, DbErr> {
        entity::prelude::Organization::find()
            .filter(entity::organization::Column::StripeCustomerId.eq(customer_id))
            .one(self.db)
            .await?
            .map(to_domain)
            .transpose()
    }

    /// Lists the organizations a user belongs to with their role and domain count.
    ///
    /// Ordered by organization name.
    pub async fn list_for_user(&self, user_id: i32) -> Result<Vec<OrganizationWithRole>, DbErr> {
        let rows = entity::prelude::OrgMember::find()
            .filter(entity::org_member::Column::UserId.eq(user_id))
            .find_also_related(entity::prelude::Organization)
            .order_by_asc(entity::organization::Column::Name)
            .all(self.db)
            .await?;

        let mut result = Vec::with_capacity(rows.len());
        for (membership, organization) in rows {
            let Some(organization) = organization else {
                continue;
            };
            let domain_count = entity::prelude::Domain::find()
                .filter(entity::domain::Column::OrganizationId.eq(organization.id))
                .count(self.db)
                .await?;
            let role: OrgRole = parse_column("org_member.role", &membership.role)
                .map_err(|e| DbErr::Custom(e.to_string()))?;

            result.push(OrganizationWithRole {
                organization: to_domain(organization)?,
                role,
                domain_count,
            });
        }

        Ok(result)
    }

    pub async fn rename(&self, id: i32, name: String) -> Result<Organization, DbErr> {
        let organization = entity::organization::ActiveModel {
            id: ActiveValue::Unchanged(id),
            name: ActiveValue::Set(name),
            ..Default::default()
        }
        .update(self.db)
        .await?;

        to_domain(organization)
    }

    /// Writes billing fields; `None` fields are left as stored.
    pub async fn update_billing(
        &self,
        id: i32,
        params: UpdateBillingParams,
    ) -> Result<Organization, DbErr> {
        let mut active = entity::organization::ActiveModel {
            id: ActiveValue::Unchanged(id),
            ..Default::default()
        };
        if let Some(plan) = params.plan {
            active.plan = ActiveValue::Set(plan.as_str().to_string());
        }
        if let Some(status) = params.subscription_status {
            active.subscription_status = ActiveValue::Set(status.as_str().to_string());
        }
        if let Some(customer_id) = params.stripe_customer_id {
            active.stripe_customer_id = ActiveValue::Set(Some(customer_id));
        }
        if let Some(subscription_id) = params.stripe_subscription_id {
            active.stripe_subscription_id = ActiveValue::Set(Some(subscription_id));
        }

        if !active.is_changed() {
            return self
                .find_by_id(id)
                .await?
                .ok_or(DbErr::RecordNotFound(format!("Organization {} not found", id)));
        }

        to_domain(active.update(self.db).await?)
    }

    /// Deletes an organization; domains, reports and all other owned rows cascade.
    pub async fn delete(&self, id: i32) -> Result<(), DbErr> {
        entity::prelude::Organization::delete_by_id(id)
            .exec(self.db)
            .await?;

        Ok(())
    }
}

fn to_domain(entity: entity::organization::Model) -> Result<Organization, DbErr> {
    Organization::from_entity(entity).map_err(|e| DbErr::Custom(e.to_string()))
}
