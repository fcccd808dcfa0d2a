use chrono::Utc;
use sea_orm::{ActiveModelTrait, ActiveValue, DatabaseConnection, DbErr};

use crate::factory::helpers::next_id;

/// Factory for organizations.
///
/// Defaults to the free plan without a subscription.
pub struct OrganizationFactory<'a> {
    db: &'a DatabaseConnection,
    name: String,
    slug: String,
    plan: String,
    subscription_status: String,
    stripe_customer_id: Option<String>,
    stripe_subscription_id: Option<String>,
}

impl<'a> OrganizationFactory<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        let id = next_id();
        Self {
            db,
            name: format!("Organization {}", id),
            slug: format!("organization-{}", id),
            plan: "free".to_string(),
            subscription_status: "none".to_string(),
            stripe_customer_id: None,
            stripe_subscription_id: None,
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn slug(mut self, slug: impl Into<String>) -> Self {
        self.slug = slug.into();
        self
    }

    /// Sets the plan, `"free"`, `"pro"` or `"business"`.
    pub fn plan(mut self, plan: impl Into<String>) -> Self {
        self.plan = plan.into();
        self
    }

    pub fn subscription_status(mut self, status: impl Into<String>) -> Self {
        self.subscription_status = status.into();
        self
    }

    pub fn stripe_customer_id(mut self, customer_id: impl Into<String>) -> Self {
        self.stripe_customer_id = Some(customer_id.into());
        self
    }

    pub fn stripe_subscription_id(mut self, subscription_id: impl Into<String>) -> Self {
        self.stripe_subscription_id = Some(subscription_id.into());
        self
    }

    pub async fn build(self) -> Result<entity::organization::Model, DbErr> {
        entity::organization::ActiveModel {
            name: ActiveValue::Set(self.name),
            slug: ActiveValue::Set(self.slug),
            plan: ActiveValue::Set(self.plan),
            subscription_status: ActiveValue::Set(self.subscription_status),
            stripe_customer_id: ActiveValue::Set(self.stripe_customer_id),
            stripe_subscription_id: ActiveValue::Set(self.stripe_subscription_id),
            created_at: ActiveValue::Set(Utc::now()),
            ..Default::default()
        }
        .insert(self.db)
        .await
    }
}

pub async fn create_organization(
    db: &DatabaseConnection,
) -> Result<entity::organization::Model, DbErr> {
    OrganizationFactory::new(db).build().await
}
