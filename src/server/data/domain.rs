use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
};

use crate::server::model::domain::Domain;

pub struct DomainRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> DomainRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn create(&self, organization_id: i32, name: String) -> Result<Domain, DbErr> {
        let domain = entity::domain::ActiveModel {
            organization_id: ActiveValue::Set(organization_id),
            name: ActiveValue::Set(name),
            created_at: ActiveValue::Set(Utc::now()),
            last_report_at: ActiveValue::Set(None),
            ..Default::default()
        }
        .insert(self.db)
        .await?;

        Ok(Domain::from_entity(domain))
    }

    pub async fn find_by_id(&self, id: i32) -> Result<Option<Domain>, DbErr> {
        let domain = entity::prelude::Domain::find_by_id(id).one(self.db).await?;

        Ok(domain.map(Domain::from_entity))
    }

    pub async fn find_by_name(
        &self,
        organization_id: i32,
        name: &str,
    ) -> Result<Option<Domain>, DbErr> {
        let domain = entity::prelude::Domain::find()
            .filter(entity::domain::Column::OrganizationId.eq(organization_id))
            .filter(entity::domain::Column::Name.eq(name))
            .one(self.db)
            .await?;

        Ok(domain.map(Domain::from_entity))
    }

    /// Lists an organization's domains ordered by name.
    pub async fn list_by_organization(&self, organization_id: i32) -> Result<Vec<Domain>, DbErr> {
        let domains = entity::prelude::Domain::find()
            .filter(entity::domain::Column::OrganizationId.eq(organization_id))
            .order_by_asc(entity::domain::Column::Name)
            .all(self.db)
            .await?;

        Ok(domains.into_iter().map(Domain::from_entity).collect())
    }

    pub async fn count_by_organization(&self, organization_id: i32) -> Result<u64, DbErr> {
        entity::prelude::Domain::find()
            .filter(entity::domain::Column::OrganizationId.eq(organization_id))
            .count(self.db)
            .await
    }

    /// Deletes a domain; reports, records and sources cascade.
    pub async fn delete(&self, id: i32) -> Result<(), DbErr> {
        entity::prelude::Domain::delete_by_id(id).exec(self.db).await?;

        Ok(())
    }

    /// Domains of the given organizations whose name contains `query`.
    pub async fn search(
        &self,
        organization_ids: &[i32],
        query: &str,
        limit: u64,
    ) -> Result<Vec<Domain>, DbErr> {
        let domains = entity::prelude::Domain::find()
            .filter(entity::domain::Column::OrganizationId.is_in(organization_ids.to_vec()))
            .filter(entity::domain::Column::Name.contains(query))
            .order_by_asc(entity::domain::Column::Name)
            .limit(limit)
            .all(self.db)
            .await?;

        Ok(domains.into_iter().map(Domain::from_entity).collect())
    }
}
