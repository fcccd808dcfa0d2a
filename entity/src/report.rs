use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "report")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub domain_id: i32,
    /// Reporting organization, e.g. "google.com"
    pub org_name: String,
    pub reporter_email: Option<String>,
    /// Report identifier assigned by the reporter
    pub report_id: String,
    pub date_begin: DateTimeUtc,
    pub date_end: DateTimeUtc,
    pub policy_domain: String,
    pub policy_p: String,
    pub policy_sp: Option<String>,
    pub policy_pct: Option<i32>,
    pub policy_adkim: Option<String>,
    pub policy_aspf: Option<String>,
    pub total_count: i64,
    pub pass_count: i64,
    pub fail_count: i64,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::domain::Entity",
        from = "Column::DomainId",
        to = "super::domain::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Domain,
    #[sea_orm(has_many = "super::record::Entity")]
    Record,
}

impl Related<super::domain::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Domain.def()
    }
}

impl Related<super::record::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Record.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
