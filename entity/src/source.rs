use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "source")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub domain_id: i32,
    pub ip: String,
    pub hostname: Option<String>,
    pub country: Option<String>,
    pub city: Option<String>,
    pub isp: Option<String>,
    pub known_sender_id: Option<i32>,
    pub total_count: i64,
    pub pass_count: i64,
    pub first_seen: DateTimeUtc,
    pub last_seen: DateTimeUtc,
    pub geo_checked_at: Option<DateTimeUtc>,
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
    #[sea_orm(
        belongs_to = "super::known_sender::Entity",
        from = "Column::KnownSenderId",
        to = "super::known_sender::Column::Id",
        on_update = "Cascade",
        on_delete = "SetNull"
    )]
    KnownSender,
}

impl Related<super::domain::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Domain.def()
    }
}

impl Related<super::known_sender::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::KnownSender.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
