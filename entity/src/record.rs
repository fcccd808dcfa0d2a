use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "record")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub report_id: i32,
    pub source_ip: String,
    pub count: i64,
    pub disposition: String,
    /// Policy-evaluated DKIM result ("pass" / "fail")
    pub dkim: String,
    /// Policy-evaluated SPF result ("pass" / "fail")
    pub spf: String,
    pub header_from: String,
    pub envelope_from: Option<String>,
    pub dkim_domain: Option<String>,
    pub dkim_result: Option<String>,
    pub spf_domain: Option<String>,
    pub spf_result: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::report::Entity",
        from = "Column::ReportId",
        to = "super::report::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Report,
}

impl Related<super::report::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Report.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
