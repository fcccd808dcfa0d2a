use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, ToSchema)]
pub struct SearchHitDto {
    pub id: i32,
    pub organization_id: i32,
    pub domain_id: Option<i32>,
    pub title: String,
    pub subtitle: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, ToSchema)]
pub struct SearchResultsDto {
    pub query: String,
    pub domains: Vec<SearchHitDto>,
    pub sources: Vec<SearchHitDto>,
    pub reports: Vec<SearchHitDto>,
}
