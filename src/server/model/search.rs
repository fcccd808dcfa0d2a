use crate::model::search::{SearchHitDto, SearchResultsDto};

#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub id: i32,
    pub organization_id: i32,
    pub domain_id: Option<i32>,
    pub title: String,
    pub subtitle: Option<String>,
}

impl SearchHit {
    pub fn into_dto(self) -> SearchHitDto {
        SearchHitDto {
            id: self.id,
            organization_id: self.organization_id,
            domain_id: self.domain_id,
            title: self.title,
            subtitle: self.subtitle,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SearchResults {
    pub domains: Vec<SearchHit>,
    pub sources: Vec<SearchHit>,
    pub reports: Vec<SearchHit>,
}

impl SearchResults {
    pub fn into_dto(self, query: String) -> SearchResultsDto {
        SearchResultsDto {
            query,
            domains: self.domains.into_iter().map(SearchHit::into_dto).collect(),
            sources: self.sources.into_iter().map(SearchHit::into_dto).collect(),
            reports: self.reports.into_iter().map(SearchHit::into_dto).collect(),
        }
    }
}
