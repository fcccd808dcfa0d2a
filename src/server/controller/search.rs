use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use tower_sessions::Session;
use utoipa::IntoParams;

use crate::{
    model::{api::ErrorDto, search::SearchResultsDto},
    server::{
        error::AppError, middleware::auth::AuthGuard, service::search::SearchService,
        state::AppState,
    },
};

/// Tag for grouping search endpoints in OpenAPI documentation
pub static SEARCH_TAG: &str = "search";

#[derive(Deserialize, IntoParams)]
pub struct SearchParams {
    /// Text to search for, at least 2 characters
    #[serde(default)]
    pub q: String,
}

/// Search domains, sources and reports across the user's organizations.
///
/// # Returns
/// - `200 OK` - Up to 10 matches per kind
/// - `400 Bad Request` - Query shorter than 2 characters
/// - `401 Unauthorized` - Not logged in
#[utoipa::path(
    get,
    path = "/api/search",
    tag = SEARCH_TAG,
    params(SearchParams),
    responses(
        (status = 200, description = "Matches grouped by kind", body = SearchResultsDto),
        (status = 400, description = "Query too short", body = ErrorDto),
        (status = 401, description = "Not logged in", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn search(
    State(state): State<AppState>,
    session: Session,
    Query(params): Query<SearchParams>,
) -> Result<impl IntoResponse, AppError> {
    let user = AuthGuard::new(&state.db, &session).require(&[]).await?;

    let results = SearchService::new(&state.db)
        .search(user.id, &params.q)
        .await?;

    Ok((StatusCode::OK, Json(results.into_dto(params.q))))
}
