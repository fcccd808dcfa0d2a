use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use tower_sessions::Session;

use crate::{
    model::{api::ErrorDto, pagination::PageDto, source::SourceDto},
    server::{
        controller::PaginationParams,
        error::AppError,
        middleware::auth::{AccessLevel, AuthGuard},
        service::source::SourceService,
        state::AppState,
    },
};

/// Tag for grouping sending source endpoints in OpenAPI documentation
pub static SOURCE_TAG: &str = "source";

/// Get a page of the IPs that sent mail for a domain, by descending volume.
///
/// # Access Control
/// - `OrgView` - Any member of the owning organization
#[utoipa::path(
    get,
    path = "/api/domains/{domain_id}/sources",
    tag = SOURCE_TAG,
    params(
        ("domain_id" = i32, Path, description = "Domain ID"),
        PaginationParams
    ),
    responses(
        (status = 200, description = "Page of sources with known sender names", body = PageDto<SourceDto>),
        (status = 404, description = "Domain not found", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn list_sources(
    State(state): State<AppState>,
    session: Session,
    Path(domain_id): Path<i32>,
    Query(params): Query<PaginationParams>,
) -> Result<impl IntoResponse, AppError> {
    AuthGuard::new(&state.db, &session)
        .require_domain(domain_id, AccessLevel::View)
        .await?;

    let sources = SourceService::new(&state.db)
        .list(domain_id, params.page, params.per_page())
        .await?;

    Ok((StatusCode::OK, Json(sources.into_dto(|s| s.into_dto()))))
}
