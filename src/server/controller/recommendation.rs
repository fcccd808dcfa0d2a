use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use tower_sessions::Session;
use utoipa::IntoParams;

use crate::{
    model::{
        api::ErrorDto,
        recommendation::{AiRecommendationDto, RecommendationDto},
    },
    server::{
        error::AppError,
        middleware::auth::{AccessLevel, AuthGuard},
        service::{ai::AiService, recommendation::RecommendationService},
        state::AppState,
    },
};

/// Tag for grouping recommendation endpoints in OpenAPI documentation
pub static RECOMMENDATION_TAG: &str = "recommendation";

#[derive(Deserialize, IntoParams)]
pub struct AiRecommendationParams {
    /// Ignore the cached answer and ask the model again
    #[serde(default)]
    pub refresh: bool,
}

/// Suggest the next DMARC policy from the domain's report history.
///
/// # Access Control
/// - `OrgView` - Any member of the owning organization
#[utoipa::path(
    get,
    path = "/api/domains/{domain_id}/recommendation",
    tag = RECOMMENDATION_TAG,
    params(
        ("domain_id" = i32, Path, description = "Domain ID")
    ),
    responses(
        (status = 200, description = "Suggested policy with reasons and record", body = RecommendationDto),
        (status = 404, description = "Domain not found", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn get_recommendation(
    State(state): State<AppState>,
    session: Session,
    Path(domain_id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let (_, _, domain) = AuthGuard::new(&state.db, &session)
        .require_domain(domain_id, AccessLevel::View)
        .await?;

    let (input, recommendation) = RecommendationService::new(&state.db, &state.http_client)
        .recommend_for(&domain)
        .await?;

    Ok((StatusCode::OK, Json(recommendation.into_dto(&input))))
}

/// Ask the organization's AI integration for advice on the domain.
///
/// Answers are cached for 24 hours per domain.
///
/// # Access Control
/// - `OrgView` - Any member of the owning organization
///
/// # Returns
/// - `200 OK` - Markdown answer and its HTML rendering
/// - `400 Bad Request` - Integration missing or disabled
/// - `502 Bad Gateway` - The model provider failed
#[utoipa::path(
    get,
    path = "/api/domains/{domain_id}/recommendation/ai",
    tag = RECOMMENDATION_TAG,
    params(
        ("domain_id" = i32, Path, description = "Domain ID"),
        AiRecommendationParams
    ),
    responses(
        (status = 200, description = "AI recommendation", body = AiRecommendationDto),
        (status = 400, description = "AI integration missing or disabled", body = ErrorDto),
        (status = 404, description = "Domain not found", body = ErrorDto),
        (status = 502, description = "Model provider failed", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn get_ai_recommendation(
    State(state): State<AppState>,
    session: Session,
    Path(domain_id): Path<i32>,
    Query(params): Query<AiRecommendationParams>,
) -> Result<impl IntoResponse, AppError> {
    let (_, _, domain) = AuthGuard::new(&state.db, &session)
        .require_domain(domain_id, AccessLevel::View)
        .await?;

    let recommendation = AiService::new(&state.db, &state.http_client)
        .recommend(&domain, params.refresh)
        .await?;

    Ok((StatusCode::OK, Json(recommendation.into_dto())))
}
