use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use tower_sessions::Session;

use crate::{
    model::{
        api::ErrorDto,
        billing::{BillingUrlDto, CheckoutDto},
    },
    server::{
        error::AppError,
        middleware::auth::{AuthGuard, Permission},
        service::{billing::BillingService, organization::OrganizationService},
        state::AppState,
    },
};

/// Tag for grouping billing endpoints in OpenAPI documentation
pub static BILLING_TAG: &str = "billing";

/// Header carrying the Stripe webhook signature
static STRIPE_SIGNATURE_HEADER: &str = "stripe-signature";

/// Start a Stripe Checkout subscribing the organization to a paid plan.
///
/// # Access Control
/// - `OrgOwner` - Owners only
#[utoipa::path(
    post,
    path = "/api/organizations/{org_id}/billing/checkout",
    tag = BILLING_TAG,
    params(
        ("org_id" = i32, Path, description = "Organization ID")
    ),
    request_body = CheckoutDto,
    responses(
        (status = 200, description = "Checkout page URL", body = BillingUrlDto),
        (status = 400, description = "Billing not configured or free plan requested", body = ErrorDto),
        (status = 403, description = "Not an owner", body = ErrorDto),
        (status = 404, description = "Organization not found", body = ErrorDto),
        (status = 502, description = "Stripe request failed", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn create_checkout(
    State(state): State<AppState>,
    session: Session,
    Path(org_id): Path<i32>,
    Json(payload): Json<CheckoutDto>,
) -> Result<impl IntoResponse, AppError> {
    AuthGuard::new(&state.db, &session)
        .require(&[Permission::OrgOwner(org_id)])
        .await?;

    let organization = OrganizationService::new(&state.db).find(org_id).await?;

    let url = billing_service(&state)
        .checkout(&organization, payload.plan)
        .await?;

    Ok((StatusCode::OK, Json(BillingUrlDto { url })))
}

/// Open the Stripe customer portal for the organization.
///
/// # Access Control
/// - `OrgOwner` - Owners only
#[utoipa::path(
    post,
    path = "/api/organizations/{org_id}/billing/portal",
    tag = BILLING_TAG,
    params(
        ("org_id" = i32, Path, description = "Organization ID")
    ),
    responses(
        (status = 200, description = "Customer portal URL", body = BillingUrlDto),
        (status = 400, description = "Billing not configured or no subscription yet", body = ErrorDto),
        (status = 403, description = "Not an owner", body = ErrorDto),
        (status = 404, description = "Organization not found", body = ErrorDto),
        (status = 502, description = "Stripe request failed", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn create_portal(
    State(state): State<AppState>,
    session: Session,
    Path(org_id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    AuthGuard::new(&state.db, &session)
        .require(&[Permission::OrgOwner(org_id)])
        .await?;

    let organization = OrganizationService::new(&state.db).find(org_id).await?;

    let url = billing_service(&state).portal(&organization).await?;

    Ok((StatusCode::OK, Json(BillingUrlDto { url })))
}

/// Receive subscription events from Stripe.
///
/// # Access Control
/// - Valid `Stripe-Signature` header
#[utoipa::path(
    post,
    path = "/api/billing/webhook",
    tag = BILLING_TAG,
    request_body(content = String, content_type = "application/json"),
    responses(
        (status = 200, description = "Event handled or ignored"),
        (status = 400, description = "Invalid signature or payload", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn stripe_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, AppError> {
    let signature = headers
        .get(STRIPE_SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::BadRequest("Missing Stripe-Signature header".to_string()))?;

    billing_service(&state)
        .handle_webhook(signature, &body)
        .await?;

    Ok(StatusCode::OK)
}

fn billing_service(state: &AppState) -> BillingService<'_> {
    BillingService::new(
        &state.db,
        &state.http_client,
        state.stripe.as_ref(),
        &state.app_url,
    )
}
