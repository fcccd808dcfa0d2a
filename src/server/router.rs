//! Route table and OpenAPI documentation.
//!
//! Handlers are registered through `utoipa-axum` so that every route also
//! lands in the OpenAPI document served by Swagger UI at `/api/docs`.

use std::time::Duration;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    Router,
};
use tower_governor::{
    governor::GovernorConfigBuilder, key_extractor::SmartIpKeyExtractor, GovernorLayer,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_axum::{router::OpenApiRouter, routes};
use utoipa_swagger_ui::SwaggerUi;

use crate::server::{
    controller::{
        ai, alert, api_key, auth, billing, domain, gmail, known_sender, member, organization,
        recommendation, report, scheduled_report, search, source, stats,
    },
    error::AppError,
    service::ingest::decode::MAX_REPORT_SIZE,
    state::AppState,
};

/// Interval after which each client IP regains one `/api/ingest` request,
/// two requests per second.
const INGEST_REPLENISH_PERIOD: Duration = Duration::from_millis(500);
/// Requests a client may burst on `/api/ingest` before being limited.
const INGEST_BURST: u32 = 10;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "DMARC Analyser API",
        description = "Multi-tenant DMARC report ingestion and analysis"
    ),
    modifiers(&SecurityAddon)
)]
struct ApiDoc;

/// Registers the bearer scheme used by API key authenticated endpoints.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_key",
            SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).build()),
        );
    }
}

/// Builds the application router.
///
/// # Arguments
/// - `app_url` - Origin of the web application, the only origin allowed by CORS
///
/// # Returns
/// - `Ok(Router)` - Router awaiting its `AppState`
/// - `Err(AppError::InternalError)` - Invalid origin or rate limit configuration
pub fn router(app_url: &str) -> Result<Router<AppState>, AppError> {
    let (api_router, api) = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .merge(session_routes())
        .merge(upload_routes())
        .merge(ingest_routes()?)
        .split_for_parts();

    let origin = HeaderValue::from_str(app_url.trim_end_matches('/'))
        .map_err(|e| AppError::InternalError(format!("Invalid APP_URL for CORS: {}", e)))?;

    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true);

    let router = api_router
        .merge(SwaggerUi::new("/api/docs").url("/api/docs/openapi.json", api))
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    Ok(router)
}

/// Session authenticated JSON endpoints.
fn session_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        // Authentication
        .routes(routes!(auth::login))
        .routes(routes!(auth::callback))
        .routes(routes!(auth::logout))
        .routes(routes!(auth::get_user))
        // Organizations, members and invitations
        .routes(routes!(
            organization::list_organizations,
            organization::create_organization
        ))
        .routes(routes!(
            organization::get_organization,
            organization::update_organization,
            organization::delete_organization
        ))
        .routes(routes!(member::list_members))
        .routes(routes!(member::update_member, member::remove_member))
        .routes(routes!(member::create_invitation, member::list_invitations))
        .routes(routes!(member::revoke_invitation))
        .routes(routes!(member::accept_invitation))
        // Domains and their data
        .routes(routes!(domain::list_domains, domain::create_domain))
        .routes(routes!(domain::get_domain, domain::delete_domain))
        .routes(routes!(domain::check_dns))
        .routes(routes!(report::get_report, report::delete_report))
        .routes(routes!(report::list_forensic_reports))
        .routes(routes!(stats::get_overview))
        .routes(routes!(stats::get_timeline))
        .routes(routes!(stats::export_records))
        .routes(routes!(source::list_sources))
        .routes(routes!(
            known_sender::list_known_senders,
            known_sender::create_known_sender
        ))
        .routes(routes!(known_sender::delete_known_sender))
        // Recommendations
        .routes(routes!(recommendation::get_recommendation))
        .routes(routes!(recommendation::get_ai_recommendation))
        .routes(routes!(
            ai::get_ai_integration,
            ai::upsert_ai_integration,
            ai::delete_ai_integration
        ))
        // Alerts
        .routes(routes!(alert::list_alerts))
        .routes(routes!(alert::mark_alert_read))
        .routes(routes!(alert::mark_all_alerts_read))
        .routes(routes!(alert::list_alert_rules, alert::create_alert_rule))
        .routes(routes!(alert::update_alert_rule, alert::delete_alert_rule))
        // Organization integrations
        .routes(routes!(api_key::list_api_keys, api_key::create_api_key))
        .routes(routes!(api_key::revoke_api_key))
        .routes(routes!(
            scheduled_report::list_scheduled_reports,
            scheduled_report::create_scheduled_report
        ))
        .routes(routes!(
            scheduled_report::update_scheduled_report,
            scheduled_report::delete_scheduled_report
        ))
        .routes(routes!(gmail::connect_gmail))
        .routes(routes!(gmail::gmail_callback))
        .routes(routes!(gmail::list_gmail_accounts))
        .routes(routes!(gmail::delete_gmail_account))
        .routes(routes!(gmail::sync_gmail_account))
        // Billing
        .routes(routes!(billing::create_checkout))
        .routes(routes!(billing::create_portal))
        .routes(routes!(billing::stripe_webhook))
        // Search
        .routes(routes!(search::search))
}

/// Report listing and upload, accepting bodies up to the report size cap.
fn upload_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(report::list_reports, report::upload_report))
        .layer(DefaultBodyLimit::max(MAX_REPORT_SIZE))
}

/// Machine ingestion, rate limited per client IP.
fn ingest_routes() -> Result<OpenApiRouter<AppState>, AppError> {
    let governor_conf = GovernorConfigBuilder::default()
        .key_extractor(SmartIpKeyExtractor)
        .period(INGEST_REPLENISH_PERIOD)
        .burst_size(INGEST_BURST)
        .finish()
        .ok_or_else(|| AppError::InternalError("Invalid ingest rate limit".to_string()))?;

    Ok(OpenApiRouter::new()
        .routes(routes!(report::ingest_report))
        .layer(DefaultBodyLimit::max(MAX_REPORT_SIZE))
        .layer(GovernorLayer::new(governor_conf)))
}

#[cfg(test)]
mod tests {
    use std::net::{IpAddr, Ipv4Addr};

    use super::*;

    /// Tests the ingest limit allows the burst, then two requests per second.
    ///
    /// Expected: burst accepted, next request refused, one more accepted after
    /// a single replenish period
    #[tokio::test]
    async fn ingest_limit_replenishes_twice_per_second() {
        let config = GovernorConfigBuilder::default()
            .key_extractor(SmartIpKeyExtractor)
            .period(INGEST_REPLENISH_PERIOD)
            .burst_size(INGEST_BURST)
            .finish()
            .unwrap();
        let limiter = config.limiter();
        let ip = IpAddr::V4(Ipv4Addr::new(192, 0, 2, 1));

        for _ in 0..INGEST_BURST {
            assert!(limiter.check_key(&ip).is_ok());
        }
        assert!(limiter.check_key(&ip).is_err());

        tokio::time::sleep(INGEST_REPLENISH_PERIOD + Duration::from_millis(100)).await;

        assert!(limiter.check_key(&ip).is_ok());
        assert!(limiter.check_key(&ip).is_err());
        assert_eq!(Duration::from_secs(1).as_millis() / INGEST_REPLENISH_PERIOD.as_millis(), 2);
    }
}
