use axum::http::{header::AUTHORIZATION, HeaderMap, HeaderValue};
use chrono::Utc;
use sea_orm::EntityTrait;
use test_utils::{builder::TestBuilder, factory};

use crate::server::{
    error::{auth::AuthError, AppError},
    middleware::api_key::ApiKeyGuard,
    service::api_key::hash_key,
};

fn bearer(key: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {}", key)).unwrap(),
    );
    headers
}

/// Tests an active key resolves to its organization and records its use.
///
/// Expected: Ok(ApiKey) with `last_used_at` set
#[tokio::test]
async fn authenticates_active_key() -> Result<(), AppError> {
    let test = TestBuilder::new()
        .with_all_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let (owner, organization, _) = factory::helpers::create_owner_with_organization(db).await?;
    let key = "dmarc_activekey0000000000000000000000000000";
    factory::api_key::create_api_key(db, organization.id, owner.id, hash_key(key), None).await?;

    let guard = ApiKeyGuard::new(db);
    let api_key = guard.authenticate(&bearer(key)).await?;

    assert_eq!(api_key.organization_id, organization.id);

    let stored = entity::prelude::ApiKey::find_by_id(api_key.id)
        .one(db)
        .await?
        .unwrap();
    assert!(stored.last_used_at.is_some());

    Ok(())
}

/// Tests revoked, unknown and missing keys are all rejected the same way.
///
/// Expected: Err(AuthError::InvalidApiKey)
#[tokio::test]
async fn rejects_revoked_unknown_and_missing_keys() -> Result<(), AppError> {
    let test = TestBuilder::new()
        .with_all_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let (owner, organization, _) = factory::helpers::create_owner_with_organization(db).await?;
    let revoked = "dmarc_revokedkey000000000000000000000000000";
    factory::api_key::create_api_key(
        db,
        organization.id,
        owner.id,
        hash_key(revoked),
        Some(Utc::now()),
    )
    .await?;

    let guard = ApiKeyGuard::new(db);

    for headers in [
        bearer(revoked),
        bearer("dmarc_unknownkey000000000000000000000000000"),
        HeaderMap::new(),
    ] {
        let result = guard.authenticate(&headers).await;
        assert!(matches!(
            result,
            Err(AppError::AuthErr(AuthError::InvalidApiKey))
        ));
    }

    Ok(())
}
