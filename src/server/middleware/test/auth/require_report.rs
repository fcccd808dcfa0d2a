use super::*;

/// Tests the owner can open a report of their domain.
///
/// Expected: Ok((User, Report, Domain))
#[tokio::test]
async fn grants_report_access_to_owner() -> Result<(), AppError> {
    let mut test = TestBuilder::new()
        .with_domain_tables()
        .build()
        .await
        .unwrap();
    let (db, session) = test.db_and_session().await.unwrap();

    let (owner, _, domain) = factory::helpers::create_domain_with_owner(db).await?;
    let report = factory::report::create_report(db, domain.id).await?;
    AuthSession::new(session).set_user_id(owner.id).await?;

    let auth_guard = AuthGuard::new(db, session);
    let (_, returned_report, returned_domain) = auth_guard
        .require_report(report.id, AccessLevel::Manage)
        .await?;

    assert_eq!(returned_report.id, report.id);
    assert_eq!(returned_domain.id, domain.id);

    Ok(())
}

/// Tests reports of other tenants and unknown reports both give not found.
///
/// Expected: Err(AppError::NotFound) in both cases
#[tokio::test]
async fn hides_foreign_and_missing_reports() -> Result<(), AppError> {
    let mut test = TestBuilder::new()
        .with_domain_tables()
        .build()
        .await
        .unwrap();
    let (db, session) = test.db_and_session().await.unwrap();

    let (_, _, domain) = factory::helpers::create_domain_with_owner(db).await?;
    let report = factory::report::create_report(db, domain.id).await?;
    let (outsider, _, _) = factory::helpers::create_owner_with_organization(db).await?;
    AuthSession::new(session).set_user_id(outsider.id).await?;

    let auth_guard = AuthGuard::new(db, session);

    let foreign = auth_guard.require_report(report.id, AccessLevel::View).await;
    assert!(matches!(foreign, Err(AppError::NotFound(_))));

    let missing = auth_guard.require_report(9999, AccessLevel::View).await;
    assert!(matches!(missing, Err(AppError::NotFound(_))));

    Ok(())
}
