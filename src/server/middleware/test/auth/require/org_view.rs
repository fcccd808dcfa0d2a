use super::*;

/// Tests any member may view their organization.
///
/// Expected: Ok(User)
#[tokio::test]
async fn grants_view_to_member() -> Result<(), AppError> {
    let mut test = TestBuilder::new()
        .with_organization_tables()
        .build()
        .await
        .unwrap();
    let (db, session) = test.db_and_session().await.unwrap();

    let user = factory::user::create_user(db).await?;
    let organization = factory::organization::create_organization(db).await?;
    factory::org_member::create_member(db, organization.id, user.id, "member").await?;
    AuthSession::new(session).set_user_id(user.id).await?;

    let auth_guard = AuthGuard::new(db, session);
    let result = auth_guard
        .require(&[Permission::OrgView(organization.id)])
        .await;

    assert!(result.is_ok());

    Ok(())
}

/// Tests a non-member sees the organization as missing.
///
/// Expected: Err(AuthError::OrganizationNotFound)
#[tokio::test]
async fn hides_organization_from_non_member() -> Result<(), AppError> {
    let mut test = TestBuilder::new()
        .with_organization_tables()
        .build()
        .await
        .unwrap();
    let (db, session) = test.db_and_session().await.unwrap();

    let (_, organization, _) = factory::helpers::create_owner_with_organization(db).await?;
    let outsider = factory::user::create_user(db).await?;
    AuthSession::new(session).set_user_id(outsider.id).await?;

    let auth_guard = AuthGuard::new(db, session);
    let result = auth_guard
        .require(&[Permission::OrgView(organization.id)])
        .await;

    match result {
        Err(AppError::AuthErr(AuthError::OrganizationNotFound(id))) => {
            assert_eq!(id, organization.id)
        }
        other => panic!("Expected OrganizationNotFound, got: {:?}", other),
    }

    Ok(())
}

/// Tests a missing organization gives the same error as one the user can't see.
///
/// Expected: Err(AuthError::OrganizationNotFound)
#[tokio::test]
async fn reports_missing_organization_as_not_found() -> Result<(), AppError> {
    let mut test = TestBuilder::new()
        .with_organization_tables()
        .build()
        .await
        .unwrap();
    let (db, session) = test.db_and_session().await.unwrap();

    let user = factory::user::create_user(db).await?;
    AuthSession::new(session).set_user_id(user.id).await?;

    let auth_guard = AuthGuard::new(db, session);
    let result = auth_guard.require(&[Permission::OrgView(999)]).await;

    assert!(matches!(
        result,
        Err(AppError::AuthErr(AuthError::OrganizationNotFound(999)))
    ));

    Ok(())
}
