use super::*;

/// Tests admins pass the manage check and get their membership back.
///
/// Expected: Ok((User, Membership)) with the admin role
#[tokio::test]
async fn grants_manage_to_admin() -> Result<(), AppError> {
    let mut test = TestBuilder::new()
        .with_organization_tables()
        .build()
        .await
        .unwrap();
    let (db, session) = test.db_and_session().await.unwrap();

    let user = factory::user::create_user(db).await?;
    let organization = factory::organization::create_organization(db).await?;
    factory::org_member::create_member(db, organization.id, user.id, "admin").await?;
    AuthSession::new(session).set_user_id(user.id).await?;

    let auth_guard = AuthGuard::new(db, session);
    let (returned_user, membership) = auth_guard
        .require_member(Permission::OrgManage(organization.id))
        .await?;

    assert_eq!(returned_user.id, user.id);
    assert_eq!(membership.organization_id, organization.id);
    assert_eq!(membership.role, crate::model::organization::OrgRole::Admin);

    Ok(())
}

/// Tests plain members can't manage the organization.
///
/// Expected: Err(AuthError::AccessDenied)
#[tokio::test]
async fn denies_manage_to_member() -> Result<(), AppError> {
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
        .require(&[Permission::OrgManage(organization.id)])
        .await;

    assert!(matches!(
        result,
        Err(AppError::AuthErr(AuthError::AccessDenied(_, _)))
    ));

    Ok(())
}
