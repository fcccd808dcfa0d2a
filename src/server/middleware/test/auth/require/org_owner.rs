use super::*;

/// Tests the owner passes the owner check.
///
/// Expected: Ok(User)
#[tokio::test]
async fn grants_owner_permission_to_owner() -> Result<(), AppError> {
    let mut test = TestBuilder::new()
        .with_organization_tables()
        .build()
        .await
        .unwrap();
    let (db, session) = test.db_and_session().await.unwrap();

    let (owner, organization, _) = factory::helpers::create_owner_with_organization(db).await?;
    AuthSession::new(session).set_user_id(owner.id).await?;

    let auth_guard = AuthGuard::new(db, session);
    let user = auth_guard
        .require(&[Permission::OrgOwner(organization.id)])
        .await?;

    assert_eq!(user.id, owner.id);

    Ok(())
}

/// Tests admins can't perform owner-only actions.
///
/// Expected: Err(AuthError::AccessDenied)
#[tokio::test]
async fn denies_owner_permission_to_admin() -> Result<(), AppError> {
    let mut test = TestBuilder::new()
        .with_organization_tables()
        .build()
        .await
        .unwrap();
    let (db, session) = test.db_and_session().await.unwrap();

    let (_, organization, _) = factory::helpers::create_owner_with_organization(db).await?;
    let admin = factory::user::create_user(db).await?;
    factory::org_member::create_member(db, organization.id, admin.id, "admin").await?;
    AuthSession::new(session).set_user_id(admin.id).await?;

    let auth_guard = AuthGuard::new(db, session);
    let result = auth_guard
        .require(&[Permission::OrgOwner(organization.id)])
        .await;

    match result {
        Err(AppError::AuthErr(AuthError::AccessDenied(user_id, _))) => {
            assert_eq!(user_id, admin.id)
        }
        other => panic!("Expected AccessDenied, got: {:?}", other),
    }

    Ok(())
}
