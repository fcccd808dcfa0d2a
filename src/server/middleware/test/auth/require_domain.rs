use super::*;

/// Tests a member of the owning organization can view a domain.
///
/// Expected: Ok((User, Membership, Domain))
#[tokio::test]
async fn grants_domain_view_to_member() -> Result<(), AppError> {
    let mut test = TestBuilder::new()
        .with_domain_tables()
        .build()
        .await
        .unwrap();
    let (db, session) = test.db_and_session().await.unwrap();

    let (_, organization, domain) = factory::helpers::create_domain_with_owner(db).await?;
    let member = factory::user::create_user(db).await?;
    factory::org_member::create_member(db, organization.id, member.id, "member").await?;
    AuthSession::new(session).set_user_id(member.id).await?;

    let auth_guard = AuthGuard::new(db, session);
    let (_, membership, returned_domain) =
        auth_guard.require_domain(domain.id, AccessLevel::View).await?;

    assert_eq!(returned_domain.id, domain.id);
    assert_eq!(membership.user_id, member.id);

    Ok(())
}

/// Tests a domain of another organization looks like it doesn't exist.
///
/// Expected: Err(AppError::NotFound)
#[tokio::test]
async fn hides_domain_of_other_organization() -> Result<(), AppError> {
    let mut test = TestBuilder::new()
        .with_domain_tables()
        .build()
        .await
        .unwrap();
    let (db, session) = test.db_and_session().await.unwrap();

    let (_, _, domain) = factory::helpers::create_domain_with_owner(db).await?;
    let (outsider, _, _) = factory::helpers::create_owner_with_organization(db).await?;
    AuthSession::new(session).set_user_id(outsider.id).await?;

    let auth_guard = AuthGuard::new(db, session);
    let result = auth_guard.require_domain(domain.id, AccessLevel::View).await;

    assert!(matches!(result, Err(AppError::NotFound(_))));

    Ok(())
}

/// Tests members can't manage a domain.
///
/// Expected: Err(AuthError::AccessDenied)
#[tokio::test]
async fn denies_domain_manage_to_member() -> Result<(), AppError> {
    let mut test = TestBuilder::new()
        .with_domain_tables()
        .build()
        .await
        .unwrap();
    let (db, session) = test.db_and_session().await.unwrap();

    let (_, organization, domain) = factory::helpers::create_domain_with_owner(db).await?;
    let member = factory::user::create_user(db).await?;
    factory::org_member::create_member(db, organization.id, member.id, "member").await?;
    AuthSession::new(session).set_user_id(member.id).await?;

    let auth_guard = AuthGuard::new(db, session);
    let result = auth_guard
        .require_domain(domain.id, AccessLevel::Manage)
        .await;

    assert!(matches!(
        result,
        Err(AppError::AuthErr(AuthError::AccessDenied(_, _)))
    ));

    Ok(())
}
