use super::*;

/// Tests a new organization starts on the free plan with its creator as owner.
///
/// Expected: Ok with the free plan and an owner membership
#[tokio::test]
async fn creates_organization_with_owner() -> Result<(), DbErr> {
    let test = TestBuilder::new()
        .with_domain_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let user = factory::user::create_user(db).await?;

    let repo = OrganizationRepository::new(db);
    let organization = repo
        .create("Acme".to_string(), "acme".to_string(), user.id)
        .await?;

    assert_eq!(organization.name, "Acme");
    assert_eq!(organization.plan, Plan::Free);
    assert!(repo.slug_exists("acme").await?);
    assert!(!repo.slug_exists("acme-2").await?);

    let memberships = repo.list_for_user(user.id).await?;
    assert_eq!(memberships.len(), 1);
    assert_eq!(memberships[0].role, OrgRole::Owner);

    Ok(())
}

/// Tests slugs are unique across organizations.
///
/// Expected: Err on the second insert
#[tokio::test]
async fn rejects_duplicate_slug() -> Result<(), DbErr> {
    let test = TestBuilder::new()
        .with_organization_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let user = factory::user::create_user(db).await?;

    let repo = OrganizationRepository::new(db);
    repo.create("Acme".to_string(), "acme".to_string(), user.id)
        .await?;
    let result = repo
        .create("Acme Two".to_string(), "acme".to_string(), user.id)
        .await;

    assert!(result.is_err());

    Ok(())
}
