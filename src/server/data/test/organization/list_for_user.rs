use super::*;

/// Tests only the user's organizations are listed, with role and domain count.
///
/// Expected: Ok with one entry per membership ordered by name
#[tokio::test]
async fn lists_memberships_with_domain_counts() -> Result<(), DbErr> {
    let test = TestBuilder::new()
        .with_domain_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let user = factory::user::create_user(db).await?;
    let beta = factory::organization::OrganizationFactory::new(db)
        .name("Beta")
        .build()
        .await?;
    let alpha = factory::organization::OrganizationFactory::new(db)
        .name("Alpha")
        .build()
        .await?;
    factory::org_member::create_member(db, beta.id, user.id, "member").await?;
    factory::org_member::create_member(db, alpha.id, user.id, "admin").await?;
    factory::domain::create_domain(db, alpha.id).await?;
    factory::domain::create_domain(db, alpha.id).await?;

    // Not a member here
    factory::helpers::create_owner_with_organization(db).await?;

    let repo = OrganizationRepository::new(db);
    let result = repo.list_for_user(user.id).await?;

    assert_eq!(result.len(), 2);
    assert_eq!(result[0].organization.name, "Alpha");
    assert_eq!(result[0].role, OrgRole::Admin);
    assert_eq!(result[0].domain_count, 2);
    assert_eq!(result[1].organization.name, "Beta");
    assert_eq!(result[1].domain_count, 0);

    Ok(())
}
