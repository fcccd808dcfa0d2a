use super::*;

/// Tests owners are counted per organization.
///
/// Expected: Ok(2) for the organization with two owners
#[tokio::test]
async fn counts_owners_of_organization() -> Result<(), DbErr> {
    let test = TestBuilder::new()
        .with_organization_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let (_, organization, _) = factory::helpers::create_owner_with_organization(db).await?;
    let second_owner = factory::user::create_user(db).await?;
    let member = factory::user::create_user(db).await?;
    factory::org_member::create_member(db, organization.id, second_owner.id, "owner").await?;
    factory::org_member::create_member(db, organization.id, member.id, "member").await?;
    factory::helpers::create_owner_with_organization(db).await?;

    let repo = OrgMemberRepository::new(db);

    assert_eq!(repo.count_with_role(organization.id, OrgRole::Owner).await?, 2);
    assert_eq!(repo.count_with_role(organization.id, OrgRole::Member).await?, 1);
    assert_eq!(repo.count_with_role(organization.id, OrgRole::Admin).await?, 0);

    Ok(())
}
