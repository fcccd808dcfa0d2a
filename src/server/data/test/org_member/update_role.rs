use super::*;

/// Tests changing a member's role is persisted.
///
/// Expected: Ok with the new role returned and stored
#[tokio::test]
async fn promotes_member_to_admin() -> Result<(), DbErr> {
    let test = TestBuilder::new()
        .with_organization_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let (_, organization, _) = factory::helpers::create_owner_with_organization(db).await?;
    let user = factory::user::create_user(db).await?;
    let member = factory::org_member::create_member(db, organization.id, user.id, "member").await?;

    let repo = OrgMemberRepository::new(db);
    let updated = repo.update_role(member.id, OrgRole::Admin).await?;

    assert_eq!(updated.role, OrgRole::Admin);

    let stored = repo.find(organization.id, user.id).await?.unwrap();
    assert_eq!(stored.role, OrgRole::Admin);

    Ok(())
}
