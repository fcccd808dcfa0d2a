use super::*;

/// Tests a revoked key is no longer found as active.
///
/// Expected: Ok(true) and no active key for the hash
#[tokio::test]
async fn revoked_key_is_inactive() -> Result<(), DbErr> {
    let test = TestBuilder::new()
        .with_all_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let (owner, organization, _) = factory::helpers::create_owner_with_organization(db).await?;
    let key = factory::api_key::create_api_key(db, organization.id, owner.id, "hash-1", None).await?;

    let repo = ApiKeyRepository::new(db);
    assert!(repo.find_active_by_hash("hash-1").await?.is_some());

    assert!(repo.revoke(organization.id, key.id).await?);
    assert!(repo.find_active_by_hash("hash-1").await?.is_none());

    let listed = repo.list_by_organization(organization.id).await?;
    assert!(listed[0].revoked_at.is_some());

    Ok(())
}

/// Tests keys of another organization can't be revoked.
///
/// Expected: Ok(false) and the key stays active
#[tokio::test]
async fn ignores_key_of_other_organization() -> Result<(), DbErr> {
    let test = TestBuilder::new()
        .with_all_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let (owner, organization, _) = factory::helpers::create_owner_with_organization(db).await?;
    let (_, other, _) = factory::helpers::create_owner_with_organization(db).await?;
    let key = factory::api_key::create_api_key(db, organization.id, owner.id, "hash-1", None).await?;

    let repo = ApiKeyRepository::new(db);

    assert!(!repo.revoke(other.id, key.id).await?);
    assert!(repo.find_active_by_hash("hash-1").await?.is_some());

    Ok(())
}
