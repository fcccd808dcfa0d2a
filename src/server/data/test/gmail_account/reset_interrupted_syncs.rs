use super::*;

/// Tests accounts stuck in syncing are returned to idle.
///
/// Accounts in other states are left as they are.
///
/// Expected: Ok(1), the syncing account idle, the failed account still in error
#[tokio::test]
async fn resets_only_syncing_accounts() -> Result<(), DbErr> {
    let test = TestBuilder::new().with_all_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let organization = factory::create_organization(db).await?;
    let stuck =
        factory::gmail_account::create_gmail_account(db, organization.id, "a@example.com", "syncing")
            .await?;
    let failed =
        factory::gmail_account::create_gmail_account(db, organization.id, "b@example.com", "error")
            .await?;

    let repo = GmailAccountRepository::new(db);
    let reset = repo.reset_interrupted_syncs().await?;

    assert_eq!(reset, 1);
    let stuck = repo.find(organization.id, stuck.id).await?.unwrap();
    assert_eq!(stuck.sync_status, SyncStatus::Idle);
    let failed = repo.find(organization.id, failed.id).await?.unwrap();
    assert_eq!(failed.sync_status, SyncStatus::Error);

    Ok(())
}
