use super::*;

/// Tests a finished sync stores the cursor and clears the error.
///
/// Expected: idle status, cursor stored, no error
#[tokio::test]
async fn stores_cursor_and_idles() -> Result<(), DbErr> {
    let test = TestBuilder::new().with_all_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let organization = factory::create_organization(db).await?;
    let account =
        factory::gmail_account::create_gmail_account(db, organization.id, "a@example.com", "syncing")
            .await?;
    let cursor = Utc.with_ymd_and_hms(2026, 3, 10, 12, 0, 0).unwrap();

    let repo = GmailAccountRepository::new(db);
    repo.set_status(account.id, SyncStatus::Error, Some("timeout".to_string()))
        .await?;
    repo.mark_synced(account.id, Some(cursor)).await?;

    let account = repo.find(organization.id, account.id).await?.unwrap();
    assert_eq!(account.sync_status, SyncStatus::Idle);
    assert_eq!(account.last_sync_at, Some(cursor));
    assert_eq!(account.last_error, None);

    Ok(())
}
