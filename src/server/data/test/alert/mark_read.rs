use super::*;

/// Tests marking one alert read only changes that alert.
///
/// Expected: Ok(true) and one unread alert left
#[tokio::test]
async fn marks_single_alert_read() -> Result<(), DbErr> {
    let test = TestBuilder::new()
        .with_all_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let (_, organization, _) = factory::helpers::create_owner_with_organization(db).await?;

    let repo = AlertRepository::new(db);
    let first = repo.create(alert(organization.id, "first")).await?;
    repo.create(alert(organization.id, "second")).await?;

    assert!(repo.mark_read(organization.id, first.id).await?);
    assert_eq!(repo.count_unread(organization.id).await?, 1);

    let (unread, total) = repo.get_paginated(organization.id, true, 0, 10).await?;
    assert_eq!(total, 1);
    assert_eq!(unread[0].message, "second");

    Ok(())
}

/// Tests alerts of other organizations are left alone.
///
/// Expected: Ok(false) for a foreign alert, mark_all_read only counts own alerts
#[tokio::test]
async fn scopes_updates_to_organization() -> Result<(), DbErr> {
    let test = TestBuilder::new()
        .with_all_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let (_, organization, _) = factory::helpers::create_owner_with_organization(db).await?;
    let (_, other, _) = factory::helpers::create_owner_with_organization(db).await?;

    let repo = AlertRepository::new(db);
    let foreign = repo.create(alert(other.id, "foreign")).await?;
    repo.create(alert(organization.id, "own")).await?;
    repo.create(alert(organization.id, "own too")).await?;

    assert!(!repo.mark_read(organization.id, foreign.id).await?);
    assert_eq!(repo.mark_all_read(organization.id).await?, 2);
    assert_eq!(repo.count_unread(other.id).await?, 1);

    Ok(())
}
