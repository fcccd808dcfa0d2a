use super::*;

/// Tests only sources never looked up are pending, up to the limit.
///
/// Expected: Ok with unchecked sources only
#[tokio::test]
async fn returns_unchecked_sources() -> Result<(), DbErr> {
    let test = TestBuilder::new()
        .with_domain_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let (_, _, domain) = factory::helpers::create_domain_with_owner(db).await?;
    factory::source::create_source(db, domain.id, "192.0.2.1").await?;
    factory::source::create_source(db, domain.id, "192.0.2.2").await?;
    factory::source::SourceFactory::new(db, domain.id, "192.0.2.3")
        .country("NL")
        .geo_checked_at(Utc::now())
        .build()
        .await?;

    let repo = SourceRepository::new(db);

    let pending = repo.get_pending_geo(10).await?;
    assert_eq!(pending.len(), 2);
    assert!(pending.iter().all(|s| s.geo_checked_at.is_none()));

    let limited = repo.get_pending_geo(1).await?;
    assert_eq!(limited.len(), 1);

    Ok(())
}
