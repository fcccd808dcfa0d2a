use super::*;

/// Tests only records of reports starting inside the window are returned.
///
/// Expected: Ok with the record of the recent report only
#[tokio::test]
async fn returns_records_inside_window() -> Result<(), DbErr> {
    let test = TestBuilder::new()
        .with_domain_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let (_, _, domain) = factory::helpers::create_domain_with_owner(db).await?;
    let now = Utc::now();

    let old = factory::report::ReportFactory::new(db, domain.id)
        .window(now - Duration::days(40), now - Duration::days(39))
        .build()
        .await?;
    let recent = factory::report::ReportFactory::new(db, domain.id)
        .window(now - Duration::days(2), now - Duration::days(1))
        .build()
        .await?;
    factory::report::RecordFactory::new(db, old.id)
        .source_ip("192.0.2.1")
        .build()
        .await?;
    factory::report::RecordFactory::new(db, recent.id)
        .source_ip("192.0.2.2")
        .build()
        .await?;

    let repo = ReportRepository::new(db);
    let rows = repo
        .get_records_since(domain.id, now - Duration::days(30))
        .await?;

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].record.source_ip, "192.0.2.2");
    assert_eq!(rows[0].report.id, recent.id);

    Ok(())
}
