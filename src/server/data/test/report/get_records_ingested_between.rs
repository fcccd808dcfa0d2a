use super::*;

/// Tests records are selected by when their report was ingested, not by the
/// period it covers.
///
/// Expected: the old-period report ingested inside the window only; the
/// window end is exclusive
#[tokio::test]
async fn selects_by_ingestion_time() -> Result<(), DbErr> {
    let test = TestBuilder::new()
        .with_domain_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let (_, _, domain) = factory::helpers::create_domain_with_owner(db).await?;
    let since = Utc.with_ymd_and_hms(2026, 3, 10, 10, 0, 0).unwrap();
    let until = since + Duration::days(1);

    let late_arrival = factory::report::ReportFactory::new(db, domain.id)
        .window(since - Duration::days(2), since - Duration::days(1))
        .created_at(since + Duration::hours(3))
        .build()
        .await?;
    let earlier = factory::report::ReportFactory::new(db, domain.id)
        .window(since - Duration::hours(2), since + Duration::hours(22))
        .created_at(since - Duration::minutes(5))
        .build()
        .await?;
    let next_window = factory::report::ReportFactory::new(db, domain.id)
        .created_at(until)
        .build()
        .await?;
    for (report, ip) in [
        (&late_arrival, "192.0.2.1"),
        (&earlier, "192.0.2.2"),
        (&next_window, "192.0.2.3"),
    ] {
        factory::report::RecordFactory::new(db, report.id)
            .source_ip(ip)
            .build()
            .await?;
    }

    let rows = ReportRepository::new(db)
        .get_records_ingested_between(domain.id, since, until)
        .await?;

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].record.source_ip, "192.0.2.1");
    assert_eq!(rows[0].report.id, late_arrival.id);

    Ok(())
}
