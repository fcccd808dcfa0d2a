use super::*;

/// Tests a report is stored with its records and totals computed from them.
///
/// A record passes when either DKIM or SPF passes aligned.
///
/// Expected: Ok with total 10, passed 7, failed 3
#[tokio::test]
async fn stores_report_with_records_and_totals() -> Result<(), DbErr> {
    let test = TestBuilder::new()
        .with_domain_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let (_, _, domain) = factory::helpers::create_domain_with_owner(db).await?;

    let repo = ReportRepository::new(db);
    let (report, _) = repo
        .create(
            domain.id,
            parsed(
                "r-1",
                vec![
                    record("192.0.2.1", 5, "pass", "fail"),
                    record("192.0.2.2", 2, "fail", "pass"),
                    record("198.51.100.7", 3, "fail", "fail"),
                ],
            ),
            Utc::now(),
        )
        .await?;

    assert_eq!(report.total_count, 10);
    assert_eq!(report.pass_count, 7);
    assert_eq!(report.fail_count, 3);

    let records = repo.get_records(report.id).await?;
    assert_eq!(records.len(), 3);

    Ok(())
}

/// Tests duplicates are detected per domain, reporter and report id.
///
/// Expected: exists is true only for the stored combination
#[tokio::test]
async fn detects_existing_report() -> Result<(), DbErr> {
    let test = TestBuilder::new()
        .with_domain_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let (_, organization, domain) = factory::helpers::create_domain_with_owner(db).await?;
    let other_domain = factory::domain::create_domain(db, organization.id).await?;

    let repo = ReportRepository::new(db);
    repo.create(domain.id, parsed("r-1", vec![]), Utc::now())
        .await?;

    assert!(repo.exists(domain.id, "google.com", "r-1").await?);
    assert!(!repo.exists(domain.id, "yahoo.com", "r-1").await?);
    assert!(!repo.exists(domain.id, "google.com", "r-2").await?);
    assert!(!repo.exists(other_domain.id, "google.com", "r-1").await?);

    Ok(())
}

/// Tests deleting a report also removes its records.
///
/// Expected: no records left for the deleted report
#[tokio::test]
async fn delete_removes_records() -> Result<(), DbErr> {
    let test = TestBuilder::new()
        .with_domain_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let (_, _, domain) = factory::helpers::create_domain_with_owner(db).await?;

    let repo = ReportRepository::new(db);
    let (report, _) = repo
        .create(
            domain.id,
            parsed("r-1", vec![record("192.0.2.1", 1, "pass", "pass")]),
            Utc::now(),
        )
        .await?;
    repo.delete(report.id).await?;

    assert!(repo.find_by_id(report.id).await?.is_none());
    assert!(repo.get_records(report.id).await?.is_empty());

    Ok(())
}

/// Tests a report with more records than one insert statement can bind is
/// stored completely.
///
/// Expected: Ok with all 3000 records and their summed totals
#[tokio::test]
async fn stores_report_with_thousands_of_records() -> Result<(), DbErr> {
    let test = TestBuilder::new()
        .with_domain_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let (_, _, domain) = factory::helpers::create_domain_with_owner(db).await?;

    let records = (0..3000)
        .map(|i| {
            let ip = format!("10.{}.{}.{}", i / 65536, (i / 256) % 256, i % 256);
            if i % 3 == 0 {
                record(&ip, 2, "fail", "fail")
            } else {
                record(&ip, 2, "pass", "pass")
            }
        })
        .collect();

    let repo = ReportRepository::new(db);
    let (report, new_sources) = repo
        .create(domain.id, parsed("bulk-1", records), Utc::now())
        .await?;

    assert_eq!(report.total_count, 6000);
    assert_eq!(report.pass_count, 4000);
    assert_eq!(report.fail_count, 2000);
    assert_eq!(repo.get_records(report.id).await?.len(), 3000);
    assert_eq!(new_sources.len(), 3000);

    Ok(())
}

/// Tests the report, its sources and the domain's last report time are
/// written together.
///
/// Records of the same IP fold into one source stamped with the period end.
///
/// Expected: Ok with two new sources and `last_report_at` set
#[tokio::test]
async fn stores_report_sources_and_last_report_time() -> Result<(), DbErr> {
    let test = TestBuilder::new()
        .with_domain_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let (_, _, domain) = factory::helpers::create_domain_with_owner(db).await?;
    let ingested_at = Utc.with_ymd_and_hms(2026, 3, 3, 8, 0, 0).unwrap();

    let (report, new_sources) = ReportRepository::new(db)
        .create(
            domain.id,
            parsed(
                "r-1",
                vec![
                    record("192.0.2.1", 5, "pass", "fail"),
                    record("198.51.100.7", 3, "fail", "fail"),
                    record("192.0.2.1", 2, "fail", "fail"),
                ],
            ),
            ingested_at,
        )
        .await?;

    assert_eq!(report.total_count, 10);
    assert_eq!(new_sources.len(), 2);
    assert_eq!(new_sources[0].ip, "192.0.2.1");
    assert_eq!(new_sources[0].total_count, 7);
    assert_eq!(new_sources[0].pass_count, 5);
    assert_eq!(new_sources[0].first_seen, report.date_end);
    assert_eq!(new_sources[1].ip, "198.51.100.7");
    assert_eq!(new_sources[1].pass_count, 0);

    let stored = entity::prelude::Domain::find_by_id(domain.id)
        .one(db)
        .await?
        .unwrap();
    assert_eq!(stored.last_report_at, Some(ingested_at));

    Ok(())
}

/// Tests a later report adds to existing sources instead of creating them.
///
/// Expected: only the unseen IP is new, counts summed, seen window widened
#[tokio::test]
async fn accumulates_existing_sources() -> Result<(), DbErr> {
    let test = TestBuilder::new()
        .with_domain_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let (_, _, domain) = factory::helpers::create_domain_with_owner(db).await?;
    let repo = ReportRepository::new(db);

    let (first, _) = repo
        .create(
            domain.id,
            parsed("r-1", vec![record("192.0.2.1", 10, "pass", "pass")]),
            Utc::now(),
        )
        .await?;

    let mut later = parsed(
        "r-2",
        vec![
            record("192.0.2.1", 5, "fail", "fail"),
            record("192.0.2.9", 1, "pass", "pass"),
        ],
    );
    later.date_begin += Duration::days(3);
    later.date_end += Duration::days(3);
    let later_end = later.date_end;

    let (_, new_sources) = repo
        .create(domain.id, later, Utc::now())
        .await?;

    assert_eq!(new_sources.len(), 1);
    assert_eq!(new_sources[0].ip, "192.0.2.9");

    let source = entity::prelude::Source::find()
        .filter(entity::source::Column::DomainId.eq(domain.id))
        .filter(entity::source::Column::Ip.eq("192.0.2.1"))
        .one(db)
        .await?
        .unwrap();
    assert_eq!(source.total_count, 15);
    assert_eq!(source.pass_count, 10);
    assert_eq!(source.first_seen, first.date_end);
    assert_eq!(source.last_seen, later_end);

    Ok(())
}

/// Tests nothing is kept when a write inside the transaction fails.
///
/// The domain does not exist, so the report or the domain update fails.
///
/// Expected: Err, with no report, record or source rows left behind
#[tokio::test]
async fn rolls_back_when_a_write_fails() -> Result<(), DbErr> {
    let test = TestBuilder::new()
        .with_domain_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let result = ReportRepository::new(db)
        .create(
            9999,
            parsed("r-1", vec![record("192.0.2.1", 5, "pass", "pass")]),
            Utc::now(),
        )
        .await;

    assert!(result.is_err());
    assert_eq!(entity::prelude::Report::find().count(db).await?, 0);
    assert_eq!(entity::prelude::Record::find().count(db).await?, 0);
    assert_eq!(entity::prelude::Source::find().count(db).await?, 0);

    Ok(())
}
