use super::*;

/// Tests domain-scoped and organization-wide enabled rules apply to a domain.
///
/// Disabled rules and rules scoped to another domain are skipped.
///
/// Expected: Ok with the organization-wide and matching domain rule
#[tokio::test]
async fn returns_matching_enabled_rules() -> Result<(), DbErr> {
    let test = TestBuilder::new()
        .with_all_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let (_, organization, domain) = factory::helpers::create_domain_with_owner(db).await?;
    let other_domain = factory::domain::create_domain(db, organization.id).await?;

    let global = factory::alert_rule::AlertRuleFactory::new(db, organization.id, "new_source")
        .build()
        .await?;
    let scoped = factory::alert_rule::AlertRuleFactory::new(db, organization.id, "pass_rate_below")
        .domain_id(domain.id)
        .threshold(90.0)
        .build()
        .await?;
    factory::alert_rule::AlertRuleFactory::new(db, organization.id, "failure_volume")
        .domain_id(other_domain.id)
        .threshold(100.0)
        .build()
        .await?;
    factory::alert_rule::AlertRuleFactory::new(db, organization.id, "new_source")
        .enabled(false)
        .build()
        .await?;

    let repo = AlertRuleRepository::new(db);
    let rules = repo
        .list_enabled_for_domain(organization.id, domain.id)
        .await?;

    let ids: Vec<i32> = rules.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![global.id, scoped.id]);

    Ok(())
}
