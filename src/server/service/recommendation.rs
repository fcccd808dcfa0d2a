//! DMARC policy recommendation from aggregate pass rates.
//!
//! [`recommend`] is a rule evaluator over [`RecommendationInput`]; the
//! service only gathers the input from stored reports and live DNS.

use chrono::{Duration, Utc};
use sea_orm::DatabaseConnection;

use crate::{
    model::recommendation::{Confidence, DmarcPolicy},
    server::{
        data::{report::ReportRepository, source::SourceRepository},
        error::AppError,
        model::{
            domain::Domain,
            dns::DmarcRecord,
            recommendation::{Recommendation, RecommendationInput},
            report::Report,
        },
        service::dns::DnsService,
        util::parse::pass_rate,
    },
};

const MIN_DAYS_MONITORED: i64 = 14;
const REGRESSION_POINTS: f64 = 5.0;

pub struct RecommendationService<'a> {
    db: &'a DatabaseConnection,
    http_client: &'a reqwest::Client,
}

impl<'a> RecommendationService<'a> {
    pub fn new(db: &'a DatabaseConnection, http_client: &'a reqwest::Client) -> Self {
        Self { db, http_client }
    }

    /// Collects the statistics the heuristic works from.
    ///
    /// The published policy and rua come from a live DNS lookup; a failed
    /// lookup is treated as no policy published.
    pub async fn input(&self, domain: &Domain) -> Result<RecommendationInput, AppError> {
        let report_repo = ReportRepository::new(self.db);
        let now = Utc::now();

        let dmarc = DnsService::new(self.http_client).dmarc(&domain.name).await;

        let totals = |reports: &[Report]| {
            reports
                .iter()
                .fold((0i64, 0i64), |(t, p), r| (t + r.total_count, p + r.pass_count))
        };
        let (total_7d, passed_7d) =
            totals(&report_repo.get_since(domain.id, now - Duration::days(7)).await?);
        let (total_30d, passed_30d) =
            totals(&report_repo.get_since(domain.id, now - Duration::days(30)).await?);
        let (total_all, passed_all) = report_repo.all_time_totals(domain.id).await?;

        let days_monitored = report_repo
            .first_report_date(domain.id)
            .await?
            .map(|first| (now - first).num_days().max(0))
            .unwrap_or(0);

        let unknown_sources = SourceRepository::new(self.db)
            .count_unknown(domain.id)
            .await?;

        let (current_policy, current_rua) = published_policy(dmarc.as_ref());

        Ok(RecommendationInput {
            current_policy,
            current_rua,
            pass_rate_7d: pass_rate(passed_7d, total_7d),
            pass_rate_30d: pass_rate(passed_30d, total_30d),
            pass_rate_all: pass_rate(passed_all, total_all),
            total_30d,
            unknown_sources,
            days_monitored,
        })
    }

    /// Builds the heuristic recommendation for a domain.
    ///
    /// # Returns
    /// - `Ok((input, recommendation))` - The input is returned for display
    pub async fn recommend_for(
        &self,
        domain: &Domain,
    ) -> Result<(RecommendationInput, Recommendation), AppError> {
        let input = self.input(domain).await?;
        let recommendation = recommend(&input);

        Ok((input, recommendation))
    }
}

fn published_policy(dmarc: Option<&DmarcRecord>) -> (Option<DmarcPolicy>, Option<String>) {
    match dmarc {
        None => (None, None),
        Some(record) => {
            let policy = record.policy.as_deref().and_then(|p| p.parse().ok());
            let rua = (!record.rua.is_empty()).then(|| record.rua.join(","));
            (policy, rua)
        }
    }
}

/// Suggests the next DMARC policy for a domain.
///
/// Rules are checked in order and the first that applies decides the policy:
/// no recent data, too short a history, a 7-day regression, a low 30-day pass
/// rate, then a progression step from the currently published policy.
pub fn recommend(input: &RecommendationInput) -> Recommendation {
    let current = input.current_policy.unwrap_or(DmarcPolicy::None);
    let rate = input.pass_rate_30d;
    let mut reasons = Vec::new();

    let (policy, pct) = if input.total_30d == 0 {
        reasons.push(
            "No reports received in the last 30 days; collect more data before changing policy"
                .to_string(),
        );
        (DmarcPolicy::None, None)
    } else if input.days_monitored < MIN_DAYS_MONITORED {
        reasons.push(format!(
            "Only {} days of reports; keep monitoring with p=none for at least {} days",
            input.days_monitored, MIN_DAYS_MONITORED
        ));
        (DmarcPolicy::None, None)
    } else if input.pass_rate_7d < rate - REGRESSION_POINTS {
        reasons.push(format!(
            "Pass rate dropped to {:.1}% over the last 7 days from {:.1}% over 30 days; keep the current policy and investigate",
            input.pass_rate_7d, rate
        ));
        (current, None)
    } else if rate < 90.0 {
        reasons.push(format!(
            "30-day pass rate is {:.1}%; identify and fix failing sources before enforcing",
            rate
        ));
        if input.unknown_sources > 0 {
            reasons.push(format!(
                "{} sending sources are not recognised as known senders",
                input.unknown_sources
            ));
        }
        (DmarcPolicy::None, None)
    } else {
        match current {
            DmarcPolicy::None => {
                if rate >= 95.0 && input.unknown_sources <= 2 && input.days_monitored >= 30 {
                    let pct = if rate >= 98.0 && input.unknown_sources == 0 {
                        100
                    } else {
                        25
                    };
                    reasons.push(format!(
                        "30-day pass rate of {:.1}% over {} days supports moving to quarantine",
                        rate, input.days_monitored
                    ));
                    (DmarcPolicy::Quarantine, Some(pct))
                } else {
                    reasons.push(format!(
                        "Quarantine needs a 95% pass rate, at most 2 unknown sources and 30 days of data (currently {:.1}%, {} unknown, {} days)",
                        rate, input.unknown_sources, input.days_monitored
                    ));
                    (DmarcPolicy::None, None)
                }
            }
            DmarcPolicy::Quarantine => {
                if rate >= 98.0
                    && input.pass_rate_7d >= 98.0
                    && input.unknown_sources == 0
                    && input.days_monitored >= 60
                {
                    reasons.push(format!(
                        "Pass rate of {:.1}% with no unknown sources over {} days supports moving to reject",
                        rate, input.days_monitored
                    ));
                    (DmarcPolicy::Reject, None)
                } else {
                    let pct = if rate >= 97.0 { 100 } else { 25 };
                    reasons.push(
                        "Stay on quarantine; reject needs a 98% pass rate over 7 and 30 days, no unknown sources and 60 days of data"
                            .to_string(),
                    );
                    (DmarcPolicy::Quarantine, Some(pct))
                }
            }
            DmarcPolicy::Reject => {
                reasons.push("Domain is already fully protected with p=reject".to_string());
                if rate < 95.0 {
                    reasons.push(format!(
                        "30-day pass rate of {:.1}% means legitimate mail may be rejected",
                        rate
                    ));
                }
                (DmarcPolicy::Reject, None)
            }
        }
    };

    Recommendation {
        policy,
        pct,
        confidence: confidence(input),
        reasons,
        suggested_record: suggested_record(policy, pct, input.current_rua.as_deref()),
    }
}

fn confidence(input: &RecommendationInput) -> Confidence {
    if input.total_30d >= 1000 && input.days_monitored >= 30 {
        Confidence::High
    } else if input.total_30d >= 100 {
        Confidence::Medium
    } else {
        Confidence::Low
    }
}

/// Renders a DMARC TXT record, keeping the published rua when known.
pub fn suggested_record(policy: DmarcPolicy, pct: Option<u8>, rua: Option<&str>) -> String {
    let mut record = format!("v=DMARC1; p={}", policy.as_str());
    if let Some(pct) = pct {
        record.push_str(&format!("; pct={}", pct));
    }
    if let Some(rua) = rua {
        let uris: Vec<String> = rua
            .split(',')
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .map(|u| {
                if u.to_ascii_lowercase().starts_with("mailto:") {
                    u.to_string()
                } else {
                    format!("mailto:{}", u)
                }
            })
            .collect();
        if !uris.is_empty() {
            record.push_str(&format!("; rua={}", uris.join(",")));
        }
    }
    record
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input() -> RecommendationInput {
        RecommendationInput {
            current_policy: Some(DmarcPolicy::None),
            current_rua: Some("mailto:dmarc@example.com".into()),
            pass_rate_7d: 99.0,
            pass_rate_30d: 99.0,
            pass_rate_all: 99.0,
            total_30d: 5000,
            unknown_sources: 0,
            days_monitored: 90,
        }
    }

    /// Expected: no recent messages keeps p=none with low confidence
    #[test]
    fn no_data_keeps_none() {
        let rec = recommend(&RecommendationInput {
            total_30d: 0,
            pass_rate_7d: 0.0,
            pass_rate_30d: 0.0,
            ..input()
        });

        assert_eq!(rec.policy, DmarcPolicy::None);
        assert_eq!(rec.confidence, Confidence::Low);
    }

    #[test]
    fn short_history_keeps_none() {
        let rec = recommend(&RecommendationInput {
            days_monitored: 10,
            ..input()
        });

        assert_eq!(rec.policy, DmarcPolicy::None);
        assert_eq!(rec.confidence, Confidence::Medium);
    }

    /// Expected: a 7-day drop keeps the published policy
    #[test]
    fn regression_keeps_current_policy() {
        let rec = recommend(&RecommendationInput {
            current_policy: Some(DmarcPolicy::Quarantine),
            pass_rate_7d: 90.0,
            pass_rate_30d: 97.0,
            ..input()
        });

        assert_eq!(rec.policy, DmarcPolicy::Quarantine);
        assert_eq!(rec.pct, None);
    }

    #[test]
    fn low_pass_rate_recommends_none() {
        let rec = recommend(&RecommendationInput {
            current_policy: Some(DmarcPolicy::Quarantine),
            pass_rate_7d: 85.0,
            pass_rate_30d: 85.0,
            unknown_sources: 4,
            ..input()
        });

        assert_eq!(rec.policy, DmarcPolicy::None);
        assert_eq!(rec.reasons.len(), 2);
    }

    /// Expected: clean traffic moves straight to full quarantine
    #[test]
    fn none_moves_to_quarantine() {
        let rec = recommend(&input());
        assert_eq!(rec.policy, DmarcPolicy::Quarantine);
        assert_eq!(rec.pct, Some(100));
        assert_eq!(rec.confidence, Confidence::High);
        assert_eq!(
            rec.suggested_record,
            "v=DMARC1; p=quarantine; pct=100; rua=mailto:dmarc@example.com"
        );

        let rec = recommend(&RecommendationInput {
            pass_rate_7d: 96.0,
            pass_rate_30d: 96.0,
            unknown_sources: 2,
            ..input()
        });
        assert_eq!(rec.policy, DmarcPolicy::Quarantine);
        assert_eq!(rec.pct, Some(25));
    }

    #[test]
    fn none_stays_with_too_many_unknown_sources() {
        let rec = recommend(&RecommendationInput {
            unknown_sources: 3,
            ..input()
        });

        assert_eq!(rec.policy, DmarcPolicy::None);
    }

    #[test]
    fn quarantine_moves_to_reject() {
        let rec = recommend(&RecommendationInput {
            current_policy: Some(DmarcPolicy::Quarantine),
            ..input()
        });

        assert_eq!(rec.policy, DmarcPolicy::Reject);
        assert_eq!(
            rec.suggested_record,
            "v=DMARC1; p=reject; rua=mailto:dmarc@example.com"
        );
    }

    /// Expected: unknown sources keep quarantine, pct raised at 97%
    #[test]
    fn quarantine_stays_with_unknown_sources() {
        let rec = recommend(&RecommendationInput {
            current_policy: Some(DmarcPolicy::Quarantine),
            unknown_sources: 1,
            ..input()
        });

        assert_eq!(rec.policy, DmarcPolicy::Quarantine);
        assert_eq!(rec.pct, Some(100));
    }

    #[test]
    fn reject_warns_below_95() {
        let rec = recommend(&RecommendationInput {
            current_policy: Some(DmarcPolicy::Reject),
            pass_rate_7d: 92.0,
            pass_rate_30d: 92.0,
            ..input()
        });

        assert_eq!(rec.policy, DmarcPolicy::Reject);
        assert_eq!(rec.reasons.len(), 2);
    }

    #[test]
    fn renders_record_without_rua() {
        assert_eq!(
            suggested_record(DmarcPolicy::None, None, None),
            "v=DMARC1; p=none"
        );
        assert_eq!(
            suggested_record(DmarcPolicy::Quarantine, Some(25), Some("a@x.com, mailto:b@x.com")),
            "v=DMARC1; p=quarantine; pct=25; rua=mailto:a@x.com,mailto:b@x.com"
        );
    }
}
