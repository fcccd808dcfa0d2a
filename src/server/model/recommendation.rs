use crate::model::recommendation::{Confidence, DmarcPolicy, RecommendationDto};

/// Aggregate statistics the policy heuristic works from.
#[derive(Debug, Clone, PartialEq)]
pub struct RecommendationInput {
    pub current_policy: Option<DmarcPolicy>,
    pub current_rua: Option<String>,
    pub pass_rate_7d: f64,
    pub pass_rate_30d: f64,
    pub pass_rate_all: f64,
    pub total_30d: i64,
    pub unknown_sources: u64,
    pub days_monitored: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Recommendation {
    pub policy: DmarcPolicy,
    pub pct: Option<u8>,
    pub confidence: Confidence,
    pub reasons: Vec<String>,
    pub suggested_record: String,
}

impl Recommendation {
    pub fn into_dto(self, input: &RecommendationInput) -> RecommendationDto {
        RecommendationDto {
            current_policy: input.current_policy,
            policy: self.policy,
            pct: self.pct,
            confidence: self.confidence,
            reasons: self.reasons,
            suggested_record: self.suggested_record,
            pass_rate_7d: input.pass_rate_7d,
            pass_rate_30d: input.pass_rate_30d,
            pass_rate_all: input.pass_rate_all,
            unknown_sources: input.unknown_sources,
            days_monitored: input.days_monitored,
        }
    }
}
