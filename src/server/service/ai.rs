//! AI-assisted recommendations through the Gemini `generateContent` API.

use chrono::{Duration, Utc};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};

use crate::server::{
    data::{
        ai_integration::AiIntegrationRepository,
        ai_recommendation_cache::AiRecommendationCacheRepository,
    },
    error::AppError,
    model::{
        ai::{AiIntegration, AiRecommendation, UpsertAiIntegrationParams},
        dns::DnsCheck,
        domain::Domain,
        recommendation::{Recommendation, RecommendationInput},
        stats::Overview,
    },
    service::{
        dns::DnsService,
        recommendation::RecommendationService,
        stats::{StatsService, DEFAULT_WINDOW_DAYS},
    },
};

const GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const CACHE_HOURS: i64 = 24;
/// Model used when an integration is saved without one.
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

#[derive(Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

impl GenerateContentResponse {
    /// Concatenated text of the first candidate.
    fn text(self) -> Option<String> {
        let content = self.candidates.into_iter().next()?.content?;
        let text: String = content.parts.into_iter().filter_map(|p| p.text).collect();
        (!text.trim().is_empty()).then_some(text)
    }
}

pub struct AiService<'a> {
    db: &'a DatabaseConnection,
    http_client: &'a reqwest::Client,
}

impl<'a> AiService<'a> {
    pub fn new(db: &'a DatabaseConnection, http_client: &'a reqwest::Client) -> Self {
        Self { db, http_client }
    }

    pub async fn get_integration(
        &self,
        organization_id: i32,
    ) -> Result<Option<AiIntegration>, AppError> {
        Ok(AiIntegrationRepository::new(self.db)
            .find(organization_id)
            .await?)
    }

    /// Creates or updates the organization's Gemini integration.
    ///
    /// # Returns
    /// - `Ok(AiIntegration)` - Stored integration
    /// - `Err(AppError::BadRequest)` - No key given and none stored yet
    pub async fn save_integration(
        &self,
        params: UpsertAiIntegrationParams,
    ) -> Result<AiIntegration, AppError> {
        if params.model.trim().is_empty() {
            return Err(AppError::BadRequest("Model must not be empty".to_string()));
        }
        if params.api_key.as_deref().is_some_and(|k| k.trim().is_empty()) {
            return Err(AppError::BadRequest("API key must not be empty".to_string()));
        }

        let organization_id = params.organization_id;
        let integration = AiIntegrationRepository::new(self.db)
            .upsert(params)
            .await?
            .ok_or_else(|| AppError::BadRequest("An API key is required".to_string()))?;

        tracing::info!("Saved AI integration for organization {}", organization_id);

        Ok(integration)
    }

    pub async fn delete_integration(&self, organization_id: i32) -> Result<bool, AppError> {
        Ok(AiIntegrationRepository::new(self.db)
            .delete(organization_id)
            .await?)
    }

    /// Gets the AI recommendation for a domain, from cache unless `refresh` is set.
    ///
    /// # Returns
    /// - `Ok(AiRecommendation)` - Cached or freshly generated answer
    /// - `Err(AppError::BadRequest)` - Integration missing or disabled
    /// - `Err(AppError::ExternalService)` - Gemini request failed
    pub async fn recommend(
        &self,
        domain: &Domain,
        refresh: bool,
    ) -> Result<AiRecommendation, AppError> {
        let integration = AiIntegrationRepository::new(self.db)
            .find(domain.organization_id)
            .await?
            .filter(|i| i.enabled)
            .ok_or_else(|| {
                AppError::BadRequest(
                    "AI integration is not configured for this organization".to_string(),
                )
            })?;

        let cache = AiRecommendationCacheRepository::new(self.db);
        let now = Utc::now();

        if !refresh {
            if let Some(cached) = cache.find_valid(domain.id, now).await? {
                return Ok(cached);
            }
        }

        let overview = StatsService::new(self.db)
            .overview(domain.id, DEFAULT_WINDOW_DAYS)
            .await?;
        let dns = DnsService::new(self.http_client).check(&domain.name).await;
        let (input, heuristic) = RecommendationService::new(self.db, self.http_client)
            .recommend_for(domain)
            .await?;

        let prompt = build_prompt(&domain.name, &overview, &dns, &input, &heuristic);
        let markdown = self.generate(&integration, &prompt).await?;

        let generated = cache
            .upsert(
                domain.id,
                integration.model.clone(),
                markdown,
                now,
                now + Duration::hours(CACHE_HOURS),
            )
            .await?;

        tracing::info!(
            "Generated AI recommendation for domain {} with {}",
            domain.name,
            integration.model
        );

        Ok(generated)
    }

    async fn generate(&self, integration: &AiIntegration, prompt: &str) -> Result<String, AppError> {
        let body = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
        };

        let response = self
            .http_client
            .post(format!(
                "{}/{}:generateContent",
                GEMINI_API_URL, integration.model
            ))
            .header("x-goog-api-key", &integration.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!("Gemini request failed: {}", e);
                AppError::ExternalService("AI provider request failed".to_string())
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response.text().await.unwrap_or_default();
            tracing::warn!("Gemini returned {}: {}", status, detail);
            return Err(AppError::ExternalService(format!(
                "AI provider returned {}",
                status
            )));
        }

        response
            .json::<GenerateContentResponse>()
            .await
            .ok()
            .and_then(GenerateContentResponse::text)
            .ok_or_else(|| AppError::ExternalService("AI provider returned no content".to_string()))
    }
}

/// Describes the domain's state for the model and asks for a markdown answer.
pub fn build_prompt(
    domain: &str,
    overview: &Overview,
    dns: &DnsCheck,
    input: &RecommendationInput,
    heuristic: &Recommendation,
) -> String {
    let mut prompt = format!(
        "You are an email deliverability expert. Review the DMARC status of the domain {} \
         and give concrete, prioritised advice in Markdown.\n\n",
        domain
    );

    prompt.push_str("## Published DNS records\n");
    match &dns.dmarc {
        Some(dmarc) => prompt.push_str(&format!("- DMARC: `{}`\n", dmarc.raw)),
        None => prompt.push_str("- DMARC: none\n"),
    }
    match dns.spf.as_slice() {
        [] => prompt.push_str("- SPF: none\n"),
        records => {
            for record in records {
                prompt.push_str(&format!("- SPF: `{}`\n", record));
            }
        }
    }
    if dns.dkim.is_empty() {
        prompt.push_str("- DKIM: no key found on common selectors\n");
    } else {
        let selectors: Vec<&str> = dns.dkim.iter().map(|s| s.selector.as_str()).collect();
        prompt.push_str(&format!("- DKIM selectors: {}\n", selectors.join(", ")));
    }

    prompt.push_str(&format!("\n## Last {} days\n", overview.days));
    prompt.push_str(&format!(
        "- Messages: {} ({} passed, {} failed, pass rate {:.1}%)\n",
        overview.total_messages,
        overview.passed,
        overview.failed(),
        overview.pass_rate()
    ));
    prompt.push_str(&format!(
        "- DKIM pass: {}, SPF pass: {}\n- Dispositions: none {}, quarantine {}, reject {}\n",
        overview.dkim_pass,
        overview.spf_pass,
        overview.disposition_none,
        overview.disposition_quarantine,
        overview.disposition_reject
    ));
    prompt.push_str(&format!(
        "- Pass rate 7 days: {:.1}%, all time: {:.1}%, days monitored: {}, unknown sources: {}\n",
        input.pass_rate_7d, input.pass_rate_all, input.days_monitored, input.unknown_sources
    ));
    if !overview.top_sources.is_empty() {
        prompt.push_str("\n## Top sending sources\n");
        for source in &overview.top_sources {
            prompt.push_str(&format!(
                "- {}: {} messages, {} passed\n",
                source.source_ip, source.total, source.passed
            ));
        }
    }

    prompt.push_str(&format!(
        "\n## Rule-based suggestion\n- Policy: {}\n- Record: `{}`\n",
        heuristic.policy.as_str(),
        heuristic.suggested_record
    ));
    for reason in &heuristic.reasons {
        prompt.push_str(&format!("- {}\n", reason));
    }

    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        model::recommendation::{Confidence, DmarcPolicy},
        server::model::{dns::DmarcRecord, stats::TopSource},
    };

    /// Expected: DNS state, counters and heuristic all present in the prompt
    #[test]
    fn prompt_contains_domain_state() {
        let overview = Overview {
            domain_id: 1,
            days: 30,
            total_messages: 200,
            passed: 150,
            top_sources: vec![TopSource {
                source_ip: "192.0.2.1".into(),
                total: 200,
                passed: 150,
            }],
            ..Default::default()
        };
        let dns = DnsCheck {
            domain: "example.com".into(),
            dmarc: Some(DmarcRecord::parse("v=DMARC1; p=none")),
            spf: vec![],
            dkim: vec![],
        };
        let input = RecommendationInput {
            current_policy: Some(DmarcPolicy::None),
            current_rua: None,
            pass_rate_7d: 75.0,
            pass_rate_30d: 75.0,
            pass_rate_all: 75.0,
            total_30d: 200,
            unknown_sources: 1,
            days_monitored: 40,
        };
        let heuristic = Recommendation {
            policy: DmarcPolicy::None,
            pct: None,
            confidence: Confidence::Medium,
            reasons: vec!["Fix failing sources".into()],
            suggested_record: "v=DMARC1; p=none".into(),
        };

        let prompt = build_prompt("example.com", &overview, &dns, &input, &heuristic);

        assert!(prompt.contains("example.com"));
        assert!(prompt.contains("`v=DMARC1; p=none`"));
        assert!(prompt.contains("- SPF: none"));
        assert!(prompt.contains("pass rate 75.0%"));
        assert!(prompt.contains("192.0.2.1: 200 messages"));
        assert!(prompt.contains("- Fix failing sources"));
    }

    #[test]
    fn reads_first_candidate_text() {
        let response: GenerateContentResponse = serde_json::from_str(
            r##"{"candidates":[{"content":{"parts":[{"text":"# Advice\n"},{"text":"Do this."}]}}]}"##,
        )
        .unwrap();
        assert_eq!(response.text().as_deref(), Some("# Advice\nDo this."));

        let empty: GenerateContentResponse = serde_json::from_str(r#"{}"#).unwrap();
        assert_eq!(empty.text(), None);
    }
}
