use chrono::{DateTime, Utc};

use crate::model::{ai::AiIntegrationDto, recommendation::AiRecommendationDto};

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";

#[derive(Debug, Clone, PartialEq)]
pub struct AiIntegration {
    pub id: i32,
    pub organization_id: i32,
    pub provider: String,
    pub api_key: String,
    pub model: String,
    pub enabled: bool,
    pub updated_at: DateTime<Utc>,
}

impl AiIntegration {
    pub fn from_entity(entity: entity::ai_integration::Model) -> Self {
        Self {
            id: entity.id,
            organization_id: entity.organization_id,
            provider: entity.provider,
            api_key: entity.api_key,
            model: entity.model,
            enabled: entity.enabled,
            updated_at: entity.updated_at,
        }
    }

    /// Converts to a DTO exposing only the last four characters of the key.
    pub fn into_dto(self) -> AiIntegrationDto {
        let chars: Vec<char> = self.api_key.chars().collect();
        let tail: String = chars[chars.len().saturating_sub(4)..].iter().collect();
        AiIntegrationDto {
            organization_id: self.organization_id,
            provider: self.provider,
            model: self.model,
            enabled: self.enabled,
            api_key_hint: format!("****{}", tail),
            updated_at: self.updated_at,
        }
    }
}

#[derive(Debug, Clone)]
pub struct UpsertAiIntegrationParams {
    pub organization_id: i32,
    pub api_key: Option<String>,
    pub model: String,
    pub enabled: bool,
}

/// Cached AI answer for a domain.
#[derive(Debug, Clone, PartialEq)]
pub struct AiRecommendation {
    pub domain_id: i32,
    pub model: String,
    pub markdown: String,
    pub cached: bool,
    pub generated_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl AiRecommendation {
    pub fn from_entity(entity: entity::ai_recommendation_cache::Model, cached: bool) -> Self {
        Self {
            domain_id: entity.domain_id,
            model: entity.model,
            markdown: entity.content,
            cached,
            generated_at: entity.created_at,
            expires_at: entity.expires_at,
        }
    }

    pub fn into_dto(self) -> AiRecommendationDto {
        let mut html = String::new();
        let parser = pulldown_cmark::Parser::new(&self.markdown);
        pulldown_cmark::html::push_html(&mut html, parser);

        AiRecommendationDto {
            domain_id: self.domain_id,
            model: self.model,
            markdown: self.markdown,
            html,
            cached: self.cached,
            generated_at: self.generated_at,
            expires_at: self.expires_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Expected: key masked to its last four characters
    #[test]
    fn masks_api_key() {
        let integration = AiIntegration {
            id: 1,
            organization_id: 1,
            provider: "gemini".into(),
            api_key: "AIzaSyExample1234".into(),
            model: DEFAULT_GEMINI_MODEL.into(),
            enabled: true,
            updated_at: Utc::now(),
        };
        assert_eq!(integration.into_dto().api_key_hint, "****1234");
    }

    /// Expected: markdown rendered to HTML
    #[test]
    fn renders_markdown() {
        let rec = AiRecommendation {
            domain_id: 1,
            model: "m".into(),
            markdown: "# Title\n\n* item".into(),
            cached: false,
            generated_at: Utc::now(),
            expires_at: Utc::now(),
        };
        let dto = rec.into_dto();
        assert!(dto.html.contains("<h1>Title</h1>"));
        assert!(dto.html.contains("<li>item</li>"));
    }
}
