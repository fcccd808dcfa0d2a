//! Outbound chat webhooks for alerts and scheduled summaries.
//!
//! Slack and generic webhooks receive JSON over the shared reqwest client.
//! Discord webhooks go through serenity so the message renders as an embed.

use serde_json::json;
use serenity::{
    all::{CreateEmbed, CreateEmbedFooter, ExecuteWebhook, Webhook},
    http::Http,
};

use crate::{
    model::alert::{Severity, WebhookKind},
    server::error::AppError,
};

/// Message posted to a webhook.
#[derive(Debug, Clone)]
pub struct Notification {
    pub title: String,
    pub text: String,
    pub severity: Severity,
    /// Name/value pairs rendered as embed fields on Discord and appended as
    /// lines elsewhere.
    pub fields: Vec<(String, String)>,
    pub link: Option<String>,
}

impl Notification {
    /// Plain-text rendering used for Slack.
    pub fn to_text(&self) -> String {
        let mut text = format!("*{}*\n{}", self.title, self.text);
        for (name, value) in &self.fields {
            text.push_str(&format!("\n• {}: {}", name, value));
        }
        if let Some(link) = &self.link {
            text.push_str(&format!("\n<{}|Open dashboard>", link));
        }
        text
    }

    fn color(&self) -> u32 {
        match self.severity {
            Severity::Info => 0x3b82f6,
            Severity::Warning => 0xf59e0b,
            Severity::Critical => 0xef4444,
        }
    }
}

pub struct WebhookNotifier<'a> {
    http_client: &'a reqwest::Client,
    discord_http: &'a Http,
}

impl<'a> WebhookNotifier<'a> {
    pub fn new(http_client: &'a reqwest::Client, discord_http: &'a Http) -> Self {
        Self {
            http_client,
            discord_http,
        }
    }

    /// Posts a notification to a webhook.
    ///
    /// # Returns
    /// - `Ok(())` - Webhook accepted the message
    /// - `Err(AppError)` - Request failed or returned a non-success status
    pub async fn send(
        &self,
        url: &str,
        kind: WebhookKind,
        notification: &Notification,
    ) -> Result<(), AppError> {
        match kind {
            WebhookKind::Slack => {
                self.http_client
                    .post(url)
                    .json(&json!({ "text": notification.to_text() }))
                    .send()
                    .await?
                    .error_for_status()?;
            }
            WebhookKind::Generic => {
                let fields: serde_json::Map<String, serde_json::Value> = notification
                    .fields
                    .iter()
                    .map(|(k, v)| (k.clone(), json!(v)))
                    .collect();
                self.http_client
                    .post(url)
                    .json(&json!({
                        "title": notification.title,
                        "text": notification.text,
                        "severity": notification.severity.as_str(),
                        "fields": fields,
                        "link": notification.link,
                    }))
                    .send()
                    .await?
                    .error_for_status()?;
            }
            WebhookKind::Discord => {
                let webhook = Webhook::from_url(self.discord_http, url).await?;

                let mut embed = CreateEmbed::new()
                    .title(&notification.title)
                    .description(&notification.text)
                    .color(notification.color())
                    .footer(CreateEmbedFooter::new("DMARC Analyser"));
                if let Some(link) = &notification.link {
                    embed = embed.url(link);
                }
                for (name, value) in &notification.fields {
                    embed = embed.field(name, value, true);
                }

                webhook
                    .execute(self.discord_http, false, ExecuteWebhook::new().embed(embed))
                    .await?;
            }
        }

        Ok(())
    }

    /// Sends a notification, logging instead of returning failures.
    pub async fn send_logged(&self, url: &str, kind: WebhookKind, notification: &Notification) {
        if let Err(e) = self.send(url, kind, notification).await {
            tracing::warn!(
                "Failed to deliver {} webhook '{}': {}",
                kind.as_str(),
                notification.title,
                e
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Expected: title in bold, then text, fields and link on their own lines
    #[test]
    fn renders_slack_text() {
        let notification = Notification {
            title: "Pass rate dropped".into(),
            text: "example.com is at 80%".into(),
            severity: Severity::Warning,
            fields: vec![("Threshold".into(), "90%".into())],
            link: Some("https://app.test/domains/1".into()),
        };

        assert_eq!(
            notification.to_text(),
            "*Pass rate dropped*\nexample.com is at 80%\n• Threshold: 90%\n<https://app.test/domains/1|Open dashboard>"
        );
    }
}
