//! Known sending services recognised by reverse-DNS hostname.

use sea_orm::DatabaseConnection;

use crate::server::{
    data::known_sender::KnownSenderRepository,
    error::AppError,
    model::source::{CreateKnownSenderParams, KnownSender},
    util::parse::normalize_domain,
};

/// Global senders available to every organization: `(name, hostname suffix, description)`.
const DEFAULT_SENDERS: &[(&str, &str, &str)] = &[
    ("Google Workspace", "google.com", "Gmail and Google Workspace"),
    ("Microsoft 365", "outlook.com", "Exchange Online Protection"),
    ("Microsoft 365", "protection.outlook.com", "Exchange Online Protection"),
    ("Amazon SES", "amazonses.com", "Amazon Simple Email Service"),
    ("SendGrid", "sendgrid.net", "Twilio SendGrid"),
    ("Mailchimp", "mcsv.net", "Mailchimp campaigns"),
    ("Mandrill", "mandrillapp.com", "Mailchimp transactional"),
    ("Mailgun", "mailgun.net", "Mailgun"),
    ("Postmark", "mtasv.net", "Postmark"),
    ("SparkPost", "sparkpostmail.com", "SparkPost"),
    ("Zendesk", "zendesk.com", "Zendesk support mail"),
    ("Salesforce", "salesforce.com", "Salesforce and Marketing Cloud"),
    ("Salesforce", "exacttarget.com", "Salesforce Marketing Cloud"),
    ("HubSpot", "hubspotemail.net", "HubSpot marketing mail"),
    ("Zoho", "zoho.com", "Zoho Mail"),
];

pub struct KnownSenderService<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> KnownSenderService<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Inserts the built-in global senders missing from the database.
    ///
    /// # Returns
    /// - `Ok(count)` - Number of senders inserted
    pub async fn seed_defaults(&self) -> Result<usize, AppError> {
        let repo = KnownSenderRepository::new(self.db);

        let mut inserted = 0;
        for (name, suffix, description) in DEFAULT_SENDERS {
            if repo.global_exists(suffix).await? {
                continue;
            }
            repo.create(CreateKnownSenderParams {
                organization_id: None,
                name: name.to_string(),
                hostname_suffix: suffix.to_string(),
                description: Some(description.to_string()),
            })
            .await?;
            inserted += 1;
        }

        Ok(inserted)
    }

    pub async fn list(&self, organization_id: i32) -> Result<Vec<KnownSender>, AppError> {
        Ok(KnownSenderRepository::new(self.db)
            .list_for_organization(organization_id)
            .await?)
    }

    /// Adds an organization-specific sender.
    ///
    /// # Returns
    /// - `Err(AppError::BadRequest)` - Blank name or invalid hostname suffix
    pub async fn create(&self, params: CreateKnownSenderParams) -> Result<KnownSender, AppError> {
        let name = params.name.trim().to_string();
        if name.is_empty() {
            return Err(AppError::BadRequest("Sender name is required".to_string()));
        }
        let Some(suffix) = normalize_domain(params.hostname_suffix.trim_start_matches('.')) else {
            return Err(AppError::BadRequest(format!(
                "'{}' is not a valid hostname suffix",
                params.hostname_suffix
            )));
        };

        Ok(KnownSenderRepository::new(self.db)
            .create(CreateKnownSenderParams {
                name,
                hostname_suffix: suffix,
                ..params
            })
            .await?)
    }

    pub async fn delete(&self, organization_id: i32, id: i32) -> Result<bool, AppError> {
        Ok(KnownSenderRepository::new(self.db)
            .delete(organization_id, id)
            .await?)
    }
}

/// Picks the sender matching `hostname`, preferring the longest suffix.
pub fn classify<'s>(senders: &'s [KnownSender], hostname: &str) -> Option<&'s KnownSender> {
    senders
        .iter()
        .filter(|s| s.matches(hostname))
        .max_by_key(|s| s.hostname_suffix.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sender(id: i32, suffix: &str) -> KnownSender {
        KnownSender {
            id,
            organization_id: None,
            name: suffix.into(),
            hostname_suffix: suffix.into(),
            description: None,
        }
    }

    /// Expected: most specific suffix wins, unmatched hosts yield None
    #[test]
    fn classifies_by_longest_suffix() {
        let senders = vec![sender(1, "outlook.com"), sender(2, "protection.outlook.com")];

        let hit = classify(&senders, "mail-db5eur01.outbound.protection.outlook.com");
        assert_eq!(hit.map(|s| s.id), Some(2));
        assert_eq!(classify(&senders, "smtp.outlook.com").map(|s| s.id), Some(1));
        assert!(classify(&senders, "mx.example.net").is_none());
    }
}
