use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::{DateTime, Duration, Utc};
use oauth2::{RefreshToken, TokenResponse};
use serde::Deserialize;

use crate::{
    model::{gmail::SyncStatus, report::ReportKind},
    server::{
        data::gmail_account::GmailAccountRepository,
        error::{auth::AuthError, AppError},
        model::gmail::{GmailAccount, GmailSyncResult},
        service::{
            gmail::{GmailService, GMAIL_API_URL},
            ingest::IngestService,
        },
    },
};

const REPORT_QUERY: &str = r#"has:attachment (subject:"Report Domain" OR subject:DMARC)"#;
/// Upper bound of messages fetched per sync run. The oldest are taken first and
/// the rest are left for the next run.
const MAX_MESSAGES_PER_SYNC: usize = 500;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct MessageList {
    #[serde(default)]
    messages: Vec<MessageRef>,
    next_page_token: Option<String>,
}

#[derive(Deserialize)]
struct MessageRef {
    id: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Message {
    /// Receive time in epoch milliseconds.
    internal_date: Option<String>,
    payload: Option<MessagePart>,
}

#[derive(Deserialize)]
struct RawMessage {
    raw: String,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct MessagePart {
    #[serde(default)]
    mime_type: String,
    #[serde(default)]
    filename: String,
    body: Option<PartBody>,
    #[serde(default)]
    parts: Vec<MessagePart>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PartBody {
    attachment_id: Option<String>,
    data: Option<String>,
}

#[derive(Deserialize)]
struct AttachmentBody {
    data: String,
}

/// Where the content of a report attachment is found.
#[derive(Debug, Clone, PartialEq)]
enum AttachmentSource {
    Inline(String),
    Remote(String),
}

/// Report content located in a message.
#[derive(Debug, Default, PartialEq)]
struct MessageReports {
    attachments: Vec<AttachmentSource>,
    forensic: bool,
}

impl<'a> GmailService<'a> {
    /// Syncs one account on request of a user.
    ///
    /// # Returns
    /// - `Ok(GmailSyncResult)` - Counts of processed messages and reports
    /// - `Err(AppError::NotFound)` - Account not in the organization
    /// - `Err(AppError::BadRequest)` - A sync of the account is already running
    pub async fn sync(
        &self,
        organization_id: i32,
        id: i32,
        ingest: &IngestService<'_>,
    ) -> Result<GmailSyncResult, AppError> {
        let account = GmailAccountRepository::new(self.db)
            .find(organization_id, id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Gmail account {} not found", id)))?;

        if account.sync_status == SyncStatus::Syncing {
            return Err(AppError::BadRequest(
                "A sync of this account is already in progress".to_string(),
            ));
        }

        self.sync_account(&account, ingest).await
    }

    /// Syncs every connected account, skipping those already syncing.
    ///
    /// # Returns
    /// - `Ok(count)` - Number of accounts synced successfully
    pub async fn sync_all(&self, ingest: &IngestService<'_>) -> Result<usize, AppError> {
        let accounts = GmailAccountRepository::new(self.db).list_all().await?;

        let mut synced = 0;
        for account in accounts {
            if account.sync_status == SyncStatus::Syncing {
                tracing::debug!("Skipping Gmail account {}, sync in progress", account.id);
                continue;
            }
            match self.sync_account(&account, ingest).await {
                Ok(_) => synced += 1,
                Err(e) => tracing::warn!("Gmail sync of account {} failed: {}", account.id, e),
            }
        }

        Ok(synced)
    }

    /// Runs one sync, tracking progress in the account's status column.
    async fn sync_account(
        &self,
        account: &GmailAccount,
        ingest: &IngestService<'_>,
    ) -> Result<GmailSyncResult, AppError> {
        let repo = GmailAccountRepository::new(self.db);
        let started_at = Utc::now();

        repo.set_status(account.id, SyncStatus::Syncing, None).await?;

        match self.fetch_and_ingest(account, ingest).await {
            Ok((result, batch)) => {
                let cursor = next_sync_cursor(account.last_sync_at, started_at, &batch);
                repo.mark_synced(account.id, cursor).await?;
                tracing::info!(
                    "Synced Gmail account {}: {} messages, {} reports, {} duplicates, {} failures",
                    account.email,
                    result.messages,
                    result.reports,
                    result.duplicates,
                    result.failures
                );
                Ok(result)
            }
            Err(e) => {
                repo.set_status(account.id, SyncStatus::Error, Some(e.to_string()))
                    .await?;
                Err(e)
            }
        }
    }

    async fn fetch_and_ingest(
        &self,
        account: &GmailAccount,
        ingest: &IngestService<'_>,
    ) -> Result<(GmailSyncResult, SyncBatch), AppError> {
        let access_token = self.access_token(account).await?;
        let listed = self
            .list_messages(&access_token, account.last_sync_at)
            .await?;
        let (message_ids, truncated) = oldest_first(listed, MAX_MESSAGES_PER_SYNC);
        if truncated {
            tracing::info!(
                "Gmail account {} has more than {} report mails, the rest follow next run",
                account.email,
                MAX_MESSAGES_PER_SYNC
            );
        }

        let mut result = GmailSyncResult {
            messages: message_ids.len() as u64,
            ..Default::default()
        };
        let mut batch = SyncBatch {
            truncated,
            newest_received: None,
        };

        for message_id in message_ids {
            let message: Message = self
                .get_json(&access_token, &format!("messages/{}?format=full", message_id))
                .await?;
            let received = message
                .internal_date
                .as_deref()
                .and_then(parse_internal_date);
            batch.newest_received = batch.newest_received.max(received);
            let Some(payload) = message.payload else {
                continue;
            };
            let reports = find_reports(&payload);

            for attachment in reports.attachments {
                let bytes = match attachment {
                    AttachmentSource::Inline(data) => decode_base64url(&data),
                    AttachmentSource::Remote(attachment_id) => {
                        let body: AttachmentBody = self
                            .get_json(
                                &access_token,
                                &format!("messages/{}/attachments/{}", message_id, attachment_id),
                            )
                            .await?;
                        decode_base64url(&body.data)
                    }
                };
                let Some(bytes) = bytes else {
                    result.failures += 1;
                    continue;
                };
                self.ingest_one(account, ingest, ReportKind::Aggregate, &bytes, &mut result)
                    .await;
            }

            if reports.forensic {
                let raw: RawMessage = self
                    .get_json(&access_token, &format!("messages/{}?format=raw", message_id))
                    .await?;
                match decode_base64url(&raw.raw) {
                    Some(bytes) => {
                        self.ingest_one(account, ingest, ReportKind::Forensic, &bytes, &mut result)
                            .await
                    }
                    None => result.failures += 1,
                }
            }
        }

        Ok((result, batch))
    }

    async fn ingest_one(
        &self,
        account: &GmailAccount,
        ingest: &IngestService<'_>,
        kind: ReportKind,
        bytes: &[u8],
        result: &mut GmailSyncResult,
    ) {
        match ingest
            .ingest(account.organization_id, None, kind, bytes)
            .await
        {
            Ok(outcome) if outcome.duplicate => result.duplicates += 1,
            Ok(_) => result.reports += 1,
            Err(e) => {
                tracing::warn!(
                    "Skipping report from Gmail account {}: {}",
                    account.email,
                    e
                );
                result.failures += 1;
            }
        }
    }

    /// Returns a valid access token, refreshing and storing it when expired.
    async fn access_token(&self, account: &GmailAccount) -> Result<String, AppError> {
        if !account.token_expired(Utc::now()) {
            return Ok(account.access_token.clone());
        }

        let refresh_token = account.refresh_token.clone().ok_or_else(|| {
            AuthError::TokenExchange("No refresh token stored, reconnect the mailbox".to_string())
        })?;

        let token = self
            .oauth_client
            .exchange_refresh_token(&RefreshToken::new(refresh_token))
            .request_async(self.http_client)
            .await
            .map_err(AuthError::from)?;

        let access_token = token.access_token().secret().to_string();
        let expires_at = token
            .expires_in()
            .and_then(|d| chrono::Duration::from_std(d).ok())
            .map(|d| Utc::now() + d);

        GmailAccountRepository::new(self.db)
            .update_tokens(account.id, access_token.clone(), expires_at)
            .await?;

        Ok(access_token)
    }

    /// Ids of every report mail received after `since`, newest first.
    async fn list_messages(
        &self,
        access_token: &str,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<String>, AppError> {
        let query = search_query(since);
        let mut ids = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut request = self
                .http_client
                .get(format!("{}/messages", GMAIL_API_URL))
                .bearer_auth(access_token)
                .query(&[("q", query.as_str()), ("maxResults", "100")]);
            if let Some(token) = &page_token {
                request = request.query(&[("pageToken", token.as_str())]);
            }

            let list = request
                .send()
                .await?
                .error_for_status()?
                .json::<MessageList>()
                .await?;

            ids.extend(list.messages.into_iter().map(|m| m.id));

            match list.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        Ok(ids)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        access_token: &str,
        path: &str,
    ) -> Result<T, AppError> {
        Ok(self
            .http_client
            .get(format!("{}/{}", GMAIL_API_URL, path))
            .bearer_auth(access_token)
            .send()
            .await?
            .error_for_status()?
            .json::<T>()
            .await?)
    }
}

/// Messages processed by one sync run.
#[derive(Debug, Default, PartialEq)]
struct SyncBatch {
    /// More messages matched than one run processes.
    truncated: bool,
    /// Receive time of the newest processed message.
    newest_received: Option<DateTime<Utc>>,
}

/// Keeps the `limit` oldest of a newest-first id list, oldest first.
///
/// # Returns
/// - `(ids, truncated)` - Ids to process and whether some were left out
fn oldest_first(mut ids: Vec<String>, limit: usize) -> (Vec<String>, bool) {
    let truncated = ids.len() > limit;
    ids.reverse();
    ids.truncate(limit);
    (ids, truncated)
}

/// Lower bound of the next run's search.
///
/// A complete run moves it to the run's start. A truncated run moves it to
/// just before the newest processed message, so the unprocessed newer mails
/// are found next time; reprocessed mails are skipped as duplicates.
fn next_sync_cursor(
    previous: Option<DateTime<Utc>>,
    started_at: DateTime<Utc>,
    batch: &SyncBatch,
) -> Option<DateTime<Utc>> {
    if !batch.truncated {
        return Some(started_at);
    }
    match batch.newest_received {
        Some(received) => {
            let cursor = received - Duration::seconds(1);
            Some(previous.map_or(cursor, |p| cursor.max(p)))
        }
        None => previous,
    }
}

fn parse_internal_date(millis: &str) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp_millis(millis.parse().ok()?)
}

/// Gmail search query for report mails, limited to mails after the last sync.
fn search_query(since: Option<DateTime<Utc>>) -> String {
    match since {
        Some(at) => format!("{} after:{}", REPORT_QUERY, at.timestamp()),
        None => REPORT_QUERY.to_string(),
    }
}

/// Walks a message's MIME tree for aggregate report attachments and an ARF part.
fn find_reports(part: &MessagePart) -> MessageReports {
    let mut reports = MessageReports::default();
    collect_parts(part, &mut reports);
    reports
}

fn collect_parts(part: &MessagePart, reports: &mut MessageReports) {
    if part.mime_type.eq_ignore_ascii_case("message/feedback-report") {
        reports.forensic = true;
    } else if is_report_file(&part.filename, &part.mime_type) {
        if let Some(body) = &part.body {
            if let Some(id) = &body.attachment_id {
                reports.attachments.push(AttachmentSource::Remote(id.clone()));
            } else if let Some(data) = &body.data {
                reports.attachments.push(AttachmentSource::Inline(data.clone()));
            }
        }
    }

    for child in &part.parts {
        collect_parts(child, reports);
    }
}

fn is_report_file(filename: &str, mime_type: &str) -> bool {
    let name = filename.to_ascii_lowercase();
    if name.ends_with(".xml") || name.ends_with(".gz") || name.ends_with(".zip") {
        return true;
    }
    !filename.is_empty()
        && matches!(
            mime_type.to_ascii_lowercase().as_str(),
            "application/gzip"
                | "application/x-gzip"
                | "application/zip"
                | "application/x-zip-compressed"
                | "text/xml"
                | "application/xml"
        )
}

/// Gmail returns URL-safe base64, with or without padding.
fn decode_base64url(data: &str) -> Option<Vec<u8>> {
    URL_SAFE_NO_PAD.decode(data.trim_end_matches('=')).ok()
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn limits_query_to_last_sync() {
        assert_eq!(search_query(None), REPORT_QUERY);

        let at = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(
            search_query(Some(at)),
            format!("{} after:1767225600", REPORT_QUERY)
        );
    }

    /// Expected: nested zip attachment and ARF part found, body text ignored
    #[test]
    fn finds_report_parts() {
        let payload: MessagePart = serde_json::from_str(
            r#"{
                "mimeType": "multipart/mixed",
                "filename": "",
                "parts": [
                    {"mimeType": "text/plain", "filename": "", "body": {"data": "aGVsbG8"}},
                    {"mimeType": "multipart/mixed", "filename": "", "parts": [
                        {"mimeType": "application/zip", "filename": "google.com!example.com!1!2.zip",
                         "body": {"attachmentId": "att-1", "size": 512}}
                    ]},
                    {"mimeType": "message/feedback-report", "filename": "", "body": {"data": "eA"}}
                ]
            }"#,
        )
        .unwrap();

        let reports = find_reports(&payload);

        assert_eq!(
            reports.attachments,
            vec![AttachmentSource::Remote("att-1".into())]
        );
        assert!(reports.forensic);
    }

    #[test]
    fn decodes_padded_and_unpadded_base64url() {
        assert_eq!(decode_base64url("PD94bWw-").as_deref(), Some(&b"<?xml>"[..]));
        assert_eq!(decode_base64url("aGk=").as_deref(), Some(&b"hi"[..]));
        assert_eq!(decode_base64url("!!"), None);
    }

    /// Expected: the oldest ids kept, oldest first, truncation reported
    #[test]
    fn keeps_oldest_messages_when_over_limit() {
        let ids: Vec<String> = ["m5", "m4", "m3", "m2", "m1"].map(String::from).to_vec();

        assert_eq!(
            oldest_first(ids.clone(), 3),
            (vec!["m1".to_string(), "m2".to_string(), "m3".to_string()], true)
        );
        assert!(!oldest_first(ids, 5).1);
    }

    /// Expected: a complete run moves the cursor to its start
    #[test]
    fn complete_run_advances_cursor_to_start() {
        let previous = Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap();
        let started_at = Utc.with_ymd_and_hms(2026, 3, 2, 6, 0, 0).unwrap();
        let batch = SyncBatch {
            truncated: false,
            newest_received: Some(Utc.with_ymd_and_hms(2026, 3, 2, 5, 0, 0).unwrap()),
        };

        assert_eq!(next_sync_cursor(Some(previous), started_at, &batch), Some(started_at));
    }

    /// Tests a run that left newer messages unprocessed.
    ///
    /// Expected: cursor just before the newest processed message, never
    /// behind the previous cursor, unchanged when no receive time is known
    #[test]
    fn truncated_run_keeps_unprocessed_messages_in_range() {
        let previous = Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap();
        let started_at = Utc.with_ymd_and_hms(2026, 3, 2, 6, 0, 0).unwrap();
        let newest = Utc.with_ymd_and_hms(2026, 3, 1, 18, 0, 0).unwrap();

        let batch = SyncBatch {
            truncated: true,
            newest_received: Some(newest),
        };
        let cursor = next_sync_cursor(Some(previous), started_at, &batch);
        assert_eq!(cursor, Some(newest - Duration::seconds(1)));
        assert!(cursor < Some(started_at));

        let batch = SyncBatch {
            truncated: true,
            newest_received: Some(previous),
        };
        assert_eq!(next_sync_cursor(Some(previous), started_at, &batch), Some(previous));

        let batch = SyncBatch {
            truncated: true,
            newest_received: None,
        };
        assert_eq!(next_sync_cursor(Some(previous), started_at, &batch), Some(previous));
        assert_eq!(next_sync_cursor(None, started_at, &batch), None);
    }

    #[test]
    fn parses_internal_date_millis() {
        assert_eq!(
            parse_internal_date("1767225600123"),
            Some(Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap() + Duration::milliseconds(123))
        );
        assert_eq!(parse_internal_date("soon"), None);
    }
}
