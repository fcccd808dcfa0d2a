//! Typed access to session keys.
//!
//! - `AuthSession` - Signed-in user id
//! - `CsrfSession` - OAuth `state` for the sign-in and Gmail flows
//! - `GmailFlowSession` - Organization a Gmail mailbox is being connected to

use tower_sessions::Session;

use crate::server::{error::AppError, util::parse::parse_i32_from_string};

const SESSION_AUTH_USER_ID: &str = "auth:user";
const SESSION_AUTH_CSRF_TOKEN: &str = "auth:csrf_token";
const SESSION_GMAIL_ORGANIZATION_ID: &str = "gmail:organization";

/// Signed-in user of the session.
pub struct AuthSession<'a> {
    session: &'a Session,
}

impl<'a> AuthSession<'a> {
    pub fn new(session: &'a Session) -> Self {
        Self { session }
    }

    /// Signs `user_id` in, issuing a new session id first.
    pub async fn set_user_id(&self, user_id: i32) -> Result<(), AppError> {
        self.session.cycle_id().await?;
        self.session
            .insert(SESSION_AUTH_USER_ID, user_id.to_string())
            .await?;
        Ok(())
    }

    /// # Returns
    /// - `Ok(Some(user_id))` - Signed in
    /// - `Ok(None)` - Anonymous session
    pub async fn get_user_id(&self) -> Result<Option<i32>, AppError> {
        let Some(user_id_str) = self.session.get::<String>(SESSION_AUTH_USER_ID).await? else {
            return Ok(None);
        };

        let user_id = parse_i32_from_string(user_id_str)?;

        Ok(Some(user_id))
    }

    /// Drops everything stored in the session, including pending OAuth state.
    pub async fn clear(&self) {
        self.session.clear().await;
    }
}

/// OAuth `state` value awaiting its callback.
pub struct CsrfSession<'a> {
    session: &'a Session,
}

impl<'a> CsrfSession<'a> {
    pub fn new(session: &'a Session) -> Self {
        Self { session }
    }

    pub async fn set_token(&self, token: String) -> Result<(), AppError> {
        self.session.insert(SESSION_AUTH_CSRF_TOKEN, token).await?;
        Ok(())
    }

    /// Removes and returns the stored token, so each one is accepted once.
    pub async fn take_token(&self) -> Result<Option<String>, AppError> {
        let token = self.session.remove(SESSION_AUTH_CSRF_TOKEN).await?;
        Ok(token)
    }
}

/// Gmail connection flow state.
///
/// Remembers which organization a mailbox is being connected to across the
/// redirect to Google and back.
pub struct GmailFlowSession<'a> {
    session: &'a Session,
}

impl<'a> GmailFlowSession<'a> {
    pub fn new(session: &'a Session) -> Self {
        Self { session }
    }

    pub async fn set_organization_id(&self, organization_id: i32) -> Result<(), AppError> {
        self.session
            .insert(SESSION_GMAIL_ORGANIZATION_ID, organization_id)
            .await?;
        Ok(())
    }

    /// Retrieves and removes the pending organization ID.
    pub async fn take_organization_id(&self) -> Result<Option<i32>, AppError> {
        let organization_id = self.session.remove(SESSION_GMAIL_ORGANIZATION_ID).await?;
        Ok(organization_id)
    }
}
