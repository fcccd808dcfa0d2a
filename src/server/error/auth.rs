use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use oauth2::{basic::BasicErrorResponseType, HttpClientError, RequestTokenError, StandardErrorResponse};
use thiserror::Error;

use crate::model::api::ErrorDto;

#[derive(Error, Debug)]
pub enum AuthError {
    /// No user id stored in the session.
    ///
    /// Results in a 401 Unauthorized response.
    #[error("User not found in session")]
    UserNotInSession,

    /// Session refers to a user that no longer exists.
    ///
    /// Results in a 401 Unauthorized response.
    #[error("User {0} stored in session was not found in database")]
    UserNotInDatabase(i32),

    /// User is not a member of the organization, or it doesn't exist.
    ///
    /// Both cases result in the same 404 Not Found response so that the
    /// existence of an organization is not revealed to outsiders.
    #[error("Organization {0} not found")]
    OrganizationNotFound(i32),

    /// User is a member but lacks the required role.
    ///
    /// Results in a 403 Forbidden response.
    ///
    /// # Fields
    /// - User ID that was denied
    /// - Reason, logged server-side only
    #[error("Access denied for user {0}: {1}")]
    AccessDenied(i32, String),

    /// Bearer key is missing, malformed, unknown or revoked.
    ///
    /// Results in a 401 Unauthorized response.
    #[error("Invalid API key")]
    InvalidApiKey,

    /// CSRF state validation failed during OAuth callback.
    ///
    /// The CSRF state token in the OAuth callback URL does not match the token stored
    /// in the session, indicating a potential CSRF attack or an invalid callback request.
    /// Results in a 400 Bad Request response.
    #[error("Failed to login user due to CSRF state mismatch")]
    CsrfValidationFailed,

    /// Invitation token is unknown, expired, already accepted or addressed
    /// to a different email.
    ///
    /// Results in a 400 Bad Request response.
    #[error("Invalid invitation: {0}")]
    InvalidInvitation(String),

    /// Exchanging an authorization code or refresh token with Google failed.
    ///
    /// Results in a 500 Internal Server Error response.
    #[error("Failed to exchange OAuth token: {0}")]
    TokenExchange(String),
}

impl From<RequestTokenError<HttpClientError<reqwest::Error>, StandardErrorResponse<BasicErrorResponseType>>>
    for AuthError
{
    fn from(
        err: RequestTokenError<
            HttpClientError<reqwest::Error>,
            StandardErrorResponse<BasicErrorResponseType>,
        >,
    ) -> Self {
        Self::TokenExchange(err.to_string())
    }
}

/// Converts authentication errors into HTTP responses.
///
/// Maps authentication errors to appropriate HTTP status codes and user-friendly error messages:
/// - `UserNotInSession` / `UserNotInDatabase` / `InvalidApiKey` → 401 Unauthorized
/// - `OrganizationNotFound` → 404 Not Found
/// - `AccessDenied` → 403 Forbidden
/// - `CsrfValidationFailed` / `InvalidInvitation` → 400 Bad Request
/// - `TokenExchange` → 500 Internal Server Error with generic message
///
/// All errors are logged at debug level for diagnostics while keeping client-facing messages
/// generic to avoid information leakage.
impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        tracing::debug!("{}", self);

        let (status, message) = match self {
            Self::UserNotInSession | Self::UserNotInDatabase(_) => {
                (StatusCode::UNAUTHORIZED, "Not logged in".to_string())
            }
            Self::InvalidApiKey => (StatusCode::UNAUTHORIZED, "Invalid API key".to_string()),
            Self::OrganizationNotFound(_) => {
                (StatusCode::NOT_FOUND, "Organization not found".to_string())
            }
            Self::AccessDenied(_, _) => (
                StatusCode::FORBIDDEN,
                "You don't have permission to perform this action".to_string(),
            ),
            Self::CsrfValidationFailed => (
                StatusCode::BAD_REQUEST,
                "There was an issue logging you in, please try again.".to_string(),
            ),
            Self::InvalidInvitation(reason) => (StatusCode::BAD_REQUEST, reason),
            Self::TokenExchange(err) => {
                tracing::error!("OAuth token exchange failed: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        (status, Json(ErrorDto { error: message })).into_response()
    }
}
