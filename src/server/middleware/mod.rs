//! Request authentication: session wrappers, the session-based [`auth::AuthGuard`]
//! and the API key guard used for machine ingestion.

pub mod api_key;
pub mod auth;
pub mod session;

#[cfg(test)]
mod test;
