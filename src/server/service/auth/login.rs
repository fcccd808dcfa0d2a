use oauth2::{CsrfToken, Scope};
use url::Url;

use crate::server::service::auth::GoogleAuthService;

impl<'a> GoogleAuthService<'a> {
    /// Builds the Google authorize URL and the CSRF state to store in the session.
    pub fn login_url(&self) -> (Url, CsrfToken) {
        let (authorize_url, csrf_state) = self
            .oauth_client
            .authorize_url(CsrfToken::new_random)
            .add_scope(Scope::new("openid".to_string()))
            .add_scope(Scope::new("email".to_string()))
            .add_scope(Scope::new("profile".to_string()))
            .url();

        (authorize_url, csrf_state)
    }
}
