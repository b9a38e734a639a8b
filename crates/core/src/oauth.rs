//! Google sign-in via the implicit grant: build the authorize URL, then turn
//! the redirect fragment into a session.

use std::time::Duration;

use tracing::{info, warn};
use url::{Url, form_urlencoded};

use crate::{api::Backend, config::ClientConfig, session::SessionController};

pub const GOOGLE_AUTHORIZE_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
pub const GOOGLE_SCOPE: &str = "openid email profile";

/// How long the success screen stays up before the host navigates home.
pub const REDIRECT_DELAY: Duration = Duration::from_secs(2);

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum OAuthError {
    #[error("Google sign-in is not configured (set TUBEMENTOR_GOOGLE_CLIENT_ID)")]
    MissingClientId,
    #[error("invalid authorize url: {0}")]
    Url(#[from] url::ParseError),
}

pub fn authorize_url(config: &ClientConfig) -> Result<Url, OAuthError> {
    let client_id = config
        .google_client_id
        .as_deref()
        .ok_or(OAuthError::MissingClientId)?;
    let mut url = Url::parse(GOOGLE_AUTHORIZE_URL)?;
    url.query_pairs_mut()
        .append_pair("client_id", client_id)
        .append_pair("redirect_uri", config.oauth_redirect.as_str())
        .append_pair("response_type", "token")
        .append_pair("scope", GOOGLE_SCOPE);
    Ok(url)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fragment {
    Token(String),
    Error(String),
    Missing,
}

/// Reads the redirect fragment. Accepts a full callback URL, a `#...`
/// fragment or the bare `key=value&...` string.
pub fn parse_fragment(input: &str) -> Fragment {
    let raw = input.trim();
    let raw = match raw.split_once('#') {
        Some((_, fragment)) => fragment,
        None => raw,
    };

    let mut token = None;
    let mut error = None;
    let mut description = None;
    for (key, value) in form_urlencoded::parse(raw.as_bytes()) {
        match key.as_ref() {
            "access_token" if !value.is_empty() => token = Some(value.into_owned()),
            "error" => error = Some(value.into_owned()),
            "error_description" => description = Some(value.into_owned()),
            _ => {}
        }
    }

    match (error, token) {
        (Some(error), _) => Fragment::Error(description.unwrap_or(error)),
        (None, Some(token)) => Fragment::Token(token),
        (None, None) => Fragment::Missing,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackState {
    Processing,
    Success,
    Error(String),
}

/// The callback view: starts in `Processing` and ends in one of the two
/// terminal states.
#[derive(Debug)]
pub struct OAuthCallback {
    state: CallbackState,
}

impl Default for OAuthCallback {
    fn default() -> Self {
        Self {
            state: CallbackState::Processing,
        }
    }
}

impl OAuthCallback {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &CallbackState {
        &self.state
    }

    pub async fn complete<B: Backend + ?Sized>(
        &mut self,
        fragment: &str,
        session: &mut SessionController,
        backend: &B,
    ) -> &CallbackState {
        self.state = match parse_fragment(fragment) {
            Fragment::Error(message) => {
                warn!(%message, "google sign-in returned an error");
                CallbackState::Error(message)
            }
            Fragment::Missing => CallbackState::Error("No access token received".to_string()),
            Fragment::Token(token) => match session.login_with_google(backend, &token).await {
                Ok(user) => {
                    info!(email = %user.email, "google sign-in complete");
                    CallbackState::Success
                }
                Err(err) => CallbackState::Error(err.to_string()),
            },
        };
        &self.state
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::{error::ApiError, storage::MemoryTokenStore, testing::FakeBackend};

    #[test]
    fn authorize_url_carries_implicit_grant_params() {
        let config = ClientConfig {
            google_client_id: Some("client-1.apps.googleusercontent.com".into()),
            ..ClientConfig::default()
        };
        let url = authorize_url(&config).unwrap();
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();

        assert_eq!(url.host_str(), Some("accounts.google.com"));
        assert!(pairs.contains(&("response_type".into(), "token".into())));
        assert!(pairs.contains(&("scope".into(), "openid email profile".into())));
        assert!(pairs.contains(&(
            "redirect_uri".into(),
            "http://localhost:5173/auth/callback".into()
        )));
    }

    #[test]
    fn authorize_url_needs_client_id() {
        let config = ClientConfig {
            google_client_id: None,
            ..ClientConfig::default()
        };
        assert_eq!(authorize_url(&config), Err(OAuthError::MissingClientId));
    }

    #[test]
    fn fragment_parsing() {
        assert_eq!(
            parse_fragment("http://localhost:5173/auth/callback#access_token=ya29.x&token_type=Bearer"),
            Fragment::Token("ya29.x".into())
        );
        assert_eq!(
            parse_fragment("#error=access_denied"),
            Fragment::Error("access_denied".into())
        );
        assert_eq!(
            parse_fragment("error=invalid_request&error_description=Bad+redirect"),
            Fragment::Error("Bad redirect".into())
        );
        assert_eq!(parse_fragment("#state=abc"), Fragment::Missing);
    }

    #[tokio::test]
    async fn error_fragment_skips_exchange() {
        let backend = FakeBackend::new();
        let mut session = SessionController::new(Box::new(MemoryTokenStore::default()));
        let mut callback = OAuthCallback::new();

        let state = callback
            .complete("#error=access_denied", &mut session, &backend)
            .await;

        assert_eq!(state, &CallbackState::Error("access_denied".into()));
        assert!(backend.calls().is_empty());
        assert!(!session.is_authenticated());
    }

    #[tokio::test]
    async fn token_fragment_signs_in() {
        let backend = FakeBackend::new();
        backend.respond(
            "google",
            json!({
                "access_token": "jwt-g",
                "user": {"id": 1, "email": "g@example.com", "auth_provider": "google"}
            }),
        );
        let mut session = SessionController::new(Box::new(MemoryTokenStore::default()));
        let mut callback = OAuthCallback::new();

        let state = callback
            .complete("#access_token=ya29.x", &mut session, &backend)
            .await;

        assert_eq!(state, &CallbackState::Success);
        assert!(session.is_authenticated());
        assert_eq!(backend.bearer().as_deref(), Some("jwt-g"));
    }

    #[tokio::test]
    async fn rejected_exchange_ends_in_error() {
        let backend = FakeBackend::new();
        backend.fail(
            "google",
            ApiError::Status {
                status: 401,
                detail: Some("Invalid Google token".into()),
            },
        );
        let mut session = SessionController::new(Box::new(MemoryTokenStore::default()));
        let mut callback = OAuthCallback::new();

        let state = callback
            .complete("#access_token=stale", &mut session, &backend)
            .await;

        assert_eq!(state, &CallbackState::Error("Invalid Google token".into()));
    }
}
