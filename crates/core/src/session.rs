//! Auth session: one object that owns the current user and token, persists
//! the token, and keeps the backend's bearer header in sync.

use tracing::{info, warn};

use crate::{
    api::Backend,
    error::{ApiError, AuthError, StorageError},
    storage::TokenStore,
    types::{AuthGrant, Credentials, SignupForm, UserProfile},
};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    pub user: Option<UserProfile>,
    pub token: Option<String>,
}

pub struct SessionController {
    store: Box<dyn TokenStore>,
    session: Session,
}

impl SessionController {
    pub fn new(store: Box<dyn TokenStore>) -> Self {
        Self {
            store,
            session: Session::default(),
        }
    }

    pub fn user(&self) -> Option<&UserProfile> {
        self.session.user.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.user.is_some() && self.session.token.is_some()
    }

    /// Restores the session from storage, validating the stored token with
    /// the backend. A rejected token logs out; with no token nothing is
    /// sent.
    pub async fn hydrate<B: Backend + ?Sized>(&mut self, backend: &B) -> Result<(), StorageError> {
        let Some(token) = self.store.load()? else {
            self.session = Session::default();
            return Ok(());
        };

        match backend.current_user(&token).await {
            Ok(user) => {
                info!(email = %user.email, "session restored");
                backend.set_bearer(Some(token.clone()));
                self.session = Session {
                    user: Some(user),
                    token: Some(token),
                };
            }
            Err(err @ ApiError::Status { .. }) => {
                warn!(error = %err, "stored token rejected, logging out");
                self.logout(backend)?;
            }
            Err(err) => {
                // Backend unreachable: keep the token for the next attempt.
                warn!(error = %err, "could not validate stored token");
                self.session = Session::default();
            }
        }
        Ok(())
    }

    pub async fn login<B: Backend + ?Sized>(
        &mut self,
        backend: &B,
        email: &str,
        password: &str,
    ) -> Result<&UserProfile, AuthError> {
        let credentials = Credentials {
            email: email.trim().to_string(),
            password: password.to_string(),
        };
        let grant = backend
            .login(&credentials)
            .await
            .map_err(|e| AuthError::Rejected(e.user_message("Login failed")))?;
        self.establish(backend, grant)
    }

    pub async fn signup<B: Backend + ?Sized>(
        &mut self,
        backend: &B,
        form: SignupForm,
    ) -> Result<&UserProfile, AuthError> {
        let grant = backend
            .signup(&form)
            .await
            .map_err(|e| AuthError::Rejected(e.user_message("Signup failed")))?;
        self.establish(backend, grant)
    }

    /// Trades a Google access token for a TubeMentor session.
    pub async fn login_with_google<B: Backend + ?Sized>(
        &mut self,
        backend: &B,
        access_token: &str,
    ) -> Result<&UserProfile, AuthError> {
        let grant = backend
            .google(access_token)
            .await
            .map_err(|e| AuthError::Rejected(e.user_message("Google login failed")))?;
        self.establish(backend, grant)
    }

    /// Forgets the session locally. The backend keeps no session state, so
    /// nothing is sent.
    pub fn logout<B: Backend + ?Sized>(&mut self, backend: &B) -> Result<(), StorageError> {
        backend.set_bearer(None);
        self.session = Session::default();
        self.store.clear()
    }

    fn establish<B: Backend + ?Sized>(
        &mut self,
        backend: &B,
        grant: AuthGrant,
    ) -> Result<&UserProfile, AuthError> {
        self.store.save(&grant.access_token)?;
        backend.set_bearer(Some(grant.access_token.clone()));
        info!(email = %grant.user.email, provider = %grant.user.auth_provider, "signed in");
        self.session = Session {
            user: Some(grant.user),
            token: Some(grant.access_token),
        };
        self.session
            .user
            .as_ref()
            .ok_or_else(|| AuthError::Rejected("Login failed".to_string()))
    }
}
