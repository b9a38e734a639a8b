//! Client configuration loaded from the environment.
//!
//! A `.env` file in the working directory is honoured for local development,
//! except in tests so they stay hermetic.

use std::path::PathBuf;

use url::Url;

pub const DEFAULT_API_URL: &str = "http://localhost:8000";
pub const DEFAULT_OAUTH_REDIRECT: &str = "http://localhost:5173/auth/callback";

/// Client id baked in at build time, if the builder exported one.
const BUILD_GOOGLE_CLIENT_ID: Option<&str> = option_env!("TUBEMENTOR_GOOGLE_CLIENT_ID");

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub api_url: Url,
    pub token_dir: Option<PathBuf>,
    pub google_client_id: Option<String>,
    pub oauth_redirect: Url,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: Url::parse(DEFAULT_API_URL).expect("default api url is valid"),
            token_dir: default_token_dir(),
            google_client_id: BUILD_GOOGLE_CLIENT_ID.map(str::to_string),
            oauth_redirect: Url::parse(DEFAULT_OAUTH_REDIRECT)
                .expect("default redirect url is valid"),
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let api_url = match lookup("TUBEMENTOR_API_URL") {
            Some(raw) => parse_url("TUBEMENTOR_API_URL", &raw)?,
            None => defaults.api_url,
        };

        let oauth_redirect = match lookup("TUBEMENTOR_OAUTH_REDIRECT") {
            Some(raw) => parse_url("TUBEMENTOR_OAUTH_REDIRECT", &raw)?,
            None => defaults.oauth_redirect,
        };

        let token_dir = lookup("TUBEMENTOR_TOKEN_DIR")
            .map(PathBuf::from)
            .or(defaults.token_dir);

        let google_client_id = lookup("TUBEMENTOR_GOOGLE_CLIENT_ID")
            .filter(|id| !id.trim().is_empty())
            .or(defaults.google_client_id);

        Ok(Self {
            api_url,
            token_dir,
            google_client_id,
            oauth_redirect,
        })
    }

    pub fn with_api_url(mut self, raw: &str) -> Result<Self, ConfigError> {
        self.api_url = parse_url("--api-url", raw)?;
        Ok(self)
    }
}

pub fn default_token_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("tubementor"))
}

fn parse_url(name: &str, raw: &str) -> Result<Url, ConfigError> {
    Url::parse(raw.trim()).map_err(|e| ConfigError::InvalidValue(name.to_string(), e.to_string()))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = ClientConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.api_url.as_str(), "http://localhost:8000/");
        assert_eq!(config.oauth_redirect.as_str(), DEFAULT_OAUTH_REDIRECT);
    }

    #[test]
    fn reads_overrides() {
        let config = ClientConfig::from_lookup(lookup(&[
            ("TUBEMENTOR_API_URL", "https://api.tubementor.dev"),
            ("TUBEMENTOR_TOKEN_DIR", "/tmp/tm"),
            ("TUBEMENTOR_GOOGLE_CLIENT_ID", "client-123"),
        ]))
        .unwrap();
        assert_eq!(config.api_url.host_str(), Some("api.tubementor.dev"));
        assert_eq!(config.token_dir, Some(PathBuf::from("/tmp/tm")));
        assert_eq!(config.google_client_id.as_deref(), Some("client-123"));
    }

    #[test]
    fn rejects_invalid_url() {
        let err = ClientConfig::from_lookup(lookup(&[("TUBEMENTOR_API_URL", "not a url")]))
            .unwrap_err();
        assert!(err.to_string().contains("TUBEMENTOR_API_URL"));
    }
}
