use thiserror::Error;

/// Failure of a single backend call.
///
/// Kept `Clone` so completions can travel through GUI message queues.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApiError {
    #[error("Request failed: {0}")]
    Transport(String),

    #[error("Server returned {status}{}", .detail.as_deref().map(|d| format!(": {d}")).unwrap_or_default())]
    Status { status: u16, detail: Option<String> },

    #[error("{0}")]
    Domain(String),

    #[error("Unexpected response: {0}")]
    Decode(String),
}

impl ApiError {
    /// Server-supplied message, if the backend sent one.
    pub fn detail(&self) -> Option<&str> {
        match self {
            ApiError::Status { detail, .. } => detail.as_deref(),
            ApiError::Domain(message) => Some(message),
            _ => None,
        }
    }

    /// One-line message for a toast: the server detail when present,
    /// otherwise `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        match self.detail() {
            Some(detail) if !detail.trim().is_empty() => detail.to_string(),
            _ => fallback.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::Status { status: 404, .. })
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else {
            ApiError::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Decode(err.to_string())
    }
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Token storage I/O error at {path}: {source}")]
    Io {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("No directory available for token storage")]
    NoDirectory,
}

#[derive(Error, Debug)]
pub enum AuthError {
    /// Credentials or token refused; carries the message shown to the user.
    #[error("{0}")]
    Rejected(String),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

pub type Result<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_message_prefers_server_detail() {
        let err = ApiError::Status {
            status: 400,
            detail: Some("Summary not found. Generate a summary first.".into()),
        };
        assert_eq!(
            err.user_message("Failed to generate PDF"),
            "Summary not found. Generate a summary first."
        );
    }

    #[test]
    fn user_message_falls_back_without_detail() {
        let err = ApiError::Status {
            status: 502,
            detail: None,
        };
        assert_eq!(err.user_message("Failed to load transcript"), "Failed to load transcript");

        let err = ApiError::Transport("connection refused".into());
        assert_eq!(err.user_message("Search failed"), "Search failed");
    }

    #[test]
    fn domain_failure_exposes_its_message() {
        let err = ApiError::Domain("ElevenLabs quota exceeded".into());
        assert_eq!(err.user_message("Voice generation failed"), "ElevenLabs quota exceeded");
    }

    #[test]
    fn status_display_includes_detail() {
        let err = ApiError::Status {
            status: 404,
            detail: Some("File not found".into()),
        };
        assert_eq!(err.to_string(), "Server returned 404: File not found");
        assert!(err.is_not_found());
    }
}
