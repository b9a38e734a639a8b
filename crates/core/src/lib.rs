pub mod action;
pub mod api;
pub mod config;
pub mod error;
pub mod format;
pub mod notice;
pub mod oauth;
pub mod quiz;
pub mod search;
pub mod session;
pub mod storage;
pub mod types;
pub mod workflow;

#[cfg(test)]
mod testing;

pub use action::ActionState;
pub use api::{ApiClient, Backend};
pub use config::{ClientConfig, ConfigError};
pub use error::{ApiError, AuthError, Result, StorageError};
pub use notice::{Notice, NoticeLevel, Notices};
pub use oauth::{CallbackState, OAuthCallback};
pub use quiz::{QuestionState, QuizSession, Score};
pub use search::SearchPage;
pub use session::{Session, SessionController};
pub use storage::{FileTokenStore, MemoryTokenStore, TokenStore};
pub use workflow::{
    Completion, Controller, Envelope, Tab, ToolKind, VideoWorkflow, ViewId, dispatch, settle,
    step,
};
