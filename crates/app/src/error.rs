use thiserror::Error;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("session storage error: {0}")]
    Storage(#[from] client::StorageError),
    #[error("{}", .0.user_message())]
    Session(#[from] client::SessionError),
    #[error("{0}")]
    Api(#[from] client::ApiError),
    #[error(transparent)]
    Validation(#[from] client::ValidationError),
    #[error("not logged in, run `financefit login` first")]
    NotLoggedIn,
    #[error("{0}")]
    Failed(String),
    #[error("interrupted")]
    Interrupted,
}
