use thiserror::Error;

use crate::api::ApiError;
use crate::session::SessionError;

/// Anything a command can fail with.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error("terminal i/o: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    /// Extra guidance printed under the error, if any.
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::Api(e) if e.is_unauthorized() => Some("your session may have expired; run `taskevo login` again"),
            Self::Api(ApiError::Network(_)) => Some("is the API reachable? check --api-url or TASKEVO_API_BASE_URL"),
            _ => None,
        }
    }
}

pub type AppResult<T> = std::result::Result<T, AppError>;
