use reqwest::StatusCode;
use thiserror::Error;

/// Failures surfaced by calls against the TaskEvo API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never completed, or its body could not be read.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("{detail} (HTTP {status})")]
    Status { status: StatusCode, detail: String },

    #[error("could not decode {0}")]
    Decode(String),

    #[error("{0}")]
    InvalidInput(String),

    #[error("not logged in; run `taskevo login` first")]
    NotLoggedIn,
}

impl ApiError {
    pub fn decode(what: impl std::fmt::Display, err: impl std::fmt::Display) -> Self {
        Self::Decode(format!("{what}: {err}"))
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Status { status, .. } if *status == StatusCode::UNAUTHORIZED)
    }
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;
