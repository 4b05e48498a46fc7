use axum::{Json, http::StatusCode, response::IntoResponse};
use std::path::PathBuf;
use std::time::Duration;

use crate::models::ErrorBody;

pub type Result<T> = std::result::Result<T, Error>;

// Errors surfaced by the admission engine and the HTTP layer
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid address: {0:?}")]
    InvalidAddress(String),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl Error {
    pub fn invalid_address(addr: impl Into<String>) -> Self {
        Self::InvalidAddress(addr.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Error::InvalidAddress(_) | Error::BadRequest(_) => StatusCode::BAD_REQUEST,
            Error::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> axum::response::Response {
        let body = ErrorBody {
            error: self.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}

// Failures of the backing bucket/list store
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store call timed out after {0:?}")]
    Timeout(Duration),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    #[error("cannot open log file '{}': {source}", path.display())]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("cannot install logger: {0}")]
    Init(#[from] tracing_subscriber::util::TryInitError),
}

// Failures of the admin client talking to a running service
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("server error code: {code}: {message}")]
    Status { code: u16, message: String },
}
