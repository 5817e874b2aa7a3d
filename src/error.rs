//! Error types for the pricing client, snapshot store and configuration.
//!
//! The matrix and projector transforms never fail; everything here comes from
//! the edges (HTTP, disk, environment).

use thiserror::Error;

use crate::config::ConfigError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("request to pricing service failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("pricing service returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("snapshot I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("service api_key is not a valid header value")]
    InvalidApiKey,

    #[error(transparent)]
    Config(#[from] ConfigError),
}
