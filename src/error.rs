//! Error types shared by the dialogue, moderation, and chat layers.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CompanionError {
    /// Missing or malformed caller input. Never recovered locally.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("unknown companion '{0}'. Known companions: akari, kaede, shion, yua")]
    InvalidIdentity(String),

    /// Network failure, timeout, or non-2xx from a remote service.
    #[error("remote service unavailable: {0}")]
    RemoteUnavailable(String),

    /// A remote response that should have been JSON was not.
    #[error("failed to parse remote response: {0}")]
    ParseFailure(String),

    #[error("configuration error: {0}")]
    Config(String),
}

impl From<reqwest::Error> for CompanionError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::RemoteUnavailable(format!("request timed out: {err}"))
        } else {
            Self::RemoteUnavailable(err.to_string())
        }
    }
}

impl From<tokio::time::error::Elapsed> for CompanionError {
    fn from(_: tokio::time::error::Elapsed) -> Self {
        Self::RemoteUnavailable("deadline elapsed".into())
    }
}

pub type Result<T> = std::result::Result<T, CompanionError>;
