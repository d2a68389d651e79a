//! Crate-wide error type for catalog, configuration and I/O failures.
//!
//! Guess validation has its own [`GuessError`](crate::validation::GuessError);
//! nothing in the evaluator can fail.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("request to {url} failed: {message}")]
    Http { url: String, message: String },

    #[error("invalid response payload: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("no artists available from the catalog")]
    EmptyCatalog,

    #[error("no songs found for artist '{artist}'")]
    NoSongsFound { artist: String },

    #[error("no access token configured (set spotify_token or SPOTIFY_ACCESS_TOKEN)")]
    MissingToken,
}

impl From<toml::de::Error> for Error {
    fn from(error: toml::de::Error) -> Self {
        Self::Config(error.to_string())
    }
}
