//! Library errors.
//!
//! Malformed task data never produces an error; these cover configuration and
//! results handed in from outside the core.

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid timezone: {0}")]
    InvalidTimezone(String),
    #[error("invalid configuration: {message}")]
    Config { message: String },
    #[error("invalid parsed query: {message}")]
    InvalidParse { message: String },
    #[error("invalid query pattern: {0}")]
    Pattern(#[from] regex::Error),
}

impl Error {
    pub(crate) fn config(message: impl Into<String>) -> Self {
        Error::Config { message: message.into() }
    }

    pub(crate) fn invalid_parse(message: impl Into<String>) -> Self {
        Error::InvalidParse { message: message.into() }
    }
}
