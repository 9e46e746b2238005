//! Error handling and custom error types
//!
//! Every failure a generation can hit is one of these variants. Callers are
//! expected to look at [`Error::kind`] and the display message, nothing else.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Missing input: {0}")]
    MissingInput(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Failed to generate image: {0}")]
    Service(String),

    #[error("No image produced: {0}")]
    EmptyResult(String),

    #[error("A generation is already in progress")]
    Busy,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Coarse classification of [`Error`] for presentation layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    MissingInput,
    InvalidInput,
    Service,
    EmptyResult,
    Busy,
    Io,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Configuration(_) => ErrorKind::Configuration,
            Error::MissingInput(_) => ErrorKind::MissingInput,
            Error::InvalidInput(_) => ErrorKind::InvalidInput,
            Error::Service(_) => ErrorKind::Service,
            Error::EmptyResult(_) => ErrorKind::EmptyResult,
            Error::Busy => ErrorKind::Busy,
            Error::Io(_) => ErrorKind::Io,
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Service(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Service(format!("Malformed response: {}", err))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
