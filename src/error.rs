use thiserror::Error;

/// Errors surfaced to the caller.
///
/// Only broken input contracts are reported. Degenerate parameters
/// (k out of range, empty collections, zero vectors) produce empty or default
/// results instead of an error.
#[derive(Debug, Error)]
pub enum Error {
    /// Input the engine cannot give a meaningful answer for
    /// (non UTF-8 text, negative term counts, misaligned collections, ...)
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("configuration error: {0}")]
    Config(#[from] Box<figment::Error>),
}

impl Error {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Error::InvalidInput(msg.into())
    }
}

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Error::Config(Box::new(err))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
