//! Error types for morphogen_io.
//!
//! Every fallible read or write in this crate returns [`IoError`]; callers
//! at the binary edge usually fold it into `anyhow`.

use morphogen_core::EvolutionError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum IoError {
    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Rkyv error: {0}")]
    Rkyv(String),

    #[error("File system error: {0}")]
    FileSystem(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Compression error: {0}")]
    Compression(String),

    /// Payload parsed but is not usable (bad hex, digest mismatch, ...).
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    /// A loaded checkpoint carried a configuration the engine rejects.
    #[error("Engine error: {0}")]
    Engine(#[from] EvolutionError),

    #[error("{context}: {source}")]
    Context {
        context: String,
        source: Box<IoError>,
    },
}

pub type Result<T> = std::result::Result<T, IoError>;

impl IoError {
    #[must_use]
    pub fn serialization<S: Into<String>>(msg: S) -> Self {
        Self::Serialization(msg.into())
    }

    #[must_use]
    pub fn rkyv<S: Into<String>>(msg: S) -> Self {
        Self::Rkyv(msg.into())
    }

    #[must_use]
    pub fn compression<S: Into<String>>(msg: S) -> Self {
        Self::Compression(msg.into())
    }

    #[must_use]
    pub fn validation<S: Into<String>>(msg: S) -> Self {
        Self::Validation(msg.into())
    }

    #[must_use]
    pub fn not_found<S: Into<String>>(resource: S) -> Self {
        Self::NotFound(resource.into())
    }

    /// Wraps an error with the operation that produced it.
    #[must_use]
    pub fn with_context<S: Into<String>>(self, context: S) -> Self {
        Self::Context {
            context: context.into(),
            source: Box::new(self),
        }
    }
}
