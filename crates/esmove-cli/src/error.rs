//! Error types for the CLI

use esmove_migrate::MigrateError;

/// CLI Result type
pub type Result<T> = std::result::Result<T, Error>;

/// CLI errors
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{message}")]
    Validation { message: String },

    #[error("setup failed: {0}")]
    Setup(#[from] esmove_common::Error),

    #[error("migration failed: {0}")]
    Migration(#[from] MigrateError),
}

impl Error {
    pub fn validation(message: impl Into<String>) -> Self {
        Error::Validation {
            message: message.into(),
        }
    }
}
