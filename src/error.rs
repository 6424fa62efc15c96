//! Error types of the command line front end.
//!
//! The bundling engine has its own taxonomy in [`crate::bundler::Error`]; this
//! module wraps it together with configuration loading and argument errors.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, BundlerError>;

/// Main error type of the binary
#[derive(Error, Debug)]
pub enum BundlerError {
    /// CLI argument errors
    #[error("CLI error: {0}")]
    Cli(#[from] CliError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing errors
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Bundling engine errors
    #[error("{0}")]
    Bundler(#[from] crate::bundler::Error),
}

/// CLI-specific errors
#[derive(Error, Debug)]
pub enum CliError {
    /// Project directory does not exist
    #[error("Project directory does not exist: {}", path.display())]
    MissingProjectDir {
        /// Path given on the command line
        path: PathBuf,
    },

    /// Configuration file could not be read
    #[error("Failed to read configuration {}: {reason}", path.display())]
    ConfigUnreadable {
        /// Configuration file
        path: PathBuf,
        /// Reason for the error
        reason: String,
    },
}
