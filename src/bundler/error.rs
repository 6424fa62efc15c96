//! Error types for bundler operations.
//!
//! Provides the error taxonomy of the native bundling engine together with
//! filesystem-specific errors.
//!
//! # Taxonomy
//!
//! - **Fatal configuration**: missing vendor, duplicate or unnamed launchers,
//!   bundle-argument key collisions, no bundler found. Always surfaced.
//! - **Backend configuration**: a backend rejected the parameters. Only surfaced
//!   when `fail_on_error` is set, otherwise the orchestrator logs and skips.
//! - **External process failures**: non-zero exits from signing tools or the
//!   packager, always carrying the command (and file, when there is one).
//!
//! # Features
//!
//! - **ErrorExt trait**: Filesystem operations with automatic path context
//! - **bail! macro**: Early return with formatted error messages

use std::{
    io,
    path::{self, PathBuf},
};
use thiserror::Error as DeriveError;

/// Errors returned by the bundler.
#[derive(Debug, DeriveError)]
#[non_exhaustive]
pub enum Error {
    /// File system error with path context.
    ///
    /// Created by the [`ErrorExt`] trait's `fs_context` method.
    #[error("{context} {path}: {error}")]
    Fs {
        /// Context describing the operation (e.g., "reading descriptor file")
        context: &'static str,
        /// Path that was being accessed
        path: PathBuf,
        /// The underlying I/O error
        error: io::Error,
    },

    /// Child process could not be spawned or awaited.
    #[error("failed to run command {command}: {error}")]
    CommandFailed {
        /// Command that failed to execute
        command: String,
        /// The underlying error
        error: io::Error,
    },

    /// Child process exited unsuccessfully.
    #[error("command {command} exited with status {code}")]
    CommandExit {
        /// Command line that was executed
        command: String,
        /// Exit code, or -1 when terminated by a signal
        code: i32,
    },

    /// Generic I/O error.
    #[error("{0}")]
    IoError(#[from] io::Error),

    /// Error walking directory.
    #[error("{0}")]
    WalkdirError(#[from] walkdir::Error),

    /// Path prefix stripping error.
    #[error("{0}")]
    StripError(#[from] path::StripPrefixError),

    /// Jar archive could not be read.
    #[error("{0}")]
    ZipError(#[from] zip::result::ZipError),

    /// JSON serialization error (external bundler protocol).
    #[error("{0}")]
    JsonError(#[from] serde_json::error::Error),

    /// Regular expression error.
    #[error("{0}")]
    RegexError(#[from] regex::Error),

    /// Vendor is mandatory for every backend.
    #[error("you have to set a vendor, which is required for bundlers")]
    MissingVendor,

    /// Two launchers (primary or secondary) share an app name.
    #[error(
        "secondary launchers need to have different names, please adjust app_name inside your configuration (duplicates: {})",
        names.join(", ")
    )]
    DuplicateLauncherName {
        /// Every app name that occurred more than once
        names: Vec<String>,
    },

    /// A secondary launcher entry has no app name.
    #[error("not all secondary launchers have been configured properly: entry #{index} has no app_name")]
    NullSecondaryLauncherName {
        /// Zero-based position in the secondary launcher list
        index: usize,
    },

    /// Raw bundle arguments shadow engine-computed keys.
    #[error(
        "the following keys in bundle_arguments duplicate other settings, please remove one or the other: [{}]",
        keys.join(", ")
    )]
    BundleArgumentKeyCollision {
        /// All colliding keys, sorted
        keys: Vec<String>,
    },

    /// Registry ended up empty.
    #[error(
        "there were no bundlers registered, please make sure your custom bundlers are registered with the bundler catalog"
    )]
    NoBundlersRegistered,

    /// A specific bundler was requested but nothing matched it.
    #[error("no bundler found for given name {requested}, please check your configuration")]
    NoBundlerFound {
        /// Requested bundler name
        requested: String,
    },

    /// A backend rejected the parameter model and `fail_on_error` is set.
    #[error("skipping '{bundler}' because of configuration error '{message}'\nAdvice to fix: {advice}")]
    BundlerConfiguration {
        /// Display name of the backend
        bundler: String,
        /// Validation message
        message: String,
        /// Advice reported by the backend
        advice: String,
    },

    /// A backend failed while executing.
    #[error("got exception while executing bundler '{bundler}': {source}")]
    BundlerExecution {
        /// Backend id
        bundler: String,
        /// Underlying failure
        source: Box<Self>,
    },

    /// The jnlp backend needs `jnlp.outfile` inside bundle arguments.
    #[error("you missed to specify some bundle_arguments entry, please set 'jnlp.outfile', e.g. using app_name")]
    MissingJnlpOutfile,

    /// Keystore file does not exist.
    #[error("keystore does not exist (expected at: {path})")]
    KeystoreNotFound {
        /// Resolved keystore path
        path: PathBuf,
    },

    /// Keystore alias is empty.
    #[error("a 'keystore_alias' is required for signing jars")]
    MissingKeystoreAlias,

    /// Keystore password is empty.
    #[error("a 'keystore_password' is required for signing jars")]
    MissingKeystorePassword,

    /// Signing a specific file failed.
    #[error("there was a problem while signing jar file {file}: {reason}")]
    SigningFailed {
        /// Jar that could not be signed
        file: PathBuf,
        /// Cause reported by the signing tool
        reason: String,
    },

    /// Generic error with custom message.
    #[error("{0}")]
    GenericError(String),
}

/// Convenient type alias for Result.
pub type Result<T> = std::result::Result<T, Error>;

/// Extension trait for filesystem operations with automatic path context.
///
/// The `context` should be a present-tense verb phrase describing the operation,
/// e.g., "reading file", "creating directory", "renaming config file".
pub trait ErrorExt<T> {
    /// Add filesystem context to an I/O error.
    fn fs_context(self, context: &'static str, path: impl Into<PathBuf>) -> Result<T>;
}

impl<T> ErrorExt<T> for std::result::Result<T, std::io::Error> {
    fn fs_context(self, context: &'static str, path: impl Into<PathBuf>) -> Result<T> {
        self.map_err(|error| Error::Fs {
            context,
            path: path.into(),
            error,
        })
    }
}

/// Macro for early return with error.
///
/// Converts the message into a [`Error::GenericError`] and returns immediately.
///
/// ```ignore
/// bail!("operation failed");
/// bail!("invalid value: {}", value);
/// ```
#[macro_export]
macro_rules! bail {
    ($msg:literal $(,)?) => {
        return Err($crate::bundler::error::Error::GenericError($msg.into()))
    };
    ($err:expr $(,)?) => {
        return Err($crate::bundler::error::Error::GenericError($err.to_string()))
    };
    ($fmt:expr, $($arg:tt)*) => {
        return Err($crate::bundler::error::Error::GenericError(format!($fmt, $($arg)*)))
    };
}
