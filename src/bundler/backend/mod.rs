//! Bundler backends.
//!
//! A backend turns a [`ParameterModel`] into native artifacts (an application
//! image, an installer, a webstart bundle). The orchestrator only talks to
//! backends through the [`Bundler`] trait; where they come from is decided by
//! the [`BundlerRegistry`](crate::bundler::BundlerRegistry).

mod external;
mod packager;

pub use external::ExternalBundler;
pub use packager::{PackagerBundler, PackagerKind, PackagerToolkit};

use super::{BoxFuture, ParameterModel, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Why a backend refused a parameter model.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ValidationError {
    /// The backend cannot run on this host. Never reported to the user.
    UnsupportedPlatform(String),
    /// The parameters are wrong or a required tool is missing.
    Config {
        /// What is wrong.
        message: String,
        /// How to fix it.
        advice: String,
    },
}

impl ValidationError {
    /// Shorthand for a configuration error.
    pub fn config(message: impl Into<String>, advice: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            advice: advice.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnsupportedPlatform(reason) => write!(f, "unsupported platform: {reason}"),
            Self::Config { message, .. } => f.write_str(message),
        }
    }
}

/// A parameter a backend understands, as shown by `list-bundlers`.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct BundlerParamInfo {
    pub id: String,
    pub name: String,
    pub description: String,
}

impl BundlerParamInfo {
    pub fn new(id: &str, name: &str, description: &str) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: description.into(),
        }
    }
}

/// Static description of a backend.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct BundlerDescriptor {
    pub id: String,
    pub name: String,
    pub description: String,
    pub parameters: Vec<BundlerParamInfo>,
}

/// A native bundling backend.
pub trait Bundler: Send + Sync {
    /// Unique id used for filtering (e.g. `deb`, `jnlp`, `linux.app`).
    fn id(&self) -> &str;

    /// Display name.
    fn name(&self) -> &str;

    /// Human readable description.
    fn description(&self) -> &str;

    /// Parameters this backend reads.
    fn bundle_parameters(&self) -> Vec<BundlerParamInfo> {
        Vec::new()
    }

    /// Checks whether the backend can run with `params`.
    ///
    /// `Ok(false)` means "not applicable" and is skipped without a message.
    fn validate<'a>(
        &'a self,
        params: &'a ParameterModel,
    ) -> BoxFuture<'a, std::result::Result<bool, ValidationError>>;

    /// Produces the native artifacts inside `output_dir`.
    fn execute<'a>(
        &'a self,
        params: &'a ParameterModel,
        output_dir: &'a Path,
    ) -> BoxFuture<'a, Result<Vec<PathBuf>>>;

    /// Descriptor for listings.
    fn descriptor(&self) -> BundlerDescriptor {
        BundlerDescriptor {
            id: self.id().to_string(),
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: self.bundle_parameters(),
        }
    }
}

impl std::fmt::Debug for dyn Bundler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bundler").field("id", &self.id()).finish()
    }
}

/// A source of backends, consulted in registration order.
pub trait BundlerProvider: Send + Sync {
    /// Returns every backend this provider offers.
    fn bundlers(&self) -> Vec<Box<dyn Bundler>>;
}
