//! Native bundling engine for JavaFX applications.
//!
//! This module turns a project's `jfx.toml` settings into native bundles:
//! application images, installers (exe, msi, dmg, pkg, deb, rpm) and
//! webstart bundles. The actual formats are produced by pluggable backends;
//! this module decides which backends run, in which order, with which
//! parameters, and corrects known defects of the packaging toolchain around
//! them.
//!
//! # Configuration
//!
//! ```toml
//! main_class = "com.example.MainApp"
//! vendor = "Example Inc."
//! bundler = "deb"
//!
//! [bundle_arguments]
//! "jnlp.outfile" = "example"
//!
//! [workarounds]
//! skip_dotted_app_name = true
//! ```
//!
//! # Pipeline
//!
//! | Stage | Type | Notes |
//! |-------|------|-------|
//! | settings | [`JfxSettings`] | serde defaults of the plugin |
//! | parameters | [`ParameterModelBuilder`] | fatal configuration checks |
//! | backends | [`BundlerRegistry`] | built-in, catalog and external, first id wins |
//! | control loop | [`BundleOrchestrator`] | filter, validate, execute |
//! | corrections | [`WorkaroundEngine`] | detected per JDK/OS, idempotent |

pub mod backend;
pub mod builder;
pub mod error;
pub mod params;
pub mod registry;
pub mod settings;
pub mod utils;
pub mod workarounds;

use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;

// Public re-exports
pub use backend::{
    Bundler, BundlerDescriptor, BundlerParamInfo, BundlerProvider, ExternalBundler,
    PackagerBundler, PackagerKind, PackagerToolkit, ValidationError,
};
pub use builder::{
    BundleOrchestrator, BundleReport, BundlerOutcome, BundlerStatus, HostEnvironment, HostOs,
    JavaVersion, OrchestratorOptions, PlannedRun, SigningService,
};
pub use error::{Error, Result};
pub use params::{
    LauncherParams, Markers, ParameterModel, ParameterModelBuilder, RelativeFileSet,
    sanitize_version,
};
pub use registry::{BundlerCatalog, BundlerRegistry};
pub use settings::{
    ALL_BUNDLERS, ExternalBundlerSettings, FileAssociation, JfxSettings, SecondaryLauncher,
    SigningSettings, WorkaroundSettings,
};
pub use workarounds::{Defects, WorkaroundEngine, WorkaroundState};

/// Boxed future returned by [`Bundler`] methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// What one backend produced.
///
/// # Fields
///
/// - `bundler_id`: id of the backend that ran
/// - `paths`: every file or folder the backend reported
/// - `size`: total size in bytes (folders are summed up)
/// - `checksum`: SHA-256 of the first path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundledArtifact {
    /// Id of the backend (e.g. `deb`, `linux.app`, `jnlp`).
    pub bundler_id: String,

    /// Paths reported by the backend.
    pub paths: Vec<PathBuf>,

    /// Total size in bytes.
    pub size: u64,

    /// SHA-256 checksum of the main artifact.
    ///
    /// `None` when the backend reported no paths.
    pub checksum: Option<String>,
}
