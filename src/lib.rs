//! Native bundling engine for JavaFX applications
//!
//! This library turns a JavaFX project's `jfx.toml` into:
//! - Application images (Windows, macOS, Linux)
//! - Installers (.exe, .msi, .dmg, .pkg, .deb, .rpm)
//! - Webstart bundles (JNLP descriptors with signed jars)
//!
//! It can be used both as a CLI tool and as a library dependency.

pub mod bundler;
pub mod cli;
pub mod error;
pub mod metadata;

// Re-export commonly used types
pub use error::{BundlerError, CliError, Result};
