//! Subprocess bundler declarations.

use serde::Deserialize;
use std::path::PathBuf;

/// A bundler backend implemented by an external executable.
///
/// ```toml
/// [[external_bundlers]]
/// id = "appimage"
/// name = "AppImage"
/// description = "Portable Linux application"
/// command = "tools/appimage-bundler"
/// args = ["--compress"]
/// ```
///
/// The executable is called as `<command> <args..> validate` and
/// `<command> <args..> execute <output_dir>` and receives the parameter model
/// as JSON on stdin.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct ExternalBundlerSettings {
    /// Unique backend id.
    pub id: String,

    /// Display name.
    ///
    /// Default: same as `id`
    pub name: Option<String>,

    /// Description shown by `list-bundlers`.
    pub description: Option<String>,

    /// Executable, relative to the project directory or found on `PATH`.
    pub command: PathBuf,

    /// Arguments placed before the protocol verb.
    pub args: Vec<String>,
}
