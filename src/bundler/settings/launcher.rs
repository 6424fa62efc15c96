//! Secondary launcher and file association configuration.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// A named alternate entry point into the packaged application.
///
/// Every secondary launcher shares the application bundle of the primary
/// launcher but may start a different main class with its own JVM settings.
///
/// # Configuration
///
/// ```toml
/// [[secondary_launchers]]
/// app_name = "example-cli"
/// main_class = "com.example.Cli"
/// jvm_args = ["-Xmx256m"]
/// ```
///
/// `app_name` is required and must differ from the primary app name and from
/// every other secondary launcher.
#[derive(Clone, Debug, Default, Deserialize, serde::Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct SecondaryLauncher {
    /// Launcher name. Must be unique across all launchers.
    pub app_name: Option<String>,

    /// Main class started by this launcher.
    pub main_class: Option<String>,

    /// Alternative main jar (relative to the application folder).
    pub jfx_main_app_jar_name: Option<PathBuf>,

    /// JVM system properties.
    pub jvm_properties: Option<BTreeMap<String, String>>,

    /// JVM options.
    pub jvm_args: Option<Vec<String>>,

    /// JVM options the end user may override.
    pub user_jvm_args: Option<BTreeMap<String, String>>,

    /// Version override.
    pub native_release_version: Option<String>,

    /// Desktop shortcut hint.
    pub need_shortcut: bool,

    /// Start menu hint.
    pub need_menu: bool,

    /// Vendor override.
    pub vendor: Option<String>,

    /// Identifier override.
    pub identifier: Option<String>,

    /// Replaces the generated classpath.
    pub classpath: Option<String>,

    /// Arguments passed to the main method.
    pub launcher_arguments: Option<Vec<String>>,
}

/// File association registered by installers that support it.
///
/// Pure data, handed to the backends verbatim.
#[derive(Clone, Debug, Default, Deserialize, serde::Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct FileAssociation {
    /// Human readable description of the file type.
    pub description: Option<String>,

    /// File extensions, space separated (e.g. "foo bar").
    pub extensions: Option<String>,

    /// MIME type (e.g. "application/x-foo").
    pub content_type: Option<String>,

    /// Icon shown for associated files.
    pub icon: Option<PathBuf>,
}
