//! The parameter model handed to every bundler backend.
//!
//! [`ParameterModel`] is the single source of truth for one native bundling
//! invocation. It is built once by the [`ParameterModelBuilder`], cloned for
//! every backend so backend-side mutations never leak, and only mutated on the
//! shared copy by the orchestrator and the workaround engine.

mod builder;
mod resources;

pub use builder::{ParameterModelBuilder, sanitize_version};
pub use resources::RelativeFileSet;

use super::settings::FileAssociation;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

/// Parameter keys as understood by the packager toolkit.
pub mod keys {
    /// Verbose output.
    pub const VERBOSE: &str = "verbose";
    /// Application name.
    pub const APP_NAME: &str = "name";
    /// Application identifier.
    pub const IDENTIFIER: &str = "identifier";
    /// Application version.
    pub const VERSION: &str = "appVersion";
    /// Vendor.
    pub const VENDOR: &str = "vendor";
    /// Main class.
    pub const MAIN_CLASS: &str = "applicationClass";
    /// Main jar.
    pub const MAIN_JAR: &str = "mainJar";
    /// Desktop shortcut hint.
    pub const SHORTCUT_HINT: &str = "shortcutHint";
    /// Menu hint.
    pub const MENU_HINT: &str = "menuHint";
    /// JVM properties.
    pub const JVM_PROPERTIES: &str = "jvmProperties";
    /// JVM options.
    pub const JVM_OPTIONS: &str = "jvmOptions";
    /// User overridable JVM options.
    pub const USER_JVM_OPTIONS: &str = "userJvmOptions";
    /// Launcher arguments.
    pub const ARGUMENTS: &str = "arguments";
    /// Application resources.
    pub const APP_RESOURCES: &str = "appResources";
    /// Secondary launchers.
    pub const SECONDARY_LAUNCHERS: &str = "secondaryLaunchers";
    /// File associations.
    pub const FILE_ASSOCIATIONS: &str = "fileAssociations";
    /// Backend working folder.
    pub const BUILD_ROOT: &str = "buildRoot";
    /// Launcher cfg-file format.
    pub const LAUNCHER_CFG_FORMAT: &str = "launcher-cfg-format";
    /// Bundled runtime location.
    pub const RUNTIME: &str = "runtime";
    /// Output name of the jnlp backend.
    pub const JNLP_OUTFILE: &str = "jnlp.outfile";
    /// All-permissions flag of the jnlp backend (toolkit spelling).
    pub const JNLP_ALL_PERMISSIONS: &str = "jnlp.allPermisions";
}

/// Parameters of one secondary launcher, already validated.
#[derive(Clone, Debug, Default, Serialize, PartialEq, Eq)]
pub struct LauncherParams {
    pub app_name: String,
    pub main_class: Option<String>,
    pub main_jar: Option<PathBuf>,
    pub version: Option<String>,
    pub vendor: Option<String>,
    pub identifier: Option<String>,
    pub menu_hint: bool,
    pub shortcut_hint: bool,
    pub classpath: Option<String>,
    pub jvm_options: Option<Vec<String>>,
    pub jvm_properties: Option<BTreeMap<String, String>>,
    pub user_jvm_options: Option<BTreeMap<String, String>>,
    pub arguments: Option<Vec<String>>,
}

/// Cross-backend flags deliberately shared between backend runs.
///
/// These live on the shared model, never on the per-backend clone.
#[derive(Clone, Debug, Default, Serialize, PartialEq, Eq)]
pub struct Markers {
    /// The Linux application image was scheduled to feed installer backends.
    pub cfg_workaround: bool,
    /// Launcher cfg-files were already propagated into the app resources.
    pub cfg_workaround_done: bool,
}

/// Typed parameter model for one native bundling invocation.
#[derive(Clone, Debug, Default, Serialize)]
pub struct ParameterModel {
    pub verbose: bool,
    pub app_name: String,
    pub identifier: Option<String>,
    pub version: Option<String>,
    pub vendor: String,
    pub main_class: Option<String>,
    pub main_jar: String,
    pub shortcut_hint: bool,
    pub menu_hint: bool,
    pub jvm_properties: Option<BTreeMap<String, String>>,
    pub jvm_options: Option<Vec<String>>,
    pub user_jvm_options: Option<BTreeMap<String, String>>,
    pub arguments: Option<Vec<String>>,
    pub app_resources: RelativeFileSet,
    pub secondary_launchers: Vec<LauncherParams>,
    pub file_associations: Option<Vec<FileAssociation>>,
    pub build_root: PathBuf,
    pub launcher_cfg_format: Option<String>,
    pub markers: Markers,
    pub(crate) raw: BTreeMap<String, String>,
}

impl ParameterModel {
    /// Returns the keys of every engine-computed parameter that is set.
    pub fn computed_keys(&self) -> BTreeSet<&'static str> {
        let mut set = BTreeSet::from([
            keys::VERBOSE,
            keys::APP_NAME,
            keys::VENDOR,
            keys::MAIN_JAR,
            keys::SHORTCUT_HINT,
            keys::MENU_HINT,
            keys::APP_RESOURCES,
            keys::BUILD_ROOT,
        ]);
        let optional = [
            (self.identifier.is_some(), keys::IDENTIFIER),
            (self.version.is_some(), keys::VERSION),
            (self.main_class.is_some(), keys::MAIN_CLASS),
            (self.jvm_properties.is_some(), keys::JVM_PROPERTIES),
            (self.jvm_options.is_some(), keys::JVM_OPTIONS),
            (self.user_jvm_options.is_some(), keys::USER_JVM_OPTIONS),
            (self.arguments.is_some(), keys::ARGUMENTS),
            (!self.secondary_launchers.is_empty(), keys::SECONDARY_LAUNCHERS),
            (self.file_associations.is_some(), keys::FILE_ASSOCIATIONS),
            (self.launcher_cfg_format.is_some(), keys::LAUNCHER_CFG_FORMAT),
        ];
        set.extend(optional.into_iter().filter_map(|(present, key)| present.then_some(key)));
        set
    }

    /// Returns a raw bundle argument.
    pub fn raw(&self, key: &str) -> Option<&str> {
        self.raw.get(key).map(String::as_str)
    }

    /// Returns true when the raw bundle argument is present.
    pub fn contains_raw(&self, key: &str) -> bool {
        self.raw.contains_key(key)
    }

    /// Returns every raw bundle argument.
    pub fn raw_arguments(&self) -> &BTreeMap<String, String> {
        &self.raw
    }

    /// Sets the raw bundle arguments after checking them against computed keys.
    ///
    /// All colliding keys are reported at once.
    pub fn set_raw_arguments(
        &mut self,
        arguments: BTreeMap<String, String>,
    ) -> crate::bundler::Result<()> {
        let computed = self.computed_keys();
        let collisions: Vec<String> = arguments
            .keys()
            .filter(|key| computed.contains(key.as_str()))
            .cloned()
            .collect();
        if !collisions.is_empty() {
            return Err(crate::bundler::Error::BundleArgumentKeyCollision { keys: collisions });
        }
        self.raw = arguments;
        Ok(())
    }

    /// Returns true when the raw parameter holds a truthy value.
    pub fn raw_flag(&self, key: &str) -> bool {
        self.raw(key)
            .is_some_and(|value| value.trim().eq_ignore_ascii_case("true"))
    }

    /// Root folder for backend images.
    pub fn images_root(&self) -> PathBuf {
        self.build_root.join("images")
    }

    /// Image folder of a backend, used for additional bundler resources.
    pub fn image_dir(&self, name: &str) -> PathBuf {
        self.images_root().join(name)
    }

    /// All launcher names, primary first.
    pub fn launcher_names(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.app_name.as_str())
            .chain(self.secondary_launchers.iter().map(|l| l.app_name.as_str()))
    }

    /// Base folder of the application resources.
    pub fn app_dir(&self) -> &Path {
        self.app_resources.base_dir()
    }
}
