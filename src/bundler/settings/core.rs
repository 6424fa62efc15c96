//! Core project settings for native bundling.

use super::{
    ExternalBundlerSettings, FileAssociation, SecondaryLauncher, SigningSettings,
    WorkaroundSettings,
};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};

/// Requested-bundler value that selects every backend.
pub const ALL_BUNDLERS: &str = "ALL";

/// User-facing configuration of the native bundling step.
///
/// This is the flat settings object read from `jfx.toml`. It is translated into
/// a [`ParameterModel`](crate::bundler::ParameterModel) by the
/// [`ParameterModelBuilder`](crate::bundler::ParameterModelBuilder), which is
/// where validation happens.
///
/// # Configuration
///
/// ```toml
/// main_class = "com.example.MainApp"
/// vendor = "Example Inc."
/// app_name = "example"
/// native_release_version = "1.2.3"
///
/// [bundle_arguments]
/// "jnlp.outfile" = "example"
///
/// [[secondary_launchers]]
/// app_name = "example-admin"
/// main_class = "com.example.AdminApp"
/// ```
///
/// # See Also
///
/// - [`SecondaryLauncher`] - Additional native entry points
/// - [`SigningSettings`] - Keystore configuration for webstart signing
/// - [`WorkaroundSettings`] - Toolchain workaround toggles
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct JfxSettings {
    /// Verbose output of the packager and signing tools.
    ///
    /// Default: false
    pub verbose: bool,

    /// Fully qualified main class of the application.
    ///
    /// Default: None
    pub main_class: Option<String>,

    /// Application name used for launchers and bundle folders.
    ///
    /// Default: None (file stem of `jfx_main_app_jar_name`)
    pub app_name: Option<String>,

    /// Vendor name. Required by every backend.
    ///
    /// Default: None
    pub vendor: Option<String>,

    /// Application identifier (e.g. reverse domain name).
    ///
    /// Default: None
    pub identifier: Option<String>,

    /// Version written into native bundles.
    ///
    /// Default: "1.0"
    pub native_release_version: Option<String>,

    /// Keep non-numeric characters in `native_release_version`.
    ///
    /// Some backends fail on version components that are not digits or dots,
    /// so by default everything else is stripped.
    ///
    /// Default: false
    pub skip_native_version_number_sanitizing: bool,

    /// Ask installers to create a desktop shortcut.
    ///
    /// Default: false
    pub need_shortcut: bool,

    /// Ask installers to create a start menu entry.
    ///
    /// Default: false
    pub need_menu: bool,

    /// JVM system properties passed to the launcher.
    ///
    /// Default: None
    pub jvm_properties: Option<BTreeMap<String, String>>,

    /// JVM options passed to the launcher.
    ///
    /// Default: None
    pub jvm_args: Option<Vec<String>>,

    /// JVM options the end user may override.
    ///
    /// Default: None
    pub user_jvm_args: Option<BTreeMap<String, String>>,

    /// Arguments passed to the application's main method.
    ///
    /// Default: None
    pub launcher_arguments: Option<Vec<String>>,

    /// Folder containing the application jar and its dependencies.
    ///
    /// Default: "build/jfx/app"
    pub jfx_app_output_dir: PathBuf,

    /// File name of the application jar inside `jfx_app_output_dir`.
    ///
    /// Default: "project-jfx.jar"
    pub jfx_main_app_jar_name: String,

    /// Folder all backends write their bundles into.
    ///
    /// Default: "build/jfx/native"
    pub native_output_dir: PathBuf,

    /// Working folder of the backends.
    ///
    /// Default: None (`native-build` next to `native_output_dir`)
    pub build_root: Option<PathBuf>,

    /// Folder copied into `jfx_app_output_dir` before bundling.
    ///
    /// Default: None
    pub additional_app_resources: Option<PathBuf>,

    /// Folder with per-backend resources, copied before each backend runs.
    ///
    /// A sub folder named after the backend id takes precedence over the
    /// folder root.
    ///
    /// Default: None
    pub additional_bundler_resources: Option<PathBuf>,

    /// Backend id to run, or "ALL".
    ///
    /// Default: "ALL"
    pub bundler: String,

    /// Raw parameter overrides forwarded to the backends.
    ///
    /// Keys must not collide with parameters computed from the other settings.
    ///
    /// Default: Empty
    pub bundle_arguments: BTreeMap<String, String>,

    /// Additional native launchers sharing the application bundle.
    ///
    /// Default: Empty
    pub secondary_launchers: Vec<SecondaryLauncher>,

    /// File associations registered by installers that support them.
    ///
    /// Default: Empty
    pub file_associations: Vec<FileAssociation>,

    /// Names of custom bundlers to load from the bundler catalog.
    ///
    /// Default: Empty
    pub custom_bundlers: Vec<String>,

    /// Subprocess bundlers declared by the project.
    ///
    /// Default: Empty
    pub external_bundlers: Vec<ExternalBundlerSettings>,

    /// Drop every built-in backend and only use custom/external ones.
    ///
    /// Default: false
    pub only_custom_bundlers: bool,

    /// Never run the `jnlp` backend.
    ///
    /// Default: false
    pub skip_jnlp: bool,

    /// Promote backend configuration errors to fatal errors.
    ///
    /// Default: false
    pub fail_on_error: bool,

    /// Skip checking that `main_class` exists inside the application jars.
    ///
    /// Default: false
    pub skip_main_class_scanning: bool,

    /// Honour absolute paths instead of resolving everything against the project.
    ///
    /// Default: false
    pub check_for_absolute_paths: bool,

    /// Resolve `javapackager`/`jarsigner` from `PATH` instead of the JDK folder.
    ///
    /// Default: false
    pub use_environment_relative_executables: bool,

    /// Pin the JDK version used for defect detection (e.g. "1.8.0_92").
    ///
    /// Default: None (detected from the `java` executable)
    pub java_version: Option<String>,

    /// Keystore settings for webstart signing.
    pub signing: SigningSettings,

    /// Toolchain workaround toggles.
    pub workarounds: WorkaroundSettings,
}

impl Default for JfxSettings {
    fn default() -> Self {
        Self {
            verbose: false,
            main_class: None,
            app_name: None,
            vendor: None,
            identifier: None,
            native_release_version: Some("1.0".into()),
            skip_native_version_number_sanitizing: false,
            need_shortcut: false,
            need_menu: false,
            jvm_properties: None,
            jvm_args: None,
            user_jvm_args: None,
            launcher_arguments: None,
            jfx_app_output_dir: PathBuf::from("build/jfx/app"),
            jfx_main_app_jar_name: "project-jfx.jar".into(),
            native_output_dir: PathBuf::from("build/jfx/native"),
            build_root: None,
            additional_app_resources: None,
            additional_bundler_resources: None,
            bundler: ALL_BUNDLERS.into(),
            bundle_arguments: BTreeMap::new(),
            secondary_launchers: Vec::new(),
            file_associations: Vec::new(),
            custom_bundlers: Vec::new(),
            external_bundlers: Vec::new(),
            only_custom_bundlers: false,
            skip_jnlp: false,
            fail_on_error: false,
            skip_main_class_scanning: false,
            check_for_absolute_paths: false,
            use_environment_relative_executables: false,
            java_version: None,
            signing: SigningSettings::default(),
            workarounds: WorkaroundSettings::default(),
        }
    }
}

impl JfxSettings {
    /// Resolves a configured path against the project directory.
    ///
    /// Absolute paths are only kept as-is when `check_for_absolute_paths` is set.
    pub fn resolve(&self, project_dir: &Path, path: &Path) -> PathBuf {
        if path.is_absolute() && self.check_for_absolute_paths {
            return path.to_path_buf();
        }
        let relative: PathBuf = path
            .components()
            .filter(|c| !matches!(c, Component::RootDir | Component::Prefix(_)))
            .collect();
        project_dir.join(relative)
    }

    /// Returns the resolved application output directory.
    pub fn app_output_dir(&self, project_dir: &Path) -> PathBuf {
        self.resolve(project_dir, &self.jfx_app_output_dir)
    }

    /// Returns the resolved native output directory.
    pub fn native_output_dir(&self, project_dir: &Path) -> PathBuf {
        self.resolve(project_dir, &self.native_output_dir)
    }

    /// Returns the resolved backend working directory.
    pub fn build_root(&self, project_dir: &Path) -> PathBuf {
        match &self.build_root {
            Some(root) => self.resolve(project_dir, root),
            None => {
                let native = self.native_output_dir(project_dir);
                match native.parent() {
                    Some(parent) => parent.join("native-build"),
                    None => native.join("native-build"),
                }
            }
        }
    }

    /// Returns the application name, derived from the main jar when unset.
    pub fn effective_app_name(&self) -> String {
        if let Some(name) = &self.app_name {
            return name.clone();
        }
        Path::new(&self.jfx_main_app_jar_name)
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.jfx_main_app_jar_name.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_plugin_conventions() {
        let settings: JfxSettings = toml::from_str("").expect("empty config parses");
        assert_eq!(settings.bundler, "ALL");
        assert_eq!(settings.native_release_version.as_deref(), Some("1.0"));
        assert_eq!(settings.jfx_app_output_dir, PathBuf::from("build/jfx/app"));
        assert_eq!(settings.effective_app_name(), "project-jfx");
        assert_eq!(settings.signing.keystore_alias, "myalias");
    }

    #[test]
    fn test_absolute_paths_need_opt_in() {
        let project = Path::new("/work/project");
        let mut settings = JfxSettings::default();
        let absolute = Path::new("/opt/resources");

        assert_eq!(
            settings.resolve(project, absolute),
            PathBuf::from("/work/project/opt/resources")
        );

        settings.check_for_absolute_paths = true;
        assert_eq!(settings.resolve(project, absolute), absolute);
    }

    #[test]
    fn test_build_root_defaults_next_to_native_output() {
        let settings = JfxSettings::default();
        assert_eq!(
            settings.build_root(Path::new("/p")),
            PathBuf::from("/p/build/jfx/native-build")
        );
    }
}
