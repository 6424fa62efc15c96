//! Built-in backends driving the JDK packager toolkit.
//!
//! Every backend is the same `javapackager -deploy` invocation with a
//! different native type, so they share one implementation parameterised by
//! [`PackagerKind`].

use super::{Bundler, BundlerParamInfo, BundlerProvider, ValidationError};
use crate::bundler::builder::{HostEnvironment, HostOs};
use crate::bundler::params::keys;
use crate::bundler::utils::process::{self, OutputMode};
use crate::bundler::{BoxFuture, ParameterModel, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tokio::process::Command;

const PACKAGER: &str = "javapackager";

/// The backends offered by the packager toolkit, in registration order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PackagerKind {
    WindowsApp,
    Exe,
    Msi,
    MacApp,
    MacAppStore,
    Dmg,
    Pkg,
    LinuxApp,
    Deb,
    Rpm,
    Jnlp,
}

impl PackagerKind {
    pub const ALL: [Self; 11] = [
        Self::WindowsApp,
        Self::Exe,
        Self::Msi,
        Self::MacApp,
        Self::MacAppStore,
        Self::Dmg,
        Self::Pkg,
        Self::LinuxApp,
        Self::Deb,
        Self::Rpm,
        Self::Jnlp,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            Self::WindowsApp => "windows.app",
            Self::Exe => "exe",
            Self::Msi => "msi",
            Self::MacApp => "mac.app",
            Self::MacAppStore => "mac.appStore",
            Self::Dmg => "dmg",
            Self::Pkg => "pkg",
            Self::LinuxApp => "linux.app",
            Self::Deb => "deb",
            Self::Rpm => "rpm",
            Self::Jnlp => "jnlp",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::WindowsApp => "Windows Application Image",
            Self::Exe => "EXE Installer",
            Self::Msi => "MSI Installer",
            Self::MacApp => "Mac Application Image",
            Self::MacAppStore => "Mac App Store Ready Bundler",
            Self::Dmg => "DMG Installer",
            Self::Pkg => "PKG Installer",
            Self::LinuxApp => "Linux Application Image",
            Self::Deb => "DEB Installer",
            Self::Rpm => "RPM Bundler",
            Self::Jnlp => "Web Start JNLP Bundler",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::WindowsApp | Self::MacApp | Self::LinuxApp => {
                "A directory based image of the application with a native launcher and bundled runtime."
            }
            Self::Exe => "Installer executable built with Inno Setup.",
            Self::Msi => "Microsoft Installer package built with WiX.",
            Self::MacAppStore => "Application bundle signed for submission to the Mac App Store.",
            Self::Dmg => "Mac disk image containing the application bundle.",
            Self::Pkg => "Mac installer package.",
            Self::Deb => "Debian package.",
            Self::Rpm => "Red Hat package.",
            Self::Jnlp => "Web Start descriptor plus launch page for the application jars.",
        }
    }

    /// Host the backend runs on, `None` for cross-platform.
    pub fn host(&self) -> Option<HostOs> {
        match self {
            Self::WindowsApp | Self::Exe | Self::Msi => Some(HostOs::Windows),
            Self::MacApp | Self::MacAppStore | Self::Dmg | Self::Pkg => Some(HostOs::MacOs),
            Self::LinuxApp | Self::Deb | Self::Rpm => Some(HostOs::Linux),
            Self::Jnlp => None,
        }
    }

    /// Value of `-native`, `None` for webstart.
    fn native_type(&self) -> Option<&'static str> {
        match self {
            Self::WindowsApp | Self::MacApp | Self::LinuxApp => Some("image"),
            Self::Exe => Some("exe"),
            Self::Msi => Some("msi"),
            Self::MacAppStore => Some("mac.appStore"),
            Self::Dmg => Some("dmg"),
            Self::Pkg => Some("pkg"),
            Self::Deb => Some("deb"),
            Self::Rpm => Some("rpm"),
            Self::Jnlp => None,
        }
    }
}

/// Provider of the built-in packager backends.
#[derive(Clone, Debug)]
pub struct PackagerToolkit {
    env: HostEnvironment,
    executables_from_path: bool,
    output_mode: OutputMode,
}

impl PackagerToolkit {
    pub fn new(env: HostEnvironment, executables_from_path: bool) -> Self {
        Self {
            env,
            executables_from_path,
            output_mode: OutputMode::detect(),
        }
    }

    pub fn with_output_mode(mut self, mode: OutputMode) -> Self {
        self.output_mode = mode;
        self
    }
}

impl BundlerProvider for PackagerToolkit {
    fn bundlers(&self) -> Vec<Box<dyn Bundler>> {
        PackagerKind::ALL
            .into_iter()
            .map(|kind| {
                Box::new(PackagerBundler {
                    kind,
                    toolkit: self.clone(),
                }) as Box<dyn Bundler>
            })
            .collect()
    }
}

/// One packager backend.
#[derive(Debug)]
pub struct PackagerBundler {
    kind: PackagerKind,
    toolkit: PackagerToolkit,
}

impl PackagerBundler {
    pub fn kind(&self) -> PackagerKind {
        self.kind
    }

    fn packager(&self) -> Result<PathBuf> {
        self.toolkit
            .env
            .locate_tool(PACKAGER, self.toolkit.executables_from_path)
    }

    /// Builds the full argument list of `javapackager -deploy`.
    pub fn deploy_arguments(&self, params: &ParameterModel, output_dir: &Path) -> Vec<String> {
        let mut args = vec!["-deploy".to_string()];
        if let Some(native) = self.kind.native_type() {
            args.extend(["-native".into(), native.into()]);
        }
        let outfile = params.raw(keys::JNLP_OUTFILE).unwrap_or(&params.app_name);
        args.extend([
            "-outdir".into(),
            output_dir.display().to_string(),
            "-outfile".into(),
            outfile.to_string(),
            "-srcdir".into(),
            params.app_dir().display().to_string(),
        ]);
        for file in params.app_resources.files() {
            args.extend(["-srcfiles".into(), file.display().to_string()]);
        }
        if let Some(main_class) = &params.main_class {
            args.extend(["-appclass".into(), main_class.clone()]);
        }
        args.extend([
            "-name".into(),
            params.app_name.clone(),
            "-title".into(),
            params.app_name.clone(),
            "-vendor".into(),
            params.vendor.clone(),
        ]);
        if let Some(arguments) = &params.arguments {
            for argument in arguments {
                args.extend(["-argument".into(), argument.clone()]);
            }
        }
        if params.verbose {
            args.push("-v".into());
        }

        let mut bundle_arg = |key: &str, value: &str| args.push(format!("-B{key}={value}"));
        bundle_arg(keys::MAIN_JAR, &params.main_jar);
        bundle_arg(keys::BUILD_ROOT, &params.build_root.display().to_string());
        bundle_arg(keys::SHORTCUT_HINT, &params.shortcut_hint.to_string());
        bundle_arg(keys::MENU_HINT, &params.menu_hint.to_string());
        if let Some(version) = &params.version {
            bundle_arg(keys::VERSION, version);
        }
        if let Some(identifier) = &params.identifier {
            bundle_arg(keys::IDENTIFIER, identifier);
        }
        if let Some(format) = &params.launcher_cfg_format {
            bundle_arg(keys::LAUNCHER_CFG_FORMAT, format);
        }
        for option in params.jvm_options.iter().flatten() {
            bundle_arg(keys::JVM_OPTIONS, option);
        }
        for (key, value) in params.jvm_properties.iter().flatten() {
            bundle_arg(keys::JVM_PROPERTIES, &format!("{key}={value}"));
        }
        for (key, value) in params.user_jvm_options.iter().flatten() {
            bundle_arg(keys::USER_JVM_OPTIONS, &format!("{key}={value}"));
        }
        for (key, value) in params.raw_arguments() {
            bundle_arg(key, value);
        }
        args
    }
}

impl Bundler for PackagerBundler {
    fn id(&self) -> &str {
        self.kind.id()
    }

    fn name(&self) -> &str {
        self.kind.name()
    }

    fn description(&self) -> &str {
        self.kind.description()
    }

    fn bundle_parameters(&self) -> Vec<BundlerParamInfo> {
        let mut params = vec![
            BundlerParamInfo::new(keys::APP_NAME, "Name", "Name of the application."),
            BundlerParamInfo::new(keys::VENDOR, "Vendor", "Vendor of the application."),
            BundlerParamInfo::new(keys::VERSION, "Version", "Version of the application."),
            BundlerParamInfo::new(keys::MAIN_JAR, "Main Jar", "The main jar of the application."),
            BundlerParamInfo::new(keys::BUILD_ROOT, "Build Root", "Working folder of the backend."),
            BundlerParamInfo::new(
                keys::RUNTIME,
                "Runtime",
                "Runtime to bundle, empty for a system-JRE launcher.",
            ),
        ];
        match self.kind {
            PackagerKind::Jnlp => {
                params.push(BundlerParamInfo::new(
                    keys::JNLP_OUTFILE,
                    "Output File",
                    "Base name of the generated descriptor and launch page.",
                ));
                params.push(BundlerParamInfo::new(
                    keys::JNLP_ALL_PERMISSIONS,
                    "All Permissions",
                    "Request all permissions; the jars are signed afterwards.",
                ));
            }
            _ => params.push(BundlerParamInfo::new(
                keys::IDENTIFIER,
                "Identifier",
                "Unique identifier of the application.",
            )),
        }
        params
    }

    fn validate<'a>(
        &'a self,
        _params: &'a ParameterModel,
    ) -> BoxFuture<'a, std::result::Result<bool, ValidationError>> {
        Box::pin(async move {
            if let Some(host) = self.kind.host()
                && host != self.toolkit.env.os
            {
                return Err(ValidationError::UnsupportedPlatform(format!(
                    "{} only runs on {host:?}",
                    self.kind.id()
                )));
            }
            self.packager().map_err(|e| {
                ValidationError::config(
                    e.to_string(),
                    "Install a JDK that ships javapackager, or enable use_environment_relative_executables.",
                )
            })?;
            Ok(true)
        })
    }

    fn execute<'a>(
        &'a self,
        params: &'a ParameterModel,
        output_dir: &'a Path,
    ) -> BoxFuture<'a, Result<Vec<PathBuf>>> {
        Box::pin(async move {
            if !params.secondary_launchers.is_empty() {
                log::warn!(
                    "{} secondary launcher(s) are not forwarded to the {} command line backend",
                    params.secondary_launchers.len(),
                    PACKAGER
                );
            }
            if params.file_associations.is_some() {
                log::warn!("File associations are not forwarded to the {PACKAGER} command line backend");
            }

            tokio::fs::create_dir_all(output_dir).await?;
            let before = snapshot(output_dir).await?;

            let mut cmd = Command::new(self.packager()?);
            cmd.args(self.deploy_arguments(params, output_dir));
            process::run(cmd, self.toolkit.output_mode).await?;

            let after = snapshot(output_dir).await?;
            Ok(after
                .into_iter()
                .filter(|(path, modified)| before.get(path) != Some(modified))
                .map(|(path, _)| path)
                .collect())
        })
    }
}

/// Top level entries of a folder with their modification time.
async fn snapshot(dir: &Path) -> Result<BTreeMap<PathBuf, Option<SystemTime>>> {
    let mut entries = BTreeMap::new();
    let mut read = tokio::fs::read_dir(dir).await?;
    while let Some(entry) = read.next_entry().await? {
        let modified = entry.metadata().await.ok().and_then(|m| m.modified().ok());
        entries.insert(entry.path(), modified);
    }
    Ok(entries)
}
