//! Corrections for known defects of the packaging toolchain.
//!
//! Each workaround has the same shape: it is detected from the
//! [`HostEnvironment`] (or the parameters), can be switched off through
//! [`WorkaroundSettings`], logs when it is skipped, and records in
//! [`WorkaroundState`] that it was applied so a second trigger does not
//! mutate anything again.
//!
//! | Defect | Trigger | Correction |
//! |---|---|---|
//! | cfg-file format | Windows, JDK 8 before update 92 | force `launcher-cfg-format=prop` |
//! | dotted app name | JDK 8 update 40+ | rename `<name>.cfg` after `linux.app` |
//! | installer prerequisite | Linux, JDK 8 update 40+ or JDK 9 | run `linux.app` before `deb`/`rpm` and ship the cfg-files |
//! | descriptor path separator | Windows, JDK 8 update 60+ | `\` to `/` in `<jar href=...>` lines |
//! | descriptor signing | `jnlp.allPermisions=true` | sign referenced jars, then fix declared sizes |

pub mod jnlp;
pub mod launcher_cfg;

use crate::bundler::builder::{HostEnvironment, HostOs, PlannedRun, SigningService};
use crate::bundler::error::{Error, Result};
use crate::bundler::params::{ParameterModel, keys};
use crate::bundler::settings::WorkaroundSettings;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Id of the Linux application image backend.
pub const LINUX_APP: &str = "linux.app";
/// Id of the webstart backend.
pub const JNLP: &str = "jnlp";
/// Installer backends consuming the Linux application image.
pub const LINUX_INSTALLERS: [&str; 2] = ["deb", "rpm"];

/// Launcher cfg-file format understood by the affected launchers.
const CFG_FORMAT_PROP: &str = "prop";

/// Toolchain defects present on this host.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Defects {
    pub cfg_format: bool,
    pub dotted_app_name: bool,
    pub installer_prerequisite: bool,
    pub jnlp_path_separator: bool,
}

impl Defects {
    /// Detects the defects of the host's JDK.
    pub fn detect(env: &HostEnvironment) -> Self {
        let Some(version) = &env.java_version else {
            return Self::default();
        };
        let windows = env.os == HostOs::Windows;
        Self {
            cfg_format: windows && version.is_java8_below(92),
            dotted_app_name: version.is_java8_at_least(40),
            installer_prerequisite: version.is_java8_at_least(40) || version.is_java9(),
            jnlp_path_separator: windows && version.is_java8_at_least(60),
        }
    }
}

/// What has already been applied during this invocation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WorkaroundState {
    pub cfg_format_applied: bool,
    pub prerequisite_scheduled: bool,
    pub renamed_launchers: BTreeSet<String>,
    pub jnlp_paths_fixed: bool,
    pub jnlp_signed: bool,
    pub jnlp_sizes_recalculated: bool,
}

/// Applies workarounds around backend runs.
#[derive(Debug)]
pub struct WorkaroundEngine {
    os: HostOs,
    defects: Defects,
    settings: WorkaroundSettings,
    signing: SigningService,
    state: WorkaroundState,
}

impl WorkaroundEngine {
    pub fn new(env: &HostEnvironment, settings: WorkaroundSettings, signing: SigningService) -> Self {
        Self::with_defects(env.os, Defects::detect(env), settings, signing)
    }

    /// Creates an engine with explicit defects.
    pub fn with_defects(
        os: HostOs,
        defects: Defects,
        settings: WorkaroundSettings,
        signing: SigningService,
    ) -> Self {
        log::debug!("Toolchain defects on {os:?}: {defects:?}");
        Self {
            os,
            defects,
            settings,
            signing,
            state: WorkaroundState::default(),
        }
    }

    pub fn defects(&self) -> Defects {
        self.defects
    }

    pub fn state(&self) -> &WorkaroundState {
        &self.state
    }

    /// Adjusts the shared parameters once, before any backend runs.
    ///
    /// A raw `launcher-cfg-format` bundle argument collides with the forced
    /// format and fails with [`Error::BundleArgumentKeyCollision`].
    pub fn before_bundling(&mut self, params: &mut ParameterModel) -> Result<()> {
        if !self.defects.cfg_format || self.state.cfg_format_applied {
            return Ok(());
        }
        if self.settings.skip_cfg_format {
            log::info!("Skipped workaround for native launcher regarding cfg-file-format.");
            return Ok(());
        }
        if params.contains_raw(keys::LAUNCHER_CFG_FORMAT) {
            return Err(Error::BundleArgumentKeyCollision {
                keys: vec![keys::LAUNCHER_CFG_FORMAT.to_string()],
            });
        }
        log::info!("Applying workaround for native launcher regarding cfg-file-format.");
        params.launcher_cfg_format = Some(CFG_FORMAT_PROP.to_string());
        self.state.cfg_format_applied = true;
        Ok(())
    }

    /// Makes `linux.app` run ahead of the first Linux installer backend.
    ///
    /// `available` lists every registered id so a skipped-by-filter
    /// `linux.app` can still be forced in.
    pub fn schedule_prerequisites(
        &mut self,
        requested: &str,
        plan: &mut Vec<PlannedRun>,
        available: &[&str],
        params: &mut ParameterModel,
    ) {
        if self.os != HostOs::Linux
            || !self.defects.installer_prerequisite
            || self.state.prerequisite_scheduled
            || requested.eq_ignore_ascii_case(JNLP)
            || requested.eq_ignore_ascii_case(LINUX_APP)
            || !available.contains(&LINUX_APP)
        {
            return;
        }
        let Some(first_installer) = plan
            .iter()
            .position(|run| LINUX_INSTALLERS.contains(&run.id.as_str()))
        else {
            return;
        };
        if self.settings.skip_installer_prerequisite {
            log::info!("Skipped workaround for native linux installer bundlers.");
            return;
        }

        log::info!(
            "Detected linux application bundler ('{LINUX_APP}') needs to run before installer bundlers are executed."
        );
        match plan.iter().position(|run| run.id == LINUX_APP) {
            Some(existing) if existing < first_installer => {}
            Some(existing) => {
                let run = plan.remove(existing);
                plan.insert(first_installer, run);
            }
            None => plan.insert(first_installer, PlannedRun::forced(LINUX_APP)),
        }
        params.markers.cfg_workaround = true;
        self.state.prerequisite_scheduled = true;
    }

    /// Post-processing after a backend produced its output.
    pub async fn after_execution(
        &mut self,
        bundler_id: &str,
        params: &mut ParameterModel,
        output_dir: &Path,
    ) -> Result<()> {
        match bundler_id {
            LINUX_APP => self.after_linux_image(params, output_dir).await,
            JNLP => self.after_webstart(params, output_dir).await,
            _ => Ok(()),
        }
    }

    async fn after_linux_image(&mut self, params: &mut ParameterModel, output_dir: &Path) -> Result<()> {
        if !self.defects.dotted_app_name {
            return Ok(());
        }
        if self.settings.skip_dotted_app_name {
            log::info!("Skipped workaround for native linux launcher(s).");
            return Ok(());
        }
        log::info!("Applying workaround regarding native linux launcher(s) with dots in their name.");

        let image_dir = launcher_cfg::app_image_dir(output_dir, &params.app_name);
        let launchers: Vec<String> = params.launcher_names().map(String::from).collect();
        for launcher in &launchers {
            if self.state.renamed_launchers.contains(launcher) {
                continue;
            }
            if launcher_cfg::rename_launcher_cfg(&image_dir, launcher).await?.is_some() {
                self.state.renamed_launchers.insert(launcher.clone());
            }
        }

        if params.markers.cfg_workaround && !params.markers.cfg_workaround_done {
            log::info!("Preparing workaround regarding native linux launcher(s) inside native linux installers.");
            let added = launcher_cfg::propagate_cfg_files(
                &image_dir,
                launchers.iter().map(String::as_str),
                &mut params.app_resources,
            )
            .await?;
            log::debug!("Added {added} cfg-file(s) to the application resources");
            params.markers.cfg_workaround_done = true;
        }
        Ok(())
    }

    async fn after_webstart(&mut self, params: &ParameterModel, output_dir: &Path) -> Result<()> {
        if self.defects.jnlp_path_separator && !self.state.jnlp_paths_fixed {
            if self.settings.skip_jnlp_path_separator {
                log::info!("Skipped workaround for jar-paths inside generated JNLP-files.");
            } else {
                log::info!("Applying workaround regarding jar-paths inside generated JNLP-files.");
                for descriptor in jnlp::find_descriptors(output_dir).await? {
                    jnlp::fix_path_separators(&descriptor).await?;
                }
                self.state.jnlp_paths_fixed = true;
            }
        }

        if !params.raw_flag(keys::JNLP_ALL_PERMISSIONS) || self.state.jnlp_signed {
            return Ok(());
        }
        log::info!("Signing jar-files referenced inside generated JNLP-files.");
        if self.settings.skip_jnlp_signing {
            log::info!("Skipped signing jar-files referenced inside JNLP-files.");
            return Ok(());
        }

        let descriptors = jnlp::find_descriptors(output_dir).await?;
        let jars = self.webstart_jars(params, output_dir, &descriptors).await?;
        self.signing.sign_webstart(output_dir, &jars).await?;
        self.state.jnlp_signed = true;

        if self.settings.skip_jnlp_size_recalculation {
            log::info!("Skipped size recalculation of jar-files inside JNLP-files.");
        } else if !self.state.jnlp_sizes_recalculated {
            for descriptor in &descriptors {
                let updated = jnlp::recalculate_sizes(descriptor).await?;
                log::debug!("Updated {updated} size(s) in {}", descriptor.display());
            }
            self.state.jnlp_sizes_recalculated = true;
        }
        Ok(())
    }

    /// Jars to sign: the main jar (blob signing only) followed by every jar
    /// referenced by a descriptor, without duplicates.
    async fn webstart_jars(
        &self,
        params: &ParameterModel,
        output_dir: &Path,
        descriptors: &[PathBuf],
    ) -> Result<Vec<PathBuf>> {
        let mut jars = Vec::new();
        if !self.signing.uses_jarsigner() {
            jars.push(output_dir.join(&params.main_jar));
        }
        for descriptor in descriptors {
            for jar in jnlp::referenced_jars(descriptor).await? {
                if !jars.contains(&jar) {
                    jars.push(jar);
                }
            }
        }
        Ok(jars)
    }
}
