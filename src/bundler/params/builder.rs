//! Builds a validated [`ParameterModel`] from project settings.

use super::{LauncherParams, ParameterModel, RelativeFileSet};
use crate::bundler::error::{Error, Result};
use crate::bundler::settings::{JfxSettings, SecondaryLauncher};
use crate::bundler::utils::fs;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Strips every character that is neither a digit nor a dot.
///
/// ```
/// use jfx_bundler::bundler::sanitize_version;
/// assert_eq!(sanitize_version("1.0-SNAPSHOT"), "1.0");
/// ```
pub fn sanitize_version(version: &str) -> String {
    version
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect()
}

/// Translates [`JfxSettings`] into a [`ParameterModel`].
///
/// Validation order is fixed: the vendor is checked before anything touches
/// the filesystem, launchers are checked before raw arguments, and the main
/// class scan only ever warns.
pub struct ParameterModelBuilder<'a> {
    settings: &'a JfxSettings,
    project_dir: PathBuf,
}

impl<'a> ParameterModelBuilder<'a> {
    /// Creates a builder for the given settings, resolving paths against `project_dir`.
    pub fn new(settings: &'a JfxSettings, project_dir: impl Into<PathBuf>) -> Self {
        Self {
            settings,
            project_dir: project_dir.into(),
        }
    }

    /// Builds the model.
    pub async fn build(self) -> Result<ParameterModel> {
        let settings = self.settings;
        let vendor = settings
            .vendor
            .clone()
            .filter(|v| !v.trim().is_empty())
            .ok_or(Error::MissingVendor)?;

        let app_dir = settings.app_output_dir(&self.project_dir);
        self.copy_additional_app_resources(&app_dir).await?;

        let secondary_launchers = self.secondary_launchers()?;

        let mut model = ParameterModel {
            verbose: settings.verbose,
            app_name: settings.effective_app_name(),
            identifier: settings.identifier.clone(),
            version: settings.native_release_version.as_deref().map(|v| self.version(v)),
            vendor,
            main_class: settings.main_class.clone(),
            main_jar: settings.jfx_main_app_jar_name.clone(),
            shortcut_hint: settings.need_shortcut,
            menu_hint: settings.need_menu,
            jvm_properties: settings.jvm_properties.clone(),
            jvm_options: settings.jvm_args.clone(),
            user_jvm_options: settings.user_jvm_args.clone(),
            arguments: settings.launcher_arguments.clone(),
            app_resources: RelativeFileSet::new(&app_dir, fs::list_files(&app_dir).await?),
            secondary_launchers,
            file_associations: (!settings.file_associations.is_empty())
                .then(|| settings.file_associations.clone()),
            build_root: settings.build_root(&self.project_dir),
            ..Default::default()
        };

        // Raw arguments are checked last so every computed key is known.
        model.set_raw_arguments(settings.bundle_arguments.clone())?;

        if !settings.skip_main_class_scanning
            && let Some(main_class) = &settings.main_class
        {
            scan_for_main_class(&app_dir, main_class).await;
        }

        Ok(model)
    }

    fn version(&self, version: &str) -> String {
        if self.settings.skip_native_version_number_sanitizing {
            version.to_string()
        } else {
            sanitize_version(version)
        }
    }

    async fn copy_additional_app_resources(&self, app_dir: &Path) -> Result<()> {
        let Some(resources) = &self.settings.additional_app_resources else {
            return Ok(());
        };
        let resources = self.settings.resolve(&self.project_dir, resources);
        if !resources.is_dir() {
            log::warn!(
                "Skipping additional application resources, folder does not exist: {}",
                resources.display()
            );
            return Ok(());
        }
        log::info!("Copying additional app resources...");
        let failed = fs::copy_recursive(&resources, app_dir).await?;
        if failed > 0 {
            log::warn!("{failed} additional app resource(s) could not be copied");
        }
        Ok(())
    }

    fn secondary_launchers(&self) -> Result<Vec<LauncherParams>> {
        let configured = &self.settings.secondary_launchers;

        let mut names = Vec::with_capacity(configured.len());
        for (index, launcher) in configured.iter().enumerate() {
            match launcher.app_name.as_deref().filter(|n| !n.trim().is_empty()) {
                Some(name) => names.push(name),
                None => return Err(Error::NullSecondaryLauncherName { index }),
            }
        }

        let primary = self.settings.effective_app_name();
        let mut seen = BTreeSet::from([primary.as_str()]);
        let duplicates: BTreeSet<&str> = names
            .iter()
            .copied()
            .filter(|name| !seen.insert(name))
            .collect();
        if !duplicates.is_empty() {
            return Err(Error::DuplicateLauncherName {
                names: duplicates.into_iter().map(String::from).collect(),
            });
        }

        Ok(configured
            .iter()
            .zip(names)
            .map(|(launcher, name)| self.launcher(launcher, name))
            .collect())
    }

    fn launcher(&self, launcher: &SecondaryLauncher, name: &str) -> LauncherParams {
        LauncherParams {
            app_name: name.to_string(),
            main_class: launcher.main_class.clone(),
            main_jar: launcher.jfx_main_app_jar_name.clone(),
            version: launcher
                .native_release_version
                .as_deref()
                .map(|v| self.version(v)),
            vendor: launcher.vendor.clone(),
            identifier: launcher.identifier.clone(),
            menu_hint: launcher.need_menu,
            shortcut_hint: launcher.need_shortcut,
            classpath: launcher.classpath.clone(),
            jvm_options: launcher.jvm_args.clone(),
            jvm_properties: launcher.jvm_properties.clone(),
            user_jvm_options: launcher.user_jvm_args.clone(),
            arguments: launcher.launcher_arguments.clone(),
        }
    }
}

/// Looks for the main class inside every jar of the application folder.
///
/// Only warns. Unreadable jars are skipped.
async fn scan_for_main_class(app_dir: &Path, main_class: &str) {
    let entry_name = format!("{}.class", main_class.replace('.', "/"));
    let jars = match fs::list_files(app_dir).await {
        Ok(files) => files
            .into_iter()
            .filter(|f| f.extension().is_some_and(|e| e.eq_ignore_ascii_case("jar")))
            .map(|f| app_dir.join(f))
            .collect::<Vec<_>>(),
        Err(e) => {
            log::warn!("Couldn't scan application folder for main class: {e}");
            return;
        }
    };

    let found = tokio::task::spawn_blocking(move || {
        jars.iter().any(|jar| match jar_contains(jar, &entry_name) {
            Ok(found) => found,
            Err(e) => {
                log::debug!("Couldn't inspect {}: {e}", jar.display());
                false
            }
        })
    })
    .await
    .unwrap_or(false);

    if !found {
        log::warn!(
            "Main class {main_class} was not found inside any jar of {}, the launcher might not start",
            app_dir.display()
        );
    }
}

fn jar_contains(jar: &Path, entry_name: &str) -> Result<bool> {
    let file = std::fs::File::open(jar)?;
    let mut archive = zip::ZipArchive::new(file)?;
    let found = archive.by_name(entry_name).is_ok();
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundler::params::keys;
    use crate::bundler::settings::SecondaryLauncher;
    use std::collections::BTreeMap;

    fn settings() -> JfxSettings {
        JfxSettings {
            vendor: Some("ACME".into()),
            app_name: Some("demo".into()),
            main_class: Some("com.acme.Main".into()),
            skip_main_class_scanning: true,
            ..Default::default()
        }
    }

    fn launcher(name: Option<&str>) -> SecondaryLauncher {
        SecondaryLauncher {
            app_name: name.map(String::from),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_missing_vendor_fails_before_filesystem_access() {
        let project = tempfile::tempdir().unwrap();
        let config = JfxSettings {
            vendor: None,
            additional_app_resources: Some("res".into()),
            ..settings()
        };
        std::fs::create_dir_all(project.path().join("res")).unwrap();
        std::fs::write(project.path().join("res/readme.txt"), "x").unwrap();

        let err = ParameterModelBuilder::new(&config, project.path())
            .build()
            .await
            .unwrap_err();

        assert!(matches!(err, Error::MissingVendor));
        assert!(!project.path().join("build/jfx/app/readme.txt").exists());
    }

    #[tokio::test]
    async fn test_version_is_sanitized_unless_skipped() {
        let project = tempfile::tempdir().unwrap();
        let mut config = JfxSettings {
            native_release_version: Some("1.2.3-SNAPSHOT".into()),
            ..settings()
        };
        let model = ParameterModelBuilder::new(&config, project.path())
            .build()
            .await
            .unwrap();
        assert_eq!(model.version.as_deref(), Some("1.2.3"));

        config.skip_native_version_number_sanitizing = true;
        let model = ParameterModelBuilder::new(&config, project.path())
            .build()
            .await
            .unwrap();
        assert_eq!(model.version.as_deref(), Some("1.2.3-SNAPSHOT"));
    }

    #[tokio::test]
    async fn test_unnamed_launcher_reports_index() {
        let project = tempfile::tempdir().unwrap();
        let config = JfxSettings {
            secondary_launchers: vec![launcher(Some("a")), launcher(None), launcher(Some("a"))],
            ..settings()
        };
        let err = ParameterModelBuilder::new(&config, project.path())
            .build()
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NullSecondaryLauncherName { index: 1 }));
    }

    #[tokio::test]
    async fn test_launcher_names_must_differ_from_primary() {
        let project = tempfile::tempdir().unwrap();
        let config = JfxSettings {
            secondary_launchers: vec![launcher(Some("tool")), launcher(Some("demo"))],
            ..settings()
        };
        let err = ParameterModelBuilder::new(&config, project.path())
            .build()
            .await
            .unwrap_err();
        match err {
            Error::DuplicateLauncherName { names } => assert_eq!(names, vec!["demo"]),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_bundle_argument_collisions_are_rejected() {
        let project = tempfile::tempdir().unwrap();
        let config = JfxSettings {
            bundle_arguments: BTreeMap::from([
                ("name".to_string(), "other".to_string()),
                (keys::JNLP_OUTFILE.to_string(), "demo".to_string()),
            ]),
            ..settings()
        };
        let err = ParameterModelBuilder::new(&config, project.path())
            .build()
            .await
            .unwrap_err();
        match err {
            Error::BundleArgumentKeyCollision { keys } => assert_eq!(keys, vec!["name"]),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_additional_app_resources_are_copied_and_listed() {
        let project = tempfile::tempdir().unwrap();
        let app_dir = project.path().join("build/jfx/app");
        std::fs::create_dir_all(&app_dir).unwrap();
        std::fs::write(app_dir.join("project-jfx.jar"), "jar").unwrap();
        std::fs::create_dir_all(project.path().join("extra/docs")).unwrap();
        std::fs::write(project.path().join("extra/docs/help.html"), "help").unwrap();

        let config = JfxSettings {
            additional_app_resources: Some("extra".into()),
            ..settings()
        };
        let model = ParameterModelBuilder::new(&config, project.path())
            .build()
            .await
            .unwrap();

        assert!(app_dir.join("docs/help.html").is_file());
        assert_eq!(model.app_dir(), app_dir.as_path());
        assert!(model.app_resources.contains(Path::new("docs/help.html")));
        assert!(model.app_resources.contains(Path::new("project-jfx.jar")));
    }

    #[tokio::test]
    async fn test_secondary_launcher_fields_are_carried_over() {
        let project = tempfile::tempdir().unwrap();
        let config = JfxSettings {
            secondary_launchers: vec![SecondaryLauncher {
                app_name: Some("demo.admin".into()),
                main_class: Some("com.acme.Admin".into()),
                native_release_version: Some("2.0b".into()),
                need_menu: true,
                ..Default::default()
            }],
            ..settings()
        };
        let model = ParameterModelBuilder::new(&config, project.path())
            .build()
            .await
            .unwrap();

        let admin = &model.secondary_launchers[0];
        assert_eq!(admin.app_name, "demo.admin");
        assert_eq!(admin.version.as_deref(), Some("2.0"));
        assert!(admin.menu_hint);
        assert_eq!(
            model.launcher_names().collect::<Vec<_>>(),
            vec!["demo", "demo.admin"]
        );
    }
}
