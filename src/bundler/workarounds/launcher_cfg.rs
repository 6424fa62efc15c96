//! Launcher cfg-file handling inside Linux application images.
//!
//! Affected native launchers strip everything after the last dot of their own
//! name before looking up `<name>.cfg`, so a launcher called `my.app` reads
//! `my.cfg` while the packager wrote `my.app.cfg`.

use crate::bundler::error::{ErrorExt, Result};
use crate::bundler::params::RelativeFileSet;
use std::path::{Path, PathBuf};

const CFG_EXTENSION: &str = ".cfg";

/// Name of the cfg-file the launcher actually reads, `None` when the launcher
/// name has no dot.
pub fn expected_cfg_name(launcher: &str) -> Option<String> {
    let (stem, _) = launcher.rsplit_once('.')?;
    Some(format!("{stem}{CFG_EXTENSION}"))
}

/// The `app` folder of the Linux application image for `app_name`.
///
/// The packager either writes the image straight into the output folder or
/// below `bundles/`; whichever exists is used.
pub fn app_image_dir(output_dir: &Path, app_name: &str) -> PathBuf {
    let direct = output_dir.join(app_name).join("app");
    if direct.is_dir() {
        return direct;
    }
    let bundled = output_dir.join("bundles").join(app_name).join("app");
    if bundled.is_dir() { bundled } else { direct }
}

/// Renames `<launcher>.cfg` to the name the launcher reads.
///
/// Returns the expected cfg-file when it is in place afterwards. Calling this
/// again after a successful rename is a no-op.
pub async fn rename_launcher_cfg(image_dir: &Path, launcher: &str) -> Result<Option<PathBuf>> {
    let Some(expected) = expected_cfg_name(launcher) else {
        return Ok(None);
    };
    let generated = image_dir.join(format!("{launcher}{CFG_EXTENSION}"));
    let expected = image_dir.join(expected);

    if tokio::fs::try_exists(&generated).await.unwrap_or(false) {
        tokio::fs::rename(&generated, &expected)
            .await
            .fs_context("renaming launcher cfg-file", &generated)?;
        log::debug!(
            "Renamed {} to {}",
            generated.display(),
            expected.display()
        );
        return Ok(Some(expected));
    }
    if tokio::fs::try_exists(&expected).await.unwrap_or(false) {
        return Ok(Some(expected));
    }
    log::debug!("No cfg-file found for launcher {launcher} in {}", image_dir.display());
    Ok(None)
}

/// Copies the renamed cfg-files of dotted launchers into the application
/// resources so installer backends ship them too.
///
/// Returns how many files were added.
pub async fn propagate_cfg_files<'a>(
    image_dir: &Path,
    launchers: impl IntoIterator<Item = &'a str>,
    resources: &mut RelativeFileSet,
) -> Result<usize> {
    let mut added = 0;
    for launcher in launchers {
        let Some(cfg_name) = expected_cfg_name(launcher) else {
            continue;
        };
        let source = image_dir.join(&cfg_name);
        if !source.is_file() {
            log::debug!("Nothing to propagate for launcher {launcher}");
            continue;
        }
        let target = resources.base_dir().join(&cfg_name);
        crate::bundler::utils::fs::copy_file(&source, &target).await?;
        if resources.insert(PathBuf::from(&cfg_name)) {
            added += 1;
        }
    }
    Ok(added)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expected_name_strips_after_last_dot() {
        assert_eq!(expected_cfg_name("com.acme.app").as_deref(), Some("com.acme.cfg"));
        assert_eq!(expected_cfg_name("plain"), None);
    }

    #[tokio::test]
    async fn test_rename_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("my.app.cfg"), "app.mainjar=x.jar\n").unwrap();

        let first = rename_launcher_cfg(dir.path(), "my.app").await.unwrap();
        assert_eq!(first, Some(dir.path().join("my.cfg")));
        assert!(!dir.path().join("my.app.cfg").exists());

        let second = rename_launcher_cfg(dir.path(), "my.app").await.unwrap();
        assert_eq!(second, Some(dir.path().join("my.cfg")));
        assert_eq!(
            std::fs::read_to_string(dir.path().join("my.cfg")).unwrap(),
            "app.mainjar=x.jar\n"
        );
    }

    #[tokio::test]
    async fn test_undotted_launcher_is_left_alone() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("plain.cfg"), "").unwrap();
        assert_eq!(rename_launcher_cfg(dir.path(), "plain").await.unwrap(), None);
        assert!(dir.path().join("plain.cfg").exists());
    }

    #[tokio::test]
    async fn test_propagation_adds_files_to_resources() {
        let image = tempfile::tempdir().unwrap();
        let app = tempfile::tempdir().unwrap();
        std::fs::write(image.path().join("my.cfg"), "cfg").unwrap();
        let mut resources = RelativeFileSet::new(app.path(), []);

        let added = propagate_cfg_files(image.path(), ["my.app", "plain"], &mut resources)
            .await
            .unwrap();

        assert_eq!(added, 1);
        assert!(resources.contains(Path::new("my.cfg")));
        assert!(app.path().join("my.cfg").is_file());
    }
}
