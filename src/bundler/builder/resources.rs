//! Staging of additional bundler resources.
//!
//! Backends pick up extra files (icons, license texts, installer templates)
//! from their image folder below `<build_root>/images`. The project keeps
//! them in one folder with an optional subfolder per backend id.

use crate::bundler::ParameterModel;
use crate::bundler::error::Result;
use crate::bundler::utils::fs;
use std::path::{Path, PathBuf};

/// Where a backend's additional resources go.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ResourceTarget {
    /// The application resources already cover this backend.
    Covered,
    /// The backend cannot take additional resources.
    Unsupported,
    /// Copy into this image folder.
    Image(PathBuf),
    /// Unknown backend, copy the shared folder into the images root.
    ImagesRoot,
}

/// Looks up the resource destination of a backend.
pub fn resource_target(bundler_id: &str, params: &ParameterModel) -> ResourceTarget {
    match bundler_id {
        "windows.app" | "windows.service" | "linux.app" => ResourceTarget::Covered,
        "exe" => ResourceTarget::Image(params.image_dir("win-exe.image")),
        "msi" => ResourceTarget::Image(params.image_dir("win-msi.image")),
        "deb" => ResourceTarget::Image(params.image_dir("linux-deb.image")),
        "rpm" => ResourceTarget::Image(params.image_dir("linux-rpm.image")),
        "mac.app" | "mac.appStore" | "mac.daemon" | "dmg" | "pkg" => ResourceTarget::Unsupported,
        _ => ResourceTarget::ImagesRoot,
    }
}

/// Copies the additional resources of `bundler_id` into its image folder.
///
/// Without a subfolder named after the backend id the shared root folder is
/// copied into the images root, whatever the backend. The destination table
/// only applies to an id-specific subfolder. Copy failures of single files
/// are only logged.
pub async fn stage_bundler_resources(
    resources_root: &Path,
    bundler_id: &str,
    params: &ParameterModel,
) -> Result<()> {
    if !resources_root.is_dir() {
        log::warn!(
            "Additional bundler resources folder does not exist: {}",
            resources_root.display()
        );
        return Ok(());
    }

    let specific = resources_root.join(bundler_id);
    let (source, destination) = if !specific.is_dir() {
        (resources_root.to_path_buf(), params.images_root())
    } else {
        match resource_target(bundler_id, params) {
            ResourceTarget::Covered => {
                log::debug!("No additional bundler resources needed for {bundler_id}");
                return Ok(());
            }
            ResourceTarget::Unsupported => {
                log::warn!("Additional bundler resources are not supported for {bundler_id}");
                return Ok(());
            }
            ResourceTarget::Image(image_dir) => (specific, image_dir),
            ResourceTarget::ImagesRoot => (resources_root.to_path_buf(), params.images_root()),
        }
    };

    log::info!(
        "Copying additional bundler resources for {bundler_id} into {}",
        destination.display()
    );
    let failed = fs::copy_recursive(&source, &destination).await?;
    if failed > 0 {
        log::warn!("{failed} additional bundler resource(s) could not be copied");
    }
    Ok(())
}

/// Filesystems on which dpkg is known to be slow.
const SLOW_DPKG_FILESYSTEMS: [&str; 2] = ["ext4", "btrfs"];

/// Returns the slow filesystem types among `/proc/mounts` style lines.
pub fn slow_filesystems(mounts: &str) -> Vec<&str> {
    let mut found: Vec<&str> = mounts
        .lines()
        .filter_map(|line| line.split_whitespace().nth(2))
        .filter(|fs_type| SLOW_DPKG_FILESYSTEMS.contains(fs_type))
        .collect();
    found.sort_unstable();
    found.dedup();
    found
}

/// Logs a notice when `deb` is about to run on a filesystem dpkg is slow on.
pub async fn notice_slow_filesystems() {
    let Ok(mounts) = tokio::fs::read_to_string("/proc/mounts").await else {
        return;
    };
    let slow = slow_filesystems(&mounts);
    if !slow.is_empty() {
        log::info!(
            "Detected {} filesystem(s), building DEB installers might take longer because dpkg syncs every file.",
            slow.join("/")
        );
    }
}
