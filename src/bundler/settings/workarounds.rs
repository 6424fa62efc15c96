//! Toggles for the packaging toolchain workarounds.

use serde::Deserialize;

/// User switches that disable individual workarounds.
///
/// Every workaround is applied automatically when its defect is detected for
/// the current JDK/OS combination. Setting a `skip_*` flag turns it off; the
/// engine logs that it was skipped.
///
/// ```toml
/// [workarounds]
/// skip_dotted_app_name = true
/// ```
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct WorkaroundSettings {
    /// Do not force the launcher cfg-file format on affected Windows JDKs.
    pub skip_cfg_format: bool,

    /// Do not rename launcher cfg-files of app names containing dots.
    pub skip_dotted_app_name: bool,

    /// Do not force the Linux application image before installer backends.
    pub skip_installer_prerequisite: bool,

    /// Do not normalize path separators inside generated descriptors.
    pub skip_jnlp_path_separator: bool,

    /// Do not sign jars referenced by generated descriptors.
    pub skip_jnlp_signing: bool,

    /// Sign descriptor jars, but keep the declared sizes untouched.
    pub skip_jnlp_size_recalculation: bool,
}
