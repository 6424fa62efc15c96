//! Project configuration discovery from `jfx.toml`

use crate::bundler::JfxSettings;
use crate::error::{BundlerError, CliError, Result};
use std::path::{Path, PathBuf};

/// File name of the project configuration
pub const CONFIG_FILE_NAME: &str = "jfx.toml";

/// Configuration file of a project, `<project>/jfx.toml` unless overridden
pub fn config_path(project_dir: &Path, explicit: Option<&Path>) -> PathBuf {
    match explicit {
        Some(path) if path.is_absolute() => path.to_path_buf(),
        Some(path) => project_dir.join(path),
        None => project_dir.join(CONFIG_FILE_NAME),
    }
}

/// Load the bundling settings of a project.
///
/// A missing default configuration yields the default settings; a missing
/// explicitly requested file is an error.
pub async fn load_settings(project_dir: &Path, explicit: Option<&Path>) -> Result<JfxSettings> {
    let path = config_path(project_dir, explicit);

    let content = match tokio::fs::read_to_string(&path).await {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound && explicit.is_none() => {
            log::debug!("No {} found, using default settings", path.display());
            return Ok(JfxSettings::default());
        }
        Err(e) => {
            return Err(BundlerError::Cli(CliError::ConfigUnreadable {
                path,
                reason: e.to_string(),
            }));
        }
    };

    log::debug!("Loading settings from {}", path.display());
    parse_settings(&content)
}

/// Parse settings from TOML text
pub fn parse_settings(content: &str) -> Result<JfxSettings> {
    Ok(toml::from_str(content)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_default_config_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = load_settings(dir.path(), None).await.unwrap();
        assert_eq!(settings.bundler, "ALL");
        assert!(settings.vendor.is_none());
    }

    #[tokio::test]
    async fn test_missing_explicit_config_fails() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_settings(dir.path(), Some(Path::new("other.toml"))).await;
        assert!(matches!(
            result,
            Err(BundlerError::Cli(CliError::ConfigUnreadable { .. }))
        ));
    }

    #[test]
    fn test_parse_nested_sections() {
        let settings = parse_settings(
            r#"
            vendor = "ACME"
            bundler = "deb"

            [bundle_arguments]
            "jnlp.outfile" = "demo"

            [workarounds]
            skip_dotted_app_name = true
            "#,
        )
        .unwrap();
        assert_eq!(settings.vendor.as_deref(), Some("ACME"));
        assert_eq!(settings.bundle_arguments["jnlp.outfile"], "demo");
        assert!(settings.workarounds.skip_dotted_app_name);
        assert!(!settings.workarounds.skip_cfg_format);
    }

    #[test]
    fn test_unknown_value_type_is_rejected() {
        assert!(matches!(
            parse_settings("skip_jnlp = \"maybe\""),
            Err(BundlerError::Toml(_))
        ));
    }
}
