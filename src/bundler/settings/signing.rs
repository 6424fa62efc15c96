//! Keystore configuration for signing webstart jars.

use serde::Deserialize;
use std::path::PathBuf;

/// Keystore and signing-tool configuration.
///
/// Only used when the `jnlp` backend produced an all-permissions bundle.
///
/// # Configuration
///
/// ```toml
/// [signing]
/// keystore = "src/main/deploy/keystore.jks"
/// keystore_alias = "myalias"
/// keystore_password = "password"
/// no_blob_signing = true
/// additional_jarsigner_parameters = ["-tsa", "http://timestamp.example.com"]
/// ```
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct SigningSettings {
    /// Keystore file, relative to the project directory.
    ///
    /// Default: "src/main/deploy/keystore.jks"
    pub keystore: PathBuf,

    /// Alias of the signing key.
    ///
    /// Default: "myalias"
    pub keystore_alias: String,

    /// Keystore password.
    ///
    /// Default: "password"
    pub keystore_password: String,

    /// Key password.
    ///
    /// Default: None (same as `keystore_password`)
    pub key_password: Option<String>,

    /// Keystore type.
    ///
    /// Default: "jks"
    pub keystore_type: String,

    /// Sign every jar with `jarsigner` instead of the packager's blob signing.
    ///
    /// Default: false
    pub no_blob_signing: bool,

    /// Extra parameters appended to every `jarsigner` call.
    ///
    /// Default: Empty
    pub additional_jarsigner_parameters: Vec<String>,
}

impl Default for SigningSettings {
    fn default() -> Self {
        Self {
            keystore: PathBuf::from("src/main/deploy/keystore.jks"),
            keystore_alias: "myalias".into(),
            keystore_password: "password".into(),
            key_password: None,
            keystore_type: "jks".into(),
            no_blob_signing: false,
            additional_jarsigner_parameters: Vec::new(),
        }
    }
}
