//! Jar signing for webstart bundles.
//!
//! Two methods are supported: the packager's blob signing (`javapackager
//! -signJar`, one call for every jar) and per-jar signing through
//! `jarsigner`. Both check the keystore configuration before any process is
//! spawned.

use super::tool_detection::HostEnvironment;
use crate::bundler::error::{Error, Result};
use crate::bundler::settings::JfxSettings;
use crate::bundler::utils::process::{self, OutputMode};
use std::path::{Path, PathBuf};
use tokio::process::Command;

/// Signs jars with the project's keystore.
#[derive(Clone, Debug)]
pub struct SigningService {
    keystore: PathBuf,
    alias: String,
    store_password: String,
    key_password: Option<String>,
    store_type: String,
    no_blob_signing: bool,
    extra_parameters: Vec<String>,
    verbose: bool,
    env: HostEnvironment,
    executables_from_path: bool,
    output_mode: OutputMode,
}

impl SigningService {
    /// Creates the service from project settings.
    pub fn new(settings: &JfxSettings, project_dir: &Path, env: HostEnvironment) -> Self {
        let signing = &settings.signing;
        let keystore = settings.resolve(project_dir, &signing.keystore);
        Self {
            keystore: std::path::absolute(&keystore).unwrap_or(keystore),
            alias: signing.keystore_alias.clone(),
            store_password: signing.keystore_password.clone(),
            key_password: signing.key_password.clone(),
            store_type: signing.keystore_type.clone(),
            no_blob_signing: signing.no_blob_signing,
            extra_parameters: signing.additional_jarsigner_parameters.clone(),
            verbose: settings.verbose,
            env,
            executables_from_path: settings.use_environment_relative_executables,
            output_mode: OutputMode::detect(),
        }
    }

    pub fn with_output_mode(mut self, mode: OutputMode) -> Self {
        self.output_mode = mode;
        self
    }

    /// True when jars are signed one by one with `jarsigner`.
    pub fn uses_jarsigner(&self) -> bool {
        self.no_blob_signing
    }

    /// Key password, falling back to the store password.
    pub fn key_password(&self) -> &str {
        self.key_password.as_deref().unwrap_or(&self.store_password)
    }

    /// Checks keystore, alias and password.
    pub fn check_configuration(&self) -> Result<()> {
        if !self.keystore.is_file() {
            return Err(Error::KeystoreNotFound {
                path: self.keystore.clone(),
            });
        }
        if self.alias.is_empty() {
            return Err(Error::MissingKeystoreAlias);
        }
        if self.store_password.is_empty() {
            return Err(Error::MissingKeystorePassword);
        }
        Ok(())
    }

    /// Arguments of one `jarsigner` call.
    pub fn jarsigner_arguments(&self, jar: &Path) -> Vec<String> {
        let mut args = vec![
            "-strict".to_string(),
            "-keystore".into(),
            self.keystore.display().to_string(),
            "-storepass".into(),
            self.store_password.clone(),
            "-keypass".into(),
            self.key_password().to_string(),
            jar.display().to_string(),
            self.alias.clone(),
        ];
        args.extend(self.extra_parameters.iter().cloned());
        if self.verbose {
            args.push("-verbose".into());
        }
        args
    }

    /// Signs jars one by one with `jarsigner`, stopping at the first failure.
    pub async fn sign_jars(&self, jars: &[PathBuf]) -> Result<()> {
        self.check_configuration()?;
        let jarsigner = self.tool("jarsigner")?;
        for jar in jars {
            self.run_jarsigner(&jarsigner, jar).await?;
        }
        Ok(())
    }

    /// Signs jars below `base_dir` with a single blob-signing call.
    pub async fn sign_blob(&self, base_dir: &Path, jars: &[PathBuf]) -> Result<()> {
        self.check_configuration()?;
        let packager = self.tool("javapackager")?;

        let mut cmd = Command::new(packager);
        cmd.args(self.blob_arguments(base_dir, jars));

        log::info!("Signing JAR files for webstart bundle");
        process::run(cmd, self.output_mode)
            .await
            .map_err(|e| Error::SigningFailed {
                file: base_dir.to_path_buf(),
                reason: e.to_string(),
            })
    }

    /// Signs webstart jars with the configured method.
    pub async fn sign_webstart(&self, base_dir: &Path, jars: &[PathBuf]) -> Result<()> {
        if self.no_blob_signing {
            log::info!("Signing jar-files using jarsigner.");
            self.sign_jars(jars).await
        } else {
            log::info!("Signing jar-files using BLOB method.");
            self.sign_blob(base_dir, jars).await
        }
    }

    fn blob_arguments(&self, base_dir: &Path, jars: &[PathBuf]) -> Vec<String> {
        let mut args = vec![
            "-signJar".to_string(),
            "-keyStore".into(),
            self.keystore.display().to_string(),
            "-alias".into(),
            self.alias.clone(),
            "-storePass".into(),
            self.store_password.clone(),
            "-keyPass".into(),
            self.key_password().to_string(),
            "-storeType".into(),
            self.store_type.clone(),
            "-outdir".into(),
            base_dir.display().to_string(),
            "-srcdir".into(),
            base_dir.display().to_string(),
        ];
        for jar in jars {
            let relative = jar.strip_prefix(base_dir).unwrap_or(jar);
            args.extend(["-srcfiles".into(), relative.display().to_string()]);
        }
        if self.verbose {
            args.push("-v".into());
        }
        args
    }

    fn tool(&self, name: &str) -> Result<PathBuf> {
        self.env.locate_tool(name, self.executables_from_path)
    }

    async fn run_jarsigner(&self, jarsigner: &Path, jar: &Path) -> Result<()> {
        let jar = std::path::absolute(jar).unwrap_or_else(|_| jar.to_path_buf());
        let mut cmd = Command::new(jarsigner);
        cmd.args(self.jarsigner_arguments(&jar));

        log::debug!("Signing {}", jar.display());
        process::run(cmd, self.output_mode)
            .await
            .map_err(|e| Error::SigningFailed {
                file: jar.clone(),
                reason: e.to_string(),
            })
    }
}
