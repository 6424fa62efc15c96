//! Backends implemented by external executables.
//!
//! The executable speaks a tiny protocol: the parameter model arrives as JSON
//! on stdin, the verb (`validate` or `execute <output_dir>`) follows the
//! configured arguments, and the exit code tells the outcome.

use super::{Bundler, ValidationError};
use crate::bundler::error::Error;
use crate::bundler::settings::ExternalBundlerSettings;
use crate::bundler::utils::process;
use crate::bundler::{BoxFuture, ParameterModel, Result};
use std::path::{Path, PathBuf};
use tokio::process::Command;

/// Exit code signalling that the backend cannot run on this host.
pub const EXIT_UNSUPPORTED_PLATFORM: i32 = 3;

/// A backend delegating to a subprocess.
#[derive(Clone, Debug)]
pub struct ExternalBundler {
    id: String,
    name: String,
    description: String,
    command: PathBuf,
    args: Vec<String>,
}

impl ExternalBundler {
    /// Creates the backend, resolving a relative command against `project_dir`
    /// when it exists there.
    pub fn new(settings: &ExternalBundlerSettings, project_dir: &Path) -> Self {
        let local = project_dir.join(&settings.command);
        let command = if settings.command.components().count() > 1 || local.is_file() {
            local
        } else {
            settings.command.clone()
        };
        Self {
            id: settings.id.clone(),
            name: settings.name.clone().unwrap_or_else(|| settings.id.clone()),
            description: settings.description.clone().unwrap_or_default(),
            command,
            args: settings.args.clone(),
        }
    }

    fn command(&self, verb: &[&str]) -> Command {
        let mut cmd = Command::new(&self.command);
        cmd.args(&self.args).args(verb);
        cmd
    }
}

impl Bundler for ExternalBundler {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn validate<'a>(
        &'a self,
        params: &'a ParameterModel,
    ) -> BoxFuture<'a, std::result::Result<bool, ValidationError>> {
        Box::pin(async move {
            let advice = format!("Check the external bundler {}.", self.command.display());
            let input = serde_json::to_vec(params)
                .map_err(|e| ValidationError::config(e.to_string(), advice.clone()))?;
            let output = process::capture(self.command(&["validate"]), Some(input))
                .await
                .map_err(|e| ValidationError::config(e.to_string(), advice.clone()))?;

            match output.code {
                0 => Ok(true),
                EXIT_UNSUPPORTED_PLATFORM => {
                    Err(ValidationError::UnsupportedPlatform(output.stderr.join("\n")))
                }
                code => {
                    let message = if output.stderr.is_empty() {
                        format!("validation exited with status {code}")
                    } else {
                        output.stderr.join("\n")
                    };
                    Err(ValidationError::config(message, advice))
                }
            }
        })
    }

    fn execute<'a>(
        &'a self,
        params: &'a ParameterModel,
        output_dir: &'a Path,
    ) -> BoxFuture<'a, Result<Vec<PathBuf>>> {
        Box::pin(async move {
            tokio::fs::create_dir_all(output_dir).await?;
            let input = serde_json::to_vec(params)?;
            let out = output_dir.display().to_string();
            let cmd = self.command(&["execute", &out]);
            let command = process::display_command(&cmd);

            let output = process::capture(cmd, Some(input)).await?;
            if !output.success() {
                for line in &output.stderr {
                    log::info!("{line}");
                }
                return Err(Error::CommandExit {
                    command,
                    code: output.code,
                });
            }

            Ok(output
                .stdout
                .iter()
                .map(|line| line.trim())
                .filter(|line| !line.is_empty())
                .map(|line| output_dir.join(line))
                .collect())
        })
    }
}
