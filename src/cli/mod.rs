//! Command line interface for the JavaFX native bundler.
//!
//! Wires `jfx.toml`, host detection and the bundling engine together and
//! renders the resulting report.

mod args;
mod output;

pub use args::{Args, Command};
pub use output::OutputManager;

use crate::bundler::{
    BundleOrchestrator, BundleReport, BundlerCatalog, BundlerRegistry, BundlerStatus,
    HostEnvironment, JfxSettings, ParameterModel, ParameterModelBuilder, PackagerToolkit,
    SigningService, WorkaroundEngine,
};
use crate::error::{BundlerError, CliError, Result};
use crate::metadata;
use std::path::{Path, PathBuf};

/// Main CLI entry point
pub async fn run(args: Args) -> Result<i32> {
    let output = OutputManager::new(args.verbose);
    let project_dir = project_dir(&args.project_dir)?;
    let mut settings = metadata::load_settings(&project_dir, args.config.as_deref()).await?;
    settings.verbose |= args.verbose;

    match args.command {
        Command::Native {
            bundler,
            fail_on_error,
        } => {
            if let Some(bundler) = bundler {
                settings.bundler = bundler;
            }
            settings.fail_on_error |= fail_on_error;
            let report = native(&settings, &project_dir).await?;
            print_report(&output, &report)?;
        }
        Command::ListBundlers => list_bundlers(&output, &settings, &project_dir).await?,
    }
    Ok(0)
}

fn project_dir(path: &Path) -> Result<PathBuf> {
    if !path.is_dir() {
        return Err(CliError::MissingProjectDir {
            path: path.to_path_buf(),
        }
        .into());
    }
    Ok(std::fs::canonicalize(path)?)
}

fn registry(
    settings: &JfxSettings,
    project_dir: &Path,
    env: &HostEnvironment,
) -> Result<BundlerRegistry> {
    let toolkit = PackagerToolkit::new(env.clone(), settings.use_environment_relative_executables);
    Ok(BundlerRegistry::load(
        settings,
        project_dir,
        &toolkit,
        &BundlerCatalog::new(),
    )?)
}

/// Runs the native bundling step for a project.
pub async fn native(settings: &JfxSettings, project_dir: &Path) -> Result<BundleReport> {
    let mut params = ParameterModelBuilder::new(settings, project_dir)
        .build()
        .await?;

    let env = HostEnvironment::detect(settings.java_version.as_deref()).await;
    let registry = registry(settings, project_dir, &env)?;
    let signing = SigningService::new(settings, project_dir, env.clone());
    let engine = WorkaroundEngine::new(&env, settings.workarounds.clone(), signing);

    let mut orchestrator = BundleOrchestrator::from_settings(settings, project_dir, registry, engine);
    orchestrator
        .run(&mut params)
        .await
        .map_err(BundlerError::from)
}

async fn list_bundlers(
    output: &OutputManager,
    settings: &JfxSettings,
    project_dir: &Path,
) -> Result<()> {
    let env = HostEnvironment::detect(settings.java_version.as_deref()).await;
    let registry = registry(settings, project_dir, &env)?;

    output.section("Available bundlers")?;
    for descriptor in registry.list(&ParameterModel::default()).await {
        output.info(&format!("{} ({})", descriptor.id, descriptor.name))?;
        output.indent(&descriptor.description)?;
        for parameter in &descriptor.parameters {
            output.verbose(&format!("{}: {}", parameter.id, parameter.description))?;
        }
    }
    Ok(())
}

fn print_report(output: &OutputManager, report: &BundleReport) -> Result<()> {
    output.section("Native bundling")?;
    for outcome in &report.outcomes {
        match &outcome.status {
            BundlerStatus::Executed(artifact) => {
                let forced = if outcome.forced { " (prerequisite)" } else { "" };
                output.success(&format!(
                    "{}{forced}: {} bytes",
                    outcome.id, artifact.size
                ))?;
                for path in &artifact.paths {
                    output.indent(&path.display().to_string())?;
                }
                if let Some(checksum) = &artifact.checksum {
                    output.indent(&format!("sha256 {checksum}"))?;
                }
            }
            BundlerStatus::SkippedConfigError(message) => {
                output.warn(&format!("{} skipped: {message}", outcome.id))?;
            }
            BundlerStatus::SkippedUnsupportedPlatform => {
                output.verbose(&format!("{} skipped: unsupported platform", outcome.id))?;
            }
            BundlerStatus::Skipped => {
                output.verbose(&format!("{} skipped", outcome.id))?;
            }
        }
    }
    if report.executed_ids().is_empty() {
        output.warn("No bundler produced an artifact")?;
    }
    Ok(())
}
