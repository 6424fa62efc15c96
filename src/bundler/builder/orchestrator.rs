//! Main bundler orchestration and coordination.
//!
//! This module provides the [`BundleOrchestrator`], the control loop deciding
//! for every registered backend whether it runs, and sequencing the
//! workaround hooks around it.
//!
//! Per backend the loop moves through
//! `candidate -> skipped | validating -> (unsupported | config error | executing -> executed)`.
//! Backends run strictly one after another; later backends may read what
//! earlier ones left in the output folder.

use super::checksum::{calculate_sha256, calculate_size};
use super::resources;
use crate::bundler::error::{Error, Result};
use crate::bundler::params::keys;
use crate::bundler::registry::BundlerRegistry;
use crate::bundler::settings::{ALL_BUNDLERS, JfxSettings};
use crate::bundler::workarounds::{JNLP, WorkaroundEngine};
use crate::bundler::{BundledArtifact, ParameterModel, ValidationError};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// A backend scheduled to run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlannedRun {
    pub id: String,
    /// Scheduled as a prerequisite although the filter excluded it.
    pub forced: bool,
}

impl PlannedRun {
    pub fn requested(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            forced: false,
        }
    }

    pub fn forced(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            forced: true,
        }
    }
}

/// Terminal state of one backend.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BundlerStatus {
    /// Excluded by the bundler filter or `skip_jnlp`, or not applicable.
    Skipped,
    /// The backend does not run on this host.
    SkippedUnsupportedPlatform,
    /// The backend rejected the configuration.
    SkippedConfigError(String),
    /// The backend produced its artifact.
    Executed(BundledArtifact),
}

/// What happened to one backend.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BundlerOutcome {
    pub id: String,
    pub status: BundlerStatus,
    pub forced: bool,
}

/// Result of one native bundling invocation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BundleReport {
    pub outcomes: Vec<BundlerOutcome>,
}

impl BundleReport {
    /// Outcome of a backend.
    pub fn outcome(&self, id: &str) -> Option<&BundlerOutcome> {
        self.outcomes.iter().find(|o| o.id == id)
    }

    /// Ids of executed backends, in execution order.
    pub fn executed_ids(&self) -> Vec<&str> {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.status, BundlerStatus::Executed(_)))
            .map(|o| o.id.as_str())
            .collect()
    }

    /// Artifacts of executed backends.
    pub fn artifacts(&self) -> impl Iterator<Item = &BundledArtifact> {
        self.outcomes.iter().filter_map(|o| match &o.status {
            BundlerStatus::Executed(artifact) => Some(artifact),
            _ => None,
        })
    }
}

/// Settings steering the control loop.
#[derive(Clone, Debug)]
pub struct OrchestratorOptions {
    /// Backend id to run, or [`ALL_BUNDLERS`].
    pub requested: String,
    pub skip_jnlp: bool,
    pub fail_on_error: bool,
    pub native_output_dir: PathBuf,
    pub additional_bundler_resources: Option<PathBuf>,
}

impl OrchestratorOptions {
    pub fn from_settings(settings: &JfxSettings, project_dir: &Path) -> Self {
        Self {
            requested: settings.bundler.clone(),
            skip_jnlp: settings.skip_jnlp,
            fail_on_error: settings.fail_on_error,
            native_output_dir: settings.native_output_dir(project_dir),
            additional_bundler_resources: settings
                .additional_bundler_resources
                .as_ref()
                .map(|dir| settings.resolve(project_dir, dir)),
        }
    }

    fn requests_all(&self) -> bool {
        self.requested.trim().is_empty() || self.requested.eq_ignore_ascii_case(ALL_BUNDLERS)
    }
}

/// Drives the registered backends.
///
/// # Examples
///
/// ```no_run
/// use jfx_bundler::bundler::{
///     BundleOrchestrator, BundlerCatalog, BundlerRegistry, HostEnvironment, JfxSettings,
///     ParameterModelBuilder, PackagerToolkit, SigningService, WorkaroundEngine,
/// };
/// use std::path::Path;
///
/// # async fn example(settings: JfxSettings) -> jfx_bundler::bundler::Result<()> {
/// let project = Path::new(".");
/// let env = HostEnvironment::detect(settings.java_version.as_deref()).await;
/// let mut params = ParameterModelBuilder::new(&settings, project).build().await?;
/// let toolkit = PackagerToolkit::new(env.clone(), settings.use_environment_relative_executables);
/// let registry = BundlerRegistry::load(&settings, project, &toolkit, &BundlerCatalog::new())?;
/// let signing = SigningService::new(&settings, project, env.clone());
/// let engine = WorkaroundEngine::new(&env, settings.workarounds.clone(), signing);
///
/// let mut orchestrator = BundleOrchestrator::from_settings(&settings, project, registry, engine);
/// let report = orchestrator.run(&mut params).await?;
/// for artifact in report.artifacts() {
///     println!("{}: {} bytes", artifact.bundler_id, artifact.size);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct BundleOrchestrator {
    registry: BundlerRegistry,
    engine: WorkaroundEngine,
    options: OrchestratorOptions,
}

impl BundleOrchestrator {
    pub fn new(registry: BundlerRegistry, engine: WorkaroundEngine, options: OrchestratorOptions) -> Self {
        Self {
            registry,
            engine,
            options,
        }
    }

    pub fn from_settings(
        settings: &JfxSettings,
        project_dir: &Path,
        registry: BundlerRegistry,
        engine: WorkaroundEngine,
    ) -> Self {
        Self::new(
            registry,
            engine,
            OrchestratorOptions::from_settings(settings, project_dir),
        )
    }

    pub fn registry(&self) -> &BundlerRegistry {
        &self.registry
    }

    pub fn engine(&self) -> &WorkaroundEngine {
        &self.engine
    }

    /// Runs every applicable backend against `params`.
    ///
    /// `params` is the shared model: each backend gets its own clone, only the
    /// workaround engine writes back into it.
    pub async fn run(&mut self, params: &mut ParameterModel) -> Result<BundleReport> {
        self.engine.before_bundling(params)?;

        let (mut plan, matched) = self.plan();
        if !self.options.requests_all() && !matched {
            return Err(Error::NoBundlerFound {
                requested: self.options.requested.clone(),
            });
        }
        let available: Vec<String> = self.registry.ids().into_iter().map(String::from).collect();
        let ids: Vec<&str> = available.iter().map(String::as_str).collect();
        self.engine
            .schedule_prerequisites(&self.options.requested, &mut plan, &ids, params);

        let mut report = BundleReport::default();
        for run in &plan {
            let status = self.run_bundler(&run.id, params).await?;
            report.outcomes.push(BundlerOutcome {
                id: run.id.clone(),
                status,
                forced: run.forced,
            });
        }

        let planned: BTreeSet<&str> = plan.iter().map(|run| run.id.as_str()).collect();
        for id in ids.iter().filter(|id| !planned.contains(*id)) {
            report.outcomes.push(BundlerOutcome {
                id: id.to_string(),
                status: BundlerStatus::Skipped,
                forced: false,
            });
        }
        Ok(report)
    }

    /// Applies the bundler filter and `skip_jnlp`.
    ///
    /// Returns the runs in registry order and whether the filter matched anything.
    /// A backend excluded by `skip_jnlp` does not count as matched.
    fn plan(&self) -> (Vec<PlannedRun>, bool) {
        let mut plan = Vec::new();
        let mut matched = false;
        for bundler in self.registry.bundlers() {
            let id = bundler.id();
            if !self.options.requests_all() && !self.options.requested.eq_ignore_ascii_case(id) {
                continue;
            }
            if self.options.skip_jnlp && id.eq_ignore_ascii_case(JNLP) {
                log::info!("Skipped JNLP-bundling as requested.");
                continue;
            }
            matched = true;
            plan.push(PlannedRun::requested(id));
        }
        (plan, matched)
    }

    async fn run_bundler(&mut self, id: &str, params: &mut ParameterModel) -> Result<BundlerStatus> {
        let Some(bundler) = self.registry.get(id) else {
            return Ok(BundlerStatus::Skipped);
        };
        let run_params = params.clone();

        match bundler.validate(&run_params).await {
            Err(ValidationError::UnsupportedPlatform(reason)) => {
                log::debug!("Skipping {id}, unsupported platform: {reason}");
                return Ok(BundlerStatus::SkippedUnsupportedPlatform);
            }
            Err(ValidationError::Config { message, advice }) => {
                if self.options.fail_on_error {
                    return Err(Error::BundlerConfiguration {
                        bundler: bundler.name().to_string(),
                        message,
                        advice,
                    });
                }
                log::info!(
                    "Skipping '{}' because of configuration error '{message}'\nAdvice to fix: {advice}",
                    bundler.name()
                );
                return Ok(BundlerStatus::SkippedConfigError(message));
            }
            Ok(false) => {
                log::debug!("Skipping {id}, not applicable");
                return Ok(BundlerStatus::Skipped);
            }
            Ok(true) => {}
        }

        if let Some(resources_root) = &self.options.additional_bundler_resources {
            resources::stage_bundler_resources(resources_root, id, &run_params).await?;
        }
        if id == "deb" {
            resources::notice_slow_filesystems().await;
        }
        if id == JNLP && !run_params.contains_raw(keys::JNLP_OUTFILE) {
            if self.options.fail_on_error {
                return Err(Error::MissingJnlpOutfile);
            }
            let message = Error::MissingJnlpOutfile.to_string();
            log::warn!("{message}");
            return Ok(BundlerStatus::SkippedConfigError(message));
        }

        let output_dir = self.options.native_output_dir.clone();
        log::info!("Running bundler {} ({id})", bundler.name());
        let paths = bundler
            .execute(&run_params, &output_dir)
            .await
            .map_err(|e| Error::BundlerExecution {
                bundler: id.to_string(),
                source: Box::new(e),
            })?;
        let artifact = artifact_for(id, paths).await?;

        self.engine.after_execution(id, params, &output_dir).await?;
        Ok(BundlerStatus::Executed(artifact))
    }
}

/// Computes size and checksum of what a backend produced.
async fn artifact_for(id: &str, paths: Vec<PathBuf>) -> Result<BundledArtifact> {
    let mut size = 0u64;
    for path in &paths {
        size += calculate_size(path).await?;
    }
    let checksum = match paths.first() {
        Some(first) => Some(calculate_sha256(first).await?),
        None => {
            log::debug!("Bundler {id} reported no artifact paths");
            None
        }
    };
    Ok(BundledArtifact {
        bundler_id: id.to_string(),
        paths,
        size,
        checksum,
    })
}
