//! Shared fixtures: recording backends and engine setup.

#![allow(dead_code)]

use jfx_bundler::bundler::{
    BoxFuture, Bundler, BundlerProvider, Defects, HostEnvironment, HostOs, JfxSettings,
    ParameterModel, ParameterModelBuilder, SigningService, ValidationError, WorkaroundEngine,
    WorkaroundSettings,
};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Ids of executed backends, in execution order.
pub type ExecutionLog = Arc<Mutex<Vec<String>>>;

#[derive(Clone, Copy, Debug)]
pub enum Validation {
    Valid,
    NotApplicable,
    Unsupported,
    BadConfig,
}

/// Backend writing `<output_dir>/<id>.bin` and recording its id.
pub struct RecordingBundler {
    pub id: String,
    pub name: String,
    pub validation: Validation,
    pub fail_execution: bool,
    pub log: ExecutionLog,
}

impl RecordingBundler {
    pub fn new(id: &str, log: &ExecutionLog) -> Self {
        Self {
            id: id.to_string(),
            name: format!("{id} bundler"),
            validation: Validation::Valid,
            fail_execution: false,
            log: Arc::clone(log),
        }
    }

    pub fn named(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    pub fn validating(mut self, validation: Validation) -> Self {
        self.validation = validation;
        self
    }

    pub fn failing(mut self) -> Self {
        self.fail_execution = true;
        self
    }
}

impl Bundler for RecordingBundler {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        "records its execution"
    }

    fn validate<'a>(
        &'a self,
        _params: &'a ParameterModel,
    ) -> BoxFuture<'a, Result<bool, ValidationError>> {
        Box::pin(async move {
            match self.validation {
                Validation::Valid => Ok(true),
                Validation::NotApplicable => Ok(false),
                Validation::Unsupported => Err(ValidationError::UnsupportedPlatform(
                    "not this host".into(),
                )),
                Validation::BadConfig => Err(ValidationError::config(
                    "icon missing",
                    "set an icon",
                )),
            }
        })
    }

    fn execute<'a>(
        &'a self,
        _params: &'a ParameterModel,
        output_dir: &'a Path,
    ) -> BoxFuture<'a, jfx_bundler::bundler::Result<Vec<PathBuf>>> {
        Box::pin(async move {
            if self.fail_execution {
                return Err(jfx_bundler::bundler::Error::GenericError(
                    "tool crashed".into(),
                ));
            }
            self.log.lock().unwrap().push(self.id.clone());
            tokio::fs::create_dir_all(output_dir).await?;
            let artifact = output_dir.join(format!("{}.bin", self.id));
            tokio::fs::write(&artifact, self.id.as_bytes()).await?;
            Ok(vec![artifact])
        })
    }
}

/// Provider handing out a fixed list of recording backends.
pub struct FakeProvider {
    pub ids: Vec<(&'static str, Validation)>,
    pub log: ExecutionLog,
}

impl FakeProvider {
    pub fn new(ids: &[&'static str], log: &ExecutionLog) -> Self {
        Self {
            ids: ids.iter().map(|id| (*id, Validation::Valid)).collect(),
            log: Arc::clone(log),
        }
    }
}

impl BundlerProvider for FakeProvider {
    fn bundlers(&self) -> Vec<Box<dyn Bundler>> {
        self.ids
            .iter()
            .map(|(id, validation)| {
                Box::new(RecordingBundler::new(id, &self.log).validating(*validation))
                    as Box<dyn Bundler>
            })
            .collect()
    }
}

pub fn new_log() -> ExecutionLog {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn executed(log: &ExecutionLog) -> Vec<String> {
    log.lock().unwrap().clone()
}

/// Valid settings for a project rooted at `project_dir`.
pub fn settings() -> JfxSettings {
    JfxSettings {
        vendor: Some("ACME".into()),
        app_name: Some("demo".into()),
        main_class: Some("com.acme.Main".into()),
        skip_main_class_scanning: true,
        ..Default::default()
    }
}

pub async fn params(settings: &JfxSettings, project_dir: &Path) -> ParameterModel {
    ParameterModelBuilder::new(settings, project_dir)
        .build()
        .await
        .unwrap()
}

/// Engine for a Linux host with the given defects.
pub fn engine(project_dir: &Path, defects: Defects) -> WorkaroundEngine {
    let env = HostEnvironment::new(HostOs::Linux);
    let signing = SigningService::new(&JfxSettings::default(), project_dir, env);
    WorkaroundEngine::with_defects(HostOs::Linux, defects, WorkaroundSettings::default(), signing)
}
