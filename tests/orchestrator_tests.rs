//! Control loop tests with recording backends.

mod common;

use common::{FakeProvider, RecordingBundler, Validation};
use jfx_bundler::bundler::{
    BundleOrchestrator, Bundler, BundlerCatalog, BundlerRegistry, BundlerStatus, Defects, Error,
    OrchestratorOptions, ParameterModelBuilder, SecondaryLauncher,
};
use std::path::Path;
use std::sync::Arc;

fn options(requested: &str, output_dir: &Path) -> OrchestratorOptions {
    OrchestratorOptions {
        requested: requested.to_string(),
        skip_jnlp: false,
        fail_on_error: false,
        native_output_dir: output_dir.to_path_buf(),
        additional_bundler_resources: None,
    }
}

fn registry(provider: &FakeProvider, project_dir: &Path) -> BundlerRegistry {
    BundlerRegistry::load(&common::settings(), project_dir, provider, &BundlerCatalog::new())
        .unwrap()
}

#[tokio::test]
async fn test_filter_runs_only_the_requested_backend() {
    let project = tempfile::tempdir().unwrap();
    let out = project.path().join("native");
    let log = common::new_log();
    let provider = FakeProvider::new(&["app", "exe", "msi"], &log);
    let mut params = common::params(&common::settings(), project.path()).await;

    let mut orchestrator = BundleOrchestrator::new(
        registry(&provider, project.path()),
        common::engine(project.path(), Defects::default()),
        options("exe", &out),
    );
    let report = orchestrator.run(&mut params).await.unwrap();

    assert_eq!(common::executed(&log), vec!["exe"]);
    assert_eq!(report.executed_ids(), vec!["exe"]);
    assert_eq!(report.outcome("app").unwrap().status, BundlerStatus::Skipped);
    assert_eq!(report.outcome("msi").unwrap().status, BundlerStatus::Skipped);
    assert!(!out.join("app.bin").exists());
}

#[tokio::test]
async fn test_all_runs_every_backend_in_registration_order() {
    let project = tempfile::tempdir().unwrap();
    let out = project.path().join("native");
    let log = common::new_log();
    let provider = FakeProvider::new(&["app", "exe", "msi"], &log);
    let mut params = common::params(&common::settings(), project.path()).await;

    let mut orchestrator = BundleOrchestrator::new(
        registry(&provider, project.path()),
        common::engine(project.path(), Defects::default()),
        options("ALL", &out),
    );
    let report = orchestrator.run(&mut params).await.unwrap();

    assert_eq!(common::executed(&log), vec!["app", "exe", "msi"]);
    let artifacts: Vec<_> = report.artifacts().collect();
    assert_eq!(artifacts.len(), 3);
    for artifact in artifacts {
        assert_eq!(artifact.size, 3);
        assert_eq!(artifact.paths, vec![out.join(format!("{}.bin", artifact.bundler_id))]);
        assert_eq!(artifact.checksum.as_deref().map(str::len), Some(64));
    }
}

#[tokio::test]
async fn test_unknown_requested_backend_fails_before_running_anything() {
    let project = tempfile::tempdir().unwrap();
    let log = common::new_log();
    let provider = FakeProvider::new(&["app", "exe"], &log);
    let mut params = common::params(&common::settings(), project.path()).await;

    let mut orchestrator = BundleOrchestrator::new(
        registry(&provider, project.path()),
        common::engine(project.path(), Defects::default()),
        options("snap", &project.path().join("native")),
    );
    let err = orchestrator.run(&mut params).await.unwrap_err();

    assert!(matches!(err, Error::NoBundlerFound { ref requested } if requested == "snap"));
    assert!(common::executed(&log).is_empty());
}

#[tokio::test]
async fn test_validation_failures_are_skipped_without_fail_on_error() {
    let project = tempfile::tempdir().unwrap();
    let log = common::new_log();
    let provider = FakeProvider {
        ids: vec![
            ("unsupported", Validation::Unsupported),
            ("broken", Validation::BadConfig),
            ("inapplicable", Validation::NotApplicable),
            ("good", Validation::Valid),
        ],
        log: Arc::clone(&log),
    };
    let mut params = common::params(&common::settings(), project.path()).await;

    let mut orchestrator = BundleOrchestrator::new(
        registry(&provider, project.path()),
        common::engine(project.path(), Defects::default()),
        options("ALL", &project.path().join("native")),
    );
    let report = orchestrator.run(&mut params).await.unwrap();

    assert_eq!(common::executed(&log), vec!["good"]);
    assert_eq!(
        report.outcome("unsupported").unwrap().status,
        BundlerStatus::SkippedUnsupportedPlatform
    );
    assert_eq!(
        report.outcome("broken").unwrap().status,
        BundlerStatus::SkippedConfigError("icon missing".into())
    );
    assert_eq!(report.outcome("inapplicable").unwrap().status, BundlerStatus::Skipped);
}

#[tokio::test]
async fn test_fail_on_error_surfaces_configuration_errors() {
    let project = tempfile::tempdir().unwrap();
    let log = common::new_log();
    let provider = FakeProvider {
        ids: vec![("broken", Validation::BadConfig), ("good", Validation::Valid)],
        log: Arc::clone(&log),
    };
    let mut params = common::params(&common::settings(), project.path()).await;
    let mut options = options("ALL", &project.path().join("native"));
    options.fail_on_error = true;

    let mut orchestrator = BundleOrchestrator::new(
        registry(&provider, project.path()),
        common::engine(project.path(), Defects::default()),
        options,
    );
    let err = orchestrator.run(&mut params).await.unwrap_err();

    match err {
        Error::BundlerConfiguration {
            bundler,
            message,
            advice,
        } => {
            assert_eq!(bundler, "broken bundler");
            assert_eq!(message, "icon missing");
            assert_eq!(advice, "set an icon");
        }
        other => panic!("unexpected error {other:?}"),
    }
    assert!(common::executed(&log).is_empty());
}

#[tokio::test]
async fn test_execution_failure_names_the_backend() {
    let project = tempfile::tempdir().unwrap();
    let log = common::new_log();
    let mut registry = BundlerRegistry::new();
    registry.register(Box::new(RecordingBundler::new("rpm", &log).failing()));
    let mut params = common::params(&common::settings(), project.path()).await;

    let mut orchestrator = BundleOrchestrator::new(
        registry,
        common::engine(project.path(), Defects::default()),
        options("ALL", &project.path().join("native")),
    );
    let err = orchestrator.run(&mut params).await.unwrap_err();

    assert!(matches!(err, Error::BundlerExecution { ref bundler, .. } if bundler == "rpm"));
    assert!(err.to_string().contains("tool crashed"));
}

#[tokio::test]
async fn test_first_registered_backend_wins_id_collisions() {
    let project = tempfile::tempdir().unwrap();
    let log = common::new_log();
    let provider = FakeProvider::new(&["deb"], &log);
    let custom_log = Arc::clone(&log);
    let catalog = BundlerCatalog::new().with("com.acme.Deb", move || {
        Box::new(RecordingBundler::new("deb", &custom_log).named("Custom deb")) as Box<dyn Bundler>
    });
    let settings = jfx_bundler::bundler::JfxSettings {
        custom_bundlers: vec!["com.acme.Deb".into(), "com.acme.Missing".into()],
        ..common::settings()
    };

    let registry = BundlerRegistry::load(&settings, project.path(), &provider, &catalog).unwrap();
    assert_eq!(registry.len(), 1);
    assert_eq!(registry.get("deb").unwrap().name(), "deb bundler");

    let only_custom = jfx_bundler::bundler::JfxSettings {
        only_custom_bundlers: true,
        ..settings
    };
    let registry =
        BundlerRegistry::load(&only_custom, project.path(), &provider, &catalog).unwrap();
    assert_eq!(registry.get("deb").unwrap().name(), "Custom deb");
}

#[tokio::test]
async fn test_empty_registry_is_rejected() {
    let project = tempfile::tempdir().unwrap();
    let log = common::new_log();
    let settings = jfx_bundler::bundler::JfxSettings {
        only_custom_bundlers: true,
        ..common::settings()
    };
    let result = BundlerRegistry::load(
        &settings,
        project.path(),
        &FakeProvider::new(&["deb"], &log),
        &BundlerCatalog::new(),
    );
    assert!(matches!(result, Err(Error::NoBundlersRegistered)));
}

#[tokio::test]
async fn test_linux_installer_forces_application_image_first() {
    let project = tempfile::tempdir().unwrap();
    let log = common::new_log();
    let provider = FakeProvider::new(&["deb", "rpm", "linux.app"], &log);
    let mut params = common::params(&common::settings(), project.path()).await;
    let defects = Defects {
        installer_prerequisite: true,
        ..Defects::default()
    };

    let mut orchestrator = BundleOrchestrator::new(
        registry(&provider, project.path()),
        common::engine(project.path(), defects),
        options("deb", &project.path().join("native")),
    );
    let report = orchestrator.run(&mut params).await.unwrap();

    assert_eq!(common::executed(&log), vec!["linux.app", "deb"]);
    assert!(report.outcome("linux.app").unwrap().forced);
    assert_eq!(report.outcome("rpm").unwrap().status, BundlerStatus::Skipped);
    assert!(params.markers.cfg_workaround);
    assert!(orchestrator.engine().state().prerequisite_scheduled);
}

#[tokio::test]
async fn test_application_image_runs_once_when_requesting_all() {
    let project = tempfile::tempdir().unwrap();
    let log = common::new_log();
    let provider = FakeProvider::new(&["deb", "rpm", "linux.app"], &log);
    let mut params = common::params(&common::settings(), project.path()).await;
    let defects = Defects {
        installer_prerequisite: true,
        ..Defects::default()
    };

    let mut orchestrator = BundleOrchestrator::new(
        registry(&provider, project.path()),
        common::engine(project.path(), defects),
        options("ALL", &project.path().join("native")),
    );
    let report = orchestrator.run(&mut params).await.unwrap();

    assert_eq!(common::executed(&log), vec!["linux.app", "deb", "rpm"]);
    assert!(!report.outcome("linux.app").unwrap().forced);
}

#[tokio::test]
async fn test_cfg_format_is_forced_on_affected_hosts() {
    let project = tempfile::tempdir().unwrap();
    let log = common::new_log();
    let provider = FakeProvider::new(&["exe"], &log);
    let mut params = common::params(&common::settings(), project.path()).await;
    let defects = Defects {
        cfg_format: true,
        ..Defects::default()
    };

    let mut orchestrator = BundleOrchestrator::new(
        registry(&provider, project.path()),
        common::engine(project.path(), defects),
        options("ALL", &project.path().join("native")),
    );
    orchestrator.run(&mut params).await.unwrap();

    assert_eq!(params.launcher_cfg_format.as_deref(), Some("prop"));
}

#[tokio::test]
async fn test_webstart_needs_outfile() {
    let project = tempfile::tempdir().unwrap();
    let log = common::new_log();
    let provider = FakeProvider::new(&["jnlp"], &log);
    let mut params = common::params(&common::settings(), project.path()).await;

    let mut orchestrator = BundleOrchestrator::new(
        registry(&provider, project.path()),
        common::engine(project.path(), Defects::default()),
        options("jnlp", &project.path().join("native")),
    );
    let report = orchestrator.run(&mut params).await.unwrap();
    assert!(matches!(
        report.outcome("jnlp").unwrap().status,
        BundlerStatus::SkippedConfigError(_)
    ));
    assert!(common::executed(&log).is_empty());

    let mut strict = options("jnlp", &project.path().join("native"));
    strict.fail_on_error = true;
    let mut orchestrator = BundleOrchestrator::new(
        registry(&provider, project.path()),
        common::engine(project.path(), Defects::default()),
        strict,
    );
    let err = orchestrator.run(&mut params).await.unwrap_err();
    assert!(matches!(err, Error::MissingJnlpOutfile));
}

#[tokio::test]
async fn test_webstart_runs_with_outfile_unless_skipped() {
    let project = tempfile::tempdir().unwrap();
    let log = common::new_log();
    let provider = FakeProvider::new(&["linux.app", "jnlp"], &log);
    let mut settings = common::settings();
    settings
        .bundle_arguments
        .insert("jnlp.outfile".into(), "demo".into());
    let mut params = common::params(&settings, project.path()).await;

    let mut skipping = options("ALL", &project.path().join("native"));
    skipping.skip_jnlp = true;
    let mut orchestrator = BundleOrchestrator::new(
        registry(&provider, project.path()),
        common::engine(project.path(), Defects::default()),
        skipping,
    );
    let report = orchestrator.run(&mut params).await.unwrap();
    assert_eq!(common::executed(&log), vec!["linux.app"]);
    assert_eq!(report.outcome("jnlp").unwrap().status, BundlerStatus::Skipped);

    let mut orchestrator = BundleOrchestrator::new(
        registry(&provider, project.path()),
        common::engine(project.path(), Defects::default()),
        options("jnlp", &project.path().join("native")),
    );
    orchestrator.run(&mut params).await.unwrap();
    assert_eq!(common::executed(&log), vec!["linux.app", "jnlp"]);
}

#[tokio::test]
async fn test_requesting_skipped_webstart_finds_no_bundler() {
    let project = tempfile::tempdir().unwrap();
    let log = common::new_log();
    let provider = FakeProvider::new(&["linux.app", "jnlp"], &log);
    let mut settings = common::settings();
    settings
        .bundle_arguments
        .insert("jnlp.outfile".into(), "demo".into());
    let mut params = common::params(&settings, project.path()).await;

    let mut skipping = options("jnlp", &project.path().join("native"));
    skipping.skip_jnlp = true;
    let mut orchestrator = BundleOrchestrator::new(
        registry(&provider, project.path()),
        common::engine(project.path(), Defects::default()),
        skipping,
    );
    let err = orchestrator.run(&mut params).await.unwrap_err();

    assert!(matches!(err, Error::NoBundlerFound { ref requested } if requested == "jnlp"));
    assert!(common::executed(&log).is_empty());
}

#[tokio::test]
async fn test_invalid_launchers_stop_before_any_backend() {
    let project = tempfile::tempdir().unwrap();
    let settings = jfx_bundler::bundler::JfxSettings {
        secondary_launchers: vec![SecondaryLauncher {
            app_name: Some("demo".into()),
            ..Default::default()
        }],
        ..common::settings()
    };

    let err = ParameterModelBuilder::new(&settings, project.path())
        .build()
        .await
        .unwrap_err();
    assert!(matches!(err, Error::DuplicateLauncherName { ref names } if names == &["demo"]));
}
