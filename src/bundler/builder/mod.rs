//! Bundle orchestration and coordination.
//!
//! This module provides the [`BundleOrchestrator`] that drives the registered
//! backends, together with the services it relies on.
//!
//! # Overview
//!
//! One native bundling invocation:
//! 1. Applies the bundler filter and `skip_jnlp` to the registry
//! 2. Lets the workaround engine adjust parameters and schedule prerequisites
//! 3. Validates and executes each backend on its own parameter clone
//! 4. Calculates artifact sizes and checksums
//! 5. Runs the post-execution workarounds and returns a [`BundleReport`]
//!
//! # Module Organization
//!
//! - [`checksum`] - SHA256 checksum and size calculation for artifacts
//! - [`orchestrator`] - Main [`BundleOrchestrator`] control loop
//! - [`resources`] - Additional bundler resources staging
//! - [`signing`] - Jar signing for webstart bundles
//! - [`tool_detection`] - Host/JDK detection and tool lookup

mod checksum;
mod orchestrator;
mod resources;
mod signing;
mod tool_detection;

pub use checksum::{calculate_sha256, calculate_size};
pub use orchestrator::{
    BundleOrchestrator, BundleReport, BundlerOutcome, BundlerStatus, OrchestratorOptions,
    PlannedRun,
};
pub use resources::{ResourceTarget, resource_target, stage_bundler_resources};
pub use signing::SigningService;
pub use tool_detection::{HostEnvironment, HostOs, JavaVersion};
