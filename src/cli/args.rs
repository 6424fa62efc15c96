//! Command line argument parsing.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Native bundler for JavaFX applications
#[derive(Parser, Debug)]
#[command(
    name = "jfx_bundler",
    version,
    about = "Native bundler for JavaFX applications",
    long_about = "Creates native bundles (application images, installers, webstart bundles) for JavaFX applications.

Settings are read from <project>/jfx.toml.

Usage:
  jfx_bundler native
  jfx_bundler --project-dir ../demo native --bundler deb
  jfx_bundler list-bundlers"
)]
pub struct Args {
    /// Project directory all configured paths are relative to
    #[arg(short = 'p', long, value_name = "DIR", default_value = ".", global = true)]
    pub project_dir: PathBuf,

    /// Configuration file (default: <project>/jfx.toml)
    #[arg(short, long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Debug logging and verbose tool output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create native bundles
    Native {
        /// Backend id to run, or ALL (overrides `bundler` in jfx.toml)
        #[arg(short, long, value_name = "ID")]
        bundler: Option<String>,

        /// Abort on the first backend configuration error
        #[arg(long)]
        fail_on_error: bool,
    },

    /// List the backends usable on this host
    ListBundlers,
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
