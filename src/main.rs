//! JFX Bundler - native bundles for JavaFX applications.
//!
//! This binary creates application images, installers and webstart bundles
//! for a JavaFX project configured through `jfx.toml`.

use jfx_bundler::cli::{self, Args};
use std::process;

#[tokio::main]
async fn main() {
    let args = Args::parse_args();

    // RUST_LOG wins over --verbose
    let default_level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    let exit_code = match cli::run(args).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    };

    process::exit(exit_code);
}
