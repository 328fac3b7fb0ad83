//! Application entry point for the Genesis organism sandbox.
//!
//! This binary parses the command line, loads the configuration, installs
//! the log subscriber and hands everything else to [`Viewer`].

mod camera;
mod canvas;
mod detail_panel;
mod viewer;

use std::path::PathBuf;

use anyhow::Context as _;
use clap::Parser;
use genesis_core::config::Config;
use tracing_subscriber::EnvFilter;
use viewer::Viewer;

#[derive(Parser, Debug)]
#[command(name = "genesis", version, about = "Interactive organ and trait sandbox")]
struct Args {
    /// TOML configuration file; built-in defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Seed for the scene's random generator, overriding the config.
    #[arg(short, long)]
    seed: Option<u64>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("loading configuration from {}", path.display()))?,
        None => Config::default(),
    };
    if args.seed.is_some() {
        config.seed = args.seed;
    }

    tracing::info!(
        seed = ?config.seed,
        blueprints = config.blueprints.len(),
        "starting genesis"
    );

    let options = eframe::NativeOptions::default();
    eframe::run_native(
        "Genesis",
        options,
        Box::new(move |_cc| Ok(Box::new(Viewer::new(config)))),
    )
    .map_err(|err| anyhow::anyhow!("viewer failed: {err}"))
}
