use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;

use cd_rip::CdRipper;
use shared_utils::config::default_config_path;
use shared_utils::logging::{init_logging, LogConfig};
use shared_utils::{ui, DialoguerPrompter, RipperConfig, SystemRunner};

#[derive(Parser)]
#[command(name = "cd-rip")]
#[command(version, about = "Rip audio CDs and their enhanced content", long_about = None)]
struct Cli {
    /// Optical drive device
    #[arg(short, long)]
    device: Option<String>,
    /// Library root for ripped CDs
    #[arg(short, long)]
    output_dir: Option<PathBuf>,
    /// Config file (default: ~/.config/disc-rip/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Show debug output on the terminal
    #[arg(short, long)]
    verbose: bool,
    /// Write the effective configuration and exit
    #[arg(long)]
    write_config: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let _ = init_logging("cd_rip", LogConfig::default().verbose(cli.verbose));
    ui::install_interrupt_handler()?;

    // --write-config may target a file that does not exist yet.
    let loaded = match &cli.config {
        Some(path) if cli.write_config && !path.exists() => RipperConfig::default(),
        explicit => RipperConfig::load(explicit.as_deref()).context("Failed to load configuration")?,
    };
    let config = loaded
        .with_device(cli.device)
        .with_cd_output_dir(cli.output_dir);
    config.validate()?;

    if cli.write_config {
        let path = match cli.config {
            Some(path) => path,
            None => default_config_path()?,
        };
        config.save_to(&path)?;
        ui::print_success(&format!("Configuration written to {}", path.display()));
        return Ok(());
    }

    tracing::info!(device = %config.device, output = %config.cd_output_dir.display(), "Starting cd-rip");

    let runner = SystemRunner::new();
    let prompter = DialoguerPrompter::new();
    CdRipper::new(&runner, &prompter, config)
        .run()
        .context("CD ripping stopped")?;
    Ok(())
}
