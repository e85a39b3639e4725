use anyhow::Result;
use clap::Parser;

use land_registry::cli::commands::{dispatch, init::InitCommand};
use land_registry::cli::{Cli, Commands};
use land_registry::config::LandRegistryConfig;
use land_registry::telemetry::init_telemetry;

fn main() -> Result<()> {
    let cli = Cli::parse();
    // a malformed .env should not block the CLI
    if let Err(e) = LandRegistryConfig::load_env_file() {
        eprintln!("⚠️  Ignoring .env: {e}");
    }

    match cli.command {
        None => {
            show_overview();
            Ok(())
        }
        Some(Commands::Init { force }) => InitCommand::new(cli.config, force).execute(),
        Some(command) => {
            let config = LandRegistryConfig::load(cli.config.as_deref())?;
            init_telemetry(
                &config.observability.log_level,
                config.observability.json_logs,
            )?;
            tokio::runtime::Runtime::new()?
                .block_on(async { dispatch(command, cli.identity, &config).await })
        }
    }
}

fn show_overview() {
    println!("🏠 land-registry");
    println!();
    println!("   land-registry init                       write land-registry.toml");
    println!("   land-registry seed                       load the sample assets");
    println!("   land-registry summary                    counts by status and pending entries");
    println!("   land-registry submit-deed asset1 @deed.json");
    println!("   land-registry approve asset1 deed 0      approve the first pending deed");
    println!();
    println!("Run 'land-registry --help' for every command.");
}
