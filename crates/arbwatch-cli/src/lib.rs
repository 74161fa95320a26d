//! # arbwatch-cli
//!
//! Command-line front end for the arbwatch tracker:
//! - Firmware link resolution (`fetch`) and source health (`verify`)
//! - Package analysis (`analyze`) and history recording (`record`)
//! - README rendering and placeholder validation (`readme`)
//! - Status website data (`site`)
//! - CI matrix generation (`matrix`) and firmware INI listing (`index`)
//! - Config file management (`config`)

pub mod cli;
pub mod commands;
pub mod config;
pub mod config_handlers;
pub mod error;

pub use cli::{Cli, Command};
pub use commands::AppContext;
pub use config::ArbwatchConfig;
pub use error::{Error, Result};

use commands::fetch::OutputMode;

/// Execute a parsed command line.
pub async fn run(cli: Cli) -> Result<()> {
    let Cli {
        config,
        history_dir,
        command,
        ..
    } = cli;
    let config_path = config.as_deref();
    let context = || -> Result<AppContext> {
        Ok(AppContext::new(
            ArbwatchConfig::load(config_path)?,
            history_dir.clone(),
        ))
    };

    match command {
        Command::Config { action } => config_handlers::handle_config_command(config_path, action),
        Command::Index {
            ini,
            device,
            region,
            max,
        } => commands::index::run(&ini, &device, &region, max),
        Command::Fetch {
            device,
            region,
            target,
            json,
            version_only,
            output,
            ..
        } => {
            commands::fetch::run(
                &context()?,
                &device,
                &region,
                target.as_deref(),
                OutputMode::from_flags(json, version_only),
                output.as_deref(),
            )
            .await
        }
        Command::Analyze {
            package,
            tools_dir,
            output_dir,
            json,
        } => commands::analyze::run(&context()?, &package, tools_dir, output_dir, json).await,
        Command::Record(args) => commands::record::run(&context()?, &args),
        Command::Readme { action } => commands::readme::run(&context()?, action),
        Command::Matrix { backfill, depth } => {
            commands::matrix::run(&context()?, backfill, depth).await
        }
        Command::Verify => commands::verify::run(&context()?).await,
        Command::Site { output } => commands::site::run(&context()?, output.as_deref()),
    }
}
