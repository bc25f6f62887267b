//! Command line front end.
//!
//! Handlers here only deal with terminal presentation; the work is done by
//! the library modules.

pub mod args;
mod commands;
mod config;
mod replay;

pub use args::{Cli, CliCommand, ConfigCliArgs, ConfigCommand, ListenCliArgs, ReplayCliArgs};
pub use commands::handle_commands_command;
pub use config::handle_config_command;
pub use replay::handle_replay_command;

use anyhow::{Context, Result};

use crate::app::{self, ListenOptions};
use crate::config::Config;

/// Stored configuration with the `--set` overrides of this run on top.
pub fn load_config(overrides: &[String]) -> Result<Config> {
    Config::load()?
        .with_assignments(overrides)
        .context("Invalid --set override")
}

pub async fn handle_listen_command(args: ListenCliArgs, config: Config) -> Result<()> {
    app::run_listen(
        config,
        ListenOptions {
            channel: args.channel,
            network: args.network,
        },
    )
    .await
}
