use anyhow::Result;
use clap::Parser;
use meetbot::cli::{
    handle_commands_command, handle_config_command, handle_listen_command, handle_replay_command,
    load_config, Cli, CliCommand,
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let log_level = if cli.verbose { "debug" } else { "info" };
    let env_filter = EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        CliCommand::Version => {
            println!("MeetBot {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        CliCommand::Commands => {
            handle_commands_command();
            Ok(())
        }
        CliCommand::Config(args) => handle_config_command(args, &cli.overrides),
        CliCommand::Replay(args) => {
            let config = load_config(&cli.overrides)?;
            handle_replay_command(args, config).await
        }
        CliCommand::Listen(args) => {
            let config = load_config(&cli.overrides)?;
            handle_listen_command(args, config).await
        }
    }
}
