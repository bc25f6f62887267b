use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "meetbot")]
#[command(about = "Meeting minutes secretary for chat channels", long_about = None)]
pub struct Cli {
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Override a config value for this run (section.key=value, repeatable)
    #[arg(short = 's', long = "set", global = true, value_name = "SECTION.KEY=VALUE")]
    pub overrides: Vec<String>,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Subcommand, Debug)]
pub enum CliCommand {
    /// Regenerate minutes from a saved transcript
    Replay(ReplayCliArgs),
    /// Run live meetings on chat lines read from stdin
    Listen(ListenCliArgs),
    /// Print the meeting command table
    Commands,
    /// Inspect or create the config file
    Config(ConfigCliArgs),
    /// Print version information
    Version,
}

#[derive(ClapArgs, Debug)]
pub struct ReplayCliArgs {
    /// Transcript file path or http(s) URL
    pub source: String,
    /// Channel of the meeting (default: taken from the file name)
    #[arg(long)]
    pub channel: Option<String>,
    /// Network of the meeting
    #[arg(long, default_value = "replay")]
    pub network: String,
    /// Output base path (default: the source name without .log.txt)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
    /// Render everything but write no files
    #[arg(long)]
    pub dry_run: bool,
    /// Give up fetching the transcript after this many seconds
    #[arg(long, default_value = "30")]
    pub timeout: u64,
    /// Print a JSON summary instead of text
    #[arg(long)]
    pub json: bool,
}

#[derive(ClapArgs, Debug)]
pub struct ListenCliArgs {
    /// Channel the console stands in for
    #[arg(short, long)]
    pub channel: String,
    /// Network name used for the meeting key and file names
    #[arg(short, long, default_value = "console")]
    pub network: String,
}

#[derive(ClapArgs, Debug)]
pub struct ConfigCliArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Print the effective configuration
    Show,
    /// Print the config file location
    Path,
    /// Write a config file with the default values
    Init {
        /// Overwrite an existing file without asking
        #[arg(long)]
        force: bool,
    },
}
