//! CLI handler for the config file.

use anyhow::{Context, Result};
use dialoguer::{theme::ColorfulTheme, Confirm};

use crate::config::Config;

use super::args::{ConfigCliArgs, ConfigCommand};

pub fn handle_config_command(args: ConfigCliArgs, overrides: &[String]) -> Result<()> {
    match args.command {
        ConfigCommand::Show => {
            let config = super::load_config(overrides)?;
            let content = toml::to_string_pretty(&config).context("Failed to serialize config")?;
            println!("{}", content);
        }
        ConfigCommand::Path => println!("{}", Config::config_path()?.display()),
        ConfigCommand::Init { force } => init_config(force)?,
    }
    Ok(())
}

fn init_config(force: bool) -> Result<()> {
    let path = Config::config_path()?;
    if path.exists() && !force {
        let overwrite = Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(format!("{} exists. Replace it with the defaults?", path.display()))
            .default(false)
            .interact()?;
        if !overwrite {
            println!("Config left unchanged.");
            return Ok(());
        }
    }

    Config::default().save()?;
    println!("Wrote default config to {}", path.display());
    Ok(())
}
