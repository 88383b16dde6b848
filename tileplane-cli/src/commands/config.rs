//! Configuration CLI commands: `config path`, `config show` and `config set`.

use clap::Subcommand;
use tileplane::config::{config_file_path, ConfigFile};

use crate::error::CliError;

/// Config subcommands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Show the configuration file path
    Path,

    /// Show the effective configuration
    Show,

    /// Set a configuration value, e.g. `viewer.zoom_level 12`
    Set {
        /// Key as section.name
        key: String,

        /// New value
        value: String,
    },
}

/// Run a config subcommand.
pub fn run(command: ConfigCommands) -> Result<(), CliError> {
    match command {
        ConfigCommands::Path => run_path(),
        ConfigCommands::Show => run_show(),
        ConfigCommands::Set { key, value } => run_set(&key, &value),
    }
}

fn run_path() -> Result<(), CliError> {
    println!("{}", config_file_path().display());
    Ok(())
}

fn run_show() -> Result<(), CliError> {
    let path = config_file_path();
    let config = ConfigFile::load()?;

    if path.exists() {
        println!("# {}", path.display());
    } else {
        println!("# {} (not found, showing defaults)", path.display());
    }

    for (section, properties) in config.to_ini().iter() {
        let Some(section) = section else { continue };
        println!();
        println!("[{}]", section);
        for (key, value) in properties.iter() {
            // Never echo credentials.
            if key == "api_key" && !value.is_empty() {
                println!("{} = ********", key);
            } else if value.is_empty() {
                println!("{} = (not set)", key);
            } else {
                println!("{} = {}", key, value);
            }
        }
    }

    Ok(())
}

fn run_set(key: &str, value: &str) -> Result<(), CliError> {
    let mut config = ConfigFile::load()?;
    config.set_value(key, value)?;
    config.save()?;

    if key == "provider.api_key" {
        println!("Set {} = ********", key);
    } else {
        println!("Set {} = {}", key, value);
    }
    println!("Saved to {}", config_file_path().display());
    Ok(())
}
