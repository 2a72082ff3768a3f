//! Configuration management CLI commands.
//!
//! `config get`, `config set`, `config list` and `config path` read and
//! modify `~/.linemap/config.ini` by dotted key name.

use clap::Subcommand;
use linemap::config::{config_file_path, ConfigFile, ConfigKey};

use crate::error::CliError;

/// Config subcommands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Print one value
    Get {
        /// Key as section.key (e.g., map.basemap)
        key: String,
    },

    /// Validate and store one value
    Set {
        /// Key as section.key (e.g., layers.clustering)
        key: String,

        /// New value; an empty string clears optional values
        #[arg(allow_hyphen_values = true)]
        value: String,
    },

    /// Print every setting grouped by section
    List {
        /// Mark values that differ from the defaults
        #[arg(long)]
        changed: bool,
    },

    /// Print the configuration file path
    Path,
}

/// Run a config subcommand.
pub fn run(command: ConfigCommands) -> Result<(), CliError> {
    match command {
        ConfigCommands::Get { key } => {
            let key = parse_key(&key)?;
            let config = ConfigFile::load()?;
            println!("{}", display_value(&key.get(&config)));
            Ok(())
        }
        ConfigCommands::Set { key, value } => {
            let key = parse_key(&key)?;
            // A file that fails to parse is reported, never overwritten
            let mut config = ConfigFile::load()?;
            key.set(&mut config, &value)
                .map_err(|e| CliError::Config(e.to_string()))?;
            config.save()?;
            println!("{} = {}", key.name(), display_value(&key.get(&config)));
            Ok(())
        }
        ConfigCommands::List { changed } => {
            let config = ConfigFile::load()?;
            print!("{}", render_list(&config, changed));
            Ok(())
        }
        ConfigCommands::Path => {
            println!("{}", config_file_path().display());
            Ok(())
        }
    }
}

fn parse_key(key: &str) -> Result<ConfigKey, CliError> {
    key.parse().map_err(|_| {
        CliError::Config(format!(
            "Unknown configuration key '{}'. Use 'linemap config list' to see available keys.",
            key
        ))
    })
}

fn display_value(value: &str) -> &str {
    if value.is_empty() {
        "(not set)"
    } else {
        value
    }
}

/// Every key grouped under its `[section]` header.
fn render_list(config: &ConfigFile, mark_changed: bool) -> String {
    let defaults = ConfigFile::default();
    let mut out = String::new();
    let mut section = "";

    for key in ConfigKey::all() {
        if key.section() != section {
            if !section.is_empty() {
                out.push('\n');
            }
            section = key.section();
            out.push_str(&format!("[{}]\n", section));
        }
        let value = key.get(config);
        let marker = if mark_changed && value != key.get(&defaults) {
            "  *"
        } else {
            ""
        };
        out.push_str(&format!(
            "  {} = {}{}\n",
            key.key_name(),
            display_value(&value),
            marker
        ));
    }
    out
}
