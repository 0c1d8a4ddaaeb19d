pub mod config;

use clap::{Parser, Subcommand};

/// Vortex — an IVR payment capture gateway.
#[derive(Debug, Parser)]
#[command(name = "vortexd", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Start the gateway server (default when no subcommand is given).
    Serve,
    /// Configuration utilities.
    #[command(subcommand)]
    Config(ConfigCommand),
    /// Print version information.
    Version,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Parse the config file and report any errors.
    Validate,
    /// Dump the resolved configuration (with defaults) as TOML.
    Show,
}

/// Load the config named by `VORTEX_CONFIG` (default `config.toml`).
/// A missing file resolves to the built-in defaults.
pub fn load_config() -> anyhow::Result<(vx_domain::config::Config, String)> {
    let config_path =
        std::env::var("VORTEX_CONFIG").unwrap_or_else(|_| "config.toml".into());

    let config = if std::path::Path::new(&config_path).exists() {
        let raw = std::fs::read_to_string(&config_path)
            .map_err(|e| anyhow::anyhow!("reading {config_path}: {e}"))?;
        toml::from_str(&raw)
            .map_err(|e| anyhow::anyhow!("parsing {config_path}: {e}"))?
    } else {
        vx_domain::config::Config::default()
    };

    Ok((config, config_path))
}
