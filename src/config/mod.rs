pub mod init;
mod schema;

pub use init::write_default_config;
pub use schema::{Config, PathsConfig, DEFAULT_TOP_N};

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Get the config directory path (~/.config/shelf-rank/)
pub fn get_config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home.join(".config").join("shelf-rank"))
}

/// Get the default config file path (~/.config/shelf-rank/weights.yaml)
pub fn get_config_path() -> Result<PathBuf> {
    Ok(get_config_dir()?.join("weights.yaml"))
}

/// Parse a weights document from YAML text
pub fn parse_config(content: &str) -> Result<Config> {
    serde_saphyr::from_str(content).context("Failed to parse config: invalid YAML")
}

fn read_config(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file at {}", path.display()))?;
    parse_config(&content).with_context(|| format!("Invalid config in {}", path.display()))
}

/// Load the weights document.
///
/// # Arguments
///
/// * `path` - Optional path to config file. If None, uses the default path
///   (~/.config/shelf-rank/weights.yaml), falling back to built-in defaults
///   when that file does not exist.
///
/// # Errors
///
/// Returns an error if:
/// - An explicitly given config file does not exist
/// - The config file cannot be read
/// - The YAML cannot be parsed into the expected sections
pub fn load_config(path: Option<PathBuf>) -> Result<Config> {
    match path {
        Some(path) => {
            if !path.exists() {
                anyhow::bail!("Config file not found at {}", path.display());
            }
            read_config(&path)
        }
        None => {
            let default_path = get_config_path()?;
            if default_path.exists() {
                read_config(&default_path)
            } else {
                info!(
                    "No config at {}, using built-in defaults",
                    default_path.display()
                );
                Ok(Config::default())
            }
        }
    }
}
