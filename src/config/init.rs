use anyhow::{Context, Result};
use atomic_write_file::AtomicWriteFile;
use std::fs;
use std::io::Write;
use std::path::Path;

use super::Config;
use crate::filter::FilterKind;
use crate::scoring::validation::known_names;
use crate::scoring::Factor;

/// Render the default weights document with a short header describing the
/// accepted factor and filter names.
pub fn default_config_yaml() -> Result<String> {
    let body = serde_saphyr::to_string(&Config::default())
        .context("Failed to serialize default config")?;
    Ok(format!(
        "# shelf-rank weights\n\
         # factors: {}\n\
         # filters: {}\n\
         # Factors are min-max normalized across the filtered batch before weighting.\n\
         {}",
        known_names(&Factor::ALL, Factor::name),
        known_names(&FilterKind::ALL, FilterKind::name),
        body
    ))
}

/// Write the default weights document to `path` atomically.
///
/// Refuses to replace an existing file unless `force` is set. Creates the
/// parent directory if needed.
pub fn write_default_config(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        anyhow::bail!(
            "Config file already exists at {} (use --force to overwrite)",
            path.display()
        );
    }

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory at {}", parent.display())
            })?;
        }
    }

    let yaml = default_config_yaml()?;
    let mut file = AtomicWriteFile::open(path)
        .with_context(|| format!("Failed to open atomic write file at {}", path.display()))?;
    file.write_all(yaml.as_bytes())
        .context("Failed to write config")?;
    file.commit().context("Failed to save config")?;

    Ok(())
}
