//! `dao-gov init`: write the default deployment config.

use super::config::{default_config_path, GovConfig};
use std::path::PathBuf;

pub fn execute(config: Option<String>, force: bool) -> Result<(), Box<dyn std::error::Error>> {
    let path = config
        .map(PathBuf::from)
        .unwrap_or_else(default_config_path);

    if path.exists() && !force {
        return Err(format!(
            "Config file '{}' already exists (use --force to overwrite)",
            path.display()
        )
        .into());
    }

    GovConfig::create_default(&path)?;
    println!("Wrote default config to {}", path.display());
    println!("Edit the [governance] and [[members]] sections, then run `dao-gov validate`.");
    Ok(())
}
