//! Config file inspection and initialization.

use std::path::Path;

use anyhow::bail;

use crate::config::{self, Config};
use crate::error::Error;

/// Print the effective config, or write a default config file with `init`
pub fn cmd_config(
    config: &Config,
    explicit_path: Option<&Path>,
    init: bool,
    force: bool,
) -> anyhow::Result<()> {
    let path = match explicit_path {
        Some(path) => path.to_path_buf(),
        None => match config::config_path() {
            Some(path) => path,
            None => bail!("Could not determine config directory"),
        },
    };

    if init {
        if path.exists() && !force {
            bail!("{} already exists (use --force to overwrite)", path.display());
        }
        config::save_to(&path, &Config::default()).map_err(Error::from)?;
        println!("Wrote default config to {}", path.display());
        return Ok(());
    }

    let state = if path.exists() { "" } else { " (not found, using defaults)" };
    println!("# Config file: {}{}", path.display(), state);
    println!();
    print!("{}", config::to_toml(config)?);
    Ok(())
}
