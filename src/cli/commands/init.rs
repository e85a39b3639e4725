use anyhow::{bail, Result};
use std::path::PathBuf;

use crate::config::{LandRegistryConfig, DEFAULT_CONFIG_FILE};

/// Writes the default configuration so it can be edited
pub struct InitCommand {
    pub path: PathBuf,
    pub force: bool,
}

impl InitCommand {
    pub fn new(path: Option<PathBuf>, force: bool) -> Self {
        Self {
            path: path.unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE)),
            force,
        }
    }

    pub fn execute(&self) -> Result<()> {
        if self.path.exists() && !self.force {
            bail!(
                "{} already exists; pass --force to overwrite it",
                self.path.display()
            );
        }
        LandRegistryConfig::default().save_to_file(&self.path)?;
        println!("✅ Wrote default configuration to {}", self.path.display());
        println!("   Edit [authority] to restrict who may approve deeds and incumbrances.");
        Ok(())
    }
}
