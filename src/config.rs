pub use crate::domain::metrics::CounterMode;
use crate::domain::types::DEFAULT_OWNER;
use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

/// Runtime configuration, resolved once at startup from the environment.
#[derive(Debug, Clone)]
pub struct Config {
    /// Which secondary counter this deployment collects. Pinned here so the
    /// formula variant never depends on which input field happens to be set.
    pub counter_mode: CounterMode,
    pub data_dir: PathBuf,
    /// Owner tag stamped on records created from this process.
    pub owner: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let mode_str = env::var("EVALLOG_COUNTER_MODE").unwrap_or_else(|_| "predicted".to_string());
        let counter_mode = CounterMode::from_str(&mode_str)?;

        let data_dir = match env::var("EVALLOG_DATA_DIR") {
            Ok(dir) => PathBuf::from(dir),
            Err(_) => {
                let home = env::var("HOME").context("Could not find HOME directory")?;
                PathBuf::from(home).join(".evallog")
            }
        };

        let owner = env::var("EVALLOG_OWNER").unwrap_or_else(|_| DEFAULT_OWNER.to_string());

        Ok(Self {
            counter_mode,
            data_dir,
            owner,
        })
    }
}
