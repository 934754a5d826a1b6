use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::fence::Strategy;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub global: GlobalConfig,
    pub fences: Vec<FenceConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct GlobalConfig {
    #[serde(default = "default_listen")]
    pub listen: String,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
        }
    }
}

/// One named data set to load into the registry
#[derive(Debug, Deserialize, Clone)]
pub struct FenceConfig {
    pub name: String,
    /// GeoJSON file, relative paths resolve against the config file's directory
    pub path: PathBuf,
    #[serde(default)]
    pub strategy: Strategy,
    #[serde(default = "default_resolution")]
    pub resolution: u8,
}

fn default_listen() -> String {
    "0.0.0.0:3000".to_string()
}

fn default_resolution() -> u8 {
    12
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).context("Failed to read config file")?;
        let mut config: Config = toml::from_str(&content).context("Failed to parse config file")?;

        if let Some(dir) = path.parent() {
            for fence in &mut config.fences {
                if fence.path.is_relative() {
                    fence.path = dir.join(&fence.path);
                }
            }
        }

        Ok(config)
    }
}
