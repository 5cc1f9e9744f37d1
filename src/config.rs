//! Configuration management
//!
//! Settings live in a TOML file under the platform config directory. A
//! missing file is replaced with defaults on first load.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::bridge::BridgeConfig;
use crate::notifier::NudgeConfig;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// HTTP bridge settings
    #[serde(default)]
    pub bridge: BridgeConfig,
    /// Attention-signal settings
    #[serde(default)]
    pub nudge: NudgeConfig,
}

impl Config {
    /// Load configuration from file
    pub fn load() -> Result<Self> {
        Self::load_from(&config_path()?)
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        self.save_to(&config_path()?)
    }

    fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents =
                std::fs::read_to_string(path).context("Failed to read config file")?;
            let config: Config = toml::from_str(&contents).context("Failed to parse config file")?;
            Ok(config)
        } else {
            let config = Config::default();
            config.save_to(path)?;
            Ok(config)
        }
    }

    fn save_to(&self, path: &Path) -> Result<()> {
        let parent = path.parent().context("Config path has no parent")?;
        std::fs::create_dir_all(parent).context("Failed to create config directory")?;

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, contents).context("Failed to write config file")?;
        Ok(())
    }
}

/// Get the configuration file path
pub fn config_path() -> Result<PathBuf> {
    let base = directories::ProjectDirs::from("com", "visual-feedback", "visual-feedback")
        .context("Failed to get project directories")?;
    Ok(base.config_dir().join("config.toml"))
}

/// Project label shown to the producer: basename of the working directory
pub fn project_name() -> String {
    std::env::current_dir()
        .ok()
        .and_then(|dir| dir.file_name().map(|n| n.to_string_lossy().into_owned()))
        .unwrap_or_else(|| "unknown".to_string())
}

/// Show current configuration
pub fn show_config() -> Result<()> {
    let config = Config::load()?;

    println!("Configuration ({})", config_path()?.display());
    println!("  bridge.port:    {}", config.bridge.port);
    println!("  bridge.host:    {}", config.bridge.host);
    println!(
        "  nudge.enabled:  {}",
        if config.nudge.enabled { "on" } else { "off" }
    );
    println!("  nudge.delay_ms: {}", config.nudge.delay_ms);
    println!(
        "  nudge.command:  {}",
        config.nudge.command.as_deref().unwrap_or("(not set)")
    );

    Ok(())
}

/// Set the HTTP bridge port
pub fn set_port(port: u16) -> Result<()> {
    let mut config = Config::load()?;
    config.bridge.port = port;
    config.save()?;
    println!("Bridge port set to {}", port);
    Ok(())
}

/// Set the nudge command
pub fn set_nudge_command(command: &str) -> Result<()> {
    shell_words::split(command).context("Nudge command does not parse as a shell command")?;

    let mut config = Config::load()?;
    config.nudge.command = Some(command.to_string());
    config.save()?;
    println!("Nudge command set");
    Ok(())
}

/// Enable or disable the nudge
pub fn set_nudge_enabled(enabled: bool) -> Result<()> {
    let mut config = Config::load()?;
    config.nudge.enabled = enabled;
    config.save()?;
    println!("Nudge {}", if enabled { "enabled" } else { "disabled" });
    Ok(())
}

/// Reset configuration to defaults
pub fn reset_config() -> Result<()> {
    let config = Config::default();
    config.save()?;
    println!("Configuration reset to defaults.");
    Ok(())
}
