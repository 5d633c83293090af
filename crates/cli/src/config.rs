//! Configuration management for hyprvoice.
//!
//! Configuration is loaded from TOML files in the following locations
//! (in order):
//! 1. the platform config dir (`~/.config/hyprvoice/config.toml` on Linux)
//! 2. `~/.config/hyprvoice/config.toml` (explicit, for odd setups)
//! 3. `./config.toml` (current directory, for development)

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Main configuration structure for hyprvoice.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// App name -> launch command map for the open intent.
    pub apps: HashMap<String, String>,
    /// Scoped-deletion configuration.
    pub delete: DeleteConfig,
    /// Fuzzy app-matching thresholds.
    pub matching: MatchingConfig,
    /// Desktop notification configuration.
    pub notifications: NotificationConfig,
    /// Behavior configuration.
    pub behavior: BehaviorConfig,
    /// Compositor IPC configuration.
    pub compositor: CompositorConfig,
}

/// Scoped-deletion configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DeleteConfig {
    /// Base directory the deleter may never escape.
    #[serde(default = "default_delete_base")]
    pub base_dir: String,

    /// Spoken alias -> target path.
    #[serde(default)]
    pub aliases: HashMap<String, String>,
}

impl Default for DeleteConfig {
    fn default() -> Self {
        Self {
            base_dir: default_delete_base(),
            aliases: HashMap::new(),
        }
    }
}

/// Fuzzy app-matching thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchingConfig {
    /// Minimum fuzzy score to launch an app at all.
    #[serde(default = "default_threshold")]
    pub threshold: f64,

    /// Stricter score required for very short spoken inputs.
    #[serde(default = "default_short_threshold")]
    pub short_threshold: f64,

    /// Spoken inputs shorter than this use `short_threshold`.
    #[serde(default = "default_min_len")]
    pub min_len: usize,

    /// Minimum gap in milliseconds between two executed actions.
    #[serde(default = "default_cooldown_ms")]
    pub cooldown_ms: u64,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
            short_threshold: default_short_threshold(),
            min_len: default_min_len(),
            cooldown_ms: default_cooldown_ms(),
        }
    }
}

/// Desktop notification configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Notification display time in milliseconds.
    #[serde(default = "default_notification_timeout")]
    pub timeout_ms: u32,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            timeout_ms: default_notification_timeout(),
        }
    }
}

/// Behavior configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BehaviorConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

/// Compositor IPC configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CompositorConfig {
    /// Bound on a single hyprctl invocation, in milliseconds.
    #[serde(default = "default_compositor_timeout")]
    pub timeout_ms: u64,
}

impl Default for CompositorConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_compositor_timeout(),
        }
    }
}

// Default value functions for serde
fn default_delete_base() -> String {
    directories::BaseDirs::new()
        .map(|d| d.home_dir().to_string_lossy().into_owned())
        .unwrap_or_else(|| "/".to_string())
}

fn default_threshold() -> f64 {
    0.72
}

fn default_short_threshold() -> f64 {
    0.90
}

fn default_min_len() -> usize {
    4
}

fn default_cooldown_ms() -> u64 {
    800
}

fn default_true() -> bool {
    true
}

fn default_notification_timeout() -> u32 {
    2500
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_compositor_timeout() -> u64 {
    5000
}

impl Config {
    /// Load configuration from standard locations.
    ///
    /// Returns default config if no file is found.
    pub fn load() -> Result<Self> {
        for path in config_paths() {
            if path.exists() {
                tracing::info!("Loading config from: {}", path.display());
                return Self::load_from_path(&path);
            }
        }

        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Load configuration from a specific path.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }
}

/// Get all possible config file paths in priority order.
pub fn config_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    if let Some(proj_dirs) = ProjectDirs::from("org", "hyprvoice", "hyprvoice") {
        paths.push(proj_dirs.config_dir().join("config.toml"));
    }

    if let Some(base) = directories::BaseDirs::new() {
        paths.push(
            base.home_dir()
                .join(".config")
                .join("hyprvoice")
                .join("config.toml"),
        );
    }

    paths.push(PathBuf::from("config.toml"));

    paths
}
