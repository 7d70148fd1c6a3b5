//! Configuration loading, validation, and management for Toolgate.
//!
//! Loads configuration from `~/.toolgate/config.toml` with environment
//! variable overrides. Validates all settings at startup.
//!
//! Only classification policy lives here. Permission decisions themselves are
//! never read from or written to disk.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.toolgate/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Risk classification and prompt settings
    #[serde(default)]
    pub permissions: PermissionConfig,

    /// Decision audit trail
    #[serde(default)]
    pub audit: AuditConfig,
}

/// Upper bound on `permissions.preview_lines`.
pub const MAX_PREVIEW_LINES: usize = 5;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PermissionConfig {
    /// Writes under any of these prefixes are CRITICAL. `~` is expanded.
    #[serde(default = "default_system_path_prefixes")]
    pub system_path_prefixes: Vec<String>,

    /// Reads whose path contains one of these (case-insensitive) are HIGH.
    #[serde(default = "default_sensitive_keywords")]
    pub sensitive_keywords: Vec<String>,

    /// Unrecognised tool names starting with one of these are treated as
    /// coming from an external integration.
    #[serde(default = "default_external_tool_prefixes")]
    pub external_tool_prefixes: Vec<String>,

    /// Maximum number of content lines shown in the preview block, at most
    /// [`MAX_PREVIEW_LINES`]
    #[serde(default = "default_preview_lines")]
    pub preview_lines: usize,

    /// Preview lines longer than this are cut
    #[serde(default = "default_preview_line_width")]
    pub preview_line_width: usize,

    /// Print a one-line notice when a remembered decision is applied
    #[serde(default = "default_true")]
    pub show_fast_path_notice: bool,
}

fn default_system_path_prefixes() -> Vec<String> {
    [
        "/etc/", "/usr/", "/sys/", "/bin/", "/sbin/", "/boot/", "/proc/", "/dev/", "/lib/",
        "/root/",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}
fn default_sensitive_keywords() -> Vec<String> {
    ["password", "secret", "key", "token", "config", "env"]
        .into_iter()
        .map(String::from)
        .collect()
}
fn default_external_tool_prefixes() -> Vec<String> {
    vec!["mcp__".into()]
}
fn default_preview_lines() -> usize {
    5
}
fn default_preview_line_width() -> usize {
    120
}
fn default_true() -> bool {
    true
}

impl Default for PermissionConfig {
    fn default() -> Self {
        Self {
            system_path_prefixes: default_system_path_prefixes(),
            sensitive_keywords: default_sensitive_keywords(),
            external_tool_prefixes: default_external_tool_prefixes(),
            preview_lines: default_preview_lines(),
            preview_line_width: default_preview_line_width(),
            show_fast_path_notice: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditConfig {
    /// Keep an in-memory record of every decision
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Also emit each decision as a tracing event
    #[serde(default = "default_true")]
    pub log_to_tracing: bool,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            log_to_tracing: true,
        }
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.toolgate/config.toml).
    ///
    /// Also checks environment variables:
    /// - `TOOLGATE_EXTERNAL_TOOL_PREFIXES` (comma-separated)
    /// - `TOOLGATE_PREVIEW_LINES`
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_path();
        let mut config = Self::load_from(&config_path)?;
        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".toolgate")
    }

    /// Get the default configuration file path.
    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    fn apply_env_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(prefixes) = lookup("TOOLGATE_EXTERNAL_TOOL_PREFIXES") {
            self.permissions.external_tool_prefixes = prefixes
                .split(',')
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(String::from)
                .collect();
        }

        if let Some(lines) = lookup("TOOLGATE_PREVIEW_LINES") {
            self.permissions.preview_lines = lines.trim().parse().map_err(|_| {
                ConfigError::ValidationError(format!(
                    "TOOLGATE_PREVIEW_LINES must be a positive integer, got '{lines}'"
                ))
            })?;
        }

        Ok(())
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        let perms = &self.permissions;

        if !(1..=MAX_PREVIEW_LINES).contains(&perms.preview_lines) {
            return Err(ConfigError::ValidationError(format!(
                "permissions.preview_lines must be between 1 and {MAX_PREVIEW_LINES}"
            )));
        }

        if perms.preview_line_width < 20 {
            return Err(ConfigError::ValidationError(
                "permissions.preview_line_width must be at least 20".into(),
            ));
        }

        let lists = [
            ("system_path_prefixes", &perms.system_path_prefixes),
            ("sensitive_keywords", &perms.sensitive_keywords),
            ("external_tool_prefixes", &perms.external_tool_prefixes),
        ];
        for (field, values) in lists {
            if values.iter().any(|v| v.trim().is_empty()) {
                return Err(ConfigError::ValidationError(format!(
                    "permissions.{field} cannot contain empty entries"
                )));
            }
        }

        Ok(())
    }

    /// Generate a default config TOML string (for `config init`).
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}
