//! `toolgate config` — Configuration management commands.

use std::path::Path;
use toolgate_config::AppConfig;

pub async fn show() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

pub async fn path() -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", AppConfig::config_path().display());
    Ok(())
}

pub async fn init(force: bool) -> Result<(), Box<dyn std::error::Error>> {
    let config_path = AppConfig::config_path();
    if write_default(&config_path, force)? {
        println!("✅ Wrote default config to {}", config_path.display());
    } else {
        println!(
            "⚠️  {} already exists (use --force to overwrite)",
            config_path.display()
        );
    }
    Ok(())
}

/// Write the default config file, creating parent directories.
///
/// Returns `false` without touching anything when the file exists and
/// `force` is not set.
fn write_default(path: &Path, force: bool) -> std::io::Result<bool> {
    if path.exists() && !force {
        return Ok(false);
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, AppConfig::default_toml())?;
    Ok(true)
}
