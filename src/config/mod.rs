pub mod settings;

pub use settings::Settings;

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Get the configuration file path
///
/// `FERRET_CONFIG` wins; otherwise `<config_dir>/ferret/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os("FERRET_CONFIG").filter(|p| !p.is_empty()) {
        return Some(PathBuf::from(path));
    }
    dirs::config_dir().map(|dir| dir.join("ferret").join("config.toml"))
}

/// Load settings from the config file (if any), then apply environment overrides
pub fn load() -> Result<Settings> {
    let path = config_path();
    load_from(path.as_deref(), |key| std::env::var(key).ok())
}

/// Load settings from `path` and the variables resolved through `lookup`.
///
/// A missing file yields defaults; an unreadable or malformed one is an error.
pub fn load_from<F>(path: Option<&Path>, lookup: F) -> Result<Settings>
where
    F: Fn(&str) -> Option<String>,
{
    let mut settings = match path {
        Some(path) if path.exists() => {
            let content = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            let settings: Settings = toml::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
            tracing::debug!(path = %path.display(), "loaded config file");
            settings
        }
        _ => Settings::default(),
    };

    settings.apply_env(lookup);
    Ok(settings)
}
