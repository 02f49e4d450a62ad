//! Configuration loading functionality.
//!
//! Resolves the configuration path, creates the default file when it is missing,
//! and merges the optional `geo.toml` coordinate override before validation.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use super::validation::validate_config;
use super::{Config, GeoConfig};
use crate::common::constants::*;
use crate::common::utils::private_path;

/// Path of `suncompass.toml`, in `custom_dir` when given, otherwise in the XDG
/// configuration directory.
pub fn get_config_path(custom_dir: Option<&Path>) -> Result<PathBuf> {
    if let Some(dir) = custom_dir {
        return Ok(dir.join(CONFIG_FILE_NAME));
    }

    let config_dir = dirs::config_dir().context("Could not determine config directory")?;
    Ok(config_dir.join(APP_DIR_NAME).join(CONFIG_FILE_NAME))
}

/// Path of the `geo.toml` that sits next to `config_path`.
pub fn get_geo_path(config_path: &Path) -> PathBuf {
    config_path
        .parent()
        .map(|dir| dir.join("geo.toml"))
        .unwrap_or_else(|| PathBuf::from("geo.toml"))
}

/// Load the configuration, creating a default file if none exists yet.
///
/// Returns the configuration and the path it was read from.
pub fn load(custom_dir: Option<&Path>) -> Result<(Config, PathBuf)> {
    let config_path = get_config_path(custom_dir)?;

    if !config_path.exists() {
        super::builder::create_default_config(&config_path)
            .context("Failed to create default config during load")?;
    }

    let config = load_from_path(&config_path).with_context(|| {
        format!(
            "Failed to load configuration from {}",
            private_path(&config_path)
        )
    })?;

    Ok((config, config_path))
}

/// Load configuration from a specific path.
///
/// Unlike [`load`], this never creates a file.
pub fn load_from_path(path: &Path) -> Result<Config> {
    if !path.exists() {
        anyhow::bail!(
            "Configuration file not found at {}",
            private_path(path)
        );
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config from {}", private_path(path)))?;

    let mut config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config from {}", private_path(path)))?;

    // geo.toml values are validated together with the main file
    load_geo_override_from_path(&mut config, path);

    validate_config(&config)?;

    Ok(config)
}

/// Merge coordinates from the `geo.toml` next to `config_path`, if present.
///
/// A missing file is fine. An unreadable or malformed one is reported and the
/// coordinates from the main file are kept.
pub(crate) fn load_geo_override_from_path(config: &mut Config, config_path: &Path) {
    let geo_path = get_geo_path(config_path);
    if !geo_path.exists() {
        return;
    }

    let geo = fs::read_to_string(&geo_path)
        .map_err(anyhow::Error::from)
        .and_then(|content| toml::from_str::<GeoConfig>(&content).map_err(Into::into));

    match geo {
        Ok(geo) => {
            if let Some(latitude) = geo.latitude {
                config.latitude = Some(latitude);
            }
            if let Some(longitude) = geo.longitude {
                config.longitude = Some(longitude);
            }
            if let Some(altitude) = geo.altitude {
                config.altitude = Some(altitude);
            }
            log_debug!("Coordinates loaded from {}", private_path(&geo_path));
        }
        Err(e) => {
            log_warning!("Failed to load geo.toml: {e}. Using coordinates from main config.");
        }
    }
}
