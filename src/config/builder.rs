//! Configuration file building and in-place coordinate updates.
//!
//! The default file is produced by [`ConfigBuilder`], which aligns every inline
//! comment to one column. [`update_place`] rewrites coordinate lines of an
//! existing file while keeping the user's comments and spacing.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use super::loading::get_geo_path;
use crate::common::constants::*;
use crate::common::utils::private_path;
use crate::geo::Place;

/// Column that coordinate comments are aligned to when no comment exists yet.
const FALLBACK_COMMENT_COLUMN: usize = 25;

/// Write the commented default configuration to `path`.
pub fn create_default_config(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("Failed to create config directory")?;
    }

    fs::write(path, default_config_content())
        .with_context(|| format!("Failed to write default config to {}", path.display()))?;

    log_block_start!("Created default configuration at {}", private_path(path));
    log_indented!("Edit latitude and longitude, or run 'suncompass place <lat> <lon>'");

    Ok(())
}

pub(crate) fn default_config_content() -> String {
    let mut content = ConfigBuilder::new()
        .add_section("Location")
        .add_setting(
            "latitude",
            &format!("{DEFAULT_LATITUDE:.1}"),
            "Geographic latitude (-90 to 90)",
        )
        .add_setting(
            "longitude",
            &format!("{DEFAULT_LONGITUDE:.1}"),
            "Geographic longitude (-180 to 180)",
        )
        .add_setting(
            "altitude",
            &format!("{DEFAULT_ALTITUDE:.0}"),
            &format!("Observer altitude in meters ({MINIMUM_ALTITUDE}-{MAXIMUM_ALTITUDE})"),
        )
        .add_section("Display")
        .add_commented_setting(
            "timezone",
            "\"America/Los_Angeles\"",
            "IANA zone for displayed times (default: system)",
        )
        .add_setting(
            "overlap_threshold",
            &DEFAULT_OVERLAP_THRESHOLD.to_string(),
            "Noon/nadir azimuth distance that triggers inset (0-180)°",
        )
        .add_setting(
            "refresh_interval",
            &DEFAULT_REFRESH_INTERVAL.to_string(),
            &format!(
                "Seconds between recomputations in watch mode ({MINIMUM_REFRESH_INTERVAL}-{MAXIMUM_REFRESH_INTERVAL})"
            ),
        )
        .add_section("Compass")
        .add_setting(
            "heading_alpha",
            &DEFAULT_HEADING_ALPHA.to_string(),
            "Heading smoothing factor (0-1], larger = more responsive",
        )
        .add_setting(
            "heading_quantum",
            &DEFAULT_HEADING_QUANTUM.to_string(),
            &format!("Heading redraw step in degrees (0-{MAXIMUM_HEADING_QUANTUM}]"),
        )
        .add_setting(
            "animation_duration",
            &DEFAULT_ANIMATION_DURATION.to_string(),
            &format!(
                "Lock/unlock rotation in seconds (0-{MAXIMUM_ANIMATION_DURATION} | 0 = instant)"
            ),
        )
        .build();

    content.push('\n');
    content
}

/// Update the coordinates of an existing configuration.
///
/// When a `geo.toml` sits next to the config file the coordinates are written
/// there instead, leaving the main file untouched.
pub fn update_place(config_path: &Path, place: &Place) -> Result<()> {
    if !config_path.exists() {
        anyhow::bail!("No config file found at {}", private_path(config_path));
    }

    let latitude = format!("{:.6}", place.latitude);
    let longitude = format!("{:.6}", place.longitude);
    let altitude = format!("{:.0}", place.altitude);

    let geo_path = get_geo_path(config_path);
    if geo_path.exists() {
        let geo_content = format!(
            "#[Private geo coordinates]\nlatitude = {latitude}\nlongitude = {longitude}\naltitude = {altitude}\n"
        );
        fs::write(&geo_path, geo_content)
            .with_context(|| format!("Failed to write geo.toml at {}", geo_path.display()))?;

        log_block_start!("Updated coordinates in {}", private_path(&geo_path));
        log_indented!("Location: {}", place);
        return Ok(());
    }

    let content = fs::read_to_string(config_path)
        .with_context(|| format!("Failed to read {}", private_path(config_path)))?;
    let mut updated = content.clone();

    for (key, value) in [
        ("latitude", &latitude),
        ("longitude", &longitude),
        ("altitude", &altitude),
    ] {
        match find_config_line(&content, key) {
            Some(line) => {
                let column = line.find('#').unwrap_or(FALLBACK_COMMENT_COLUMN);
                let new_line = align_comment_to_column(&line, key, value, column);
                updated = updated.replacen(&line, &new_line, 1);
            }
            None => {
                if !updated.ends_with('\n') {
                    updated.push('\n');
                }
                updated.push_str(&format!("{key} = {value}\n"));
            }
        }
    }

    fs::write(config_path, updated)
        .with_context(|| format!("Failed to write {}", private_path(config_path)))?;

    log_block_start!("Updated config at {}", private_path(config_path));
    log_indented!("Location: {}", place);

    Ok(())
}

struct ConfigBuilder {
    entries: Vec<ConfigEntry>,
}

enum ConfigEntry {
    Section(String),
    Setting { line: String, comment: String },
}

impl ConfigBuilder {
    fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    fn add_section(mut self, title: &str) -> Self {
        self.entries.push(ConfigEntry::Section(format!("#[{title}]")));
        self
    }

    fn add_setting(mut self, key: &str, value: &str, comment: &str) -> Self {
        self.entries.push(ConfigEntry::Setting {
            line: format!("{key} = {value}"),
            comment: format!("# {comment}"),
        });
        self
    }

    /// A setting shown as an example but left disabled.
    fn add_commented_setting(mut self, key: &str, value: &str, comment: &str) -> Self {
        self.entries.push(ConfigEntry::Setting {
            line: format!("# {key} = {value}"),
            comment: format!("# {comment}"),
        });
        self
    }

    fn build(self) -> String {
        let max_width = self
            .entries
            .iter()
            .filter_map(|entry| match entry {
                ConfigEntry::Setting { line, .. } => Some(line.chars().count()),
                ConfigEntry::Section(_) => None,
            })
            .max()
            .unwrap_or(0)
            + 1;

        let mut result = Vec::new();
        let mut first_section = true;

        for entry in self.entries {
            match entry {
                ConfigEntry::Section(title) => {
                    if !first_section {
                        result.push(String::new());
                    }
                    result.push(title);
                    first_section = false;
                }
                ConfigEntry::Setting { line, comment } => {
                    let padding = " ".repeat(max_width - line.chars().count());
                    result.push(format!("{line}{padding}{comment}"));
                }
            }
        }

        result.join("\n")
    }
}

/// Find the active (uncommented) line assigning `key`.
pub(crate) fn find_config_line(content: &str, key: &str) -> Option<String> {
    content
        .lines()
        .find(|line| {
            let trimmed = line.trim_start();
            !trimmed.starts_with('#')
                && trimmed
                    .split_once('=')
                    .is_some_and(|(name, _)| name.trim() == key)
        })
        .map(str::to_string)
}

/// Rewrite `key = new_value`, padding so the existing comment starts at
/// `target_column`.
fn align_comment_to_column(
    original_line: &str,
    key: &str,
    new_value: &str,
    target_column: usize,
) -> String {
    let key_value_part = format!("{key} = {new_value}");

    match original_line.find('#') {
        Some(comment_pos) => {
            let comment_part = &original_line[comment_pos..];
            let padding = target_column.saturating_sub(key_value_part.len()).max(1);
            format!("{key_value_part}{}{comment_part}", " ".repeat(padding))
        }
        None => key_value_part,
    }
}
