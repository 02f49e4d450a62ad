//! Place command: store the observer location in the configuration.
//!
//! Coordinates go to `geo.toml` when that file exists, otherwise into the main
//! configuration file in place, keeping its comments.

use anyhow::{Result, bail};

use crate::args::GlobalOptions;
use crate::common::constants::{MAXIMUM_ALTITUDE, MINIMUM_ALTITUDE};
use crate::common::utils::private_path;
use crate::config;
use crate::geo::Place;

/// Handle the place command.
pub fn handle_place_command(
    options: &GlobalOptions,
    latitude: f64,
    longitude: f64,
    altitude: Option<f64>,
) -> Result<()> {
    log_version!();

    let (current, config_path) = super::load_config(options)?;
    let place = Place::new(
        latitude,
        longitude,
        altitude.unwrap_or(current.place().altitude),
    );

    if !place.is_valid() {
        bail!(
            "Invalid coordinates {}, {}: latitude must be within -90 to 90 and longitude within -180 to 180",
            latitude,
            longitude
        );
    }
    if !(MINIMUM_ALTITUDE..=MAXIMUM_ALTITUDE).contains(&place.altitude) {
        bail!(
            "Invalid altitude {} m: must be within {} to {}",
            place.altitude,
            MINIMUM_ALTITUDE,
            MAXIMUM_ALTITUDE
        );
    }

    config::update_place(&config_path, &place)?;

    let geo_path = config::get_geo_path(&config_path);
    let target = if geo_path.exists() {
        geo_path
    } else {
        config_path
    };

    log_block_start!("Location set to {}", place);
    log_indented!("Saved to {}", private_path(&target));
    log_end!();
    Ok(())
}

pub fn display_help() {
    log_version!();
    log_block_start!("place - Store the observer location");
    log_block_start!("Usage: suncompass place <latitude> <longitude> [altitude]");
    log_block_start!("Arguments:");
    log_indented!("latitude   Degrees north, -90 to 90 (south is negative)");
    log_indented!("longitude  Degrees east, -180 to 180 (west is negative)");
    log_indented!("altitude   Meters above sea level (keeps the current value if omitted)");
    log_block_start!("Notes:");
    log_indented!("If geo.toml exists next to suncompass.toml, the coordinates are");
    log_indented!("written there instead, keeping the main file free of your location.");
    log_block_start!("Examples:");
    log_indented!("suncompass place 51.5074 -0.1278");
    log_indented!("suncompass place -33.87 151.21 58");
    log_end!();
}
