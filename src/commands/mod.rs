//! Command-line command handlers for suncompass.
//!
//! Each command lives in its own submodule. The helpers here cover what the
//! commands share: loading configuration for the chosen directory, rendering
//! instants in the display zone, and turning solar query failures into the
//! user-facing error block.

pub mod compass;
pub mod help;
pub mod place;
pub mod schedule;
pub mod session;
pub mod watch;

use anyhow::Result;
use chrono::{DateTime, Local, Utc};
use chrono_tz::Tz;
use std::path::{Path, PathBuf};

use crate::args::GlobalOptions;
use crate::common::utils::private_path;
use crate::config::{self, Config};
use crate::error::SolarError;

/// Load the configuration selected by `--config`, creating the default file if needed.
pub(crate) fn load_config(options: &GlobalOptions) -> Result<(Config, PathBuf)> {
    config::load(options.config_dir.as_deref().map(Path::new))
}

/// Load the configuration and describe it in the log.
pub(crate) fn load_and_log_config(options: &GlobalOptions) -> Result<(Config, PathBuf)> {
    let (config, path) = load_config(options)?;
    config.log_config(&private_path(&path));
    Ok((config, path))
}

/// Wall-clock rendering of `instant` in the configured zone, or system local time.
pub fn format_instant(instant: DateTime<Utc>, zone: Option<Tz>) -> String {
    const FORMAT: &str = "%Y-%m-%d %H:%M:%S %Z";
    match zone {
        Some(tz) => instant.with_timezone(&tz).format(FORMAT).to_string(),
        None => instant.with_timezone(&Local).format(FORMAT).to_string(),
    }
}

/// Log a failed command. Solar query failures get a dedicated message; the
/// process exits with `EXIT_FAILURE` either way.
pub fn report_failure(error: &anyhow::Error) {
    match error.downcast_ref::<SolarError>() {
        Some(SolarError::Integrity(message)) => {
            log_pipe!();
            log_critical!("Internal error while building the event series: {}", message);
            log_indented!("This is a bug; please report it with the command line used.");
            log_end!();
        }
        Some(solar) => {
            log_sun_data_unavailable(solar, "Check the configured location and try again.");
            log_end!();
        }
        None => log_error_exit!("{:#}", error),
    }
}

/// Error block for a solar query that failed in the environment.
pub(crate) fn log_sun_data_unavailable(error: &SolarError, hint: &str) {
    log_pipe!();
    log_error!("Unable to determine sun data");
    log_indented!("{}", error);
    log_indented!("{}", hint);
}
