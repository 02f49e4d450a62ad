//! Formatting helpers shared by the schedule views and the CLI.

use chrono::{DateTime, Duration, Utc};
use std::path::Path;

/// Render a signed offset from now as a short human label.
///
/// Positive offsets are in the future (`"in 2h 13m"`), negative ones in the past
/// (`"45m ago"`). Anything under a minute either way is `"now"`.
pub fn relative_label(offset: Duration) -> String {
    let total_minutes = offset.num_minutes();
    if total_minutes == 0 {
        return "now".to_string();
    }

    let magnitude = total_minutes.unsigned_abs();
    let hours = magnitude / 60;
    let minutes = magnitude % 60;
    let span = match (hours, minutes) {
        (0, m) => format!("{m}m"),
        (h, 0) => format!("{h}h"),
        (h, m) => format!("{h}h {m}m"),
    };

    if total_minutes > 0 {
        format!("in {span}")
    } else {
        format!("{span} ago")
    }
}

/// Label for an event instant relative to `now`.
pub fn relative_to(instant: DateTime<Utc>, now: DateTime<Utc>) -> String {
    relative_label(instant.signed_duration_since(now))
}

/// Replace the home directory prefix with `~` for display.
pub fn private_path(path: &Path) -> String {
    if let Some(home) = dirs::home_dir()
        && let Ok(stripped) = path.strip_prefix(&home)
    {
        return format!("~/{}", stripped.display());
    }
    path.display().to_string()
}
