//! Help command implementation for suncompass.
//!
//! Dispatches to the command-specific help text, or shows the command overview.

use anyhow::Result;

/// Run the help command (dispatcher)
///
/// # Arguments
/// * `command` - Optional command name to get help for (None = general help)
pub fn run_help_command(command: Option<&str>) -> Result<()> {
    match command {
        None => display_general_help(),
        Some("schedule" | "s") => super::schedule::display_help(),
        Some("compass" | "c") => super::compass::display_help(),
        Some("watch" | "w") => super::watch::display_help(),
        Some("session" | "S") => super::session::display_help(),
        Some("place" | "p") => super::place::display_help(),
        Some("help" | "h") => display_help_help(),
        Some(unknown) => {
            log_warning!("Unknown command: {}", unknown);
            display_general_help();
        }
    }
    Ok(())
}

/// Display general help focused on commands (for the help command)
fn display_general_help() {
    log_version!();
    log_block_start!("Available Commands:");
    log_indented!("schedule, s [--at <instant>] [--json]  Surrounding solar events");
    log_indented!("compass, c [--at <instant>] [--json]   Solar events on the compass");
    log_indented!("watch, w                               Report schedule changes live");
    log_indented!("session, S                             Interactive compass session");
    log_indented!("place, p <lat> <lon> [alt]             Store the observer location");
    log_indented!("help, h [COMMAND]                      Show help for a command");
    log_pipe!();
    log_info!("Use 'suncompass help <command>' to see detailed help for a specific command.");
    log_indented!("Use 'suncompass --help' to see all options and general usage.");
    log_end!();
}

/// Display help for the help command itself
fn display_help_help() {
    log_version!();
    log_block_start!("help - Display help information");
    log_block_start!("Usage: suncompass help [COMMAND]");
    log_block_start!("Arguments:");
    log_indented!("COMMAND  Optional command to get help for");
    log_indented!("         If omitted, shows general help");
    log_block_start!("Examples:");
    log_indented!("suncompass help compass");
    log_indented!("suncompass help session");
    log_end!();
}
