//! Command-line entry point.
//!
//! Parses the arguments, applies the global logging options, and dispatches to
//! the command handlers in [`suncompass::commands`]. Failures are reported by
//! [`commands::report_failure`] and turn into a non-zero exit code.

use anyhow::Result;

use suncompass::args::{self, CliAction, GlobalOptions, ParsedArgs};
use suncompass::commands;
use suncompass::common::constants::{EXIT_FAILURE, EXIT_SUCCESS};
use suncompass::logger::{Log, LoggerGuard};

fn main() {
    let parsed_args = ParsedArgs::from_env();

    let code = match run(parsed_args.action) {
        Ok(code) => code,
        Err(e) => {
            commands::report_failure(&e);
            EXIT_FAILURE
        }
    };

    std::process::exit(code);
}

fn run(action: CliAction) -> Result<i32> {
    match action {
        CliAction::ShowVersion => {
            args::display_version_info();
            Ok(EXIT_SUCCESS)
        }
        CliAction::ShowHelp => {
            args::display_help();
            Ok(EXIT_SUCCESS)
        }
        CliAction::ShowHelpDueToError => {
            args::display_help();
            Ok(EXIT_FAILURE)
        }
        CliAction::Help { command } => {
            commands::help::run_help_command(command.as_deref())?;
            Ok(EXIT_SUCCESS)
        }
        CliAction::Schedule { options, at, json } => {
            let _guard = apply_global_options(&options)?;
            commands::schedule::handle_schedule_command(&options, at, json)?;
            Ok(EXIT_SUCCESS)
        }
        CliAction::Compass { options, at, json } => {
            let _guard = apply_global_options(&options)?;
            commands::compass::handle_compass_command(&options, at, json)?;
            Ok(EXIT_SUCCESS)
        }
        CliAction::Watch { options } => {
            let _guard = apply_global_options(&options)?;
            commands::watch::handle_watch_command(&options)?;
            Ok(EXIT_SUCCESS)
        }
        CliAction::Session { options } => {
            let _guard = apply_global_options(&options)?;
            commands::session::handle_session_command(&options)?;
            Ok(EXIT_SUCCESS)
        }
        CliAction::Place {
            options,
            latitude,
            longitude,
            altitude,
        } => {
            let _guard = apply_global_options(&options)?;
            commands::place::handle_place_command(&options, latitude, longitude, altitude)?;
            Ok(EXIT_SUCCESS)
        }
    }
}

/// Enable debug output and file logging. The returned guard must outlive the command.
fn apply_global_options(options: &GlobalOptions) -> Result<Option<LoggerGuard>> {
    Log::set_debug(options.debug_enabled);

    match &options.log_file {
        Some(path) => Ok(Some(Log::start_file_logging(path.clone())?)),
        None => Ok(None),
    }
}
