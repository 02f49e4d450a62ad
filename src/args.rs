//! Command-line argument parsing and processing.
//!
//! This module turns the raw argument list into a [`CliAction`] for `main.rs` to
//! dispatch. Global options (`--config`, `--debug`, `--log`) are accepted anywhere
//! on the line; the first positional argument selects the command and the rest
//! belong to it. Unknown options and malformed values never abort parsing silently:
//! they produce [`CliAction::ShowHelpDueToError`] after a warning naming the problem.

use chrono::{DateTime, Utc};

use crate::time_source::parse_instant;

/// Options shared by every command.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GlobalOptions {
    pub debug_enabled: bool,
    pub config_dir: Option<String>,
    pub log_file: Option<String>,
}

/// Represents the parsed command-line arguments and their intended actions.
#[derive(Debug, PartialEq)]
pub enum CliAction {
    /// Print the five-event schedule
    Schedule {
        options: GlobalOptions,
        at: Option<DateTime<Utc>>,
        json: bool,
    },
    /// Print the per-type compass projection
    Compass {
        options: GlobalOptions,
        at: Option<DateTime<Utc>>,
        json: bool,
    },
    /// Recompute periodically and log what changed
    Watch { options: GlobalOptions },
    /// Interactive compass session driven from stdin
    Session { options: GlobalOptions },
    /// Store a new observer location in the configuration
    Place {
        options: GlobalOptions,
        latitude: f64,
        longitude: f64,
        altitude: Option<f64>,
    },
    /// Show help, optionally for a single command
    Help { command: Option<String> },

    /// Display help information and exit
    ShowHelp,
    /// Display version information and exit
    ShowVersion,
    /// Show help due to unknown arguments and exit
    ShowHelpDueToError,
}

/// Result of parsing command-line arguments.
pub struct ParsedArgs {
    pub action: CliAction,
}

/// Negative coordinates look like flags; treat anything numeric as a value.
fn is_numeric(arg: &str) -> bool {
    arg.parse::<f64>().is_ok()
}

fn is_flag(arg: &str) -> bool {
    arg.starts_with('-') && !is_numeric(arg)
}

impl ParsedArgs {
    /// Parse command-line arguments into a structured result.
    ///
    /// # Arguments
    /// * `args` - Iterator over command-line arguments (typically from std::env::args())
    pub fn parse<I, S>(args: I) -> ParsedArgs
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let args_vec: Vec<String> = args
            .into_iter()
            .skip(1)
            .map(|s| s.as_ref().to_string())
            .collect();

        let mut options = GlobalOptions::default();
        let mut display_help = false;
        let mut display_version = false;
        let mut unknown_arg_found = false;
        let mut json = false;
        let mut at: Option<DateTime<Utc>> = None;
        let mut positionals: Vec<String> = Vec::new();

        let mut i = 0;
        while i < args_vec.len() {
            let arg = args_vec[i].as_str();
            match arg {
                "--help" | "-h" => display_help = true,
                "--version" | "-V" | "-v" => display_version = true,
                "--debug" | "-d" => options.debug_enabled = true,
                "--json" | "-j" => json = true,
                "--config" | "-c" => {
                    if i + 1 < args_vec.len() && !is_flag(&args_vec[i + 1]) {
                        options.config_dir = Some(args_vec[i + 1].clone());
                        i += 1;
                    } else {
                        log_warning!("Missing directory for --config. Usage: --config <directory>");
                        unknown_arg_found = true;
                    }
                }
                "--log" | "-l" => {
                    if i + 1 < args_vec.len() && !is_flag(&args_vec[i + 1]) {
                        options.log_file = Some(args_vec[i + 1].clone());
                        i += 1;
                    } else {
                        log_warning!("Missing file for --log. Usage: --log <file>");
                        unknown_arg_found = true;
                    }
                }
                "--at" | "-a" => {
                    if i + 1 < args_vec.len() {
                        match parse_instant(&args_vec[i + 1]) {
                            Ok(instant) => at = Some(instant),
                            Err(message) => {
                                log_warning!("{}", message);
                                unknown_arg_found = true;
                            }
                        }
                        i += 1;
                    } else {
                        log_warning!("Missing instant for --at. Usage: --at <RFC3339>");
                        unknown_arg_found = true;
                    }
                }
                _ if is_flag(arg) => {
                    log_warning!("Unknown option: {arg}");
                    unknown_arg_found = true;
                }
                _ => positionals.push(arg.to_string()),
            }
            i += 1;
        }

        if display_version {
            return ParsedArgs {
                action: CliAction::ShowVersion,
            };
        }
        if unknown_arg_found {
            return ParsedArgs {
                action: CliAction::ShowHelpDueToError,
            };
        }
        if display_help {
            return ParsedArgs {
                action: CliAction::ShowHelp,
            };
        }

        let command = positionals.first().map(String::as_str);
        let rest = positionals.get(1..).unwrap_or_default();

        let takes_instant = matches!(command, None | Some("schedule" | "s" | "compass" | "c"));
        if !takes_instant && (at.is_some() || json) {
            log_warning!("--at and --json only apply to the schedule and compass commands");
            return ParsedArgs {
                action: CliAction::ShowHelpDueToError,
            };
        }

        let action = match command {
            None => CliAction::Schedule { options, at, json },
            Some("schedule" | "s") if rest.is_empty() => CliAction::Schedule { options, at, json },
            Some("compass" | "c") if rest.is_empty() => CliAction::Compass { options, at, json },
            Some("watch" | "w") if rest.is_empty() => CliAction::Watch { options },
            Some("session" | "S") if rest.is_empty() => CliAction::Session { options },
            Some("place" | "p") => parse_place(options, rest),
            Some("help" | "h") if rest.len() <= 1 => CliAction::Help {
                command: rest.first().cloned(),
            },
            Some(
                cmd @ ("schedule" | "s" | "compass" | "c" | "watch" | "w" | "session" | "S"
                | "help" | "h"),
            ) => {
                log_warning!("Unexpected argument for {}: {}", cmd, rest.join(" "));
                CliAction::ShowHelpDueToError
            }
            Some(unknown) => {
                log_warning!("Unknown command: {}", unknown);
                CliAction::ShowHelpDueToError
            }
        };

        ParsedArgs { action }
    }

    /// Convenience method to parse from std::env::args()
    pub fn from_env() -> ParsedArgs {
        Self::parse(std::env::args())
    }
}

/// `place <latitude> <longitude> [altitude]`
fn parse_place(options: GlobalOptions, rest: &[String]) -> CliAction {
    if !(2..=3).contains(&rest.len()) {
        log_warning!("Usage: suncompass place <latitude> <longitude> [altitude]");
        return CliAction::ShowHelpDueToError;
    }

    let parsed: Result<Vec<f64>, _> = rest.iter().map(|v| v.parse::<f64>()).collect();
    match parsed {
        Ok(values) => CliAction::Place {
            options,
            latitude: values[0],
            longitude: values[1],
            altitude: values.get(2).copied(),
        },
        Err(_) => {
            log_warning!("Invalid coordinates: {}", rest.join(" "));
            CliAction::ShowHelpDueToError
        }
    }
}

/// Displays version information using custom logging style.
pub fn display_version_info() {
    log_version!();
    log_pipe!();
    println!("┗ {}", env!("CARGO_PKG_DESCRIPTION"));
}

/// Displays custom help message using logger methods.
pub fn display_help() {
    log_version!();
    log_block_start!(env!("CARGO_PKG_DESCRIPTION"));
    log_block_start!("Usage:");
    log_indented!("suncompass [OPTIONS] [COMMAND]");
    log_block_start!("Options:");
    log_indented!("-c, --config <dir>     Use custom configuration directory");
    log_indented!("-d, --debug            Enable detailed debug output");
    log_indented!("-l, --log <file>       Write output to a file instead of stdout");
    log_indented!("-h, --help             Print help information");
    log_indented!("-V, --version          Print version information");
    log_block_start!("Commands:");
    log_indented!("schedule, s            Show the surrounding solar events (default)");
    log_indented!("compass, c             Show solar events placed on the compass");
    log_indented!("watch, w               Recompute periodically and report changes");
    log_indented!("session, S             Interactive compass session on stdin");
    log_indented!("place, p <lat> <lon> [alt]  Store the observer location");
    log_indented!("help, h [COMMAND]      Show detailed help for a command");
    log_end!();
}
