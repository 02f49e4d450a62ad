//! Session command: an interactive compass session driven from stdin.
//!
//! Each input line is one of:
//!
//! - a number: raw device heading in degrees, delivered only while the sensor is
//!   subscribed (that is, while the compass is not locked)
//! - `lock` / `unlock`: toggle the lock
//! - `south` / `north`: choose which side is at the top when locked
//! - `error`: simulate a transient sensor fault
//! - `quit`: end the session
//!
//! Display updates are written to the log. Preferences persist across sessions.

use anyhow::{Context, Result};
use std::io::{BufRead, BufReader, Read};
use std::sync::mpsc::Sender;
use std::thread;

use crate::args::GlobalOptions;
use crate::common::utils::private_path;
use crate::error::SensorError;
use crate::geo::distance;
use crate::heading::{
    CompassDisplay, CompassLockState, CompassSession, HeadingSettings, ManualSensor, SensorFeed,
    SessionInput, ThreadAnimator,
};
use crate::logger::Log;
use crate::signals::setup_signal_handler;
use crate::state::FilePreferenceStore;

/// Smallest heading change worth a log line.
const MIN_LOGGED_CHANGE: f64 = 1.0;

#[derive(Debug, Clone, PartialEq)]
pub enum SessionCommand {
    Sample(f64),
    Lock,
    Unlock,
    South,
    North,
    Error,
    Quit,
}

/// Parse one stdin line. Blank lines yield `Ok(None)`.
pub fn parse_session_line(line: &str) -> Result<Option<SessionCommand>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let command = match line.to_ascii_lowercase().as_str() {
        "lock" | "l" => SessionCommand::Lock,
        "unlock" | "u" => SessionCommand::Unlock,
        "south" | "s" => SessionCommand::South,
        "north" | "n" => SessionCommand::North,
        "error" | "e" => SessionCommand::Error,
        "quit" | "q" | "exit" => SessionCommand::Quit,
        other => match other.parse::<f64>() {
            Ok(value) if value.is_finite() => SessionCommand::Sample(value),
            _ => return Err(format!("Unrecognized input: {line}")),
        },
    };
    Ok(Some(command))
}

/// Forward stdin lines into the session until `quit` or end of input.
pub fn pump_input<R: Read>(input: R, feed: &SensorFeed, tx: &Sender<SessionInput>) {
    for line in BufReader::new(input).lines() {
        let Ok(line) = line else { break };

        let command = match parse_session_line(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(message) => {
                log_warning!("{}", message);
                continue;
            }
        };

        let delivered = match command {
            SessionCommand::Sample(raw) => {
                if !feed.push(raw) {
                    log_debug!("Sample {raw} ignored: sensor not subscribed");
                }
                true
            }
            SessionCommand::Error => {
                feed.fail(SensorError::Transient("simulated fault".into()));
                true
            }
            SessionCommand::Lock => tx.send(SessionInput::Lock).is_ok(),
            SessionCommand::Unlock => tx.send(SessionInput::Unlock).is_ok(),
            SessionCommand::South => tx.send(SessionInput::SetSouthAtTop(true)).is_ok(),
            SessionCommand::North => tx.send(SessionInput::SetSouthAtTop(false)).is_ok(),
            SessionCommand::Quit => break,
        };
        if !delivered {
            return;
        }
    }

    let _ = tx.send(SessionInput::Shutdown);
}

/// Display sink that writes heading and state changes to the log.
#[derive(Debug, Default)]
pub struct LogDisplay {
    last_heading: Option<f64>,
}

impl CompassDisplay for LogDisplay {
    fn show_heading(&mut self, heading: f64) {
        let changed = self
            .last_heading
            .is_none_or(|last| distance(last, heading) >= MIN_LOGGED_CHANGE);
        if changed {
            log_decorated!("Heading {:.1}°", heading);
            self.last_heading = Some(heading);
        }
    }

    fn show_state(&mut self, state: CompassLockState) {
        log_block_start!("Compass {}", state);
    }

    fn show_degraded(&mut self, reason: &str) {
        log_warning!("Compass locked: {}", reason);
    }
}

/// Handle the session command. Runs until `quit`, end of input, or SIGINT/SIGTERM.
pub fn handle_session_command(options: &GlobalOptions) -> Result<()> {
    log_version!();
    let (config, _) = super::load_and_log_config(options)?;
    let signal_state = setup_signal_handler()?;

    let settings = HeadingSettings::from_config(&config);
    let sensor = ManualSensor::new();
    let feed = sensor.feed();
    let store = FilePreferenceStore::default_location();
    log_indented!("Preferences: {}", private_path(store.path()));

    let session = CompassSession::new(
        settings,
        Box::new(sensor),
        Box::new(ThreadAnimator::new(settings.animation_duration)),
        Box::new(LogDisplay::default()),
        Box::new(store),
    )
    .context("Failed to start the compass session")?;

    let tx = session.sender();
    thread::spawn(move || pump_input(std::io::stdin(), &feed, &tx));

    log_block_start!("Enter headings in degrees, or lock, unlock, south, north, error, quit");
    Log::set_timestamps(true);
    session.run(&signal_state.running);
    Log::set_timestamps(false);

    log_block_start!("Session ended");
    log_end!();
    Ok(())
}

pub fn display_help() {
    log_version!();
    log_block_start!("session - Interactive compass session on stdin");
    log_block_start!("Usage: suncompass session");
    log_block_start!("Input (one per line):");
    log_indented!("<degrees>        Raw device heading, used while unlocked");
    log_indented!("lock, l          Lock the compass (north or south up)");
    log_indented!("unlock, u        Follow the device heading");
    log_indented!("south, s         Show south at the top when locked");
    log_indented!("north, n         Show north at the top when locked");
    log_indented!("error, e         Simulate a transient sensor fault");
    log_indented!("quit, q          End the session");
    log_block_start!("Notes:");
    log_indented!("The lock and south-at-top choices are remembered between sessions.");
    log_end!();
}
