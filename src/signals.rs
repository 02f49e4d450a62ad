//! Signal handling for the long-running commands.
//!
//! `watch` and `session` stop on SIGINT or SIGTERM. `watch` additionally reloads
//! its configuration on SIGHUP. Signals are read on a dedicated thread and
//! forwarded as [`SignalMessage`]s; the `running` flag is cleared before the
//! shutdown message is sent so loops polling the flag observe it first.

use anyhow::{Context, Result};
use signal_hook::{
    consts::signal::{SIGHUP, SIGINT, SIGTERM},
    iterator::Signals,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender, channel};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalMessage {
    /// Reload configuration (SIGHUP)
    Reload,
    /// Stop the command (SIGINT, SIGTERM)
    Shutdown,
}

/// Signal handling state shared between threads
pub struct SignalState {
    /// Cleared once a shutdown signal arrives
    pub running: Arc<AtomicBool>,
    pub signal_receiver: Receiver<SignalMessage>,
    pub signal_sender: Sender<SignalMessage>,
}

impl SignalState {
    /// State with no OS handlers attached; messages come only through `signal_sender`.
    pub fn detached() -> Self {
        let (signal_sender, signal_receiver) = channel();
        Self {
            running: Arc::new(AtomicBool::new(true)),
            signal_receiver,
            signal_sender,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Sleep for up to `timeout`, returning early with the first signal received.
    pub fn wait(&self, timeout: Duration) -> Option<SignalMessage> {
        match self.signal_receiver.recv_timeout(timeout) {
            Ok(message) => Some(message),
            Err(RecvTimeoutError::Timeout) => None,
            Err(RecvTimeoutError::Disconnected) => Some(SignalMessage::Shutdown),
        }
    }
}

/// Register handlers for SIGINT, SIGTERM and SIGHUP.
pub fn setup_signal_handler() -> Result<SignalState> {
    let state = SignalState::detached();

    let mut signals =
        Signals::new([SIGINT, SIGTERM, SIGHUP]).context("failed to register signal handlers")?;

    let running = Arc::clone(&state.running);
    let sender = state.signal_sender.clone();

    thread::spawn(move || {
        for sig in signals.forever() {
            let message = match sig {
                SIGHUP => SignalMessage::Reload,
                _ => {
                    running.store(false, Ordering::SeqCst);
                    SignalMessage::Shutdown
                }
            };
            log_debug!("Received signal {sig}");

            if sender.send(message).is_err() || message == SignalMessage::Shutdown {
                break;
            }
        }
    });

    Ok(state)
}
