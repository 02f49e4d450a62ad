//! # Suncompass Library
//!
//! Internal library for the `suncompass` binary.
//!
//! This library exists to enable testing of the solar and heading internals and
//! to keep CLI dispatch (`main.rs`) apart from application logic.
//!
//! ## Architecture
//!
//! - **Geometry**: `geo` for angular distance on the compass circle and observer places
//! - **Ephemeris**: `ephemeris` for the solar event capability and the SPA-backed adapter
//! - **Solar Events**: `solar` for the windowing engine, weak identifiers, the schedule
//!   list and the compass projection
//! - **Heading**: `heading` for the heading filter, the lock state machine, the sensor
//!   and animation capabilities, and the session actor tying them together
//! - **State**: `state` for persisted compass preferences
//! - **Configuration**: `config` for TOML-based settings
//! - **Commands**: `commands` for the CLI subcommands (schedule, compass, watch, session, place)
//! - **Infrastructure**: argument parsing, signal handling, logging, time sources

// Import macros from logger module for use in all submodules
#[macro_use]
pub mod logger;

pub mod args;
pub mod commands;
pub mod common;
pub mod config;
pub mod ephemeris;
pub mod error;
pub mod geo;
pub mod heading;
pub mod signals;
pub mod solar;
pub mod state;
pub mod time_source;
