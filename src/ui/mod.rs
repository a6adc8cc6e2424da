//! User interface components
//!
//! This module provides the terminal front ends for microtunrs:
//! - A live status spinner showing the last played note and its correction
//! - An interactive console for editing offsets and presets
//!
//! The status line is built with indicatif, the console with dialoguer.

pub mod console;
mod monitor;

pub use console::{choose_device, format_tuning_table, Console};
pub use monitor::{create_status_spinner, run_monitor, TuningMonitor};
