// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # Timing Calibration
//!
//! Records, per (offset, width) pair, how many glitch attempts succeeded, so a parameter sweep
//! can pick up where it left off after a restart.
//!
//! ## Modules
//!
//! - [`record`] - The calibration record and its fixed byte layout.
//! - [`store`] - Load/save/reset against a [`Storage`] backend and outcome bookkeeping.

pub mod record;
pub mod store;

pub use record::{is_valid, CalibrationRecord, TimingEntry, RECORD_SIZE};
pub use store::{CalibrationStore, Storage};
