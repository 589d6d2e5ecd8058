// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Firmware-wide constants: timings, calibration layout, and bus defaults.

use crate::transport::Prescale;

// =============================================================================
// Calibration record
// =============================================================================

/// Sentinel stored in the first word of a valid calibration record ("GLCH").
pub const CALIBRATION_MAGIC: u32 = 0x4843_4C47;

/// Number of timing slots in the calibration table.
pub const TIMING_SLOTS: usize = 32;

// =============================================================================
// FPGA power sequencing
// =============================================================================

/// Hold time with power removed before re-applying it.
pub const POWER_OFF_SETTLE_US: u32 = 300;

/// Wait after applying power before sampling the status input.
pub const POWER_ON_SETTLE_MS: u32 = 50;

/// Bus prescaler used while power sequencing the FPGA.
pub const RESET_PRESCALE: Prescale = Prescale::Div4;

/// Bus prescaler used for normal operation.
pub const RUN_PRESCALE: Prescale = Prescale::Div2;

// =============================================================================
// Target device reset
// =============================================================================

/// Width of the reset pulse on the target control line.
pub const RESET_PULSE_MS: u32 = 2;

/// Pause between the reset pulse and the stuck-line hold.
pub const STUCK_LEAD_MS: u32 = 15;

/// How long the control line is forced during a stuck-glitch reset.
pub const STUCK_HOLD_MS: u32 = 2000;

/// Settle time after releasing the stuck control line.
pub const STUCK_TAIL_MS: u32 = 1;

// =============================================================================
// Glitch arming
// =============================================================================

/// Settle time between latching glitch parameters and enabling the trigger.
pub const ARM_SETTLE_MS: u32 = 1;
