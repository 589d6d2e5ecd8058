// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # FPGA Driver
//!
//! Everything that talks to the glitch FPGA over the [`Link`](crate::transport::Link).
//!
//! ## Modules
//!
//! - [`frame`] - Byte-exact command frames for each opcode and subcommand.
//! - [`command`] - The [`Fpga`] driver: parameter writes, status reads, identification.
//! - [`buffer`] - Bulk transfers into and out of the FPGA-side buffers.
//! - [`glitch`] - Glitch parameter programming, arming, and flag readback.
//! - [`power`] - FPGA power sequencing and target reset.

pub mod buffer;
pub mod command;
pub mod frame;
pub mod glitch;
pub mod power;

pub use command::Fpga;
pub use frame::Buffer;
pub use glitch::{GlitchCandidate, GlitchFlags, MmcFlags};
pub use power::{PowerSequencer, PowerState};
