// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # Glitch Controller Firmware
//!
//! This crate contains the firmware for a fault-injection peripheral: an STM32F767 that power
//! sequences an FPGA and commands it, over SPI, to fire precisely timed glitch pulses at a target
//! device. It also keeps a persistent calibration table of which (offset, width) pairs worked.
//!
//! ## Crate Structure
//!
//! | Module | Purpose |
//! | ------ | -------- |
//! | [`transport`] | The byte-level link to the FPGA (`Link` trait) |
//! | [`fpga`] | FPGA command protocol, buffer exchange, glitch arming, power sequencing |
//! | [`calibration`] | Persistent per-candidate success counters |
//! | [`protocol`] | Host request/response framing |
//! | [`controller`] | Maps host requests onto the above |
//! | [`poll`] | Bounded flag polling |
//! | [`config`] | Timings and other constants |
//! | [`hw`] | Status LED, plus the STM32F767 wrappers (feature `board`) |
//!
//! Everything except the STM32 wrappers in `hw` is hardware independent and unit tested on the
//! host.
//!
//! ## Getting Started
//!
//! Run the tests:
//!
//! ```bash
//! cargo test
//! ```
//!
//! Flash the board:
//!
//! ```bash
//! cargo run --release --features board --target thumbv7em-none-eabihf
//! ```
//!
//! ## License
//!
//! Licensed under the **MIT License**.
//! See the `LICENSE` file in the repository root for full terms.
//!
//! © 2025–2026 Christopher Liu

#![cfg_attr(not(test), no_std)]

pub mod calibration;
pub mod config;
pub mod controller;
pub mod error;
pub mod fpga;
pub mod hw;
pub mod poll;
pub mod protocol;
pub mod transport;

#[cfg(test)]
mod testing;

pub use error::Error;
