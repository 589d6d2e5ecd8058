// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # Board Support
//!
//! STM32F767 wrappers that plug the HAL peripherals into the hardware-independent core. Only
//! [`led`] builds without the `board` feature.
//!
//! ## Modules
//!
//! - [`spi`] - SPI1 link to the FPGA with manual chip select.
//! - [`gpio`] - `embedded-hal` digital adapters for the power and status lines.
//! - [`delay`] - SysTick delay.
//! - [`flash`] - Calibration storage in on-chip flash.
//! - [`usart`] - Debug and host serial ports.
//! - [`logger`] - `log` backend on the debug port.
//! - [`pins`] - Board pin map.
//! - [`led`] - Status LED.

#[cfg(feature = "board")]
pub mod delay;
#[cfg(feature = "board")]
pub mod flash;
#[cfg(feature = "board")]
pub mod gpio;
pub mod led;
#[cfg(feature = "board")]
pub mod logger;
#[cfg(feature = "board")]
pub mod pins;
#[cfg(feature = "board")]
pub mod spi;
#[cfg(feature = "board")]
pub mod usart;

#[cfg(feature = "board")]
pub use delay::SysDelay;
#[cfg(feature = "board")]
pub use flash::FlashStorage;
#[cfg(feature = "board")]
pub use gpio::{InputLine, OutputLine};
pub use led::{ActiveLevel, Led};
#[cfg(feature = "board")]
pub use pins::BoardPins;
#[cfg(feature = "board")]
pub use spi::{ChipSelect, SpiLink};
#[cfg(feature = "board")]
pub use usart::{HostPort, Usart};
