// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! USART abstraction layer.
//!
//! - `Usart` is a transmit-only debug port used by the logger.
//! - `HostPort` carries the host request protocol in both directions.
//!
//! To access a port on the host machine, connect to its USB-serial bridge and use
//! ```
//! $ screen /dev/tty.usbmodem* <baud_rate>
//! ```

use core::fmt;
use nb::block;

use stm32f7xx_hal::{
    prelude::*,
    serial::{self, Instance, Pins, Rx, Serial, Tx},
};

pub struct Usart<U: Instance> {
    tx: Tx<U>,
}

impl<U: Instance> Usart<U> {
    pub fn new<PINS: Pins<U>>(serial: Serial<U, PINS>) -> Self {
        let (tx, _rx) = serial.split();
        Self { tx }
    }

    #[inline]
    pub fn write_byte(&mut self, b: u8) {
        let _ = block!(self.tx.write(b));
    }

    pub fn write_str(&mut self, s: &str) {
        for &b in s.as_bytes() {
            self.write_byte(b);
        }
    }

    /// Block until the hardware TX FIFO/drain is flushed.
    #[inline]
    pub fn flush(&mut self) {
        let _ = block!(self.tx.flush());
    }
}

// Implement `core::fmt::Write` so we can use `write!` / `writeln!` on `Usart`.
impl<U: Instance> fmt::Write for Usart<U> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        Usart::write_str(self, s);
        Ok(())
    }
}

/// Full-duplex serial port for host requests.
pub struct HostPort<U: Instance> {
    tx: Tx<U>,
    rx: Rx<U>,
}

impl<U: Instance> HostPort<U> {
    pub fn new<PINS: Pins<U>>(serial: Serial<U, PINS>) -> Self {
        let (tx, rx) = serial.split();
        Self { tx, rx }
    }

    /// Poll for one received byte.
    #[inline]
    pub fn read_byte(&mut self) -> nb::Result<u8, serial::Error> {
        self.rx.read()
    }

    pub fn write_all(&mut self, bytes: &[u8]) {
        for &b in bytes {
            let _ = block!(self.tx.write(b));
        }
        let _ = block!(self.tx.flush());
    }
}
