// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! `log` backend writing to the debug USART.

use core::cell::RefCell;
use core::fmt::Write;

use cortex_m::interrupt::{self, Mutex};
use log::{LevelFilter, Log, Metadata, Record};
use stm32f7xx_hal::pac::USART3;

use super::usart::Usart;

struct UsartLogger {
    port: Mutex<RefCell<Option<Usart<USART3>>>>,
}

static LOGGER: UsartLogger = UsartLogger {
    port: Mutex::new(RefCell::new(None)),
};

impl Log for UsartLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        interrupt::free(|cs| {
            if let Some(port) = self.port.borrow(cs).borrow_mut().as_mut() {
                // Include `\r` so terminals get CRLF line endings.
                let _ = write!(port, "[{:<5}] {}\r\n", record.level(), record.args());
            }
        });
    }

    fn flush(&self) {
        interrupt::free(|cs| {
            if let Some(port) = self.port.borrow(cs).borrow_mut().as_mut() {
                port.flush();
            }
        });
    }
}

/// Route `log` output to `port`. Only the first call installs the logger.
pub fn init(port: Usart<USART3>, level: LevelFilter) {
    interrupt::free(|cs| {
        LOGGER.port.borrow(cs).replace(Some(port));
    });
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(level);
    }
}
