// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! SysTick busy-wait delay exposed through `embedded_hal::delay::DelayNs`.

use cortex_m::delay::Delay;
use embedded_hal::delay::DelayNs;

pub struct SysDelay {
    inner: Delay,
}

impl SysDelay {
    /// `inner` must have been built with the core clock frequency in Hz.
    pub fn new(inner: Delay) -> Self {
        Self { inner }
    }
}

impl DelayNs for SysDelay {
    fn delay_ns(&mut self, ns: u32) {
        // SysTick resolution is one microsecond here
        self.inner.delay_us(ns.div_ceil(1_000));
    }

    fn delay_us(&mut self, us: u32) {
        self.inner.delay_us(us);
    }

    fn delay_ms(&mut self, ms: u32) {
        self.inner.delay_ms(ms);
    }
}
