// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Status LED.
//!
//! Lit while the FPGA is powered and reported ready; dark otherwise.

use embedded_hal::digital::OutputPin;

use crate::fpga::PowerState;

/// Whether the LED is driven active-high or active-low on the board wiring.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ActiveLevel {
    High,
    Low,
}

/// LED that remembers its active level and last logical state.
pub struct Led<PIN: OutputPin> {
    pin: PIN,
    active: ActiveLevel,
    is_on: bool,
}

impl<PIN: OutputPin> Led<PIN> {
    /// Wrap `pin` and switch the LED off.
    pub fn new(pin: PIN, active: ActiveLevel) -> Self {
        let mut led = Self {
            pin,
            active,
            is_on: true,
        };
        led.set(false);
        led
    }

    pub fn active_high(pin: PIN) -> Self {
        Self::new(pin, ActiveLevel::High)
    }

    pub fn active_low(pin: PIN) -> Self {
        Self::new(pin, ActiveLevel::Low)
    }

    /// Drive the LED logically on or off. Only level changes touch the pin.
    pub fn set(&mut self, on: bool) {
        if on == self.is_on {
            return;
        }
        let high = match self.active {
            ActiveLevel::High => on,
            ActiveLevel::Low => !on,
        };
        if high {
            self.pin.set_high().ok();
        } else {
            self.pin.set_low().ok();
        }
        self.is_on = on;
    }

    /// Reflect the FPGA power state: on for [`PowerState::Ready`], off for anything else.
    pub fn show(&mut self, state: PowerState) {
        self.set(state == PowerState::Ready);
    }

    #[inline]
    pub fn is_on(&self) -> bool {
        self.is_on
    }

    pub fn free(self) -> PIN {
        self.pin
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Event, FakePower, Trace};

    #[test]
    fn starts_dark() {
        let trace = Trace::new();
        let led = Led::active_low(FakePower::new(&trace));

        assert!(!led.is_on());
        assert_eq!(trace.events(), vec![Event::Power(true)]);
    }

    #[test]
    fn follows_power_state() {
        let trace = Trace::new();
        let mut led = Led::active_high(FakePower::new(&trace));
        trace.clear();

        led.show(PowerState::Ready);
        assert!(led.is_on());
        led.show(PowerState::StatusFailed);
        assert!(!led.is_on());
        led.show(PowerState::Ready);
        led.show(PowerState::PoweredOff);
        assert!(!led.is_on());

        assert_eq!(
            trace.events(),
            vec![
                Event::Power(true),
                Event::Power(false),
                Event::Power(true),
                Event::Power(false),
            ]
        );
    }

    #[test]
    fn repeated_state_leaves_the_pin_alone() {
        let trace = Trace::new();
        let mut led = Led::active_low(FakePower::new(&trace));
        trace.clear();

        led.show(PowerState::Ready);
        led.show(PowerState::Ready);
        assert_eq!(trace.events(), vec![Event::Power(false)]);
    }
}
