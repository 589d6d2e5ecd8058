// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! `embedded-hal` 1.0 digital traits for HAL pins.
//!
//! The driver core is written against `embedded_hal::digital`; these wrappers let the
//! STM32F7 HAL pins plug into it.

use core::convert::Infallible;

use embedded_hal::digital::{ErrorType, InputPin, OutputPin};
use stm32f7xx_hal::gpio::{self, Input, Output, PinState, PullUp, PushPull};

/// Push-pull output, initialised low.
pub struct OutputLine<const P: char, const N: u8> {
    pin: gpio::Pin<P, N, Output<PushPull>>,
}

impl<const P: char, const N: u8> OutputLine<P, N> {
    pub fn new<MODE>(pin: gpio::Pin<P, N, MODE>) -> Self {
        let mut pin = pin.into_push_pull_output();
        pin.set_state(PinState::Low);
        Self { pin }
    }
}

impl<const P: char, const N: u8> ErrorType for OutputLine<P, N> {
    type Error = Infallible;
}

impl<const P: char, const N: u8> OutputPin for OutputLine<P, N> {
    fn set_low(&mut self) -> Result<(), Infallible> {
        self.pin.set_low();
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Infallible> {
        self.pin.set_high();
        Ok(())
    }
}

/// Input with the internal pull-up enabled.
pub struct InputLine<const P: char, const N: u8> {
    pin: gpio::Pin<P, N, Input<PullUp>>,
}

impl<const P: char, const N: u8> InputLine<P, N> {
    pub fn pull_up<MODE>(pin: gpio::Pin<P, N, MODE>) -> Self {
        Self {
            pin: pin.into_pull_up_input(),
        }
    }
}

impl<const P: char, const N: u8> ErrorType for InputLine<P, N> {
    type Error = Infallible;
}

impl<const P: char, const N: u8> InputPin for InputLine<P, N> {
    fn is_high(&mut self) -> Result<bool, Infallible> {
        Ok(self.pin.is_high())
    }

    fn is_low(&mut self) -> Result<bool, Infallible> {
        Ok(self.pin.is_low())
    }
}
