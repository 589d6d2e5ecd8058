// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Serial Peripheral Interface (SPI) link to the FPGA.
//!
//! - `ChipSelect` is an active-low GPIO output wrapper for manual CS control.
//! - `SpiLink` pairs SPI1 with its chip select and implements [`Link`].
//!
//! SPI1 runs in mode 3 (clock idles high, data captured on the second edge), 8-bit frames,
//! MSB first, with software slave management.

use stm32f7xx_hal::{
    gpio::{self, Output, PinState, PushPull},
    pac,
    prelude::*,
    spi::{self, Enabled, Spi},
};

use crate::transport::{Link, Prescale};

/// Manual chip-select line, active-low, generic over any GPIO pin.
pub struct ChipSelect<const P: char, const N: u8> {
    pin: gpio::Pin<P, N, Output<PushPull>>,
}

impl<const P: char, const N: u8> ChipSelect<P, N> {
    /// Create an active-low chip select and set to the inactive state (i.e., high).
    pub fn active_low<MODE>(pin: gpio::Pin<P, N, MODE>) -> Self {
        let mut pin = pin.into_push_pull_output();
        pin.set_state(PinState::High);
        Self { pin }
    }

    /// Assert the chip select.
    #[inline]
    pub fn select(&mut self) {
        self.pin.set_low();
    }

    /// Deassert the chip select.
    #[inline]
    pub fn deselect(&mut self) {
        self.pin.set_high();
    }
}

/// SPI1 plus its chip select.
pub struct SpiLink<P, const CP: char, const CN: u8> {
    spi: Spi<pac::SPI1, P, Enabled<u8>>,
    cs: ChipSelect<CP, CN>,
}

impl<P, const CP: char, const CN: u8> SpiLink<P, CP, CN>
where
    P: spi::Pins<pac::SPI1>,
{
    pub fn new(spi: Spi<pac::SPI1, P, Enabled<u8>>, cs: ChipSelect<CP, CN>) -> Self {
        Self { spi, cs }
    }

    /// Spin while the controller is still shifting a frame.
    #[inline]
    fn wait_idle(&self) {
        // SAFETY: read-only access to the status register of the SPI instance we own.
        let regs = unsafe { &*pac::SPI1::ptr() };
        while regs.sr.read().bsy().bit_is_set() {}
    }

    #[inline]
    fn transfer_byte(&mut self, byte: u8) -> Result<u8, spi::Error> {
        let mut tmp = [byte];
        self.spi.transfer(&mut tmp)?;
        Ok(tmp[0])
    }
}

impl<P, const CP: char, const CN: u8> Link for SpiLink<P, CP, CN>
where
    P: spi::Pins<pac::SPI1>,
{
    type Error = spi::Error;

    fn init(&mut self, prescale: Prescale) -> Result<(), spi::Error> {
        self.wait_idle();
        // SAFETY: we own SPI1; the peripheral is disabled while the divider changes.
        let regs = unsafe { &*pac::SPI1::ptr() };
        regs.cr1.modify(|_, w| w.spe().clear_bit());
        regs.cr1.modify(|_, w| unsafe {
            w.br()
                .bits(prescale.bits())
                .lsbfirst()
                .clear_bit()
                .ssm()
                .set_bit()
                .ssi()
                .set_bit()
                .mstr()
                .set_bit()
        });
        regs.cr1.modify(|_, w| w.spe().set_bit());
        Ok(())
    }

    fn send(&mut self, bytes: &[u8]) -> Result<(), spi::Error> {
        for &b in bytes {
            let _ = self.transfer_byte(b)?;
        }
        self.wait_idle();
        Ok(())
    }

    fn transfer(&mut self, buf: &mut [u8]) -> Result<(), spi::Error> {
        for b in buf.iter_mut() {
            *b = self.transfer_byte(*b)?;
        }
        self.wait_idle();
        Ok(())
    }

    fn assert_select(&mut self) -> Result<(), spi::Error> {
        self.wait_idle();
        self.cs.select();
        Ok(())
    }

    fn release_select(&mut self) -> Result<(), spi::Error> {
        self.wait_idle();
        self.cs.deselect();
        Ok(())
    }
}
