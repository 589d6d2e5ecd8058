// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Transport link to the FPGA.
//!
//! The link is a synchronous serial bus (full duplex, 8-bit frames, MSB first) with a manually
//! driven, active-low select line. The controller never toggles select on its own: every command
//! frame is bracketed by [`Link::assert_select`] and [`Link::release_select`], usually through
//! [`Link::framed`].
//!
//! Transfers block until the hardware is done. There is no asynchronous completion path.

/// Serial clock divider relative to the peripheral clock: fast for normal operation, slower
/// while power sequencing.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Prescale {
    Div2,
    Div4,
}

impl Prescale {
    /// Value of the 3-bit baud-rate field in the controller's control register.
    #[inline]
    pub fn bits(self) -> u8 {
        match self {
            Prescale::Div2 => 0b000,
            Prescale::Div4 => 0b001,
        }
    }
}

/// Byte-level access to the FPGA serial bus and its select line.
///
/// Implementations own the bus and the select pin. Only one logical operation may use them at a
/// time; the `&mut self` receivers enforce that.
pub trait Link {
    type Error;

    /// (Re)configure the bus: full duplex, 8-bit frames, MSB first, software select.
    fn init(&mut self, prescale: Prescale) -> Result<(), Self::Error>;

    /// Transmit `bytes`, discarding whatever is clocked in. Returns once the last bit is out.
    fn send(&mut self, bytes: &[u8]) -> Result<(), Self::Error>;

    /// Transmit `buf` and overwrite it in place with the bytes received in the same cycles.
    fn transfer(&mut self, buf: &mut [u8]) -> Result<(), Self::Error>;

    /// Wait for any in-flight transfer to drain, then drive select low.
    fn assert_select(&mut self) -> Result<(), Self::Error>;

    /// Wait for any in-flight transfer to drain, then drive select high.
    fn release_select(&mut self) -> Result<(), Self::Error>;

    /// Run `f` with select asserted. Select is released even if `f` fails.
    fn framed<T, F>(&mut self, f: F) -> Result<T, Self::Error>
    where
        Self: Sized,
        F: FnOnce(&mut Self) -> Result<T, Self::Error>,
    {
        self.assert_select()?;
        let result = f(self);
        let released = self.release_select();
        let value = result?;
        released?;
        Ok(value)
    }
}
