// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! FPGA power sequencing and target reset.
//!
//! [`PowerSequencer`] owns the FPGA power-enable output and the FPGA status input. The serial link
//! stays with [`Fpga`] and is borrowed for the duration of a sequence.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};
use log::{info, warn};

use super::command::Fpga;
use super::frame::ctrl;
use crate::config;
use crate::error::Error;
use crate::transport::Link;

/// Where the last power sequence got to.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PowerState {
    /// Power removed.
    PoweredOff,
    /// Bus drained and select parked at its idle level, power still off.
    SelectIdle,
    /// Power applied, status not yet sampled.
    PowerApplied,
    /// Status input read high after power-up.
    Ready,
    /// Status input read low after power-up.
    StatusFailed,
}

/// FPGA power-enable and status lines.
pub struct PowerSequencer<PWR, ST> {
    power: PWR,
    status: ST,
    state: PowerState,
}

impl<PWR, ST> PowerSequencer<PWR, ST>
where
    PWR: OutputPin,
    ST: InputPin,
{
    /// Take the power-enable output and status input. Power is driven off immediately.
    pub fn new(mut power: PWR, status: ST) -> Self {
        power.set_low().ok();
        Self {
            power,
            status,
            state: PowerState::PoweredOff,
        }
    }

    /// Release the pins.
    pub fn free(self) -> (PWR, ST) {
        (self.power, self.status)
    }

    #[inline]
    pub fn state(&self) -> PowerState {
        self.state
    }

    /// Bring up the link at its run speed with the FPGA unpowered and select idle.
    pub fn init<L: Link>(&mut self, fpga: &mut Fpga<L>) -> Result<(), Error<L::Error>> {
        fpga.link.init(config::RUN_PRESCALE)?;
        self.power_off();
        fpga.link.release_select()?;
        Ok(())
    }

    /// Power-cycle the FPGA and check its status signal.
    ///
    /// Returns [`Error::StatusSignalFailed`] if the status input is low once power has settled.
    pub fn reset<L: Link, D: DelayNs>(
        &mut self,
        fpga: &mut Fpga<L>,
        delay: &mut D,
    ) -> Result<(), Error<L::Error>> {
        fpga.link.init(config::RESET_PRESCALE)?;

        self.power_off();
        fpga.link.release_select()?;
        self.state = PowerState::SelectIdle;
        delay.delay_us(config::POWER_OFF_SETTLE_US);

        self.power.set_high().ok();
        self.state = PowerState::PowerApplied;
        delay.delay_ms(config::POWER_ON_SETTLE_MS);

        // A pin read error counts as a low status.
        if self.status.is_high().unwrap_or(false) {
            info!("fpga powered up");
            self.state = PowerState::Ready;
            Ok(())
        } else {
            warn!("fpga status low after power-up");
            self.state = PowerState::StatusFailed;
            Err(Error::StatusSignalFailed)
        }
    }

    /// Remove FPGA power.
    pub fn power_off(&mut self) {
        self.power.set_low().ok();
        self.state = PowerState::PoweredOff;
    }
}

impl<L: Link> Fpga<L> {
    /// Pulse the target's control line to reset it.
    ///
    /// With `stuck_glitch` the line is additionally forced for two seconds, which leaves the
    /// target's boot processor wedged. That path is suspect on real hardware and kept as is.
    pub fn reset_device<D: DelayNs>(
        &mut self,
        delay: &mut D,
        stuck_glitch: bool,
    ) -> Result<(), Error<L::Error>> {
        self.write_control(ctrl::LATCH)?;
        delay.delay_ms(config::RESET_PULSE_MS);
        self.write_control(ctrl::CLEAR)?;

        if stuck_glitch {
            warn!("holding target control line for stuck-glitch reset");
            delay.delay_ms(config::STUCK_LEAD_MS);
            self.write_control(ctrl::STUCK)?;
            delay.delay_ms(config::STUCK_HOLD_MS);
            self.write_control(ctrl::CLEAR)?;
            delay.delay_ms(config::STUCK_TAIL_MS);
        }

        Ok(())
    }
}
