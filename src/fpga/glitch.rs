// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Glitch programming and result readback.

use embedded_hal::delay::DelayNs;
use log::debug;

use super::command::Fpga;
use super::frame::{ctrl, sub};
use crate::config;
use crate::error::Error;
use crate::transport::Link;

/// MMC flag raised once the FPGA has buffered loader data from the target.
pub const MMC_LOADER_DATA_RCVD: u8 = 1 << 1;

/// One set of glitch timing parameters, in FPGA clock cycles.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct GlitchCandidate {
    /// Delay from trigger to pulse start.
    pub offset: u16,
    /// Pulse length.
    pub width: u8,
    /// How long the FPGA waits for the trigger.
    pub timeout: u8,
    /// Fine adjustment below one offset step.
    pub subcycle_delay: u8,
}

/// Raw glitch-outcome bitmask.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct GlitchFlags {
    raw: u8,
}

impl GlitchFlags {
    #[inline]
    pub fn raw(&self) -> u8 {
        self.raw
    }
}

/// Raw buffer-transfer state bitmask.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MmcFlags {
    raw: u8,
}

impl MmcFlags {
    #[inline]
    pub fn raw(&self) -> u8 {
        self.raw
    }

    /// Loader data from the target is waiting in the FPGA.
    #[inline]
    pub fn loader_data_received(&self) -> bool {
        (self.raw & MMC_LOADER_DATA_RCVD) != 0
    }
}

impl<L: Link> Fpga<L> {
    /// Program `candidate` and arm the glitch trigger.
    ///
    /// All parameters are written before the latch, and the latch gets [`config::ARM_SETTLE_MS`]
    /// to settle before the trigger is enabled.
    pub fn arm<D: DelayNs>(
        &mut self,
        candidate: &GlitchCandidate,
        delay: &mut D,
    ) -> Result<(), Error<L::Error>> {
        debug!(
            "arming glitch: offset={} width={} timeout={} subcycle={}",
            candidate.offset, candidate.width, candidate.timeout, candidate.subcycle_delay
        );

        self.write_control(ctrl::CLEAR)?;
        self.write_word(sub::OFFSET, candidate.offset)?;
        self.write_byte(sub::WIDTH, candidate.width)?;
        self.write_byte(sub::TIMEOUT, candidate.timeout)?;
        self.write_byte(sub::SUBCYCLE_DELAY, candidate.subcycle_delay)?;
        self.write_control(ctrl::LATCH)?;
        delay.delay_ms(config::ARM_SETTLE_MS);
        self.write_control(ctrl::ENABLE)
    }

    pub fn read_glitch_flags(&mut self) -> Result<GlitchFlags, Error<L::Error>> {
        Ok(GlitchFlags {
            raw: self.read_status(sub::GLITCH_FLAGS)?,
        })
    }

    pub fn read_mmc_flags(&mut self) -> Result<MmcFlags, Error<L::Error>> {
        Ok(MmcFlags {
            raw: self.read_status(sub::MMC_FLAGS)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Event, FakeDelay, FakeLink, Trace};

    fn send(bytes: &[u8]) -> [Event; 3] {
        [Event::Select, Event::Send(bytes.to_vec()), Event::Release]
    }

    #[test]
    fn arm_emits_exact_sequence() {
        let trace = Trace::new();
        let mut fpga = Fpga::new(FakeLink::new(&trace));
        let mut delay = FakeDelay::new(&trace);

        let candidate = GlitchCandidate {
            offset: 0x1234,
            width: 0x10,
            timeout: 0x05,
            subcycle_delay: 0x02,
        };
        fpga.arm(&candidate, &mut delay).unwrap();

        let mut expected = Vec::new();
        expected.extend(send(&[0x24, 0x06, 0x00]));
        expected.extend(send(&[0x24, 0x01, 0x34, 0x12]));
        expected.extend(send(&[0x24, 0x02, 0x10]));
        expected.extend(send(&[0x24, 0x03, 0x05]));
        expected.extend(send(&[0x24, 0x08, 0x02]));
        expected.extend(send(&[0x24, 0x06, 0x80]));
        expected.push(Event::DelayMs(1));
        expected.extend(send(&[0x24, 0x06, 0x10]));
        assert_eq!(trace.events(), expected);
    }

    #[test]
    fn arm_stops_at_first_link_error() {
        let trace = Trace::new();
        let mut link = FakeLink::new(&trace);
        link.fail_next();
        let mut fpga = Fpga::new(link);
        let mut delay = FakeDelay::new(&trace);

        assert!(fpga.arm(&GlitchCandidate::default(), &mut delay).is_err());
        assert!(trace.frames().is_empty());
    }

    #[test]
    fn flag_reads_use_their_subcommands() {
        let trace = Trace::new();
        let mut link = FakeLink::new(&trace);
        link.reply(&[0, 0, 0x81]);
        link.reply(&[0, 0, MMC_LOADER_DATA_RCVD]);
        let mut fpga = Fpga::new(link);

        assert_eq!(fpga.read_glitch_flags().unwrap().raw(), 0x81);
        assert!(fpga.read_mmc_flags().unwrap().loader_data_received());
        assert_eq!(
            trace.frames(),
            vec![vec![0x26, 0x0A, 0x00], vec![0x26, 0x0B, 0x00]]
        );
    }
}
