// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Bulk data exchange with the FPGA-side buffers.
//!
//! Pick a buffer with [`Fpga::select_buffer`], then move bytes with [`Fpga::read_buffer`] and
//! [`Fpga::write_buffer`]. The FPGA signals incoming data through the MMC flags; the
//! `post_*` calls acknowledge each phase.

use log::debug;

use super::command::Fpga;
use super::frame::{ctrl, op};
use crate::error::Error;
use crate::poll::poll_until;
use crate::transport::Link;

impl<L: Link> Fpga<L> {
    /// Wait until the FPGA reports received loader data.
    ///
    /// Spins on the MMC flags for as long as the configured timeout allows. With the default
    /// [`Timeout::Forever`](crate::poll::Timeout::Forever) a silent FPGA hangs here.
    pub fn pre_receive(&mut self) -> Result<(), Error<L::Error>> {
        let timeout = self.timeout;
        poll_until::<L::Error, _>(timeout, || Ok(self.read_mmc_flags()?.loader_data_received()))
    }

    /// Acknowledge a receive phase.
    pub fn post_receive(&mut self) -> Result<(), Error<L::Error>> {
        self.write_control(ctrl::POST_RECEIVE)
    }

    /// Acknowledge a send phase.
    pub fn post_send(&mut self) -> Result<(), Error<L::Error>> {
        self.write_control(ctrl::POST_SEND)
    }

    /// Put the FPGA into command mode ahead of buffer operations.
    pub fn enter_command_mode(&mut self) -> Result<(), Error<L::Error>> {
        self.write_control(ctrl::CMD_MODE_ENTER)?;
        self.write_control(ctrl::CMD_MODE_BEGIN)
    }

    /// Fill `buf` from the selected buffer.
    pub fn read_buffer(&mut self, buf: &mut [u8]) -> Result<(), Error<L::Error>> {
        debug!("fpga buffer read, {} bytes", buf.len());
        self.link.framed(|l| {
            l.send(&[op::READ_BUFFER])?;
            l.transfer(buf)
        })?;
        Ok(())
    }

    /// Write `data` to the selected buffer.
    pub fn write_buffer(&mut self, data: &[u8]) -> Result<(), Error<L::Error>> {
        debug!("fpga buffer write, {} bytes", data.len());
        self.link.framed(|l| {
            l.send(&[op::WRITE_BUFFER])?;
            l.send(data)
        })?;
        Ok(())
    }
}
