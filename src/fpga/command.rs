// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! FPGA command protocol.
//!
//! Register-style access on top of a [`Link`]: parameter writes, status reads, buffer selection
//! and identification. Every call is one select-bracketed frame.

use log::trace;

use super::frame::{Buffer, Frame};
use crate::error::Error;
use crate::poll::Timeout;
use crate::transport::Link;

/// FPGA driver owning the transport link.
pub struct Fpga<L> {
    pub(super) link: L,
    pub(super) timeout: Timeout,
}

impl<L: Link> Fpga<L> {
    /// Wrap a link. Flag waits are unbounded until [`Fpga::with_timeout`] says otherwise.
    pub fn new(link: L) -> Self {
        Self {
            link,
            timeout: Timeout::Forever,
        }
    }

    /// Bound every flag wait to `timeout` polls.
    pub fn with_timeout(mut self, timeout: Timeout) -> Self {
        self.timeout = timeout;
        self
    }

    /// Release the link.
    pub fn free(self) -> L {
        self.link
    }

    /// Send a frame, discarding whatever comes back.
    pub fn send_frame(&mut self, frame: Frame) -> Result<(), Error<L::Error>> {
        trace!("fpga tx {:02x?}", frame.as_bytes());
        self.link.framed(|l| l.send(frame.as_bytes()))?;
        Ok(())
    }

    /// Exchange a frame full duplex and return what the FPGA clocked back.
    pub fn exchange_frame(&mut self, mut frame: Frame) -> Result<Frame, Error<L::Error>> {
        trace!("fpga txrx {:02x?}", frame.as_bytes());
        self.link.framed(|l| l.transfer(frame.as_mut_bytes()))?;
        Ok(frame)
    }

    /// Byte parameter write: `{0x24, subcmd, value}`.
    pub fn write_byte(&mut self, subcmd: u8, value: u8) -> Result<(), Error<L::Error>> {
        self.send_frame(Frame::write_byte(subcmd, value))
    }

    /// Word parameter write: `{0x24, subcmd, lo, hi}`.
    pub fn write_word(&mut self, subcmd: u8, value: u16) -> Result<(), Error<L::Error>> {
        self.send_frame(Frame::write_word(subcmd, value))
    }

    /// Write the control byte (subcommand 0x6).
    pub fn write_control(&mut self, value: u8) -> Result<(), Error<L::Error>> {
        self.send_frame(Frame::control(value))
    }

    /// Status byte read: `{0x26, subcmd, 0}`, result is the third byte clocked back.
    pub fn read_status(&mut self, subcmd: u8) -> Result<u8, Error<L::Error>> {
        let reply = self.exchange_frame(Frame::read_status(subcmd))?;
        Ok(reply.as_bytes()[2])
    }

    /// Read the 32-bit FPGA identifier.
    pub fn read_id(&mut self) -> Result<u32, Error<L::Error>> {
        let reply = self.exchange_frame(Frame::read_id())?;
        let b = reply.as_bytes();
        Ok(u32::from_le_bytes([b[1], b[2], b[3], b[4]]))
    }

    /// Direct subsequent buffer transfers to `buffer`.
    pub fn select_buffer(&mut self, buffer: Buffer) -> Result<(), Error<L::Error>> {
        self.send_frame(Frame::select_buffer(buffer))
    }

    /// Have the FPGA issue the pending command to the target.
    pub fn issue_target_command(&mut self) -> Result<(), Error<L::Error>> {
        self.send_frame(Frame::target_command())
    }
}
