// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Command frames understood by the FPGA.
//!
//! Each constructor produces the exact byte layout the FPGA expects. Multi-byte values are sent
//! little-endian.

// Opcodes
pub mod op {
    pub const WRITE_PARAM: u8 = 0x24;
    pub const READ_STATUS: u8 = 0x26;
    pub const TARGET_COMMAND: u8 = 0x54;
    pub const READ_BUFFER: u8 = 0xBA;
    pub const WRITE_BUFFER: u8 = 0xBC;
    pub const READ_ID: u8 = 0xEE;
}

// Subcommands under WRITE_PARAM / READ_STATUS
pub mod sub {
    pub const OFFSET: u8 = 0x1;
    pub const WIDTH: u8 = 0x2;
    pub const TIMEOUT: u8 = 0x3;
    pub const BUFFER_SELECT: u8 = 0x5;
    pub const CONTROL: u8 = 0x6;
    pub const SUBCYCLE_DELAY: u8 = 0x8;
    pub const GLITCH_FLAGS: u8 = 0xA;
    pub const MMC_FLAGS: u8 = 0xB;
}

/// Values written to the control byte (subcommand 0x6).
pub mod ctrl {
    pub const CLEAR: u8 = 0x00;
    pub const CMD_MODE_BEGIN: u8 = 0x01;
    pub const POST_SEND: u8 = 0x03;
    pub const CMD_MODE_ENTER: u8 = 0x04;
    pub const POST_RECEIVE: u8 = 0x05;
    pub const ENABLE: u8 = 0x10;
    pub const STUCK: u8 = 0x40;
    pub const LATCH: u8 = 0x80;
}

/// Logical FPGA-side buffer targeted by subsequent buffer transfers.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Buffer {
    /// Traffic on the target's command line.
    Command = 0,
    /// Host-to-device command payloads.
    CommandData = 1,
    /// Device-to-host response payloads.
    ResponseData = 2,
}

impl Buffer {
    #[inline]
    pub fn tag(self) -> u8 {
        self as u8
    }

    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0 => Some(Buffer::Command),
            1 => Some(Buffer::CommandData),
            2 => Some(Buffer::ResponseData),
            _ => None,
        }
    }
}

const MAX_FRAME: usize = 5;

/// A fixed command frame of up to five bytes.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    bytes: [u8; MAX_FRAME],
    len: usize,
}

impl Frame {
    fn new(head: &[u8]) -> Self {
        let mut bytes = [0u8; MAX_FRAME];
        bytes[..head.len()].copy_from_slice(head);
        Self {
            bytes,
            len: head.len(),
        }
    }

    /// `{0x24, subcmd, value}`
    pub fn write_byte(subcmd: u8, value: u8) -> Self {
        Self::new(&[op::WRITE_PARAM, subcmd, value])
    }

    /// `{0x24, subcmd, lo, hi}`
    pub fn write_word(subcmd: u8, value: u16) -> Self {
        let [lo, hi] = value.to_le_bytes();
        Self::new(&[op::WRITE_PARAM, subcmd, lo, hi])
    }

    /// `{0x24, 0x6, value}`
    pub fn control(value: u8) -> Self {
        Self::write_byte(sub::CONTROL, value)
    }

    /// `{0x24, 0x5, tag}`
    pub fn select_buffer(buffer: Buffer) -> Self {
        Self::write_byte(sub::BUFFER_SELECT, buffer.tag())
    }

    /// `{0x26, subcmd, 0}`; the status byte comes back in position 2.
    pub fn read_status(subcmd: u8) -> Self {
        Self::new(&[op::READ_STATUS, subcmd, 0])
    }

    /// `{0xEE, 0, 0, 0, 0}`; the identifier comes back in positions 1..5.
    pub fn read_id() -> Self {
        Self::new(&[op::READ_ID, 0, 0, 0, 0])
    }

    /// `{0x54}`
    pub fn target_command() -> Self {
        Self::new(&[op::TARGET_COMMAND])
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len]
    }

    /// Mutable view used for full-duplex transfers.
    #[inline]
    pub fn as_mut_bytes(&mut self) -> &mut [u8] {
        &mut self.bytes[..self.len]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parameter_writes() {
        assert_eq!(Frame::write_byte(sub::WIDTH, 0x10).as_bytes(), &[0x24, 0x02, 0x10]);
        assert_eq!(
            Frame::write_word(sub::OFFSET, 0x1234).as_bytes(),
            &[0x24, 0x01, 0x34, 0x12]
        );
        assert_eq!(Frame::control(ctrl::LATCH).as_bytes(), &[0x24, 0x06, 0x80]);
    }

    #[test]
    fn buffer_select_uses_logical_tags() {
        assert_eq!(Frame::select_buffer(Buffer::Command).as_bytes(), &[0x24, 0x05, 0]);
        assert_eq!(Frame::select_buffer(Buffer::CommandData).as_bytes(), &[0x24, 0x05, 1]);
        assert_eq!(Frame::select_buffer(Buffer::ResponseData).as_bytes(), &[0x24, 0x05, 2]);
    }

    #[test]
    fn reads_and_single_byte_commands() {
        assert_eq!(Frame::read_status(sub::MMC_FLAGS).as_bytes(), &[0x26, 0x0B, 0x00]);
        assert_eq!(Frame::read_id().as_bytes(), &[0xEE, 0, 0, 0, 0]);
        assert_eq!(Frame::target_command().as_bytes(), &[0x54]);
    }
}
