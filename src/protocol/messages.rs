// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Host request and response messages.
//!
//! Request frame: `{START_BYTE, id, payload.., checksum}`. Most payloads have a fixed length per
//! ID; a buffer write carries a count byte followed by that many data bytes.
//! Response frame: `{START_BYTE, id, status, len_lo, len_hi, payload.., checksum}`.
//! The checksum is the wrapping sum of every byte after `START_BYTE`.

use crate::calibration::RECORD_SIZE;
use crate::error::Error;
use crate::fpga::{Buffer, GlitchCandidate};

/// Sync byte for the protocol.
pub const START_BYTE: u8 = 0xA5;

// Message IDs
pub const MSG_FPGA_RESET: u8 = 0x10;
pub const MSG_FPGA_POWER_OFF: u8 = 0x11;
pub const MSG_DEVICE_RESET: u8 = 0x12;
pub const MSG_FPGA_ID: u8 = 0x13;
pub const MSG_GLITCH: u8 = 0x20;
pub const MSG_GLITCH_FLAGS: u8 = 0x21;
pub const MSG_MMC_FLAGS: u8 = 0x22;
pub const MSG_TARGET_COMMAND: u8 = 0x23;
pub const MSG_COMMAND_MODE: u8 = 0x24;
pub const MSG_BUFFER_SELECT: u8 = 0x25;
pub const MSG_BUFFER_READ: u8 = 0x26;
pub const MSG_BUFFER_WRITE: u8 = 0x27;
pub const MSG_BUFFER_WAIT: u8 = 0x28;
pub const MSG_BUFFER_RECEIVED: u8 = 0x29;
pub const MSG_BUFFER_SENT: u8 = 0x2A;
pub const MSG_CAL_READ: u8 = 0x30;
pub const MSG_CAL_RECORD: u8 = 0x31;
pub const MSG_CAL_RESET: u8 = 0x32;
pub const MSG_CAL_REFLASH: u8 = 0x33;

/// Most data bytes one buffer write request can carry.
pub const BUFFER_CHUNK: usize = 64;

/// Longest request payload (a full buffer write with its count byte).
pub const MAX_REQUEST_PAYLOAD: usize = 1 + BUFFER_CHUNK;

/// Longest response payload (a full calibration record).
pub const MAX_RESPONSE_PAYLOAD: usize = RECORD_SIZE;

/// Longest encoded response frame.
pub const MAX_RESPONSE: usize = 6 + MAX_RESPONSE_PAYLOAD;

/// How the payload length of a request is known.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadLen {
    /// Always this many bytes.
    Fixed(usize),
    /// The first payload byte counts the bytes that follow it.
    Prefixed,
}

/// Requests the host can make.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Request {
    FpgaReset,
    FpgaPowerOff,
    DeviceReset { stuck_glitch: bool },
    FpgaId,
    Glitch(GlitchCandidate),
    GlitchFlags,
    MmcFlags,
    TargetCommand,
    CommandMode,
    BufferSelect(Buffer),
    BufferRead {
        len: u16,
    },
    BufferWrite {
        len: u8,
        data: [u8; BUFFER_CHUNK],
    },
    BufferWait,
    BufferReceived,
    BufferSent,
    CalibrationRead,
    CalibrationRecord {
        offset: u16,
        width: u8,
        succeeded: bool,
    },
    CalibrationReset,
    SetReflash(bool),
}

impl Request {
    /// Payload length for a message ID, `None` if the ID is unknown.
    pub fn payload_len(id: u8) -> Option<PayloadLen> {
        let len = match id {
            MSG_FPGA_RESET | MSG_FPGA_POWER_OFF | MSG_FPGA_ID | MSG_GLITCH_FLAGS
            | MSG_MMC_FLAGS | MSG_TARGET_COMMAND | MSG_COMMAND_MODE | MSG_BUFFER_WAIT
            | MSG_BUFFER_RECEIVED | MSG_BUFFER_SENT | MSG_CAL_READ | MSG_CAL_RESET => 0,
            MSG_DEVICE_RESET | MSG_BUFFER_SELECT | MSG_CAL_REFLASH => 1,
            MSG_BUFFER_READ => 2,
            MSG_CAL_RECORD => 4,
            MSG_GLITCH => 5,
            MSG_BUFFER_WRITE => return Some(PayloadLen::Prefixed),
            _ => return None,
        };
        Some(PayloadLen::Fixed(len))
    }

    /// Build a request from its ID and complete payload.
    ///
    /// Returns `None` for unknown IDs, payloads of the wrong length, and out-of-range values.
    pub fn decode(id: u8, p: &[u8]) -> Option<Self> {
        let well_sized = match Self::payload_len(id)? {
            PayloadLen::Fixed(len) => p.len() == len,
            PayloadLen::Prefixed => {
                !p.is_empty() && p[0] as usize <= BUFFER_CHUNK && p.len() == 1 + p[0] as usize
            }
        };
        if !well_sized {
            return None;
        }
        Some(match id {
            MSG_FPGA_RESET => Request::FpgaReset,
            MSG_FPGA_POWER_OFF => Request::FpgaPowerOff,
            MSG_DEVICE_RESET => Request::DeviceReset {
                stuck_glitch: p[0] == 1,
            },
            MSG_FPGA_ID => Request::FpgaId,
            MSG_GLITCH => Request::Glitch(GlitchCandidate {
                offset: u16::from_le_bytes([p[0], p[1]]),
                width: p[2],
                timeout: p[3],
                subcycle_delay: p[4],
            }),
            MSG_GLITCH_FLAGS => Request::GlitchFlags,
            MSG_MMC_FLAGS => Request::MmcFlags,
            MSG_TARGET_COMMAND => Request::TargetCommand,
            MSG_COMMAND_MODE => Request::CommandMode,
            MSG_BUFFER_SELECT => Request::BufferSelect(Buffer::from_tag(p[0])?),
            MSG_BUFFER_READ => {
                let len = u16::from_le_bytes([p[0], p[1]]);
                if len as usize > MAX_RESPONSE_PAYLOAD {
                    return None;
                }
                Request::BufferRead { len }
            }
            MSG_BUFFER_WRITE => {
                let mut data = [0u8; BUFFER_CHUNK];
                data[..p.len() - 1].copy_from_slice(&p[1..]);
                Request::BufferWrite { len: p[0], data }
            }
            MSG_BUFFER_WAIT => Request::BufferWait,
            MSG_BUFFER_RECEIVED => Request::BufferReceived,
            MSG_BUFFER_SENT => Request::BufferSent,
            MSG_CAL_READ => Request::CalibrationRead,
            MSG_CAL_RECORD => Request::CalibrationRecord {
                offset: u16::from_le_bytes([p[0], p[1]]),
                width: p[2],
                succeeded: p[3] != 0,
            },
            MSG_CAL_RESET => Request::CalibrationReset,
            MSG_CAL_REFLASH => Request::SetReflash(p[0] != 0),
            _ => return None,
        })
    }

    pub fn id(&self) -> u8 {
        match self {
            Request::FpgaReset => MSG_FPGA_RESET,
            Request::FpgaPowerOff => MSG_FPGA_POWER_OFF,
            Request::DeviceReset { .. } => MSG_DEVICE_RESET,
            Request::FpgaId => MSG_FPGA_ID,
            Request::Glitch(_) => MSG_GLITCH,
            Request::GlitchFlags => MSG_GLITCH_FLAGS,
            Request::MmcFlags => MSG_MMC_FLAGS,
            Request::TargetCommand => MSG_TARGET_COMMAND,
            Request::CommandMode => MSG_COMMAND_MODE,
            Request::BufferSelect(_) => MSG_BUFFER_SELECT,
            Request::BufferRead { .. } => MSG_BUFFER_READ,
            Request::BufferWrite { .. } => MSG_BUFFER_WRITE,
            Request::BufferWait => MSG_BUFFER_WAIT,
            Request::BufferReceived => MSG_BUFFER_RECEIVED,
            Request::BufferSent => MSG_BUFFER_SENT,
            Request::CalibrationRead => MSG_CAL_READ,
            Request::CalibrationRecord { .. } => MSG_CAL_RECORD,
            Request::CalibrationReset => MSG_CAL_RESET,
            Request::SetReflash(_) => MSG_CAL_REFLASH,
        }
    }
}

/// Outcome reported to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum StatusCode {
    Ok = 0x00,
    StatusFailed = 0x01,
    CapacityExceeded = 0x02,
    Timeout = 0x03,
    IoError = 0x04,
}

impl<E> From<&Error<E>> for StatusCode {
    fn from(err: &Error<E>) -> Self {
        match err {
            Error::Io(_) => StatusCode::IoError,
            Error::StatusSignalFailed => StatusCode::StatusFailed,
            Error::CapacityExceeded => StatusCode::CapacityExceeded,
            Error::Timeout => StatusCode::Timeout,
        }
    }
}

/// A response ready to be framed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Response<'a> {
    pub id: u8,
    pub status: StatusCode,
    pub payload: &'a [u8],
}

impl Response<'_> {
    /// Write the framed response into `out`, returning its length.
    ///
    /// Returns `None` if `out` is too small.
    pub fn encode(&self, out: &mut [u8]) -> Option<usize> {
        let total = 6 + self.payload.len();
        if out.len() < total || self.payload.len() > u16::MAX as usize {
            return None;
        }
        let [len_lo, len_hi] = (self.payload.len() as u16).to_le_bytes();

        out[0] = START_BYTE;
        out[1] = self.id;
        out[2] = self.status as u8;
        out[3] = len_lo;
        out[4] = len_hi;
        out[5..total - 1].copy_from_slice(self.payload);
        out[total - 1] = out[1..total - 1]
            .iter()
            .fold(0u8, |sum, b| sum.wrapping_add(*b));
        Some(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn glitch_payload_decodes() {
        let req = Request::decode(MSG_GLITCH, &[0x34, 0x12, 0x10, 0x05, 0x02]).unwrap();
        assert_eq!(
            req,
            Request::Glitch(GlitchCandidate {
                offset: 0x1234,
                width: 0x10,
                timeout: 0x05,
                subcycle_delay: 0x02,
            })
        );
        assert_eq!(req.id(), MSG_GLITCH);
    }

    #[test]
    fn wrong_payload_length_or_id_is_rejected() {
        assert_eq!(Request::decode(MSG_GLITCH, &[1, 2, 3]), None);
        assert_eq!(Request::decode(MSG_FPGA_ID, &[0]), None);
        assert_eq!(Request::decode(0x7F, &[]), None);
    }

    #[test]
    fn buffer_requests_decode() {
        assert_eq!(
            Request::decode(MSG_BUFFER_SELECT, &[2]),
            Some(Request::BufferSelect(Buffer::ResponseData))
        );
        assert_eq!(Request::decode(MSG_BUFFER_SELECT, &[3]), None);

        assert_eq!(
            Request::decode(MSG_BUFFER_READ, &[0x0C, 0x01]),
            Some(Request::BufferRead { len: 268 })
        );
        assert_eq!(Request::decode(MSG_BUFFER_READ, &[0x0D, 0x01]), None);

        let Some(Request::BufferWrite { len, data }) =
            Request::decode(MSG_BUFFER_WRITE, &[3, 0xAA, 0xBB, 0xCC])
        else {
            panic!("buffer write did not decode");
        };
        assert_eq!(len, 3);
        assert_eq!(&data[..4], &[0xAA, 0xBB, 0xCC, 0x00]);
    }

    #[test]
    fn buffer_write_count_must_match() {
        assert_eq!(Request::decode(MSG_BUFFER_WRITE, &[]), None);
        assert_eq!(Request::decode(MSG_BUFFER_WRITE, &[2, 0xAA]), None);
        assert!(Request::decode(MSG_BUFFER_WRITE, &[0]).is_some());
    }

    #[test]
    fn stuck_flag_needs_exact_one() {
        assert_eq!(
            Request::decode(MSG_DEVICE_RESET, &[2]),
            Some(Request::DeviceReset { stuck_glitch: false })
        );
        assert_eq!(
            Request::decode(MSG_DEVICE_RESET, &[1]),
            Some(Request::DeviceReset { stuck_glitch: true })
        );
    }

    #[test]
    fn response_framing() {
        let mut out = [0u8; 16];
        let resp = Response {
            id: MSG_GLITCH_FLAGS,
            status: StatusCode::Ok,
            payload: &[0x81],
        };
        let n = resp.encode(&mut out).unwrap();
        assert_eq!(&out[..n], &[0xA5, 0x21, 0x00, 0x01, 0x00, 0x81, 0xA3]);

        assert_eq!(resp.encode(&mut out[..6]), None);
    }

    #[test]
    fn errors_map_to_status_codes() {
        assert_eq!(StatusCode::from(&Error::<()>::StatusSignalFailed), StatusCode::StatusFailed);
        assert_eq!(StatusCode::from(&Error::Io(())), StatusCode::IoError);
    }
}
