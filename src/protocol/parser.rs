// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Message parser for the host request protocol.
//!
//! Bytes are fed in one at a time as they arrive on whatever channel carries the protocol.
//! Unknown IDs and bad checksums drop the frame and resynchronise on the next start byte.

use crate::protocol::messages::*;

enum State {
    WaitStart,
    WaitId,
    WaitCount { id: u8 },
    Payload { id: u8, len: usize, filled: usize },
    WaitChecksum { id: u8, len: usize },
}

pub struct Parser {
    state: State,
    checksum: u8,
    payload: [u8; MAX_REQUEST_PAYLOAD],
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser {
    pub fn new() -> Self {
        Self {
            state: State::WaitStart,
            checksum: 0,
            payload: [0; MAX_REQUEST_PAYLOAD],
        }
    }

    /// Process a single incoming byte. Returns `Some(Request)` if a complete packet is received.
    pub fn push(&mut self, byte: u8) -> Option<Request> {
        match self.state {
            State::WaitStart => {
                if byte == START_BYTE {
                    self.state = State::WaitId;
                    self.checksum = 0;
                }
            }
            State::WaitId => {
                self.checksum = self.checksum.wrapping_add(byte);

                self.state = match Request::payload_len(byte) {
                    Some(PayloadLen::Fixed(0)) => State::WaitChecksum { id: byte, len: 0 },
                    Some(PayloadLen::Fixed(len)) => State::Payload {
                        id: byte,
                        len,
                        filled: 0,
                    },
                    Some(PayloadLen::Prefixed) => State::WaitCount { id: byte },
                    // Unknown message ID, reset state
                    None => State::WaitStart,
                };
            }
            State::WaitCount { id } => {
                self.checksum = self.checksum.wrapping_add(byte);
                self.payload[0] = byte;

                let len = 1 + byte as usize;
                self.state = if len > MAX_REQUEST_PAYLOAD {
                    // Count too large, reset state
                    State::WaitStart
                } else if len == 1 {
                    State::WaitChecksum { id, len }
                } else {
                    State::Payload { id, len, filled: 1 }
                };
            }
            State::Payload { id, len, filled } => {
                self.checksum = self.checksum.wrapping_add(byte);
                self.payload[filled] = byte;

                self.state = if filled + 1 == len {
                    State::WaitChecksum { id, len }
                } else {
                    State::Payload {
                        id,
                        len,
                        filled: filled + 1,
                    }
                };
            }
            State::WaitChecksum { id, len } => {
                let valid = byte == self.checksum;
                self.state = State::WaitStart; // Reset for next message

                if valid {
                    return Request::decode(id, &self.payload[..len]);
                }
            }
        }
        None
    }
}
