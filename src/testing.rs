// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Host-side fakes for unit tests.
//!
//! Every fake appends to one shared [`Trace`], so a test can assert the exact interleaving of
//! select edges, frames, power changes and delays.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::convert::Infallible;
use std::rc::Rc;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{ErrorType, InputPin, OutputPin};

use crate::calibration::{Storage, RECORD_SIZE};
use crate::transport::{Link, Prescale};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    Init(Prescale),
    Select,
    Release,
    Send(Vec<u8>),
    Transfer(Vec<u8>),
    DelayUs(u32),
    DelayMs(u32),
    Power(bool),
}

#[derive(Clone, Default)]
pub struct Trace(Rc<RefCell<Vec<Event>>>);

impl Trace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, event: Event) {
        self.0.borrow_mut().push(event);
    }

    pub fn events(&self) -> Vec<Event> {
        self.0.borrow().clone()
    }

    /// Only the bytes that went out on the wire, one entry per `send`/`transfer`.
    pub fn frames(&self) -> Vec<Vec<u8>> {
        self.0
            .borrow()
            .iter()
            .filter_map(|e| match e {
                Event::Send(b) | Event::Transfer(b) => Some(b.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct LinkFault;

/// Scripted link: `transfer` returns queued replies in order, zeros once the queue is empty.
/// `fail_next` makes the next `init`, `send` or `transfer` fail.
pub struct FakeLink {
    trace: Trace,
    replies: VecDeque<Vec<u8>>,
    fail_next: bool,
}

impl FakeLink {
    pub fn new(trace: &Trace) -> Self {
        Self {
            trace: trace.clone(),
            replies: VecDeque::new(),
            fail_next: false,
        }
    }

    pub fn reply(&mut self, bytes: &[u8]) {
        self.replies.push_back(bytes.to_vec());
    }

    pub fn fail_next(&mut self) {
        self.fail_next = true;
    }

    fn check(&mut self) -> Result<(), LinkFault> {
        if core::mem::take(&mut self.fail_next) {
            return Err(LinkFault);
        }
        Ok(())
    }
}

impl Link for FakeLink {
    type Error = LinkFault;

    fn init(&mut self, prescale: Prescale) -> Result<(), LinkFault> {
        self.check()?;
        self.trace.push(Event::Init(prescale));
        Ok(())
    }

    fn send(&mut self, bytes: &[u8]) -> Result<(), LinkFault> {
        self.check()?;
        self.trace.push(Event::Send(bytes.to_vec()));
        Ok(())
    }

    fn transfer(&mut self, buf: &mut [u8]) -> Result<(), LinkFault> {
        self.check()?;
        self.trace.push(Event::Transfer(buf.to_vec()));
        let reply = self.replies.pop_front().unwrap_or_default();
        for (i, b) in buf.iter_mut().enumerate() {
            *b = reply.get(i).copied().unwrap_or(0);
        }
        Ok(())
    }

    fn assert_select(&mut self) -> Result<(), LinkFault> {
        self.trace.push(Event::Select);
        Ok(())
    }

    fn release_select(&mut self) -> Result<(), LinkFault> {
        self.trace.push(Event::Release);
        Ok(())
    }
}

pub struct FakeDelay {
    trace: Trace,
}

impl FakeDelay {
    pub fn new(trace: &Trace) -> Self {
        Self {
            trace: trace.clone(),
        }
    }
}

impl DelayNs for FakeDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.trace.push(Event::DelayUs(ns.div_ceil(1000)));
    }

    fn delay_us(&mut self, us: u32) {
        self.trace.push(Event::DelayUs(us));
    }

    fn delay_ms(&mut self, ms: u32) {
        self.trace.push(Event::DelayMs(ms));
    }
}

/// Power-enable output; records every level change.
pub struct FakePower {
    trace: Trace,
}

impl FakePower {
    pub fn new(trace: &Trace) -> Self {
        Self {
            trace: trace.clone(),
        }
    }
}

impl ErrorType for FakePower {
    type Error = Infallible;
}

impl OutputPin for FakePower {
    fn set_low(&mut self) -> Result<(), Infallible> {
        self.trace.push(Event::Power(false));
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Infallible> {
        self.trace.push(Event::Power(true));
        Ok(())
    }
}

/// Status input with a fixed level.
pub struct FakeStatus {
    pub high: bool,
}

impl ErrorType for FakeStatus {
    type Error = Infallible;
}

impl InputPin for FakeStatus {
    fn is_high(&mut self) -> Result<bool, Infallible> {
        Ok(self.high)
    }

    fn is_low(&mut self) -> Result<bool, Infallible> {
        Ok(!self.high)
    }
}

/// RAM-backed calibration storage.
#[derive(Default)]
pub struct MemStorage {
    pub data: Option<[u8; RECORD_SIZE]>,
    pub writes: usize,
    pub fail_writes: bool,
}

impl MemStorage {
    pub fn blank() -> Self {
        Self {
            data: Some([0xFF; RECORD_SIZE]),
            ..Self::default()
        }
    }
}

impl Storage for MemStorage {
    type Error = LinkFault;

    fn read(&mut self, buf: &mut [u8; RECORD_SIZE]) -> Result<(), LinkFault> {
        *buf = self.data.ok_or(LinkFault)?;
        Ok(())
    }

    fn write(&mut self, buf: &[u8; RECORD_SIZE]) -> Result<(), LinkFault> {
        if self.fail_writes {
            return Err(LinkFault);
        }
        self.data = Some(*buf);
        self.writes += 1;
        Ok(())
    }
}
