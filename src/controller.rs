// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Request dispatch.
//!
//! [`Controller`] owns the FPGA driver, the power sequencer, the delay source and the calibration
//! store, and maps each host [`Request`] onto them. It runs on the single control thread; nothing
//! else touches the link or the calibration record.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};
use log::{debug, info, warn};

use crate::calibration::{CalibrationStore, Storage, RECORD_SIZE};
use crate::error::Error;
use crate::fpga::{Fpga, GlitchCandidate, PowerSequencer};
use crate::protocol::messages::MAX_RESPONSE_PAYLOAD;
use crate::protocol::{Request, StatusCode};
use crate::transport::Link;

/// Status and payload length of a handled request. The payload itself is in the caller's buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reply {
    pub status: StatusCode,
    pub len: usize,
}

impl Reply {
    fn ok(len: usize) -> Self {
        Self {
            status: StatusCode::Ok,
            len,
        }
    }

    fn from_result<E>(result: Result<usize, Error<E>>) -> Self {
        match result {
            Ok(len) => Self::ok(len),
            Err(err) => Self {
                status: StatusCode::from(&err),
                len: 0,
            },
        }
    }
}

pub struct Controller<L, PWR, ST, D, S> {
    fpga: Fpga<L>,
    power: PowerSequencer<PWR, ST>,
    delay: D,
    store: CalibrationStore<S>,
}

impl<L, PWR, ST, D, S> Controller<L, PWR, ST, D, S>
where
    L: Link,
    PWR: OutputPin,
    ST: InputPin,
    D: DelayNs,
    S: Storage,
{
    pub fn new(
        fpga: Fpga<L>,
        power: PowerSequencer<PWR, ST>,
        delay: D,
        store: CalibrationStore<S>,
    ) -> Self {
        Self {
            fpga,
            power,
            delay,
            store,
        }
    }

    /// Load the calibration table, then bring the link up with the FPGA unpowered.
    ///
    /// A storage read failure falls back to defaults like an invalid record does. The table is
    /// loaded even when the link fails, so later requests never save over a good stored table.
    pub fn start(&mut self) -> Result<(), Error<L::Error>> {
        if self.store.load().is_err() {
            warn!("calibration storage unreadable, using defaults");
            self.store.clear();
        }
        self.power.init(&mut self.fpga)?;
        info!(
            "controller ready, calibration index {}",
            self.store.search_index()
        );
        Ok(())
    }

    #[inline]
    pub fn power(&self) -> &PowerSequencer<PWR, ST> {
        &self.power
    }

    #[inline]
    pub fn store(&self) -> &CalibrationStore<S> {
        &self.store
    }

    /// Execute `request`, writing any response payload into `payload`.
    pub fn handle(
        &mut self,
        request: &Request,
        payload: &mut [u8; MAX_RESPONSE_PAYLOAD],
    ) -> Reply {
        debug!("request {:?}", request);

        match *request {
            Request::FpgaReset => {
                Reply::from_result(self.power.reset(&mut self.fpga, &mut self.delay).map(|_| 0))
            }
            Request::FpgaPowerOff => {
                self.power.power_off();
                Reply::ok(0)
            }
            Request::DeviceReset { stuck_glitch } => Reply::from_result(
                self.fpga
                    .reset_device(&mut self.delay, stuck_glitch)
                    .map(|_| 0),
            ),
            Request::FpgaId => Reply::from_result(self.fpga.read_id().map(|id| {
                info!("fpga id {:#010x}", id);
                payload[..4].copy_from_slice(&id.to_le_bytes());
                4
            })),
            Request::Glitch(ref candidate) => {
                Reply::from_result(self.fpga.arm(candidate, &mut self.delay).map(|_| 0))
            }
            Request::GlitchFlags => Reply::from_result(self.fpga.read_glitch_flags().map(|f| {
                payload[0] = f.raw();
                1
            })),
            Request::MmcFlags => Reply::from_result(self.fpga.read_mmc_flags().map(|f| {
                payload[0] = f.raw();
                1
            })),
            Request::TargetCommand => {
                Reply::from_result(self.fpga.issue_target_command().map(|_| 0))
            }
            Request::CommandMode => Reply::from_result(self.fpga.enter_command_mode().map(|_| 0)),
            Request::BufferSelect(buffer) => {
                Reply::from_result(self.fpga.select_buffer(buffer).map(|_| 0))
            }
            Request::BufferRead { len } => {
                let len = len as usize;
                Reply::from_result(self.fpga.read_buffer(&mut payload[..len]).map(|_| len))
            }
            Request::BufferWrite { len, ref data } => {
                Reply::from_result(self.fpga.write_buffer(&data[..len as usize]).map(|_| 0))
            }
            Request::BufferWait => Reply::from_result(self.fpga.pre_receive().map(|_| 0)),
            Request::BufferReceived => Reply::from_result(self.fpga.post_receive().map(|_| 0)),
            Request::BufferSent => Reply::from_result(self.fpga.post_send().map(|_| 0)),
            Request::CalibrationRead => {
                payload[..RECORD_SIZE].copy_from_slice(&self.store.record().to_bytes());
                Reply::ok(RECORD_SIZE)
            }
            Request::CalibrationRecord {
                offset,
                width,
                succeeded,
            } => Reply::from_result(self.record_outcome(
                &GlitchCandidate {
                    offset,
                    width,
                    ..GlitchCandidate::default()
                },
                succeeded,
                payload,
            )),
            Request::CalibrationReset => Reply::from_result(self.store.reset().map(|_| 0)),
            Request::SetReflash(pending) => {
                let previous = self.store.reflash_pending();
                self.store.set_reflash(pending);
                let saved = self.store.save();
                if saved.is_err() {
                    self.store.set_reflash(previous);
                }
                Reply::from_result(saved.map(|_| 0))
            }
        }
    }

    /// Record one attempt and persist the table. The slot index goes back as one byte.
    fn record_outcome(
        &mut self,
        candidate: &GlitchCandidate,
        succeeded: bool,
        payload: &mut [u8],
    ) -> Result<usize, Error<S::Error>> {
        let slot = self.store.record_attempt(candidate, succeeded)?;
        self.store.save()?;
        payload[0] = slot as u8;
        Ok(1)
    }
}
