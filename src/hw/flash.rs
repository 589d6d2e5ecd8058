// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Calibration storage in on-chip flash.
//!
//! The record lives at the start of the last 256 KiB sector (single-bank layout). Writes erase
//! the sector, program the record body, and program the magic word last, so a write cut short by
//! a reset reads back with erased (0xFF) magic and is treated as absent.

use stm32f7xx_hal::flash::{self, Flash};

use crate::calibration::{Storage, RECORD_SIZE};

/// Sector number of the calibration sector.
const SECTOR: u8 = 11;

/// Absolute address of the calibration sector.
const SECTOR_ADDR: usize = 0x081C_0000;

/// Offset of the calibration sector from the start of flash.
const SECTOR_OFFSET: usize = SECTOR_ADDR - 0x0800_0000;

/// Bytes covered by the validity word.
const MAGIC_LEN: usize = 4;

pub struct FlashStorage {
    flash: Flash,
}

impl FlashStorage {
    pub fn new(flash: Flash) -> Self {
        Self { flash }
    }

    fn program(&mut self, buf: &[u8; RECORD_SIZE]) -> Result<(), flash::Error> {
        self.flash.blocking_erase_sector(SECTOR)?;
        self.flash
            .blocking_program(SECTOR_OFFSET + MAGIC_LEN, &buf[MAGIC_LEN..])?;
        self.flash.blocking_program(SECTOR_OFFSET, &buf[..MAGIC_LEN])
    }
}

impl Storage for FlashStorage {
    type Error = flash::Error;

    fn read(&mut self, buf: &mut [u8; RECORD_SIZE]) -> Result<(), flash::Error> {
        // SAFETY: the sector is memory mapped, always readable, and only written through `self`.
        let stored = unsafe { core::slice::from_raw_parts(SECTOR_ADDR as *const u8, RECORD_SIZE) };
        buf.copy_from_slice(stored);
        Ok(())
    }

    fn write(&mut self, buf: &[u8; RECORD_SIZE]) -> Result<(), flash::Error> {
        self.flash.unlock();
        let result = self.program(buf);
        self.flash.lock();
        result
    }
}
