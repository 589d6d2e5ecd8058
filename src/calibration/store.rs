// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Persistent calibration table.
//!
//! The table is an arena of [`TIMING_SLOTS`] fixed slots filled in sweep order. Slots are never
//! reordered or recycled; once all of them hold distinct candidates, a new candidate is rejected
//! with [`Error::CapacityExceeded`].

use log::{info, warn};

use super::record::{is_valid, CalibrationRecord, TimingEntry, RECORD_SIZE};
use crate::config::TIMING_SLOTS;
use crate::error::Error;
use crate::fpga::GlitchCandidate;

/// Non-volatile home of the calibration record.
///
/// A completed `write` must replace the previous contents as a whole. A write that is cut short
/// must leave something that fails [`is_valid`] rather than a mix of old and new data.
pub trait Storage {
    type Error;

    fn read(&mut self, buf: &mut [u8; RECORD_SIZE]) -> Result<(), Self::Error>;

    fn write(&mut self, buf: &[u8; RECORD_SIZE]) -> Result<(), Self::Error>;
}

/// In-memory calibration record backed by a [`Storage`].
pub struct CalibrationStore<S> {
    storage: S,
    record: CalibrationRecord,
    len: usize,
}

impl<S: Storage> CalibrationStore<S> {
    /// Start with a default record in memory. Nothing is read until [`CalibrationStore::load`].
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            record: CalibrationRecord::default(),
            len: 0,
        }
    }

    pub fn free(self) -> S {
        self.storage
    }

    /// Read the stored record. An invalid record is replaced by defaults in memory only.
    pub fn load(&mut self) -> Result<(), Error<S::Error>> {
        let mut raw = [0u8; RECORD_SIZE];
        self.storage.read(&mut raw)?;

        let record = CalibrationRecord::from_bytes(&raw);
        if is_valid(&record) {
            self.record = record;
            self.len = record.occupied();
            self.record.count = self.len as u8;
            info!("calibration loaded, {} entries", self.len);
        } else {
            warn!("calibration record invalid (magic {:#010x}), using defaults", record.magic());
            self.clear();
        }
        Ok(())
    }

    /// Reset the in-memory record to defaults without touching storage.
    pub fn clear(&mut self) {
        self.record = CalibrationRecord::default();
        self.len = 0;
    }

    /// Fold the outcome of one glitch attempt into the table.
    ///
    /// The candidate's (offset, width) slot is found or appended; a success bumps its counter.
    /// Returns the slot index. Storage is not written.
    pub fn record_attempt(
        &mut self,
        candidate: &GlitchCandidate,
        succeeded: bool,
    ) -> Result<usize, Error<S::Error>> {
        let slot = match self.find(candidate.offset, candidate.width) {
            Some(slot) => slot,
            None => {
                if self.len >= TIMING_SLOTS {
                    warn!(
                        "calibration table full, rejecting offset={} width={}",
                        candidate.offset, candidate.width
                    );
                    return Err(Error::CapacityExceeded);
                }
                let slot = self.len;
                self.record.entries[slot] = TimingEntry {
                    offset: candidate.offset,
                    width: candidate.width,
                    success_count: 0,
                };
                self.record.search_index = slot as u32;
                self.len += 1;
                self.record.count = self.len as u8;
                slot
            }
        };

        if succeeded {
            let entry = &mut self.record.entries[slot];
            entry.success_count = entry.success_count.saturating_add(1);
        }
        Ok(slot)
    }

    /// Persist the in-memory record.
    pub fn save(&mut self) -> Result<(), Error<S::Error>> {
        self.storage.write(&self.record.to_bytes())?;
        Ok(())
    }

    /// Wipe the table and persist the defaults.
    ///
    /// The in-memory record only changes once the write has gone through.
    pub fn reset(&mut self) -> Result<(), Error<S::Error>> {
        let fresh = CalibrationRecord::default();
        self.storage.write(&fresh.to_bytes())?;
        self.record = fresh;
        self.len = 0;
        info!("calibration reset");
        Ok(())
    }

    #[inline]
    pub fn record(&self) -> &CalibrationRecord {
        &self.record
    }

    /// Explored entries in sweep order.
    #[inline]
    pub fn entries(&self) -> &[TimingEntry] {
        &self.record.entries[..self.len]
    }

    #[inline]
    pub fn search_index(&self) -> u32 {
        self.record.search_index
    }

    #[inline]
    pub fn reflash_pending(&self) -> bool {
        self.record.reflash != 0
    }

    /// Set the reflash flag in memory. Call [`CalibrationStore::save`] to persist it.
    pub fn set_reflash(&mut self, pending: bool) {
        self.record.reflash = pending as u8;
    }

    fn find(&self, offset: u16, width: u8) -> Option<usize> {
        self.entries()
            .iter()
            .position(|e| e.offset == offset && e.width == width)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CALIBRATION_MAGIC;
    use crate::testing::MemStorage;

    fn candidate(offset: u16, width: u8) -> GlitchCandidate {
        GlitchCandidate {
            offset,
            width,
            ..GlitchCandidate::default()
        }
    }

    #[test]
    fn load_of_blank_storage_gives_defaults() {
        let mut store = CalibrationStore::new(MemStorage::blank());
        store.load().unwrap();

        assert_eq!(*store.record(), CalibrationRecord::default());
        assert_eq!(store.record().magic(), CALIBRATION_MAGIC);
        assert_eq!(store.free().writes, 0);
    }

    #[test]
    fn load_read_errors_propagate() {
        let mut store = CalibrationStore::new(MemStorage::default());
        assert!(matches!(store.load(), Err(Error::Io(_))));
    }

    #[test]
    fn save_then_load_restores_the_record() {
        let mut store = CalibrationStore::new(MemStorage::blank());
        store.record_attempt(&candidate(100, 4), true).unwrap();
        store.record_attempt(&candidate(104, 4), false).unwrap();
        store.record_attempt(&candidate(100, 4), true).unwrap();
        store.set_reflash(true);
        store.save().unwrap();
        let saved = *store.record();

        let mut reloaded = CalibrationStore::new(store.free());
        reloaded.load().unwrap();
        assert_eq!(*reloaded.record(), saved);
        assert_eq!(reloaded.entries().len(), 2);
        assert!(reloaded.reflash_pending());
    }

    #[test]
    fn lone_failed_zero_candidate_survives_reload() {
        let mut store = CalibrationStore::new(MemStorage::blank());
        assert_eq!(store.record_attempt(&candidate(0, 0), false).unwrap(), 0);
        store.save().unwrap();

        let mut reloaded = CalibrationStore::new(store.free());
        reloaded.load().unwrap();
        assert_eq!(reloaded.entries(), &[TimingEntry::default()]);

        assert_eq!(reloaded.record_attempt(&candidate(5, 5), false).unwrap(), 1);
        assert_eq!(reloaded.record_attempt(&candidate(0, 0), true).unwrap(), 0);
        assert_eq!(reloaded.entries().len(), 2);
        assert_eq!(reloaded.entries()[0].success_count, 1);
    }

    #[test]
    fn attempts_append_then_accumulate() {
        let mut store = CalibrationStore::new(MemStorage::blank());

        assert_eq!(store.record_attempt(&candidate(10, 1), false).unwrap(), 0);
        assert_eq!(store.entries()[0].success_count, 0);

        assert_eq!(store.record_attempt(&candidate(20, 1), true).unwrap(), 1);
        assert_eq!(store.search_index(), 1);

        assert_eq!(store.record_attempt(&candidate(10, 1), true).unwrap(), 0);
        assert_eq!(store.record_attempt(&candidate(10, 1), false).unwrap(), 0);
        assert_eq!(store.entries()[0].success_count, 1);
        assert_eq!(store.entries()[1].success_count, 1);
        assert_eq!(store.search_index(), 1);
    }

    #[test]
    fn thirty_third_candidate_is_rejected() {
        let mut store = CalibrationStore::new(MemStorage::blank());
        for i in 0..TIMING_SLOTS as u16 {
            store.record_attempt(&candidate(i, 2), i % 2 == 0).unwrap();
            assert!((store.search_index() as usize) < TIMING_SLOTS);
        }
        assert_eq!(store.search_index(), 31);

        let before = *store.record();
        assert_eq!(
            store.record_attempt(&candidate(500, 2), true),
            Err(Error::CapacityExceeded)
        );
        assert_eq!(*store.record(), before);

        // Known candidates still count when the table is full.
        assert_eq!(store.record_attempt(&candidate(3, 2), true).unwrap(), 3);
        assert_eq!(store.entries()[3].success_count, 1);
    }

    #[test]
    fn clear_restores_defaults_in_memory_only() {
        let mut store = CalibrationStore::new(MemStorage::blank());
        store.record_attempt(&candidate(1, 1), true).unwrap();
        store.clear();

        assert_eq!(store.search_index(), 0);
        assert!(store.entries().is_empty());
        assert!(store.record().slots().iter().all(|e| *e == TimingEntry::default()));
        assert_eq!(store.record().magic(), CALIBRATION_MAGIC);
        assert_eq!(store.free().writes, 0);
    }

    #[test]
    fn reset_persists_defaults() {
        let mut store = CalibrationStore::new(MemStorage::blank());
        store.record_attempt(&candidate(1, 1), true).unwrap();
        store.save().unwrap();
        store.reset().unwrap();

        let storage = store.free();
        assert_eq!(storage.writes, 2);
        assert_eq!(storage.data, Some(CalibrationRecord::default().to_bytes()));
    }

    #[test]
    fn failed_reset_keeps_the_old_record() {
        let mut store = CalibrationStore::new(MemStorage::blank());
        store.record_attempt(&candidate(1, 1), true).unwrap();
        let before = *store.record();

        let mut storage = store.free();
        storage.fail_writes = true;
        let mut store = CalibrationStore::new(storage);
        store.record_attempt(&candidate(1, 1), true).unwrap();
        assert!(store.reset().is_err());
        assert_eq!(*store.record(), before);
    }
}
