// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Calibration record and its persisted byte layout.
//!
//! All multi-byte fields are little-endian. The layout keeps the natural alignment padding of the
//! record so existing stored tables stay readable:
//!
//! | Offset | Size | Field |
//! | ------ | ---- | ----- |
//! | 0      | 4    | magic |
//! | 4      | 4    | search index |
//! | 8      | 256  | 32 timing entries, 8 bytes each: offset (2), width (1), pad (1), successes (4) |
//! | 264    | 1    | reflash flag |
//! | 265    | 1    | entry count, 0 if unknown |
//! | 266    | 2    | pad |
//!
//! Changing this layout invalidates stored data; only the magic word guards against that. The
//! entry count sits in what used to be padding, so records that predate it read back a count of
//! 0 and fall back to deriving occupancy from the search index.

use crate::config::{CALIBRATION_MAGIC, TIMING_SLOTS};

/// Size in bytes of one persisted timing entry.
pub const ENTRY_SIZE: usize = 8;

/// Size in bytes of the persisted record.
pub const RECORD_SIZE: usize = 8 + TIMING_SLOTS * ENTRY_SIZE + 4;

const ENTRIES_AT: usize = 8;
const REFLASH_AT: usize = ENTRIES_AT + TIMING_SLOTS * ENTRY_SIZE;
const COUNT_AT: usize = REFLASH_AT + 1;

/// Success tally for one explored (offset, width) pair.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TimingEntry {
    pub offset: u16,
    pub width: u8,
    pub success_count: u32,
}

impl TimingEntry {
    fn encode(&self, out: &mut [u8]) {
        out[0..2].copy_from_slice(&self.offset.to_le_bytes());
        out[2] = self.width;
        out[3] = 0;
        out[4..8].copy_from_slice(&self.success_count.to_le_bytes());
    }

    fn decode(raw: &[u8]) -> Self {
        Self {
            offset: u16::from_le_bytes([raw[0], raw[1]]),
            width: raw[2],
            success_count: u32::from_le_bytes([raw[4], raw[5], raw[6], raw[7]]),
        }
    }
}

/// The persisted state of the parameter search.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct CalibrationRecord {
    pub(super) magic: u32,
    pub(super) search_index: u32,
    pub(super) entries: [TimingEntry; TIMING_SLOTS],
    pub(super) reflash: u8,
    pub(super) count: u8,
}

impl Default for CalibrationRecord {
    fn default() -> Self {
        Self {
            magic: CALIBRATION_MAGIC,
            search_index: 0,
            entries: [TimingEntry::default(); TIMING_SLOTS],
            reflash: 0,
            count: 0,
        }
    }
}

impl CalibrationRecord {
    #[inline]
    pub fn magic(&self) -> u32 {
        self.magic
    }

    #[inline]
    pub fn search_index(&self) -> u32 {
        self.search_index
    }

    /// All slots, used or not, in sweep order.
    #[inline]
    pub fn slots(&self) -> &[TimingEntry; TIMING_SLOTS] {
        &self.entries
    }

    #[inline]
    pub fn reflash(&self) -> u8 {
        self.reflash
    }

    pub fn to_bytes(&self) -> [u8; RECORD_SIZE] {
        let mut out = [0u8; RECORD_SIZE];
        out[0..4].copy_from_slice(&self.magic.to_le_bytes());
        out[4..8].copy_from_slice(&self.search_index.to_le_bytes());
        for (entry, chunk) in self
            .entries
            .iter()
            .zip(out[ENTRIES_AT..REFLASH_AT].chunks_exact_mut(ENTRY_SIZE))
        {
            entry.encode(chunk);
        }
        out[REFLASH_AT] = self.reflash;
        out[COUNT_AT] = self.count;
        out
    }

    /// Decode raw storage contents. The result may be invalid; check with [`is_valid`].
    pub fn from_bytes(raw: &[u8; RECORD_SIZE]) -> Self {
        let mut entries = [TimingEntry::default(); TIMING_SLOTS];
        for (entry, chunk) in entries
            .iter_mut()
            .zip(raw[ENTRIES_AT..REFLASH_AT].chunks_exact(ENTRY_SIZE))
        {
            *entry = TimingEntry::decode(chunk);
        }
        Self {
            magic: u32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]),
            search_index: u32::from_le_bytes([raw[4], raw[5], raw[6], raw[7]]),
            entries,
            reflash: raw[REFLASH_AT],
            count: raw[COUNT_AT],
        }
    }

    /// Number of slots holding explored candidates.
    ///
    /// Taken from the stored count when there is one. Without it, `search_index` points at the
    /// newest slot and a record with index 0 and a blank first slot is empty.
    pub(super) fn occupied(&self) -> usize {
        if self.count != 0 {
            self.count as usize
        } else if self.search_index > 0 || self.entries[0] != TimingEntry::default() {
            self.search_index as usize + 1
        } else {
            0
        }
    }
}

/// Whether `record` may be used as is: the sentinel matches, the index is in range, and a stored
/// entry count agrees with the index.
pub fn is_valid(record: &CalibrationRecord) -> bool {
    record.magic == CALIBRATION_MAGIC
        && (record.search_index as usize) < TIMING_SLOTS
        && (record.count == 0 || record.count as u32 == record.search_index + 1)
}
