// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Error type shared by the FPGA driver and the calibration store.

use core::fmt;

/// Failure of a core operation.
///
/// `E` is the error type of the backend doing the I/O: the serial link for FPGA operations,
/// the non-volatile storage for calibration operations.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E> {
    /// The link or storage backend reported an error.
    Io(E),
    /// The FPGA did not raise its status signal after power-up. Power sequencing may be retried.
    StatusSignalFailed,
    /// The calibration table is full and the candidate is not already in it.
    CapacityExceeded,
    /// A bounded poll ran out before the awaited flag appeared.
    Timeout,
}

impl<E> From<E> for Error<E> {
    fn from(err: E) -> Self {
        Error::Io(err)
    }
}

impl<E: fmt::Debug> fmt::Display for Error<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(err) => write!(f, "i/o error: {:?}", err),
            Error::StatusSignalFailed => f.write_str("fpga status signal low after power-up"),
            Error::CapacityExceeded => f.write_str("calibration table full"),
            Error::Timeout => f.write_str("timed out waiting for fpga"),
        }
    }
}
