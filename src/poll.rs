// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Bounded polling of hardware flags.
//!
//! Every busy-wait in the driver goes through [`poll_until`]. With [`Timeout::Forever`] it spins
//! until the flag shows up, so a wedged FPGA hangs the caller. A [`Timeout::Polls`] bound turns
//! that hang into [`Error::Timeout`].

use crate::error::Error;

/// Upper bound on the number of polls a wait may take.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Timeout {
    /// Poll until the condition holds, however long that takes.
    #[default]
    Forever,
    /// Give up after this many unsuccessful polls.
    Polls(u32),
}

/// Call `ready` until it returns `true` or the timeout is used up.
///
/// Errors from `ready` are returned immediately.
pub fn poll_until<E, F>(timeout: Timeout, mut ready: F) -> Result<(), Error<E>>
where
    F: FnMut() -> Result<bool, Error<E>>,
{
    let mut polls: u32 = 0;
    loop {
        if ready()? {
            return Ok(());
        }
        polls = polls.saturating_add(1);
        if let Timeout::Polls(limit) = timeout {
            if polls >= limit {
                return Err(Error::Timeout);
            }
        }
    }
}
