// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Cooperative Export Cancellation
//!
//! An `AbortSignal` is shared between the control path (which raises it when
//! the peer aborts the operation) and the export loop (which checks it
//! between records and clears it when observed).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::ExportError;

#[derive(Debug, Default)]
struct SignalState {
    aborted: AtomicBool,
    claimed: AtomicBool,
}

/// Cloneable abort flag with atomic read-and-clear.
#[derive(Debug, Clone, Default)]
pub struct AbortSignal {
    state: Arc<SignalState>,
}

impl AbortSignal {
    /// Creates an unset signal.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation of the running export.
    pub fn abort(&self) {
        self.state.aborted.store(true, Ordering::Release);
    }

    /// Returns whether an abort is pending, without consuming it.
    pub fn is_aborted(&self) -> bool {
        self.state.aborted.load(Ordering::Acquire)
    }

    /// Consumes a pending abort, returning whether one was set.
    pub fn take(&self) -> bool {
        self.state.aborted.swap(false, Ordering::AcqRel)
    }

    /// Claims the signal for one export.
    ///
    /// Only one lease can be alive at a time. Dropping it discards any abort
    /// the export did not observe and releases the claim.
    pub fn claim(&self) -> Result<SignalLease<'_>, ExportError> {
        self.state
            .claimed
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| ExportError::SignalBusy)?;
        Ok(SignalLease { signal: self })
    }
}

/// Exclusive use of an `AbortSignal` by one export.
#[derive(Debug)]
pub struct SignalLease<'a> {
    signal: &'a AbortSignal,
}

impl SignalLease<'_> {
    /// Consumes a pending abort.
    pub fn take(&self) -> bool {
        self.signal.take()
    }
}

impl Drop for SignalLease<'_> {
    fn drop(&mut self) {
        self.signal.state.aborted.store(false, Ordering::Release);
        self.signal.state.claimed.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_take_clears_flag() {
        let signal = AbortSignal::new();
        assert!(!signal.take());
        signal.abort();
        assert!(signal.is_aborted());
        assert!(signal.take());
        assert!(!signal.is_aborted());
        assert!(!signal.take());
    }

    #[test]
    fn test_abort_visible_across_threads() {
        let signal = AbortSignal::new();
        let remote = signal.clone();
        thread::spawn(move || remote.abort()).join().unwrap();
        assert!(signal.take());
    }

    #[test]
    fn test_claim_is_exclusive() {
        let signal = AbortSignal::new();
        let lease = signal.claim().unwrap();
        assert!(matches!(signal.claim(), Err(ExportError::SignalBusy)));
        drop(lease);
        assert!(signal.claim().is_ok());
    }

    #[test]
    fn test_released_lease_discards_unobserved_abort() {
        let signal = AbortSignal::new();
        let lease = signal.claim().unwrap();
        signal.abort();
        drop(lease);
        assert!(!signal.is_aborted());

        let lease = signal.claim().unwrap();
        assert!(!lease.take());
    }
}
