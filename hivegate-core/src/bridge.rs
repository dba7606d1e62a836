//! Interrupt-side handoff from the expander INT pin to the capture task
//!
//! The ISR must not touch the I2C bus, so the only thing crossing the
//! interrupt boundary is "something latched, go re-check". A single-slot
//! signal models that: a second notify while one is pending coalesces, and
//! the capture pass that follows still reads the full flag/capture state.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use portable_atomic::{AtomicU32, Ordering};

pub struct InterruptBridge {
    wake: Signal<CriticalSectionRawMutex, ()>,
    raised: AtomicU32,
}

impl InterruptBridge {
    pub const fn new() -> Self {
        Self {
            wake: Signal::new(),
            raised: AtomicU32::new(0),
        }
    }

    /// Called from the INT pin edge handler. O(1), no bus access, safe in
    /// interrupt context. Duplicate notifies while one is pending are a
    /// no-op on the wake side.
    pub fn notify(&self) {
        self.raised.fetch_add(1, Ordering::Relaxed);
        self.wake.signal(());
    }

    /// Suspend until the next notify, consuming the pending signal
    pub async fn wait(&self) {
        self.wake.wait().await;
    }

    /// True if a notify is pending and unconsumed
    pub fn pending(&self) -> bool {
        self.wake.signaled()
    }

    /// Total hardware notifications observed, coalesced ones included
    pub fn raised_total(&self) -> u32 {
        self.raised.load(Ordering::Relaxed)
    }
}

impl Default for InterruptBridge {
    fn default() -> Self {
        Self::new()
    }
}
