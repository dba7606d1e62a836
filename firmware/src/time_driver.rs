//! Simple embassy time driver fed from the SysTick exception

use cortex_m_rt::exception;
use embassy_time_driver::{AlarmHandle, Driver};
use portable_atomic::{AtomicU32, Ordering};

/// Simple time driver using a system tick counter
pub struct TickDriver {
    tick_count: AtomicU32,
}

impl TickDriver {
    const fn new() -> Self {
        Self {
            tick_count: AtomicU32::new(0),
        }
    }

    /// Increment tick count (called from the SysTick exception)
    pub fn tick(&self) {
        self.tick_count.fetch_add(1, Ordering::Relaxed);
    }
}

impl Driver for TickDriver {
    fn now(&self) -> u64 {
        self.tick_count.load(Ordering::Relaxed) as u64
    }

    unsafe fn allocate_alarm(&self) -> Option<AlarmHandle> {
        // Alarms unsupported; embassy falls back to its generic queue
        None
    }

    fn set_alarm_callback(&self, _alarm: AlarmHandle, _callback: fn(*mut ()), _ctx: *mut ()) {
        // Not implemented
    }

    fn set_alarm(&self, _alarm: AlarmHandle, _timestamp: u64) -> bool {
        // Not implemented
        false
    }
}

// Export the driver
embassy_time_driver::time_driver_impl!(static DRIVER: TickDriver = TickDriver::new());

#[exception]
fn SysTick() {
    DRIVER.tick();
}
