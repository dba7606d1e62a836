#![cfg_attr(not(feature = "std"), no_std)]

//! # Hivegate Core
//!
//! Crossing-detection engine for hive gates instrumented with paired
//! break-beam sensors behind an I2C GPIO expander. Turns latched expander
//! interrupt state into timestamped per-channel events, pairs the two sensor
//! timestamps of a channel into entries and exits, and keeps a shared
//! population count.

pub mod bridge;
pub mod capture;
pub mod correlator;
pub mod counter;
pub mod expander;
pub mod hal;
pub mod queue;
pub mod types;

#[cfg(feature = "test-utils")]
pub mod test_utils;

pub use bridge::InterruptBridge;
pub use capture::{falling_edges, CaptureEngine, CaptureSummary};
pub use correlator::{ChannelPair, ChannelVerdict, Correlator, ScanStats};
pub use counter::{PopulationCounter, SharedCounter};
pub use expander::Expander;
pub use hal::{BusError, Duration, I2cRegisterBus, Instant, RegisterBus};
pub use queue::*;
pub use types::*;

/// Engine library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default tuning for a single eight-tunnel gate board
pub fn default_config() -> GateConfig {
    GateConfig {
        passage_window: Duration::from_millis(2_000),
        stale_after: Duration::from_millis(5_000),
        scan_period: Duration::from_millis(50),
    }
}
