//! Core data types for the crossing engine

use crate::hal::{Duration, Instant};

/// Number of sensor-pair channels per expander (one per port line).
pub const NUM_CHANNELS: usize = 8;

/// The two sensor lines of one tunnel channel.
///
/// `Outer` is the entrance-side beam (expander PORTA), `Inner` the
/// interior-side beam (PORTB). The structure is symmetric; the meaning is
/// not: Outer breaks first on an entry, Inner first on an exit.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Port {
    /// Entrance-side beam, expander PORTA
    Outer,
    /// Interior-side beam, expander PORTB
    Inner,
}

impl Port {
    pub const ALL: [Port; 2] = [Port::Outer, Port::Inner];

    /// Index into per-port arrays (Outer = 0, Inner = 1)
    pub const fn index(self) -> usize {
        match self {
            Port::Outer => 0,
            Port::Inner => 1,
        }
    }

    /// The beam an object reaches next when moving through the tunnel
    pub const fn opposite(self) -> Port {
        match self {
            Port::Outer => Port::Inner,
            Port::Inner => Port::Outer,
        }
    }
}

/// One break-beam activation: the instant a sensor line fell to its
/// obstructed (low) level. Channel and port are implicit from the queue
/// that holds the event.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct BeamEvent {
    /// Monotonic tick at which the falling edge was captured
    pub at: Instant,
}

/// A completed, classified passage through one tunnel.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Crossing {
    /// Outer beam broke first: the object moved into the enclosure
    Entry,
    /// Inner beam broke first: the object moved out
    Exit,
}

/// Detection tuning for the whole gate.
#[derive(Copy, Clone, Debug)]
pub struct GateConfig {
    /// Max gap between the two beams of one crossing
    pub passage_window: Duration,
    /// Max age of an unmatched single event before it is discarded
    pub stale_after: Duration,
    /// Period of the correlation pass
    pub scan_period: Duration,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            passage_window: Duration::from_millis(2_000),
            stale_after: Duration::from_millis(5_000),
            scan_period: Duration::from_millis(50),
        }
    }
}

impl GateConfig {
    /// Create a new configuration with validation
    pub fn new(
        passage_window: Duration,
        stale_after: Duration,
        scan_period: Duration,
    ) -> Result<Self, &'static str> {
        if passage_window.as_millis() == 0 {
            return Err("Passage window must be non-zero");
        }
        if passage_window > stale_after {
            // a half-pair must survive long enough for its partner to arrive
            return Err("Passage window must not exceed the staleness timeout");
        }
        if scan_period.as_millis() == 0 {
            return Err("Scan period must be non-zero");
        }

        Ok(Self {
            passage_window,
            stale_after,
            scan_period,
        })
    }
}
