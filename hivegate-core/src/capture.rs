//! Event capture: latched expander state into per-channel queues
//!
//! Runs in its own task, woken by the [`InterruptBridge`](crate::bridge).
//! One pass reads each port's flag byte and, only when lines are flagged,
//! the capture byte (which clears the chip latch as a side effect). Flagged
//! lines captured low are beam activations and become timestamped events in
//! the matching channel queue; flagged lines captured high re-armed on the
//! way back up and carry no information.

use crate::expander::Expander;
use crate::hal::{BusError, Instant, RegisterBus};
use crate::queue::EventProducer;
use crate::types::{BeamEvent, Port, NUM_CHANNELS};

/// Falling-edge activations: flagged lines whose captured level is low.
pub const fn falling_edges(flags: u8, captured: u8) -> u8 {
    flags & !captured
}

/// What one capture pass produced.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CaptureSummary {
    /// Events enqueued for the entrance-side beams
    pub outer: u8,
    /// Events enqueued for the interior-side beams
    pub inner: u8,
    /// Events lost to full queues this pass
    pub dropped: u8,
}

impl CaptureSummary {
    pub fn total(&self) -> u8 {
        self.outer + self.inner
    }
}

/// Owns the expander and the producer halves of every channel queue.
pub struct CaptureEngine<'q, B> {
    expander: Expander<B>,
    outer: [EventProducer<'q>; NUM_CHANNELS],
    inner: [EventProducer<'q>; NUM_CHANNELS],
    dropped_total: u32,
}

impl<'q, B: RegisterBus> CaptureEngine<'q, B> {
    /// `expander` must already be initialized; the engine takes sole
    /// ownership of the bus from here on.
    pub fn new(
        expander: Expander<B>,
        outer: [EventProducer<'q>; NUM_CHANNELS],
        inner: [EventProducer<'q>; NUM_CHANNELS],
    ) -> Self {
        Self {
            expander,
            outer,
            inner,
            dropped_total: 0,
        }
    }

    /// One pass over the expander's latched interrupt state, stamping every
    /// activation with `now`.
    ///
    /// A burst of edges between two wake-ups coalesces into one pass that
    /// still sees the full flag state. A full queue drops that event and
    /// counts the loss; it never blocks. A bus fault abandons the pass (the
    /// next wake-up starts from fresh register state, so no retry here).
    pub fn service(&mut self, now: Instant) -> Result<CaptureSummary, BusError> {
        let mut summary = CaptureSummary::default();
        for port in Port::ALL {
            let flags = self.expander.interrupt_flags(port)?;
            if flags == 0 {
                continue;
            }
            // this read clears the chip latch, so take it exactly once
            let captured = self.expander.interrupt_capture(port)?;
            let active = falling_edges(flags, captured);

            let (queues, enqueued) = match port {
                Port::Outer => (&mut self.outer, &mut summary.outer),
                Port::Inner => (&mut self.inner, &mut summary.inner),
            };
            for channel in 0..NUM_CHANNELS {
                if active & (1 << channel) == 0 {
                    continue;
                }
                match queues[channel].enqueue(BeamEvent { at: now }) {
                    Ok(()) => *enqueued += 1,
                    Err(_) => {
                        summary.dropped += 1;
                        self.dropped_total = self.dropped_total.saturating_add(1);
                    }
                }
            }
        }
        Ok(summary)
    }

    /// Events lost to full queues since startup
    pub fn dropped_total(&self) -> u32 {
        self.dropped_total
    }

    /// Driver access for test harnesses that inject bus state
    #[cfg(any(test, feature = "test-utils"))]
    pub fn expander_mut(&mut self) -> &mut Expander<B> {
        &mut self.expander
    }
}
