//! Shared rigs for the host-side suites
//!
//! Queues are leaked so their producer and consumer halves carry a 'static
//! lifetime and can move across threads and tasks, matching how the
//! firmware allocates them.

use hivegate_core::*;

pub fn ms(t: u64) -> Instant {
    Instant::from_millis(t)
}

pub fn test_config() -> GateConfig {
    GateConfig::new(
        Duration::from_millis(2_000),
        Duration::from_millis(5_000),
        Duration::from_millis(50),
    )
    .unwrap()
}

/// Leaked counter with the firmware's mutex flavor
pub fn counter() -> &'static SharedCounter {
    Box::leak(Box::new(SharedCounter::new()))
}

/// One channel's queues: both producer halves plus the paired consumers
pub fn channel() -> (
    EventProducer<'static>,
    EventProducer<'static>,
    ChannelPair<'static>,
) {
    let outer: &'static mut EventQueue = Box::leak(Box::new(EventQueue::new()));
    let inner: &'static mut EventQueue = Box::leak(Box::new(EventQueue::new()));
    let (outer_p, outer_c) = outer.split();
    let (inner_p, inner_c) = inner.split();
    (
        outer_p,
        inner_p,
        ChannelPair {
            outer: outer_c,
            inner: inner_c,
        },
    )
}

/// Full eight-channel rig wired the way the firmware wires it
pub struct GateRig {
    pub outer: [EventProducer<'static>; NUM_CHANNELS],
    pub inner: [EventProducer<'static>; NUM_CHANNELS],
    pub correlator: Correlator<'static>,
    pub counter: &'static SharedCounter,
}

pub fn gate() -> GateRig {
    let outer_bank: &'static mut QueueBank = Box::leak(Box::new(new_bank()));
    let inner_bank: &'static mut QueueBank = Box::leak(Box::new(new_bank()));
    let (outer_p, outer_c) = split_bank(outer_bank);
    let (inner_p, inner_c) = split_bank(inner_bank);
    GateRig {
        outer: outer_p,
        inner: inner_p,
        correlator: Correlator::new(ChannelPair::from_banks(outer_c, inner_c), test_config()),
        counter: counter(),
    }
}

pub fn push(producer: &mut EventProducer<'static>, t: u64) {
    producer.enqueue(BeamEvent { at: ms(t) }).unwrap();
}
